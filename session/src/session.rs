use crate::role::AssumeRoleParameters;
use anyhow::{anyhow, Context, Result};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use chrono::{DateTime, Utc};
use file_manager::aws_config::AwsConfig;
use file_manager::credential_cache::{CachedCredentials, CredentialCache};
use std::path::PathBuf;
use tracing::{debug, info};

const PROFILE_ENV: &str = "AWS_PROFILE";

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl From<&Credentials> for ResolvedCredentials {
    fn from(credentials: &Credentials) -> Self {
        Self {
            access_key: credentials.access_key_id().to_owned(),
            secret_key: credentials.secret_access_key().to_owned(),
            session_token: credentials.session_token().map(str::to_owned),
            expiration: credentials.expiry().map(DateTime::<Utc>::from),
        }
    }
}

impl From<CachedCredentials> for ResolvedCredentials {
    fn from(cached: CachedCredentials) -> Self {
        let credential = cached.credentials;
        Self {
            access_key: credential.access_key_id,
            secret_key: credential.secret_access_key,
            session_token: Some(credential.session_token),
            expiration: Some(credential.expiration),
        }
    }
}

/// A credential source scoped to one profile.
///
/// `attach_cache` is the only way the rest of the tool influences how credentials are
/// obtained; everything else about role assumption stays inside the SDK.
#[allow(async_fn_in_trait)]
pub trait Session {
    fn attach_cache(&mut self, cache: Box<dyn CredentialCache>);

    fn scoped_region(&self) -> Option<String>;

    async fn credentials(&self) -> Result<ResolvedCredentials>;
}

#[derive(Debug)]
pub struct SdkSession {
    profile_name: Option<String>,
    config: SdkConfig,
    config_file: Option<PathBuf>,
    cache: Option<Box<dyn CredentialCache>>,
}

impl SdkSession {
    /// Loads the SDK configuration for the profile, or the SDK's default chain if none is given.
    ///
    /// A named profile only resolves through the profile files, identity variables already
    /// in the environment never take its place.
    pub async fn load(profile_name: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile_name) = profile_name {
            let provider = ProfileFileCredentialsProvider::builder()
                .profile_name(profile_name)
                .build();
            loader = loader.profile_name(profile_name).credentials_provider(provider);
        }
        let config = loader.load().await;

        Self::new(profile_name.map(str::to_owned), config)
    }

    pub fn new(profile_name: Option<String>, config: SdkConfig) -> Self {
        Self {
            profile_name,
            config,
            config_file: AwsConfig::file_path().ok(),
            cache: None,
        }
    }

    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = Some(config_file.into());
        self
    }

    fn effective_profile_name(&self) -> String {
        self.profile_name
            .clone()
            .or_else(|| std::env::var(PROFILE_ENV).ok().filter(|p| !p.is_empty()))
            .unwrap_or_else(|| "default".to_string())
    }

    /// The profile's own section of the config file, without environment overrides
    fn scoped_config(&self) -> Option<AwsConfig> {
        let config_file = self.config_file.as_ref()?;
        let profile_name = self.effective_profile_name();

        let profiles = match AwsConfig::read_from(config_file) {
            Ok(profiles) => profiles,
            Err(e) => {
                debug!("{:#}", e);
                return None;
            }
        };

        match AwsConfig::get(&profile_name, &profiles) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("{:#}", e);
                None
            }
        }
    }

    fn role_parameters(&self) -> Option<AssumeRoleParameters> {
        let parameters = self
            .scoped_config()
            .and_then(|config| AssumeRoleParameters::from_config(&config));
        if parameters.is_none() {
            debug!("Not caching, {} does not assume a role", self.effective_profile_name());
        }
        parameters
    }

    async fn resolve(&self) -> Result<ResolvedCredentials> {
        let provider = self
            .config
            .credentials_provider()
            .ok_or_else(|| anyhow!("No credentials provider is configured"))?;

        let credentials = provider.provide_credentials().await.with_context(|| {
            format!(
                "Unable to resolve credentials for profile '{}'",
                self.effective_profile_name()
            )
        })?;

        Ok(ResolvedCredentials::from(&credentials))
    }
}

impl Session for SdkSession {
    fn attach_cache(&mut self, cache: Box<dyn CredentialCache>) {
        self.cache = Some(cache);
    }

    fn scoped_region(&self) -> Option<String> {
        self.scoped_config()
            .and_then(|config| config.region)
            .filter(|region| !region.trim().is_empty())
    }

    async fn credentials(&self) -> Result<ResolvedCredentials> {
        let cache = match &self.cache {
            Some(cache) => cache,
            None => return self.resolve().await,
        };

        let cache_key = match self.role_parameters() {
            Some(parameters) => parameters.cache_key()?,
            None => return self.resolve().await,
        };

        if let Some(cached) = cache.get(&cache_key) {
            if !cached.is_about_to_expire() {
                info!("Using cached credentials for {}", self.effective_profile_name());
                return Ok(cached.into());
            }
            debug!("Cached credentials {} are about to expire", cache_key);
        }

        let credentials = self.resolve().await?;

        if let (Some(session_token), Some(expiration)) =
            (&credentials.session_token, credentials.expiration)
        {
            let cached = CachedCredentials::new(
                &credentials.access_key,
                &credentials.secret_key,
                session_token,
                expiration,
            );
            cache.set(&cache_key, &cached)?;
        }

        Ok(credentials)
    }
}
