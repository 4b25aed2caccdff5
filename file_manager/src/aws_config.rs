use anyhow::{anyhow, bail, Context, Result};
use directories::UserDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

/// The subset of a shared config profile this tool cares about.
/// Everything else in the section is left to the SDK.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub role_arn: Option<String>,
    pub source_profile: Option<String>,
    pub credential_source: Option<String>,
    pub role_session_name: Option<String>,
    pub external_id: Option<String>,
    pub mfa_serial: Option<String>,
    pub duration_seconds: Option<u32>,
}

impl AwsConfig {
    pub fn file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        match UserDirs::new() {
            Some(user_dirs) => Ok(user_dirs.home_dir().join(".aws/config")),
            None => Err(anyhow!("Unable to get user directories")),
        }
    }

    pub fn read_file() -> Result<HashMap<String, AwsConfig>> {
        let config_path = Self::file_path()?;
        Self::read_from(&config_path)
    }

    pub fn read_from(config_path: &Path) -> Result<HashMap<String, AwsConfig>> {
        if !config_path.exists() {
            bail!("AWS config file not found at {}", config_path.display())
        }
        let file = File::open(config_path)
            .with_context(|| format!("Unable to open {}", config_path.display()))?;
        let reader = BufReader::new(file);
        let profiles: HashMap<String, AwsConfig> = serde_ini::from_bufread(reader)
            .with_context(|| format!("Unable to parse {}", config_path.display()))?;

        Ok(profiles)
    }

    pub fn get(profile_name: &str, profiles: &HashMap<String, AwsConfig>) -> Result<AwsConfig> {
        let profile_name_sanitized = Self::sanitize_profile_name(profile_name);
        let profile = profiles.get(&profile_name_sanitized).ok_or_else(|| {
            anyhow!(
                "Profile '{}' not found in the AWS config file",
                profile_name
            )
        })?;

        Ok(profile.clone())
    }

    pub fn assumes_role(&self) -> bool {
        self.role_arn
            .as_deref()
            .is_some_and(|arn| !arn.trim().is_empty())
    }

    pub fn sanitize_profile_name(profile_name: &str) -> String {
        if profile_name != "default" && !profile_name.starts_with("profile ") {
            format!("profile {}", profile_name)
        } else {
            profile_name.to_string()
        }
    }
}
