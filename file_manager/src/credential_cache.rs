use crate::serde_support::serialize_datetime_with_ms;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use directories::UserDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Relative to the home directory. Keys differ from the AWS CLI's, so entries are kept apart
pub const CACHE_DIR: &str = ".aws/aws-profile/cache";

/// Minutes before expiry at which cached credentials are considered stale
const REFRESH_WINDOW_MINUTES: i64 = 11;

/// Storage for assumed-role credentials, keyed by a digest of the role parameters
pub trait CredentialCache: Debug {
    fn get(&self, cache_key: &str) -> Option<CachedCredentials>;

    fn set(&self, cache_key: &str, value: &CachedCredentials) -> Result<()>;
}

/// Cache body in the layout the AWS CLI uses for its own assume-role cache
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CachedCredentials {
    pub credentials: CachedCredential,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CachedCredential {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    #[serde(serialize_with = "serialize_datetime_with_ms")]
    pub expiration: DateTime<Utc>,
}

impl CachedCredentials {
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        session_token: &str,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            credentials: CachedCredential {
                access_key_id: access_key_id.to_owned(),
                secret_access_key: secret_access_key.to_owned(),
                session_token: session_token.to_owned(),
                expiration,
            },
        }
    }

    pub fn is_about_to_expire(&self) -> bool {
        let time_difference = self
            .credentials
            .expiration
            .signed_duration_since(Utc::now());
        time_difference < chrono::Duration::minutes(REFRESH_WINDOW_MINUTES)
    }
}

/// JSON file per cache key
#[derive(Clone, Debug)]
pub struct JsonFileCache {
    working_dir: PathBuf,
}

impl JsonFileCache {
    pub fn new() -> Result<Self> {
        match UserDirs::new() {
            Some(user_dirs) => Ok(Self::with_working_dir(
                user_dirs.home_dir().join(CACHE_DIR),
            )),
            None => Err(anyhow!("Unable to get user directories")),
        }
    }

    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.working_dir
    }

    pub fn file_path(&self, cache_key: &str) -> PathBuf {
        self.working_dir.join(format!("{}.json", cache_key))
    }

    pub fn read<T: DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        let path = self.file_path(cache_key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Cache miss for {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring undecodable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn write<T: Serialize + Debug>(&self, cache_key: &str, value: &T) -> Result<()> {
        let file_content = serde_json::to_string(value).map_err(|e| {
            anyhow!(
                "Value cannot be cached, must be JSON serializable: {:?} ({})",
                value,
                e
            )
        })?;

        if !self.working_dir.is_dir() {
            fs::create_dir_all(&self.working_dir).with_context(|| {
                format!(
                    "Unable to create cache directory {}",
                    self.working_dir.display()
                )
            })?;
        }

        let path = self.file_path(cache_key);
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&path)
            .with_context(|| format!("Unable to open cache file {}", path.display()))?;
        file.write_all(file_content.as_bytes())
            .with_context(|| format!("Unable to write cache file {}", path.display()))?;

        debug!("Cached credentials written to {}", path.display());

        Ok(())
    }
}

impl CredentialCache for JsonFileCache {
    fn get(&self, cache_key: &str) -> Option<CachedCredentials> {
        self.read(cache_key)
    }

    fn set(&self, cache_key: &str, value: &CachedCredentials) -> Result<()> {
        self.write(cache_key, value)
    }
}
