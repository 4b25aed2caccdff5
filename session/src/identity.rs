use crate::session::Session;
use anyhow::Result;
use file_manager::credential_cache::CredentialCache;
use tracing::debug;

/// The identity handed to the wrapped command
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedIdentity {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    pub region: Option<String>,
}

/// Resolves credentials and region through the session.
///
/// The cache is only constructed and attached when caching is enabled. An explicit region
/// wins over the one configured for the profile.
pub async fn resolve_identity<S, F>(
    session: &mut S,
    region: Option<String>,
    cache_enabled: bool,
    make_cache: F,
) -> Result<ResolvedIdentity>
where
    S: Session,
    F: FnOnce() -> Result<Box<dyn CredentialCache>>,
{
    if cache_enabled {
        let cache = make_cache()?;
        debug!("Caching assumed role credentials in {:?}", cache);
        session.attach_cache(cache);
    }

    let region = region.or_else(|| session.scoped_region());
    let credentials = session.credentials().await?;

    Ok(ResolvedIdentity {
        access_key: credentials.access_key,
        secret_key: credentials.secret_key,
        session_token: credentials.session_token,
        region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ResolvedCredentials;
    use anyhow::bail;
    use file_manager::credential_cache::JsonFileCache;

    #[derive(Default)]
    struct FakeSession {
        region: Option<String>,
        attach_calls: usize,
        fail: bool,
    }

    impl Session for FakeSession {
        fn attach_cache(&mut self, _cache: Box<dyn CredentialCache>) {
            self.attach_calls += 1;
        }

        fn scoped_region(&self) -> Option<String> {
            self.region.clone()
        }

        async fn credentials(&self) -> Result<ResolvedCredentials> {
            if self.fail {
                bail!("The config profile (missing) could not be found");
            }
            Ok(ResolvedCredentials {
                access_key: "A".to_string(),
                secret_key: "S".to_string(),
                session_token: Some("T".to_string()),
                expiration: None,
            })
        }
    }

    fn cache() -> Result<Box<dyn CredentialCache>> {
        Ok(Box::new(JsonFileCache::with_working_dir("unused")))
    }

    #[tokio::test]
    async fn cache_is_attached_when_enabled() {
        let mut session = FakeSession::default();

        resolve_identity(&mut session, None, true, cache)
            .await
            .unwrap();

        assert_eq!(session.attach_calls, 1);
    }

    #[tokio::test]
    async fn cache_is_never_attached_when_disabled() {
        let mut session = FakeSession::default();
        let mut factory_calls = 0;

        resolve_identity(&mut session, None, false, || {
            factory_calls += 1;
            cache()
        })
        .await
        .unwrap();

        assert_eq!(session.attach_calls, 0);
        assert_eq!(factory_calls, 0);
    }

    #[tokio::test]
    async fn region_falls_back_to_scoped_config() {
        let mut session = FakeSession {
            region: Some("eu-west-1".to_string()),
            ..Default::default()
        };

        let identity = resolve_identity(&mut session, None, false, cache)
            .await
            .unwrap();

        assert_eq!(
            identity,
            ResolvedIdentity {
                access_key: "A".to_string(),
                secret_key: "S".to_string(),
                session_token: Some("T".to_string()),
                region: Some("eu-west-1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn explicit_region_wins() {
        let mut session = FakeSession {
            region: Some("eu-west-1".to_string()),
            ..Default::default()
        };

        let region = Some("us-east-2".to_string());
        let identity = resolve_identity(&mut session, region, false, cache)
            .await
            .unwrap();

        assert_eq!(identity.region.as_deref(), Some("us-east-2"));
    }

    #[tokio::test]
    async fn resolution_errors_propagate() {
        let mut session = FakeSession {
            fail: true,
            ..Default::default()
        };

        let err = resolve_identity(&mut session, None, true, cache)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("could not be found"));
    }
}
