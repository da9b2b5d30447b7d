use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{TtlCache, ACCESS_TOKEN_KEY, INSTANCE_URL_KEY};
use crate::force::{ForceError, ServiceCredential, TokenGranter};

// Token and instance URL live under separate cache keys; if either is
// missing the whole credential is re-granted.
#[derive(Clone)]
pub struct CredentialCache {
    cache: Arc<TtlCache>,
    granter: Arc<dyn TokenGranter>,
}

impl CredentialCache {
    pub fn new(cache: Arc<TtlCache>, granter: Arc<dyn TokenGranter>) -> Self {
        Self { cache, granter }
    }

    // TTL expiry alone does not guarantee validity; callers that see a
    // 401 downstream must evict and retry.
    pub async fn get(&self) -> Result<ServiceCredential, ForceError> {
        let access_token: Option<String> = self.cache.get(ACCESS_TOKEN_KEY);
        let instance_url: Option<String> = self.cache.get(INSTANCE_URL_KEY);

        if let (Some(access_token), Some(instance_url)) = (access_token, instance_url) {
            debug!("Force.com credential served from cache");
            return Ok(ServiceCredential {
                access_token,
                instance_url,
            });
        }

        info!("Force.com credential cache miss, performing password grant");
        let credential = self.granter.password_grant().await?;
        self.cache.set(ACCESS_TOKEN_KEY, &credential.access_token);
        self.cache.set(INSTANCE_URL_KEY, &credential.instance_url);
        Ok(credential)
    }

    pub fn evict(&self) {
        info!("Evicting cached Force.com credential");
        self.cache.delete(ACCESS_TOKEN_KEY);
        self.cache.delete(INSTANCE_URL_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::Duration;

    struct CountingGranter {
        grants: AtomicUsize,
    }

    impl CountingGranter {
        fn new() -> Self {
            Self {
                grants: AtomicUsize::new(0),
            }
        }

        fn grant_count(&self) -> usize {
            self.grants.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenGranter for CountingGranter {
        async fn password_grant(&self) -> Result<ServiceCredential, ForceError> {
            let n = self.grants.fetch_add(1, Ordering::SeqCst);
            Ok(ServiceCredential {
                access_token: format!("token-{n}"),
                instance_url: "https://na1.example.com".into(),
            })
        }
    }

    fn credentials_with_ttl(ttl: Duration) -> (CredentialCache, Arc<CountingGranter>) {
        let granter = Arc::new(CountingGranter::new());
        let cache = Arc::new(TtlCache::new(ttl));
        (
            CredentialCache::new(cache, granter.clone()),
            granter,
        )
    }

    #[tokio::test]
    async fn miss_performs_one_grant_then_serves_from_cache() {
        let (credentials, granter) = credentials_with_ttl(Duration::hours(1));

        let first = credentials.get().await.unwrap();
        assert_eq!(granter.grant_count(), 1);
        assert_eq!(first.access_token, "token-0");

        let second = credentials.get().await.unwrap();
        assert_eq!(granter.grant_count(), 1);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn evict_forces_a_fresh_grant() {
        let (credentials, granter) = credentials_with_ttl(Duration::hours(1));

        credentials.get().await.unwrap();
        credentials.evict();
        let fresh = credentials.get().await.unwrap();

        assert_eq!(granter.grant_count(), 2);
        assert_eq!(fresh.access_token, "token-1");
    }

    #[tokio::test]
    async fn expired_cache_entries_trigger_a_grant() {
        let (credentials, granter) = credentials_with_ttl(Duration::seconds(-1));

        credentials.get().await.unwrap();
        credentials.get().await.unwrap();
        assert_eq!(granter.grant_count(), 2);
    }

    #[tokio::test]
    async fn grant_failure_propagates() {
        struct FailingGranter;

        #[async_trait]
        impl TokenGranter for FailingGranter {
            async fn password_grant(&self) -> Result<ServiceCredential, ForceError> {
                Err(ForceError::UnexpectedResponse("login server down".into()))
            }
        }

        let cache = Arc::new(TtlCache::new(Duration::hours(1)));
        let credentials = CredentialCache::new(cache, Arc::new(FailingGranter));
        assert!(matches!(
            credentials.get().await,
            Err(ForceError::UnexpectedResponse(_))
        ));
    }
}
