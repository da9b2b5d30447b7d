use std::sync::Arc;
use shared::models::Charity;
use tracing::{info, warn};

use crate::cache::{TtlCache, CHARITIES_KEY};
use crate::credentials::CredentialCache;
use crate::force::{CharitySource, ForceError};

// The whole charity list is one cache entry; the dataset is tens of
// rows, so lookups are linear scans.
#[derive(Clone)]
pub struct CharityCatalog {
    cache: Arc<TtlCache>,
    credentials: CredentialCache,
    source: Arc<dyn CharitySource>,
}

impl CharityCatalog {
    pub fn new(
        cache: Arc<TtlCache>,
        credentials: CredentialCache,
        source: Arc<dyn CharitySource>,
    ) -> Self {
        Self {
            cache,
            credentials,
            source,
        }
    }

    // A 401 means the cached token died before its TTL: evict, re-grant,
    // retry once.
    pub async fn get_charities(&self) -> Result<Vec<Charity>, ForceError> {
        if let Some(charities) = self.cache.get::<Vec<Charity>>(CHARITIES_KEY) {
            info!("Charity list served from cache");
            return Ok(charities);
        }

        info!("Charity cache miss, querying Force.com");
        let credential = self.credentials.get().await?;
        let charities = match self.source.fetch_charities(&credential).await {
            Ok(charities) => charities,
            Err(ForceError::AuthExpired) => {
                warn!("Force.com token expired before cache TTL, re-granting");
                self.credentials.evict();
                let credential = self.credentials.get().await?;
                self.source.fetch_charities(&credential).await?
            }
            Err(e) => return Err(e),
        };

        self.cache.set(CHARITIES_KEY, &charities);
        Ok(charities)
    }

    pub async fn get_charity(&self, id: &str) -> Result<Option<Charity>, ForceError> {
        let charities = self.get_charities().await?;
        Ok(charities.into_iter().find(|c| c.id == id))
    }

    // Reports whether an entry was present; the next call refetches.
    pub fn flush(&self) -> bool {
        info!("Flushing charity cache");
        self.cache.delete(CHARITIES_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::{ServiceCredential, TokenGranter};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::Duration;

    fn charity(id: &str, name: &str) -> Charity {
        Charity {
            id: id.into(),
            name: name.into(),
            logo_url: None,
            detail_url: None,
        }
    }

    struct StaticGranter {
        grants: AtomicUsize,
    }

    impl StaticGranter {
        fn new() -> Self {
            Self {
                grants: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenGranter for StaticGranter {
        async fn password_grant(&self) -> Result<ServiceCredential, ForceError> {
            let n = self.grants.fetch_add(1, Ordering::SeqCst);
            Ok(ServiceCredential {
                access_token: format!("token-{n}"),
                instance_url: "https://na1.example.com".into(),
            })
        }
    }

    struct CountingSource {
        fetches: AtomicUsize,
        charities: Vec<Charity>,
        // Tokens this source rejects with a 401.
        rejected_token: Option<String>,
    }

    impl CountingSource {
        fn new(charities: Vec<Charity>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                charities,
                rejected_token: None,
            }
        }

        fn rejecting(charities: Vec<Charity>, token: &str) -> Self {
            Self {
                rejected_token: Some(token.into()),
                ..Self::new(charities)
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CharitySource for CountingSource {
        async fn fetch_charities(
            &self,
            credential: &ServiceCredential,
        ) -> Result<Vec<Charity>, ForceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.rejected_token.as_deref() == Some(credential.access_token.as_str()) {
                return Err(ForceError::AuthExpired);
            }
            Ok(self.charities.clone())
        }
    }

    fn catalog_with(source: Arc<CountingSource>) -> (CharityCatalog, Arc<StaticGranter>) {
        let cache = Arc::new(TtlCache::new(Duration::hours(1)));
        let granter = Arc::new(StaticGranter::new());
        let credentials = CredentialCache::new(cache.clone(), granter.clone());
        (CharityCatalog::new(cache, credentials, source), granter)
    }

    #[tokio::test]
    async fn second_call_within_ttl_hits_the_cache() {
        let source = Arc::new(CountingSource::new(vec![charity("a01", "Alpha")]));
        let (catalog, _) = catalog_with(source.clone());

        let first = catalog.get_charities().await.unwrap();
        let second = catalog.get_charities().await.unwrap();

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn flush_forces_exactly_one_refetch() {
        let source = Arc::new(CountingSource::new(vec![charity("a01", "Alpha")]));
        let (catalog, _) = catalog_with(source.clone());

        catalog.get_charities().await.unwrap();
        assert!(catalog.flush());
        catalog.get_charities().await.unwrap();

        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn flush_reports_empty_cache() {
        let source = Arc::new(CountingSource::new(vec![]));
        let (catalog, _) = catalog_with(source);
        assert!(!catalog.flush());
    }

    #[tokio::test]
    async fn get_charity_scans_the_cached_list() {
        let source = Arc::new(CountingSource::new(vec![
            charity("a01", "Alpha"),
            charity("a02", "Beta"),
        ]));
        let (catalog, _) = catalog_with(source.clone());

        let found = catalog.get_charity("a02").await.unwrap();
        assert_eq!(found.map(|c| c.name), Some("Beta".to_string()));

        let missing = catalog.get_charity("a99").await.unwrap();
        assert!(missing.is_none());

        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn stale_token_is_evicted_and_query_retried_once() {
        // The granter hands out token-0 first; the source 401s it. The
        // catalog must evict, grant token-1, and succeed.
        let source = Arc::new(CountingSource::rejecting(
            vec![charity("a01", "Alpha")],
            "token-0",
        ));
        let (catalog, granter) = catalog_with(source.clone());

        let charities = catalog.get_charities().await.unwrap();

        assert_eq!(charities.len(), 1);
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(granter.grants.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_auth_failure_surfaces_after_one_retry() {
        struct AlwaysExpired;

        #[async_trait]
        impl CharitySource for AlwaysExpired {
            async fn fetch_charities(
                &self,
                _credential: &ServiceCredential,
            ) -> Result<Vec<Charity>, ForceError> {
                Err(ForceError::AuthExpired)
            }
        }

        let cache = Arc::new(TtlCache::new(Duration::hours(1)));
        let granter = Arc::new(StaticGranter::new());
        let credentials = CredentialCache::new(cache.clone(), granter.clone());
        let catalog = CharityCatalog::new(cache, credentials, Arc::new(AlwaysExpired));

        assert!(matches!(
            catalog.get_charities().await,
            Err(ForceError::AuthExpired)
        ));
        assert_eq!(granter.grants.load(Ordering::SeqCst), 2);
    }
}
