//! Signing-authority key set: fetch + read-through cache keyed by `kid`.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("key set request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the published key set comes from.
///
/// Implementations must be cheap to share (`Arc<dyn KeySetSource>`).
#[async_trait]
pub trait KeySetSource: Send + Sync + 'static {
    // Returns the source name (for logging).
    fn source_name(&self) -> String;

    async fn fetch(&self) -> Result<JwkSet, KeySetError>;
}

/// `GET <issuer>/.well-known/jwks.json`
#[derive(Clone, Debug)]
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: url::Url,
}

impl HttpKeySetSource {
    pub fn new(url: url::Url, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    fn source_name(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        let set = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        Ok(set)
    }
}

/// Fixed key set (no I/O). Counts fetches so cache behaviour can be asserted.
#[cfg(test)]
#[derive(Debug)]
pub struct StaticKeySet {
    set: JwkSet,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl StaticKeySet {
    pub fn new(set: JwkSet) -> Self {
        Self {
            set,
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl KeySetSource for StaticKeySet {
    fn source_name(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.set.clone())
    }
}

/// Read-through cache of decoding keys.
///
/// - Lookups share the read lock.
/// - A miss (unknown `kid`) triggers one refresh; there is no timer.
/// - Concurrent misses are coalesced behind `refresh_lock`.
/// - After a successful refresh, further misses within `min_refresh_interval`
///   answer "unknown key" without contacting the source.
pub struct KeySetCache {
    source: Arc<dyn KeySetSource>,
    keys: RwLock<HashMap<String, DecodingKey>>,
    // last successful refresh
    refresh_lock: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("KeySetCache")
            .field("source", &self.source.source_name())
            .finish()
    }
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySetSource>) -> Self {
        Self::with_min_refresh_interval(source, MIN_REFRESH_INTERVAL)
    }

    pub fn with_min_refresh_interval(source: Arc<dyn KeySetSource>, interval: Duration) -> Self {
        Self {
            source,
            keys: RwLock::new(HashMap::new()),
            refresh_lock: Mutex::new(None),
            min_refresh_interval: interval,
        }
    }

    pub async fn get(&self, kid: &str) -> Result<Option<DecodingKey>, KeySetError> {
        if let Some(key) = self.cached(kid).await {
            return Ok(Some(key));
        }

        let mut last_refresh = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(key) = self.cached(kid).await {
            return Ok(Some(key));
        }

        if let Some(at) = *last_refresh
            && at.elapsed() < self.min_refresh_interval
        {
            tracing::debug!(kid = %kid, "unknown kid, key set refreshed recently");
            return Ok(None);
        }

        self.refresh().await?;
        *last_refresh = Some(Instant::now());
        Ok(self.cached(kid).await)
    }

    async fn cached(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn refresh(&self) -> Result<(), KeySetError> {
        let set = self.source.fetch().await?;
        let keys = decoding_keys(&set);

        tracing::debug!(
            source = %self.source.source_name(),
            keys = keys.len(),
            "signing key set refreshed"
        );

        *self.keys.write().await = keys;
        Ok(())
    }
}

// Keys without `kid`, non-signature keys and keys jsonwebtoken cannot use are skipped.
fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter(|jwk| !matches!(&jwk.common.public_key_use, Some(u) if *u != PublicKeyUse::Signature))
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    tracing::warn!(kid = %kid, error = %e, "skipping unusable jwk");
                    None
                }
            }
        })
        .collect()
}
