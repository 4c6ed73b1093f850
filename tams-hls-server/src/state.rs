//! Application state shared across handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tams_hls_lib::{Catalog, CodecMap, TamsClient, UrlSigner};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{Result, ServerError};

/// Application state shared across all handlers.
pub struct AppState {
    /// TAMS store access.
    pub catalog: Arc<dyn Catalog>,

    /// Process-lifetime codec mapping table, refreshed on a TTL.
    pub codec_map: CodecMapCache,

    /// Signer for playlist URIs.
    pub signer: Arc<dyn UrlSigner>,

    /// Segment count used when a flow carries no `hls_segments` tag.
    pub default_segments: u64,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ServerError::Config(format!("HTTP client: {e}")))?;

        let auth = config.token_provider(http.clone());
        let catalog: Arc<dyn Catalog> =
            Arc::new(TamsClient::new(http.clone(), config.tams_url.clone(), auth));

        Ok(Self {
            catalog,
            codec_map: CodecMapCache::new(
                http,
                config.codec_map.clone(),
                Duration::from_secs(config.codec_map_ttl),
            ),
            signer: config.signer(),
            default_segments: config.default_segments,
        })
    }
}

/// Lazily loaded codec mapping table.
///
/// Populated on first use and kept for the configured TTL; a failed load is
/// logged and degrades to an empty table so manifest generation can still
/// fall back to raw codec tokens.
pub struct CodecMapCache {
    http: reqwest::Client,
    source: Option<String>,
    ttl: Duration,
    cached: RwLock<Option<CachedMap>>,
}

struct CachedMap {
    loaded_at: Instant,
    map: Arc<CodecMap>,
}

impl CodecMapCache {
    pub fn new(http: reqwest::Client, source: Option<String>, ttl: Duration) -> Self {
        Self {
            http,
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Arc<CodecMap> {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.loaded_at.elapsed() < self.ttl {
                    return entry.map.clone();
                }
            }
        }

        let mut slot = self.cached.write().await;
        if let Some(entry) = slot.as_ref() {
            if entry.loaded_at.elapsed() < self.ttl {
                return entry.map.clone();
            }
        }

        let map = Arc::new(self.load().await);
        *slot = Some(CachedMap {
            loaded_at: Instant::now(),
            map: map.clone(),
        });
        map
    }

    async fn load(&self) -> CodecMap {
        let Some(source) = self.source.as_deref() else {
            return CodecMap::default();
        };
        match self.load_source(source).await {
            Ok(map) => {
                tracing::debug!(source, mappings = map.len(), "loaded codec mapping table");
                map
            }
            Err(err) => {
                tracing::warn!(
                    source,
                    error = %err,
                    "codec mapping table unavailable, using empty table"
                );
                CodecMap::default()
            }
        }
    }

    async fn load_source(&self, source: &str) -> Result<CodecMap> {
        let raw = if source.starts_with("http://") || source.starts_with("https://") {
            let response = self
                .http
                .get(source)
                .send()
                .await
                .map_err(|e| ServerError::Config(e.to_string()))?;
            if !response.status().is_success() {
                return Err(ServerError::Config(format!(
                    "codec map endpoint returned {}",
                    response.status()
                )));
            }
            response
                .text()
                .await
                .map_err(|e| ServerError::Config(e.to_string()))?
        } else {
            tokio::fs::read_to_string(source).await?
        };
        CodecMap::from_json(&raw)
            .map_err(|e| ServerError::Config(format!("invalid codec map: {e}")))
    }
}
