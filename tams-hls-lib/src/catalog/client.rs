//! HTTP client for the TAMS store API.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::auth::TokenProvider;
use super::{Catalog, SegmentPage};
use crate::error::{ManifestError, Result};
use crate::types::{Flow, FlowSegment, Source};

/// Client for the TAMS store HTTP API.
///
/// Every call attaches the bearer credential from the configured
/// [`TokenProvider`] and maps non-success statuses to
/// [`ManifestError::CatalogStatus`]. The caller supplies a `reqwest::Client`
/// already configured with a request timeout.
pub struct TamsClient {
    http: reqwest::Client,
    base_url: String,
    auth: TokenProvider,
}

impl TamsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, auth: TokenProvider) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let mut request = self.http.get(url);
        if let Some(token) = self.auth.bearer().await? {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ManifestError::CatalogStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "catalog request");
        let response = self.get(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_page(&self, url: &str) -> Result<SegmentPage> {
        debug!(url, "segment page request");
        let response = self.get(url).await?;
        let next = next_link(response.headers());
        let body = response.bytes().await?;
        let segments: Vec<FlowSegment> = serde_json::from_slice(&body)?;
        Ok(SegmentPage { segments, next })
    }
}

#[async_trait]
impl Catalog for TamsClient {
    async fn source(&self, source_id: Uuid) -> Result<Source> {
        self.get_json(&format!("{}/sources/{}", self.base_url, source_id))
            .await
    }

    async fn flow(&self, flow_id: Uuid) -> Result<Flow> {
        self.get_json(&format!(
            "{}/flows/{}?include_timerange=true",
            self.base_url, flow_id
        ))
        .await
    }

    async fn flows_by_source(&self, source_id: Uuid) -> Result<Vec<Flow>> {
        self.get_json(&format!("{}/flows?source_id={}", self.base_url, source_id))
            .await
    }

    async fn segments(&self, flow_id: Uuid, limit: Option<u64>) -> Result<SegmentPage> {
        let mut url = format!(
            "{}/flows/{}/segments?reverse_order=true",
            self.base_url, flow_id
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }
        self.get_page(&url).await
    }

    async fn segments_page(&self, next: &str) -> Result<SegmentPage> {
        self.get_page(next).await
    }
}

/// Continuation URL from a `Link: <...>; rel="next"` response header.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::LINK).and_then(|v| v.to_str().ok())?;
    for link in value.split(',') {
        let mut pieces = link.split(';');
        let target = match pieces.next() {
            Some(target) => target.trim(),
            None => continue,
        };
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param.eq_ignore_ascii_case("rel=\"next\"") || param.eq_ignore_ascii_case("rel=next")
        });
        if is_next {
            return Some(target[1..target.len() - 1].to_string());
        }
    }
    None
}
