//! Read-side access to the TAMS store.

pub mod auth;
pub mod client;
pub mod segments;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Flow, FlowSegment, Source};

/// One page of a flow's segment listing, newest-first, plus the opaque
/// continuation link when the store has more.
#[derive(Debug, Clone, Default)]
pub struct SegmentPage {
    pub segments: Vec<FlowSegment>,
    pub next: Option<String>,
}

/// The catalog operations used for manifest derivation.
///
/// Implemented over HTTP by [`client::TamsClient`]; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn source(&self, source_id: Uuid) -> Result<Source>;

    async fn flow(&self, flow_id: Uuid) -> Result<Flow>;

    async fn flows_by_source(&self, source_id: Uuid) -> Result<Vec<Flow>>;

    /// First page of a flow's reverse-chronological segment listing. `limit`
    /// is a hint; the store may answer with fewer segments per page.
    async fn segments(&self, flow_id: Uuid, limit: Option<u64>) -> Result<SegmentPage>;

    /// Follow a continuation link returned in a previous [`SegmentPage`].
    async fn segments_page(&self, next: &str) -> Result<SegmentPage>;
}
