//! Shared test fixtures: an in-memory catalog and flow/segment builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::{Catalog, SegmentPage};
use crate::error::{ManifestError, Result};
use crate::timerange::{TimeRange, Timestamp};
use crate::types::{Flow, FlowCollectionRef, FlowSegment, GetUrl, Source};

/// In-memory catalog. Flows are looked up by id; segment listings are
/// served from pre-cut pages joined by `page:N` continuation links.
#[derive(Default)]
pub struct MockCatalog {
    pub flows: HashMap<Uuid, Flow>,
    pub root_flows: Vec<Flow>,
    pub pages: Vec<Vec<FlowSegment>>,
    pub page_requests: AtomicUsize,
    pub fail_segments: bool,
}

impl MockCatalog {
    pub fn with_flows(flows: Vec<Flow>) -> Self {
        Self {
            flows: flows.iter().map(|f| (f.id, f.clone())).collect(),
            root_flows: flows,
            ..Self::default()
        }
    }

    /// Split `segments` into pages of `page_size`.
    pub fn paginate(&mut self, segments: Vec<FlowSegment>, page_size: usize) {
        self.pages = segments
            .chunks(page_size.max(1))
            .map(|c| c.to_vec())
            .collect();
    }

    fn page(&self, index: usize) -> Result<SegmentPage> {
        if self.fail_segments {
            return Err(ManifestError::CatalogStatus {
                status: 503,
                url: "mock://segments".into(),
            });
        }
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let segments = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| format!("page:{}", index + 1));
        Ok(SegmentPage { segments, next })
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn source(&self, source_id: Uuid) -> Result<Source> {
        Ok(Source {
            id: source_id,
            ..Source::default()
        })
    }

    async fn flow(&self, flow_id: Uuid) -> Result<Flow> {
        self.flows
            .get(&flow_id)
            .cloned()
            .ok_or(ManifestError::CatalogStatus {
                status: 404,
                url: format!("mock://flows/{flow_id}"),
            })
    }

    async fn flows_by_source(&self, _source_id: Uuid) -> Result<Vec<Flow>> {
        Ok(self.root_flows.clone())
    }

    async fn segments(&self, _flow_id: Uuid, _limit: Option<u64>) -> Result<SegmentPage> {
        self.page(0)
    }

    async fn segments_page(&self, next: &str) -> Result<SegmentPage> {
        let index: usize = next
            .strip_prefix("page:")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        self.page(index)
    }
}

pub fn video_flow(max_bit_rate: u64) -> Flow {
    Flow {
        id: Uuid::new_v4(),
        format: "urn:x-nmos:format:video".into(),
        codec: Some("urn:x-nmos:mediatype:video/h264".into()),
        description: Some("video".into()),
        max_bit_rate: Some(max_bit_rate),
        ..Flow::default()
    }
}

pub fn audio_flow() -> Flow {
    Flow {
        id: Uuid::new_v4(),
        format: "urn:x-nmos:format:audio".into(),
        codec: Some("urn:x-nmos:mediatype:audio/aac".into()),
        description: Some("audio".into()),
        ..Flow::default()
    }
}

pub fn subtitle_flow() -> Flow {
    let mut flow = Flow {
        id: Uuid::new_v4(),
        format: crate::types::FORMAT_DATA.into(),
        description: Some("subtitles".into()),
        ..Flow::default()
    };
    flow.essence_parameters.data_type = Some(crate::types::DATA_TYPE_SUBTITLE.into());
    flow
}

pub fn collection_flow(members: &[&Flow]) -> Flow {
    Flow {
        id: Uuid::new_v4(),
        format: "urn:x-nmos:format:multi".into(),
        flow_collection: members
            .iter()
            .map(|f| FlowCollectionRef {
                id: f.id,
                role: None,
            })
            .collect(),
        ..Flow::default()
    }
}

pub fn segment(start: i64, end: i64) -> FlowSegment {
    FlowSegment {
        object_id: format!("obj-{start}"),
        timerange: TimeRange::new(Timestamp::new(start, 0), Timestamp::new(end, 0)),
        get_urls: vec![GetUrl {
            url: format!("https://cdn.example/{start}.ts?sig=x"),
            presigned: true,
            label: None,
        }],
        ts_offset: None,
    }
}
