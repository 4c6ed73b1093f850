//! Lazy, paginated segment retrieval.

use std::collections::VecDeque;

use uuid::Uuid;

use super::{Catalog, SegmentPage};
use crate::error::Result;
use crate::types::FlowSegment;

/// Upper bound on how many segments a fetch may yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLimit {
    Bounded(u64),
    Unbounded,
}

impl SegmentLimit {
    /// Parse the `hls_segments` tag value. The tag is numeric text; a
    /// non-finite value (`inf`) lifts the bound entirely, and anything
    /// unparseable falls back to the configured default.
    pub fn from_tag(value: Option<&str>, default: u64) -> Self {
        match value {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SegmentLimit::Bounded(n.max(0.0) as u64),
                Ok(_) => SegmentLimit::Unbounded,
                Err(_) => SegmentLimit::Bounded(default),
            },
            None => SegmentLimit::Bounded(default),
        }
    }

    fn hint(&self) -> Option<u64> {
        match self {
            SegmentLimit::Bounded(n) => Some(*n),
            SegmentLimit::Unbounded => None,
        }
    }
}

enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Pull-driven cursor over a flow's segment listing, newest-first.
///
/// Pages are requested only as consumption demands; once the limit is
/// satisfied no further page request is issued. A failed page aborts the
/// cursor; segments already yielded stay valid.
pub struct SegmentFetcher<'a> {
    catalog: &'a dyn Catalog,
    flow_id: Uuid,
    limit: SegmentLimit,
    yielded: u64,
    buffer: VecDeque<FlowSegment>,
    cursor: Cursor,
}

impl<'a> SegmentFetcher<'a> {
    pub fn new(catalog: &'a dyn Catalog, flow_id: Uuid, limit: SegmentLimit) -> Self {
        Self {
            catalog,
            flow_id,
            limit,
            yielded: 0,
            buffer: VecDeque::new(),
            cursor: Cursor::Start,
        }
    }

    fn satisfied(&self) -> bool {
        matches!(self.limit, SegmentLimit::Bounded(n) if self.yielded >= n)
    }

    /// Next segment, or `None` once the limit is reached or the listing is
    /// drained. An `Err` item ends the sequence.
    pub async fn next(&mut self) -> Option<Result<FlowSegment>> {
        loop {
            if self.satisfied() {
                return None;
            }
            if let Some(segment) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(segment));
            }
            let page = match std::mem::replace(&mut self.cursor, Cursor::Exhausted) {
                Cursor::Start => self.catalog.segments(self.flow_id, self.limit.hint()).await,
                Cursor::Next(url) => self.catalog.segments_page(&url).await,
                Cursor::Exhausted => return None,
            };
            match page {
                Ok(SegmentPage { segments, next }) => {
                    self.buffer.extend(segments);
                    if let Some(next) = next {
                        self.cursor = Cursor::Next(next);
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Drain the cursor into a vector, newest-first.
    pub async fn collect_all(mut self) -> Result<Vec<FlowSegment>> {
        let mut segments = Vec::new();
        while let Some(item) = self.next().await {
            segments.push(item?);
        }
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_tag_parsing() {
        assert_eq!(
            SegmentLimit::from_tag(Some("25"), 150),
            SegmentLimit::Bounded(25)
        );
        assert_eq!(
            SegmentLimit::from_tag(Some("inf"), 150),
            SegmentLimit::Unbounded
        );
        assert_eq!(
            SegmentLimit::from_tag(Some("not-a-number"), 150),
            SegmentLimit::Bounded(150)
        );
        assert_eq!(SegmentLimit::from_tag(None, 150), SegmentLimit::Bounded(150));
        assert_eq!(
            SegmentLimit::from_tag(Some("-3"), 150),
            SegmentLimit::Bounded(0)
        );
    }
}
