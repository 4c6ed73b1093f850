//! Flow-collection traversal and classification.
//!
//! A flow's `flow_collection` may reference other flows, recursively, and the
//! references may repeat or form cycles. Traversal therefore runs off an
//! explicit work stack rather than recursion, and a flow already classified
//! into a bucket is never fetched or classified again.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{ManifestError, Result};
use crate::types::Flow;

/// Classification buckets keyed by essence class (`video`, `audio`,
/// `subtitle`, ...), rebuilt fresh per request.
pub type FlowBuckets = HashMap<String, Vec<Flow>>;

/// Upper bound on flows taken off the work stack in one resolution.
/// Collection-only cycles never reach a bucket, so bucket membership alone
/// cannot terminate them; the cap turns such catalogs into a traversal error
/// instead of an unbounded fetch loop.
const MAX_TRAVERSED_FLOWS: usize = 1024;

/// Resolve a set of root flows through their nested collections into
/// classification buckets of terminal flows.
pub async fn resolve_collections(catalog: &dyn Catalog, roots: Vec<Flow>) -> Result<FlowBuckets> {
    let mut stack = roots;
    let mut buckets = FlowBuckets::new();
    let mut traversed = 0usize;

    while let Some(flow) = stack.pop() {
        traversed += 1;
        if traversed > MAX_TRAVERSED_FLOWS {
            return Err(ManifestError::Traversal(format!(
                "collection traversal exceeded {MAX_TRAVERSED_FLOWS} flows; giving up on a cyclic or oversized graph"
            )));
        }

        if flow.is_excluded() {
            debug!(flow_id = %flow.id, "flow excluded by tag");
            continue;
        }

        if !flow.flow_collection.is_empty() {
            for member in &flow.flow_collection {
                if contains(&buckets, member.id) || stack.iter().any(|f| f.id == member.id) {
                    continue;
                }
                stack.push(catalog.flow(member.id).await?);
            }
        } else {
            let class = classify(&flow)?;
            buckets.entry(class).or_default().push(flow);
        }
    }

    Ok(buckets)
}

fn contains(buckets: &FlowBuckets, id: Uuid) -> bool {
    buckets.values().flatten().any(|flow| flow.id == id)
}

fn classify(flow: &Flow) -> Result<String> {
    if flow.is_subtitle() {
        return Ok("subtitle".to_string());
    }
    flow.format_class()
        .map(str::to_owned)
        .ok_or_else(|| {
            ManifestError::Traversal(format!(
                "flow {} has unrecognized format `{}`",
                flow.id, flow.format
            ))
        })
}
