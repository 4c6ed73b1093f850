pub mod fixtures;

use std::sync::atomic::Ordering;

use fixtures::*;

use crate::catalog::segments::{SegmentFetcher, SegmentLimit};
use crate::error::ManifestError;
use crate::resolve::resolve_collections;
use crate::types::{Flow, FlowCollectionRef};

#[tokio::test]
async fn resolver_classifies_terminal_flows() {
    let video = video_flow(5_000_000);
    let audio = audio_flow();
    let subs = subtitle_flow();
    let catalog = MockCatalog::with_flows(vec![video.clone(), audio.clone(), subs.clone()]);

    let buckets = resolve_collections(&catalog, catalog.root_flows.clone())
        .await
        .unwrap();

    assert_eq!(buckets["video"].len(), 1);
    assert_eq!(buckets["audio"].len(), 1);
    assert_eq!(buckets["subtitle"].len(), 1);
    assert_eq!(buckets["video"][0].id, video.id);
    assert_eq!(buckets["subtitle"][0].id, subs.id);
}

#[tokio::test]
async fn resolver_walks_nested_collections() {
    let video = video_flow(1_000_000);
    let audio = audio_flow();
    let inner = collection_flow(&[&audio]);
    let outer = collection_flow(&[&video, &inner]);
    let catalog = MockCatalog::with_flows(vec![
        video.clone(),
        audio.clone(),
        inner,
        outer.clone(),
    ]);

    let buckets = resolve_collections(&catalog, vec![outer]).await.unwrap();

    assert_eq!(buckets["video"][0].id, video.id);
    assert_eq!(buckets["audio"][0].id, audio.id);
}

#[tokio::test]
async fn resolver_deduplicates_repeated_references() {
    let shared_audio = audio_flow();
    let inner_a = collection_flow(&[&shared_audio]);
    let inner_b = collection_flow(&[&shared_audio]);
    let outer = collection_flow(&[&inner_a, &inner_b]);
    let catalog = MockCatalog::with_flows(vec![
        shared_audio.clone(),
        inner_a,
        inner_b,
        outer.clone(),
    ]);

    let buckets = resolve_collections(&catalog, vec![outer]).await.unwrap();

    let all: Vec<_> = buckets.values().flatten().collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, shared_audio.id);
}

#[tokio::test]
async fn resolver_drops_excluded_subtrees() {
    let kept = video_flow(1_000_000);
    let dropped_child = audio_flow();
    let mut excluded = collection_flow(&[&dropped_child]);
    excluded.tags.insert("hls_exclude".into(), "True".into());
    let outer = collection_flow(&[&kept, &excluded]);
    let catalog = MockCatalog::with_flows(vec![
        kept.clone(),
        dropped_child.clone(),
        excluded,
        outer.clone(),
    ]);

    let buckets = resolve_collections(&catalog, vec![outer]).await.unwrap();

    assert_eq!(buckets["video"].len(), 1);
    assert!(!buckets.contains_key("audio"));
}

#[tokio::test]
async fn resolver_rejects_collection_cycles() {
    let mut a = collection_flow(&[]);
    let mut b = collection_flow(&[]);
    a.flow_collection = vec![FlowCollectionRef { id: b.id, role: None }];
    b.flow_collection = vec![FlowCollectionRef { id: a.id, role: None }];
    let catalog = MockCatalog::with_flows(vec![a.clone(), b]);

    let err = resolve_collections(&catalog, vec![a]).await.unwrap_err();
    assert!(matches!(err, ManifestError::Traversal(_)));
}

#[tokio::test]
async fn resolver_propagates_missing_children() {
    let mut orphaned = collection_flow(&[]);
    orphaned.flow_collection = vec![FlowCollectionRef {
        id: uuid::Uuid::new_v4(),
        role: None,
    }];
    let catalog = MockCatalog::with_flows(vec![orphaned.clone()]);

    let err = resolve_collections(&catalog, vec![orphaned]).await.unwrap_err();
    assert!(matches!(err, ManifestError::CatalogStatus { status: 404, .. }));
}

#[tokio::test]
async fn fetcher_stops_at_the_requested_count() {
    let flow = video_flow(0);
    let mut catalog = MockCatalog::with_flows(vec![flow.clone()]);
    // Newest-first listing, paginated two at a time.
    let segments: Vec<_> = (0..10)
        .rev()
        .map(|i| segment(i * 4, (i + 1) * 4))
        .collect();
    catalog.paginate(segments, 2);

    let fetcher = SegmentFetcher::new(&catalog, flow.id, SegmentLimit::Bounded(5));
    let yielded = fetcher.collect_all().await.unwrap();

    assert_eq!(yielded.len(), 5);
    assert_eq!(catalog.page_requests.load(Ordering::SeqCst), 3);
    // Newest-first before the caller reverses.
    assert_eq!(yielded[0].timerange.start.unwrap().seconds(), 36);
    assert_eq!(yielded[4].timerange.start.unwrap().seconds(), 20);
}

#[tokio::test]
async fn fetcher_unbounded_drains_every_page() {
    let flow = video_flow(0);
    let mut catalog = MockCatalog::with_flows(vec![flow.clone()]);
    let segments: Vec<_> = (0..7).map(|i| segment(i * 4, (i + 1) * 4)).collect();
    catalog.paginate(segments, 3);

    let fetcher = SegmentFetcher::new(&catalog, flow.id, SegmentLimit::Unbounded);
    let yielded = fetcher.collect_all().await.unwrap();

    assert_eq!(yielded.len(), 7);
    assert_eq!(catalog.page_requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn fetcher_aborts_on_catalog_error() {
    let flow = video_flow(0);
    let mut catalog = MockCatalog::with_flows(vec![flow.clone()]);
    catalog.fail_segments = true;

    let mut fetcher = SegmentFetcher::new(&catalog, flow.id, SegmentLimit::Bounded(5));
    let first = fetcher.next().await.unwrap();
    assert!(first.is_err());
    assert!(fetcher.next().await.is_none());
}

#[tokio::test]
async fn empty_flow_has_empty_listing() {
    let flow = Flow::default();
    let catalog = MockCatalog::default();
    let fetcher = SegmentFetcher::new(&catalog, flow.id, SegmentLimit::Bounded(5));
    assert!(fetcher.collect_all().await.unwrap().is_empty());
}
