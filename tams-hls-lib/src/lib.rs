pub mod catalog;
pub mod error;
pub mod playlist;
pub mod resolve;
pub mod sign;
pub mod timerange;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use catalog::auth::TokenProvider;
pub use catalog::client::TamsClient;
pub use catalog::segments::{SegmentFetcher, SegmentLimit};
pub use catalog::{Catalog, SegmentPage};
pub use error::{ManifestError, Result};
pub use playlist::codec::{map_codec, CodecMap, CodecMapping};
pub use playlist::empty_playlist;
pub use playlist::master::build_master_playlist;
pub use playlist::media::build_media_playlist;
pub use resolve::{resolve_collections, FlowBuckets};
pub use sign::{PathSigner, SecureLinkSigner, UrlSigner};
pub use types::{Flow, FlowSegment, GetUrl, Rational, Source};
