//! Catalog data model.
//!
//! Mirrors the subset of the TAMS flow, source and segment records needed to
//! derive playlists. Unknown fields in store responses are ignored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timerange::TimeRange;

/// Format URN carried by data flows.
pub const FORMAT_DATA: &str = "urn:x-nmos:format:data";

/// `data_type` essence parameter marking a data flow as subtitles.
pub const DATA_TYPE_SUBTITLE: &str = "urn:x-tams:data:subtitle";

/// A rational number as stored by TAMS (`{numerator, denominator}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: i64,
    #[serde(default = "default_denominator")]
    pub denominator: i64,
}

fn default_denominator() -> i64 {
    1
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Value as a float. A zero denominator yields a non-finite value which
    /// callers must reject before doing playlist arithmetic.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Reference to a member of a flow collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowCollectionRef {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// H.264 codec parameters carried in a video flow's essence parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AvcParameters {
    #[serde(default)]
    pub profile: Option<u8>,
    #[serde(default)]
    pub flags: Option<u8>,
    #[serde(default)]
    pub level: Option<u8>,
}

/// Generic codec parameters (MPEG-4 audio object type indication).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CodecParameters {
    #[serde(default)]
    pub mp4_oti: Option<u32>,
}

/// Essence parameters of a flow. All fields are optional; which ones are
/// present depends on the flow's format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EssenceParameters {
    #[serde(default)]
    pub frame_width: Option<u32>,
    #[serde(default)]
    pub frame_height: Option<u32>,
    #[serde(default)]
    pub frame_rate: Option<Rational>,
    #[serde(default)]
    pub channels: Option<u16>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub avc_parameters: Option<AvcParameters>,
    #[serde(default)]
    pub codec_parameters: Option<CodecParameters>,
}

/// A TAMS flow: one essence track, or a collection of other flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flow {
    pub id: Uuid,
    #[serde(default)]
    pub source_id: Option<Uuid>,
    /// Format URN, e.g. `urn:x-nmos:format:video`.
    #[serde(default)]
    pub format: String,
    /// Codec URN, e.g. `urn:x-nmos:mediatype:video/h264`.
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub flow_collection: Vec<FlowCollectionRef>,
    #[serde(default)]
    pub essence_parameters: EssenceParameters,
    #[serde(default)]
    pub max_bit_rate: Option<u64>,
    #[serde(default)]
    pub avg_bit_rate: Option<u64>,
    #[serde(default)]
    pub segment_duration: Option<Rational>,
}

impl Flow {
    /// Tag value by exact key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// True when the `hls_exclude` tag carries a case-insensitive `"true"`.
    pub fn is_excluded(&self) -> bool {
        self.tag("hls_exclude")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// True when the store is still writing segments for this flow.
    pub fn is_ingesting(&self) -> bool {
        self.tag("flow_status") == Some("ingesting")
    }

    /// Classification key: the fourth colon-delimited segment of the format
    /// URN (`urn:x-nmos:format:video` -> `video`).
    pub fn format_class(&self) -> Option<&str> {
        self.format.split(':').nth(3)
    }

    /// True for data flows whose essence parameters declare subtitle payload.
    pub fn is_subtitle(&self) -> bool {
        self.format == FORMAT_DATA
            && self.essence_parameters.data_type.as_deref() == Some(DATA_TYPE_SUBTITLE)
    }
}

/// A TAMS source: groups flows representing the same content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// One retrieval URL of a segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetUrl {
    pub url: String,
    /// Directly fetchable without further authentication.
    #[serde(default)]
    pub presigned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A time-bounded, independently retrievable unit of a flow's essence data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSegment {
    #[serde(default)]
    pub object_id: String,
    pub timerange: TimeRange,
    #[serde(default)]
    pub get_urls: Vec<GetUrl>,
    /// Opaque timestamp-offset marker; a change between adjacent segments
    /// signals a decoding discontinuity. Absent compares equal to `""`.
    #[serde(default)]
    pub ts_offset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_denominator_defaults_to_one() {
        let r: Rational = serde_json::from_str(r#"{"numerator": 4}"#).unwrap();
        assert_eq!(r, Rational::new(4, 1));
        assert_eq!(r.as_f64(), 4.0);
    }

    #[test]
    fn flow_deserializes_from_store_record() {
        let raw = r#"{
            "id": "0861b2f4-9a1f-4157-a8e5-7fbd2df69a7a",
            "source_id": "23ba03a3-9d58-4f4b-b15d-0829d67e48a1",
            "format": "urn:x-nmos:format:video",
            "codec": "urn:x-nmos:mediatype:video/h264",
            "container": "video/mp2t",
            "description": "Camera 1",
            "created": "2024-03-01T12:00:00Z",
            "tags": {"flow_status": "ingesting"},
            "essence_parameters": {
                "frame_width": 1920,
                "frame_height": 1080,
                "frame_rate": {"numerator": 50, "denominator": 1},
                "avc_parameters": {"profile": 100, "flags": 0, "level": 31}
            },
            "max_bit_rate": 5000000,
            "segment_duration": {"numerator": 4}
        }"#;
        let flow: Flow = serde_json::from_str(raw).unwrap();
        assert_eq!(flow.format_class(), Some("video"));
        assert!(flow.is_ingesting());
        assert!(!flow.is_excluded());
        assert_eq!(flow.segment_duration.unwrap().as_f64(), 4.0);
        assert_eq!(flow.essence_parameters.frame_width, Some(1920));
    }

    #[test]
    fn exclusion_tag_is_case_insensitive() {
        let mut flow = Flow::default();
        flow.tags.insert("hls_exclude".into(), "TRUE".into());
        assert!(flow.is_excluded());
        flow.tags.insert("hls_exclude".into(), "false".into());
        assert!(!flow.is_excluded());
    }

    #[test]
    fn subtitle_detection_requires_data_format_and_data_type() {
        let mut flow = Flow {
            format: FORMAT_DATA.into(),
            ..Flow::default()
        };
        assert!(!flow.is_subtitle());
        flow.essence_parameters.data_type = Some(DATA_TYPE_SUBTITLE.into());
        assert!(flow.is_subtitle());
        flow.format = "urn:x-nmos:format:video".into();
        assert!(!flow.is_subtitle());
    }
}
