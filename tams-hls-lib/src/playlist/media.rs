//! Media playlist generator.

use chrono::{DateTime, Utc};

use crate::error::{ManifestError, Result};
use crate::types::{Flow, FlowSegment};

/// Generate the media playlist for one flow.
///
/// `segments` must be in ascending time-range order (the store lists them
/// newest-first; the caller reverses before calling). An ingesting flow is
/// rendered as a live `EVENT` playlist with a sequence number anchored to
/// the flow's creation time; anything else is `VOD` with an end marker.
pub fn build_media_playlist(flow: &Flow, segments: &[FlowSegment]) -> Result<String> {
    let first = segments
        .first()
        .ok_or_else(|| ManifestError::Arithmetic(format!("flow {} has no segments", flow.id)))?;
    let first_start = first.timerange.start.ok_or_else(|| {
        ManifestError::Timerange("first segment has no start timestamp".to_string())
    })?;

    let segment_duration = flow
        .segment_duration
        .map(|d| d.as_f64())
        .unwrap_or(0.0);
    let ingesting = flow.is_ingesting();

    let media_sequence: i64 = if ingesting {
        let created = flow.created.ok_or_else(|| {
            ManifestError::Arithmetic(format!("ingesting flow {} has no creation time", flow.id))
        })?;
        if !segment_duration.is_finite() || segment_duration <= 0.0 {
            return Err(ManifestError::Arithmetic(format!(
                "ingesting flow {} has no usable segment duration",
                flow.id
            )));
        }
        let elapsed = first_start.as_secs_f64() - created.timestamp() as f64;
        (elapsed / segment_duration).floor() as i64
    } else {
        1
    };

    let program_date_time =
        DateTime::<Utc>::from_timestamp(first_start.seconds(), first_start.subsec_nanos())
            .ok_or_else(|| {
                ManifestError::Arithmetic("segment start out of timestamp range".to_string())
            })?;

    let mut out = String::new();
    out.push_str("#EXTM3U\n");
    out.push_str("#EXT-X-VERSION:4\n");
    if segment_duration > 0.0 && segment_duration.is_finite() {
        out.push_str(&format!("#EXT-X-TARGETDURATION:{segment_duration}\n"));
    }
    out.push_str(&format!("#EXT-X-MEDIA-SEQUENCE:{media_sequence}\n"));
    out.push_str(&format!(
        "#EXT-X-PLAYLIST-TYPE:{}\n",
        if ingesting { "EVENT" } else { "VOD" }
    ));
    out.push_str(&format!(
        "#EXT-X-PROGRAM-DATE-TIME:{}\n",
        program_date_time.format("%Y-%m-%dT%H:%M:%S%.3f+00:00")
    ));

    // A segment is discontinuous when its offset marker differs from the
    // previous segment's; the marker before the first segment is empty.
    let mut prev_offset = "";
    for segment in segments {
        let duration = segment.timerange.length_secs().ok_or_else(|| {
            ManifestError::Timerange(format!(
                "segment {} has an unbounded timerange",
                segment.object_id
            ))
        })?;
        let offset = segment.ts_offset.as_deref().unwrap_or("");
        if offset != prev_offset {
            out.push_str("#EXT-X-DISCONTINUITY\n");
        }
        let uri = segment
            .get_urls
            .iter()
            .find(|u| u.presigned)
            .map(|u| u.url.as_str())
            .unwrap_or("");
        out.push_str(&format!("#EXTINF:{duration},\n{uri}\n"));
        prev_offset = offset;
    }

    if !ingesting {
        out.push_str("#EXT-X-ENDLIST\n");
    }
    Ok(out)
}
