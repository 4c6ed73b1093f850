//! Multivariant (master) playlist generator.

use std::cmp::Reverse;

use super::codec::{map_codec, CodecMap};
use crate::sign::UrlSigner;
use crate::types::Flow;

/// Presentation attributes of an alternate rendition, taken from `hls_*`
/// tags with defaulting rules applied.
struct HlsProps {
    language: Option<String>,
    name: String,
    default: String,
    autoselect: String,
    forced: Option<String>,
}

/// Recognized tag suffixes only; anything else under `hls_` is ignored.
fn hls_props(flow: &Flow, position: usize) -> HlsProps {
    let tag = |key: &str| flow.tag(key).map(str::to_owned);
    HlsProps {
        language: tag("hls_language"),
        name: tag("hls_name")
            .or_else(|| flow.description.clone())
            .unwrap_or_default(),
        default: tag("hls_default")
            .unwrap_or_else(|| if position == 0 { "YES" } else { "NO" }.to_string()),
        autoselect: tag("hls_autoselect").unwrap_or_else(|| "YES".to_string()),
        forced: tag("hls_forced"),
    }
}

fn media_playlist_uri(flow: &Flow, signer: &dyn UrlSigner) -> String {
    signer.sign(&format!("flows/{}/segments/manifest.m3u8", flow.id))
}

/// Generate the multivariant playlist for one source or collection flow.
///
/// Video renditions are ordered highest max-bit-rate first. With no video
/// present, the audio flows themselves become the renditions. Otherwise
/// audio and subtitle flows become `#EXT-X-MEDIA` alternates, and only the
/// first of each is referenced from the video renditions (single default
/// alternate group; deliberate upstream behavior).
pub fn build_master_playlist(
    mut video: Vec<Flow>,
    audio: Vec<Flow>,
    subtitle: Vec<Flow>,
    codecs: &CodecMap,
    signer: &dyn UrlSigner,
) -> String {
    video.sort_by_key(|flow| Reverse(flow.max_bit_rate.unwrap_or(0)));

    let mut out = String::new();
    out.push_str("#EXTM3U\n");
    out.push_str("#EXT-X-VERSION:4\n");
    out.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");

    if video.is_empty() {
        // Audio-only presentation: one rendition per audio flow.
        for flow in &audio {
            out.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},AVERAGE-BANDWIDTH={},CODECS=\"{}\"\n",
                flow.max_bit_rate.unwrap_or(0),
                flow.avg_bit_rate.unwrap_or(0),
                map_codec(flow, codecs)
            ));
            out.push_str(&media_playlist_uri(flow, signer));
            out.push('\n');
        }
        return out;
    }

    for (i, flow) in subtitle.iter().enumerate() {
        let props = hls_props(flow, i);
        let mut attrs = vec!["TYPE=SUBTITLES".to_string(), "GROUP-ID=\"subs\"".to_string()];
        if let Some(language) = &props.language {
            attrs.push(format!("LANGUAGE=\"{language}\""));
        }
        attrs.push(format!("NAME=\"{}\"", props.name));
        attrs.push(format!("DEFAULT={}", props.default));
        attrs.push(format!("AUTOSELECT={}", props.autoselect));
        if let Some(forced) = &props.forced {
            attrs.push(format!("FORCED={forced}"));
        }
        attrs.push(format!("URI=\"{}\"", media_playlist_uri(flow, signer)));
        out.push_str(&format!("#EXT-X-MEDIA:{}\n", attrs.join(",")));
    }

    let first_audio_codec = audio.first().map(|flow| map_codec(flow, codecs));
    for (i, flow) in audio.iter().enumerate() {
        let props = hls_props(flow, i);
        let mut attrs = vec!["TYPE=AUDIO".to_string(), "GROUP-ID=\"audio\"".to_string()];
        if let Some(language) = &props.language {
            attrs.push(format!("LANGUAGE=\"{language}\""));
        }
        attrs.push(format!("NAME=\"{}\"", props.name));
        attrs.push(format!("DEFAULT={}", props.default));
        attrs.push(format!("AUTOSELECT={}", props.autoselect));
        if let Some(forced) = &props.forced {
            attrs.push(format!("FORCED={forced}"));
        }
        if let Some(channels) = flow.essence_parameters.channels {
            attrs.push(format!("CHANNELS=\"{channels}\""));
        }
        attrs.push(format!("CODECS=\"{}\"", map_codec(flow, codecs)));
        attrs.push(format!("URI=\"{}\"", media_playlist_uri(flow, signer)));
        out.push_str(&format!("#EXT-X-MEDIA:{}\n", attrs.join(",")));
    }

    for flow in &video {
        let mut codec = map_codec(flow, codecs);
        if let Some(audio_codec) = &first_audio_codec {
            codec = format!("{codec},{audio_codec}");
        }
        let mut attrs = vec![
            format!("BANDWIDTH={}", flow.max_bit_rate.unwrap_or(0)),
            format!("AVERAGE-BANDWIDTH={}", flow.avg_bit_rate.unwrap_or(0)),
            format!("CODECS=\"{codec}\""),
        ];
        let params = &flow.essence_parameters;
        if let (Some(width), Some(height)) = (params.frame_width, params.frame_height) {
            attrs.push(format!("RESOLUTION={width}x{height}"));
        }
        if let Some(frame_rate) = params.frame_rate {
            attrs.push(format!("FRAME-RATE={}", frame_rate.as_f64()));
        }
        if first_audio_codec.is_some() {
            attrs.push("AUDIO=\"audio\"".to_string());
        }
        if !subtitle.is_empty() {
            attrs.push("SUBTITLES=\"subs\"".to_string());
        }
        out.push_str(&format!("#EXT-X-STREAM-INF:{}\n", attrs.join(",")));
        out.push_str(&media_playlist_uri(flow, signer));
        out.push('\n');
    }

    out
}
