//! Catalog-codec to HLS codec-string mapping.

use std::collections::HashMap;

use serde::Deserialize;

use crate::types::{EssenceParameters, Flow};

/// One `{tams, hls}` pair as stored in the mapping parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct CodecMapping {
    pub tams: String,
    pub hls: String,
}

/// Lookup table from catalog codec URNs to HLS codec tokens.
#[derive(Debug, Clone, Default)]
pub struct CodecMap {
    mappings: HashMap<String, String>,
}

impl CodecMap {
    pub fn new(pairs: Vec<CodecMapping>) -> Self {
        Self {
            mappings: pairs.into_iter().map(|p| (p.tams, p.hls)).collect(),
        }
    }

    /// Parse the JSON list form (`[{"tams": ..., "hls": ...}, ...]`).
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let pairs: Vec<CodecMapping> = serde_json::from_str(raw)?;
        Ok(Self::new(pairs))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mapped token, falling back to the last path segment of the URN.
    fn token_for<'a>(&'a self, codec: &'a str) -> &'a str {
        match self.mappings.get(codec) {
            Some(token) => token.as_str(),
            None => codec.rsplit('/').next().unwrap_or(codec),
        }
    }
}

/// HLS codec string for a flow.
///
/// The `avc1` and `mp4a` families need parameterized strings built from the
/// flow's essence parameters; any other token passes through unchanged.
/// Derivation never fails: missing parameters fall back to defaults and a
/// missing codec URN yields an empty token.
pub fn map_codec(flow: &Flow, map: &CodecMap) -> String {
    let codec = flow.codec.as_deref().unwrap_or_default();
    let token = map.token_for(codec);
    match token {
        "avc1" => avc1_codec_string(&flow.essence_parameters),
        "mp4a" => mp4a_codec_string(&flow.essence_parameters),
        _ => token.to_string(),
    }
}

fn avc1_codec_string(params: &EssenceParameters) -> String {
    let avc = params.avc_parameters.unwrap_or_default();
    format!(
        "avc1.{:02x}{:02x}{:02x}",
        avc.profile.unwrap_or(100),
        avc.flags.unwrap_or(0),
        avc.level.unwrap_or(31)
    )
}

fn mp4a_codec_string(params: &EssenceParameters) -> String {
    let oti = params
        .codec_parameters
        .and_then(|c| c.mp4_oti)
        .unwrap_or(64);
    format!("mp4a.{oti:x}.2")
}
