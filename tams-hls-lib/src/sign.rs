//! Signed URL generation for playlist entries.
//!
//! Rendition and segment-manifest URIs embedded in playlists point back at
//! this service. When a signing secret and public endpoint are configured,
//! the URIs are emitted as time-limited secure links; otherwise they stay
//! plain absolute paths.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use md5::{Digest, Md5};

/// Produces a fetchable URL for a relative object path.
pub trait UrlSigner: Send + Sync {
    fn sign(&self, path: &str) -> String;
}

/// Fallback signer used when no signing identity is configured: the path is
/// returned as-is, rooted.
pub struct PathSigner;

impl UrlSigner for PathSigner {
    fn sign(&self, path: &str) -> String {
        format!("/{path}")
    }
}

/// Secure-link signer: absolute URLs carrying an expiry and an md5 token
/// bound to a shared secret, in the style of nginx `secure_link_md5`.
pub struct SecureLinkSigner {
    base_url: String,
    secret: String,
    ttl: Duration,
}

impl SecureLinkSigner {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
            ttl,
        }
    }

    /// Percent-encode each path segment while keeping the slashes.
    fn encode_path(path: &str) -> String {
        path.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn sign_at(&self, path: &str, expires: u64) -> String {
        let encoded = Self::encode_path(path);
        let payload = format!("{expires}/{encoded}{}", self.secret);
        let token = URL_SAFE_NO_PAD.encode(Md5::digest(payload.as_bytes()));
        format!("{}/{encoded}?e={expires}&st={token}", self.base_url)
    }
}

impl UrlSigner for SecureLinkSigner {
    fn sign(&self, path: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.sign_at(path, now + self.ttl.as_secs())
    }
}
