//! Playlist document assembly.

pub mod codec;
pub mod master;
pub mod media;

/// Minimal valid playlist, served when manifest derivation fails.
pub fn empty_playlist() -> String {
    "#EXTM3U\n#EXT-X-VERSION:4\n".to_string()
}
