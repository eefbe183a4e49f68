//! Manifest conventions
//!
//! - URL layout of the video host's HLS master playlists
//! - Media type probing for native playback
//! - Reading renditions out of a multivariant playlist

use crate::{catalog::ReportedLevel, Error, Result};
use url::Url;

/// MIME type advertised for HLS playlists
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// File name of the multivariant playlist written by the transcoder
pub const MASTER_PLAYLIST: &str = "master.m3u8";

/// Parse and validate a video host base URL
pub fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host).map_err(|e| Error::InvalidHost(format!("{}: {}", host, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidHost(format!(
            "{}: unsupported scheme {:?}",
            host, other
        ))),
    }
}

/// Resolve `{host}/api/v1/videos/{id}/master.m3u8`
///
/// The identifier becomes a single, percent-encoded path segment.
pub fn manifest_url(host: &Url, video_id: &str) -> Result<Url> {
    let id = video_id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains('/') {
        return Err(Error::InvalidVideoId(video_id.to_string()));
    }

    let mut url = host.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| Error::InvalidHost(host.to_string()))?
        .pop_if_empty()
        .extend(["api", "v1", "videos", id, MASTER_PLAYLIST]);

    Ok(url)
}

/// Media type to probe the surface with, from the URL extension
pub fn mime_type_for(url: &Url) -> Option<&'static str> {
    let path = url.path().to_lowercase();
    if path.ends_with(".m3u8") || path.ends_with(".m3u") {
        Some(HLS_MIME_TYPE)
    } else {
        None
    }
}

/// Read the renditions of an HLS multivariant playlist, in playlist order
///
/// I-frame-only variants are not selectable and are skipped.
pub fn parse_master_playlist(content: &[u8]) -> Result<Vec<ReportedLevel>> {
    let master = m3u8_rs::parse_master_playlist_res(content)
        .map_err(|e| Error::ManifestParse(format!("Failed to parse HLS master: {:?}", e)))?;

    Ok(master
        .variants
        .iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| {
            let (width, height) = variant
                .resolution
                .map(|r| (r.width as u32, r.height as u32))
                .unwrap_or((0, 0));
            ReportedLevel {
                height,
                width,
                bitrate: variant.bandwidth,
            }
        })
        .collect())
}
