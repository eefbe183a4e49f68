//! Where master playlists come from

use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};
use url::Url;

/// Source of master playlist bytes
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Read the playlist published at `url`
    async fn fetch(&self, url: &Url) -> anyhow::Result<Vec<u8>>;

    /// Human readable origin
    fn describe(&self, url: &Url) -> String;
}

/// Fetch from the video host
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &Url) -> anyhow::Result<Vec<u8>> {
        debug!("Fetching master playlist: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }

    fn describe(&self, url: &Url) -> String {
        url.to_string()
    }
}

/// Read a playlist saved on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ManifestSource for FileSource {
    async fn fetch(&self, _url: &Url) -> anyhow::Result<Vec<u8>> {
        debug!(path = %self.path.display(), "Reading master playlist");
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))
    }

    fn describe(&self, _url: &Url) -> String {
        self.path.display().to_string()
    }
}

/// Pick the file source when a path is given, HTTP otherwise
pub fn source_for(file: Option<PathBuf>) -> Box<dyn ManifestSource> {
    match file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720\n\
720p/playlist.m3u8\n";

    fn manifest_url() -> Url {
        Url::parse("http://127.0.0.1:8080/api/v1/videos/abc123/master.m3u8").unwrap()
    }

    #[tokio::test]
    async fn test_file_source_reads_playlist() {
        let path = std::env::temp_dir().join(format!("reelplay-{}.m3u8", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, PLAYLIST).await.unwrap();

        let source = source_for(Some(path.clone()));
        let bytes = source.fetch(&manifest_url()).await.unwrap();
        assert_eq!(bytes, PLAYLIST.as_bytes());
        assert_eq!(source.describe(&manifest_url()), path.display().to_string());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let path = std::env::temp_dir().join(format!("reelplay-missing-{}.m3u8", uuid::Uuid::new_v4()));
        let source = FileSource::new(path);

        let err = source.fetch(&manifest_url()).await.unwrap_err();
        assert!(err.to_string().starts_with("cannot read"));
    }

    #[test]
    fn test_http_source_describes_url() {
        let source = source_for(None);
        assert_eq!(source.describe(&manifest_url()), manifest_url().to_string());
    }
}
