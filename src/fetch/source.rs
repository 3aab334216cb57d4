// src/fetch/source.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Result of a single retrieval attempt that reached the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Body(Vec<u8>),
    /// The source answered without a body (non-success HTTP status, missing file).
    Status(u16),
}

/// Where raw dataset text comes from.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Fetched>;
}

/// Retrieves dataset files over HTTP relative to a base URL.
///
/// Absolute paths (`/data/x.csv`) resolve against the host root, relative
/// ones (`data/x.csv`) against the base URL's directory.
pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("joining {} onto {}", path, self.base))
    }
}

#[async_trait]
impl TextSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Fetched> {
        let url = self.resolve(path)?;
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(Fetched::Status(status.as_u16()));
        }
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        Ok(Fetched::Body(bytes.to_vec()))
    }
}

/// Reads dataset files from a local directory. A missing file answers 404.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl TextSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<Fetched> {
        let file = self.resolve(path);
        debug!(path = %file.display(), "read");
        match fs::read(&file).await {
            Ok(bytes) => Ok(Fetched::Body(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Fetched::Status(404)),
            Err(e) => Err(e).with_context(|| format!("reading {}", file.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_paths_resolve_like_a_browser() -> Result<()> {
        let src = HttpSource::new(Client::new(), Url::parse("https://example.org/dash/")?);
        assert_eq!(
            src.resolve("/data/etim_data.csv")?.as_str(),
            "https://example.org/data/etim_data.csv"
        );
        assert_eq!(
            src.resolve("data/etim_data.csv")?.as_str(),
            "https://example.org/dash/data/etim_data.csv"
        );
        Ok(())
    }

    #[tokio::test]
    async fn file_source_reads_and_reports_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("data"))?;
        std::fs::write(dir.path().join("data/iig_data.csv"), "State\nGoa\n")?;

        let src = FileSource::new(dir.path());
        assert_eq!(
            src.fetch("/data/iig_data.csv").await?,
            Fetched::Body(b"State\nGoa\n".to_vec())
        );
        assert_eq!(src.fetch("data/etim_data.csv").await?, Fetched::Status(404));
        Ok(())
    }
}
