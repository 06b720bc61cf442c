// File: crates/tradeviz-core/src/fetch.rs
// Summary: Byte sources for the loaders (file system, HTTP, in-memory) and JSON/CSV decoding helpers.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Something that can hand back the bytes behind a location string.
///
/// A missing resource must surface as [`LoadError::Status`] so every source
/// fails the same way a non-2xx HTTP response does.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

impl<F: Fetch> Fetch for &F {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        (**self).fetch(location).await
    }
}

/// Reads locations relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetch for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.root.join(location);
        tracing::debug!(path = %path.display(), "reading local file");
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LoadError::Status { location: location.to_string(), status: 404 })
            }
            Err(source) => Err(LoadError::Io { location: location.to_string(), source }),
        }
    }
}

/// Plain GET over HTTP(S).
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        tracing::debug!(url = location, "fetching remote resource");
        let http_err = |source| LoadError::Http { location: location.to_string(), source };
        let response = self.client.get(location).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status { location: location.to_string(), status: status.as_u16() });
        }
        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(bytes.to_vec())
    }
}

/// Routes `http://` and `https://` locations to HTTP and everything else to disk.
#[derive(Clone, Debug)]
pub struct SourceFetcher {
    pub files: FsFetcher,
    pub http: HttpFetcher,
}

impl SourceFetcher {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self { files: FsFetcher::new(data_root), http: HttpFetcher::default() }
    }
}

impl Fetch for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        if is_remote(location) {
            self.http.fetch(location).await
        } else {
            self.files.fetch(location).await
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fixed set of in-memory resources.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(location.into(), bytes.into());
    }
}

impl Fetch for MemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        self.resources
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::Status { location: location.to_string(), status: 404 })
    }
}

/// Fetch and decode a JSON document.
pub async fn fetch_json<T, F>(fetcher: &F, location: &str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    F: Fetch + ?Sized,
{
    let bytes = fetcher.fetch(location).await?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Json { location: location.to_string(), source })
}

/// Fetch a CSV document with a header row and decode every record.
pub async fn fetch_csv<T, F>(fetcher: &F, location: &str) -> Result<Vec<T>, LoadError>
where
    T: DeserializeOwned,
    F: Fetch + ?Sized,
{
    let bytes = fetcher.fetch(location).await?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes.as_slice());
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv { location: location.to_string(), source })
}
