use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::io::AsyncWriteExt;

use mango_model::{MangoError, ReleaseSource, TransferObserver};

pub const DEFAULT_BASE_URL: &str = "https://go.dev";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GoDevSource {
    client: reqwest::Client,
    base_url: String,
}

impl GoDevSource {
    /// # Errors
    /// Returns [`MangoError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, MangoError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// # Errors
    /// Returns [`MangoError::Network`] if the HTTP client cannot be built.
    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, MangoError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(format!("mango/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| MangoError::network_from("client setup", error))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn index_url(&self) -> String {
        format!("{}/dl/", self.base_url)
    }

    #[must_use]
    pub fn archive_url(&self, locator: &str) -> String {
        format!("{}/{}", self.base_url, locator.trim_start_matches('/'))
    }

    async fn get(&self, operation: &'static str, url: &str) -> Result<reqwest::Response, MangoError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| MangoError::network_from(operation, error))?;

        if !response.status().is_success() {
            return Err(MangoError::network(
                operation,
                format!("{url} returned HTTP {}", response.status()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl ReleaseSource for GoDevSource {
    fn name(&self) -> &'static str {
        "go.dev"
    }

    async fn fetch_index(&self) -> Result<String, MangoError> {
        let url = self.index_url();
        self.get("release index", &url)
            .await?
            .text()
            .await
            .map_err(|error| MangoError::network_from("release index", error))
    }

    async fn fetch_archive(
        &self,
        locator: &str,
        dest: &Path,
        observer: &dyn TransferObserver,
    ) -> Result<u64, MangoError> {
        use futures_util::StreamExt;

        let url = self.archive_url(locator);
        let response = self.get("archive download", &url).await?;

        let total = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
            MangoError::io_with_path("failed to create download file", dest, &error)
        })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|error| MangoError::network_from("archive download", error))?;
            file.write_all(&chunk).await.map_err(|error| {
                MangoError::io_with_path("failed to write download data", dest, &error)
            })?;
            downloaded += chunk.len() as u64;
            observer.on_transfer(downloaded, total);
        }

        file.flush().await.map_err(|error| {
            MangoError::io_with_path("failed to flush download file", dest, &error)
        })?;

        info!("Downloaded {url}: {downloaded} bytes");
        Ok(downloaded)
    }
}
