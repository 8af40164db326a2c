//! Obtaining the raw song catalog from disk or over HTTP.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use songdex_core::SongRecord;

use crate::error::{CatalogError, CatalogResult};

/// Where the catalog JSON lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Classify a configured location: `http://` and `https://` are URLs,
    /// anything else is a file path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Read or download the catalog and parse it into raw records.
    ///
    /// HTTP fetches retry transient failures up to `retries` times with
    /// exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or downloaded, or if
    /// it is not a JSON array.
    pub async fn fetch(&self, retries: usize) -> CatalogResult<Vec<SongRecord>> {
        let body = match self {
            Self::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            Self::Url(url) => download_with_retry(url, retries).await?,
        };

        let records = SongRecord::parse_catalog(&body)?;
        log::info!("Fetched {} catalog records from {}", records.len(), self);
        Ok(records)
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

fn http_client() -> CatalogResult<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("songdex/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

async fn download_with_retry(url: &str, retries: usize) -> CatalogResult<String> {
    let client = http_client()?;

    (|| download(&client, url))
        .retry(ExponentialBuilder::default().with_max_times(retries))
        .when(CatalogError::is_transient)
        .notify(|err, delay| {
            log::warn!("Catalog fetch failed: {}; retrying in {:?}", err, delay);
        })
        .await
}

async fn download(client: &Client, url: &str) -> CatalogResult<String> {
    log::debug!("Downloading catalog from {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}
