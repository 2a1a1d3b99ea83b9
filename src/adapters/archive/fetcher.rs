//! HTTP archive fetcher
//!
//! Downloads raw artifacts from the release archive. Bodies are streamed into
//! `<raw>.part`; only a complete, synced file is renamed to the final path.

use super::auth::archive_headers;
use super::ArtifactFetcher;
use crate::config::schema::{DownloadConfig, RetryConfig};
use crate::config::secret::SecretString;
use crate::domain::descriptor::{partial_path, FileDescriptor};
use crate::domain::errors::{FetchError, FetchFailure, TripdataError};
use crate::domain::outcome::StageStatus;
use crate::domain::result::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Fetches raw artifacts over HTTP(S)
///
/// # Example
///
/// ```no_run
/// use tripdata::adapters::archive::{resolve_token, HttpArchiveFetcher};
/// use tripdata::config::DownloadConfig;
///
/// # fn example() -> tripdata::domain::Result<()> {
/// let config = DownloadConfig::default();
/// let token = resolve_token(&config.token_env_var, &config.secrets_file);
/// let fetcher = HttpArchiveFetcher::new(&config, token)?;
/// # Ok(())
/// # }
/// ```
pub struct HttpArchiveFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpArchiveFetcher {
    /// Create a new fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - Download settings (timeouts, user agent, retry policy)
    /// * `token` - Optional bearer token for the archive
    ///
    /// # Errors
    ///
    /// Returns [`TripdataError::Initialization`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &DownloadConfig, token: Option<SecretString>) -> Result<Self> {
        let client = ClientBuilder::new()
            .default_headers(archive_headers(&config.user_agent, token.as_ref())?)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| {
                TripdataError::Initialization(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Retry an operation with exponential backoff
    ///
    /// Only failures that [`FetchFailure::is_retryable`] accepts are retried.
    async fn retry_request<F, T, Fut>(
        &self,
        descriptor: &FileDescriptor,
        operation: F,
    ) -> std::result::Result<T, FetchFailure>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, FetchFailure>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() || attempt >= max_retries {
                        return Err(e);
                    }
                    attempt += 1;

                    let delay = self.retry.delay_for(attempt);

                    tracing::warn!(
                        file = %descriptor.raw_file_name(),
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transfer failed, retrying with exponential backoff"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One transfer attempt: stream to the partial path, then rename
    async fn transfer(&self, descriptor: &FileDescriptor) -> std::result::Result<u64, FetchFailure> {
        if let Some(parent) = descriptor.raw_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchFailure::Io(e.to_string()))?;
        }

        let partial = partial_path(&descriptor.raw_path);
        let written = match self.stream_to(&descriptor.remote_url, &partial).await {
            Ok(written) => written,
            Err(e) => {
                discard(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &descriptor.raw_path).await {
            discard(&partial).await;
            return Err(FetchFailure::Io(e.to_string()));
        }

        Ok(written)
    }

    async fn stream_to(&self, url: &str, partial: &Path) -> std::result::Result<u64, FetchFailure> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(|e| FetchFailure::Io(e.to_string()))?;

        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(network_failure)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchFailure::Io(e.to_string()))?;
            received += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| FetchFailure::Io(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| FetchFailure::Io(e.to_string()))?;

        if let Some(expected) = expected {
            if received != expected {
                return Err(FetchFailure::Incomplete { expected, received });
            }
        }

        Ok(received)
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArchiveFetcher {
    async fn fetch(
        &self,
        descriptor: &FileDescriptor,
        force: bool,
    ) -> std::result::Result<StageStatus, FetchError> {
        if !force && descriptor.has_local_artifact() {
            tracing::debug!(
                file = %descriptor.raw_file_name(),
                "Artifact already present, skipping download"
            );
            return Ok(StageStatus::Skipped);
        }

        tracing::debug!(url = %descriptor.remote_url, "Downloading");

        let bytes = self
            .retry_request(descriptor, || self.transfer(descriptor))
            .await
            .map_err(|cause| FetchError::new(descriptor.id, cause))?;

        tracing::info!(
            file = %descriptor.raw_file_name(),
            bytes = bytes,
            "Downloaded"
        );

        Ok(StageStatus::Completed)
    }
}

fn classify_status(status: StatusCode) -> FetchFailure {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchFailure::Authentication {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => FetchFailure::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchFailure::RateLimited,
        other => FetchFailure::Http {
            status: other.as_u16(),
        },
    }
}

fn network_failure(e: reqwest::Error) -> FetchFailure {
    FetchFailure::Network(e.to_string())
}

async fn discard(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), error = %e, "Failed to remove partial download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            FetchFailure::Authentication { status: 401 }
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            FetchFailure::Authentication { status: 403 }
        );
        assert_eq!(classify_status(StatusCode::NOT_FOUND), FetchFailure::NotFound);
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            FetchFailure::RateLimited
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            FetchFailure::Http { status: 502 }
        );
    }

    #[test]
    fn test_new_with_default_config() {
        assert!(HttpArchiveFetcher::new(&DownloadConfig::default(), None).is_ok());
    }
}
