//! Remote archive access
//!
//! The [`ArtifactFetcher`] trait is the seam between the download coordinator
//! and the network. [`HttpArchiveFetcher`] is the production implementation;
//! tests substitute their own.

pub mod auth;
pub mod fetcher;

pub use auth::{archive_headers, resolve_token};
pub use fetcher::HttpArchiveFetcher;

use crate::domain::descriptor::FileDescriptor;
use crate::domain::errors::FetchError;
use crate::domain::outcome::StageStatus;
use async_trait::async_trait;

/// Materializes the raw artifact of one descriptor on local storage
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch the raw artifact
    ///
    /// Returns [`StageStatus::Skipped`] without any network access when the
    /// artifact is already present and `force` is false. On success the file
    /// at `descriptor.raw_path` is complete; on failure nothing is left there.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] carrying the descriptor identity and cause.
    async fn fetch(
        &self,
        descriptor: &FileDescriptor,
        force: bool,
    ) -> Result<StageStatus, FetchError>;
}
