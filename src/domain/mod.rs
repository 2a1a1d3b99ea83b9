//! Domain models and types for tripdata.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identity axes** ([`Category`], [`Year`], [`Month`]) and the
//!   combined [`DescriptorId`]
//! - **Plan inputs** ([`DatasetGroup`], [`Selector`]) and the resolved
//!   [`FileDescriptor`] with its [`DataLayout`]
//! - **Outcomes** ([`DownloadOutcome`], [`OutcomeKind`], [`StageStatus`])
//! - **Error types** ([`TripdataError`], [`ConfigurationError`], [`FetchError`],
//!   [`ConversionError`], [`LoadError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Years and months can only be built inside their valid ranges, so every
//! [`DescriptorId`] names a file the archive can publish:
//!
//! ```rust
//! use tripdata::domain::{Category, DescriptorId, Month, Year};
//!
//! # fn example() -> Result<(), String> {
//! let id = DescriptorId::new(Category::Yellow, Year::new(2019)?, Month::new(2)?);
//! assert_eq!(id.to_string(), "yellow 2019-02");
//!
//! assert!(Month::new(13).is_err());
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod errors;
pub mod group;
pub mod ids;
pub mod outcome;
pub mod result;
pub mod selector;

// Re-export commonly used types for convenience
pub use descriptor::{partial_path, DataLayout, FileDescriptor};
pub use errors::{
    ConfigViolation, ConfigurationError, ConversionError, ConversionFailure, FetchError,
    FetchFailure, LoadError, LoadFailure, TripdataError,
};
pub use group::DatasetGroup;
pub use ids::{Category, DescriptorId, Month, Year};
pub use outcome::{DownloadOutcome, OutcomeKind, Stage, StageStatus};
pub use result::Result;
pub use selector::Selector;
