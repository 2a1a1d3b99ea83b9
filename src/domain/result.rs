//! Result type alias for tripdata

use super::errors::TripdataError;

/// Result type alias for tripdata operations
///
/// # Examples
///
/// ```
/// use tripdata::domain::result::Result;
/// use tripdata::domain::errors::TripdataError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TripdataError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TripdataError>;
