use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The number of workers cannot be zero.
    #[error("`workers` cannot be zero")]
    WorkersZero,
    /// The delay range is inverted.
    #[error("Invalid delay config: `min_ms` ({min_ms}) must not exceed `max_ms` ({max_ms})")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
    /// A field has a value outside its allowed range.
    #[error("Invalid value for `{field}`: {constraint}")]
    InvalidFieldValue { field: String, constraint: String },
}
