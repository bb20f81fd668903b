//! Macros for error handling.
//!
//! Convenience macros for creating and returning [`crate::error::FaninError`]
//! instances with reduced boilerplate.

/// Creates a [`crate::error::FaninError`] from an error kind and description.
///
/// Accepts an optional dynamic detail and an optional source error.
#[macro_export]
macro_rules! fanin_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::FaninError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::FaninError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::FaninError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::FaninError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Creates and returns a [`crate::error::FaninError`] from the current function.
///
/// Combines error creation with early return for error conditions that should
/// immediately terminate execution. Supports the same optional detail and source
/// arguments as [`fanin_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::fanin_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::fanin_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::fanin_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::fanin_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
