//! Error types and result definitions for batch processing operations.
//!
//! Provides an error system with classification, aggregation, and captured diagnostic
//! metadata. The [`FaninError`] type supports single errors, errors with additional
//! detail, and multiple aggregated errors, which is how failures from several workers
//! are surfaced together.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type using [`FaninError`] as the error type.
pub type FaninResult<T> = Result<T, FaninError>;

/// Detailed payload stored for single [`FaninError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for batch processing operations.
///
/// [`FaninError`] can represent a single classified error or multiple aggregated
/// errors. Aggregation is used when waiting on a pool of workers, where more than
/// one worker may fail independently.
#[derive(Debug, Clone)]
pub struct FaninError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors, mainly useful to capture multiple worker failures.
    Many {
        errors: Vec<FaninError>,
        location: &'static Location<'static>,
    },
}

/// Specific categories of errors that can occur while running a batch.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Configuration & state errors
    ConfigError,
    InvalidState,

    // Output resource errors
    ResourceUnavailable,
    WriteFailed,
    SinkClosed,
    SinkPanic,

    // Worker errors
    WorkerPanic,
    WorkerCancelled,

    // IO errors
    IoError,

    // Unknown / uncategorized
    Unknown,
}

impl FaninError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For aggregated errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error, flattened.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => {
                errors.iter().flat_map(|err| err.kinds()).collect()
            }
        }
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating [`error::Error`] to this error and returns the
    /// modified instance.
    ///
    /// Has no effect on aggregated errors, which forward the first contained
    /// error as their source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }
        self
    }

    /// Creates a [`FaninError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        FaninError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
                backtrace: Arc::new(Backtrace::capture()),
            }),
        }
    }
}

impl PartialEq for FaninError {
    /// Compares errors by kind only, which is what tests and callers care about.
    fn eq(&self, other: &FaninError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (ErrorRepr::Many { errors: a, .. }, ErrorRepr::Many { errors: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for FaninError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                write!(
                    f,
                    "[{:?}] {} @ {}:{}",
                    payload.kind,
                    payload.description,
                    payload.location.file(),
                    payload.location.line()
                )?;

                if let Some(detail) = payload.detail.as_deref() {
                    write!(f, "\n  Detail: {detail}")?;
                }
                if let Some(source) = payload.source.as_deref() {
                    write!(f, "\n  Caused by: {source}")?;
                }

                Ok(())
            }
            ErrorRepr::Many { errors, location } => {
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}",
                    errors.len(),
                    if errors.len() == 1 { "" } else { "s" },
                    location.file(),
                    location.line()
                )?;

                for (index, error) in errors.iter().enumerate() {
                    for (i, line) in format!("{error}").lines().enumerate() {
                        if i == 0 {
                            write!(f, "\n  {}. {line}", index + 1)?;
                        } else {
                            write!(f, "\n     {line}")?;
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for FaninError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| source as &(dyn error::Error + 'static)),
            // For aggregated errors, we forward the first contained error as the source.
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

/// Creates a [`FaninError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for FaninError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> FaninError {
        FaninError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`FaninError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for FaninError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> FaninError {
        FaninError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Creates a [`FaninError`] from a vector of errors for aggregation.
///
/// If the vector contains exactly one error, returns that error directly without
/// wrapping it in the aggregated variant.
impl<E> From<Vec<E>> for FaninError
where
    E: Into<FaninError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> FaninError {
        let location = Location::caller();

        let mut errors: Vec<FaninError> = errors.into_iter().map(Into::into).collect();
        if errors.len() == 1 {
            return errors.pop().expect("just checked length is 1");
        }

        FaninError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`std::io::Error`] to [`FaninError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for FaninError {
    #[track_caller]
    fn from(err: std::io::Error) -> FaninError {
        let detail = err.to_string();
        FaninError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanin_error;

    #[test]
    fn single_error_exposes_kind_and_detail() {
        let err = fanin_error!(
            ErrorKind::WriteFailed,
            "Failed to write output line",
            "disk full"
        );

        assert_eq!(err.kind(), ErrorKind::WriteFailed);
        assert_eq!(err.detail(), Some("disk full"));
        assert_eq!(err.kinds(), vec![ErrorKind::WriteFailed]);
    }

    #[test]
    fn aggregation_flattens_kinds_and_unwraps_singletons() {
        let single: FaninError = vec![fanin_error!(ErrorKind::WorkerPanic, "Worker panicked")].into();
        assert_eq!(single.kind(), ErrorKind::WorkerPanic);

        let many: FaninError = vec![
            fanin_error!(ErrorKind::WorkerPanic, "Worker panicked"),
            fanin_error!(ErrorKind::SinkClosed, "Sink closed"),
        ]
        .into();
        assert_eq!(
            many.kinds(),
            vec![ErrorKind::WorkerPanic, ErrorKind::SinkClosed]
        );
    }

    #[test]
    fn io_error_conversion_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FaninError = io.into();

        assert_eq!(err.kind(), ErrorKind::IoError);
        assert!(std::error::Error::source(&err).is_some());
    }
}
