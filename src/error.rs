//! Error types for plan construction and stream coding.

use std::{fmt, io};

use snafu::Snafu;

/// Error raised while building a plan or moving a value through a stream.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// No fixed-width layout can be derived for the type.
    #[snafu(display("unsupported type `{type_name}`: {reason}"))]
    UnsupportedType {
        /// Offending type.
        type_name: &'static str,
        /// Why no plan exists.
        reason: &'static str,
    },

    /// The sink or source failed, or ran out before the value was complete.
    #[snafu(display("stream i/o failed: {source}"))]
    Io {
        /// Underlying failure.
        source: io::Error,
    },

    /// A custom leaf failed to marshal itself.
    #[snafu(display("marshalling `{type_name}` failed: {source}"))]
    Marshal {
        /// Custom leaf type.
        type_name: &'static str,
        /// Failure reported by, or detected around, the leaf.
        source: io::Error,
    },

    /// A custom leaf failed to unmarshal itself.
    #[snafu(display("unmarshalling `{type_name}` failed: {source}"))]
    Unmarshal {
        /// Custom leaf type.
        type_name: &'static str,
        /// Failure reported by, or detected around, the leaf.
        source: io::Error,
    },

    /// A plan was applied to a value of a different type.
    #[snafu(display("plan for `{type_name}` applied to a value of another type"))]
    PlanMismatch {
        /// Type the plan was built for.
        type_name: &'static str,
    },
}

impl Error {
    /// True when the stream ended before the value was complete.
    ///
    /// Covers primitive leaves and custom leaves whose source ran dry.
    pub fn is_truncation(&self) -> bool {
        match self {
            Error::Io { source } | Error::Unmarshal { source, .. } => {
                source.kind() == io::ErrorKind::UnexpectedEof
            }
            _ => false,
        }
    }
}

/// Result type for fixbuf operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A write or read that stopped early.
///
/// Carries the number of bytes that crossed the stream before the failing
/// step. Those bytes are never retracted: a sink keeps what it accepted and
/// destinations keep what was decoded into them.
#[derive(Debug)]
pub struct Incomplete {
    bytes: usize,
    error: Error,
}

impl Incomplete {
    pub(crate) fn new(bytes: usize, error: Error) -> Self {
        Self { bytes, error }
    }

    /// Bytes moved before the failure.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// The failure itself.
    #[inline]
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Drop the byte count and keep the failure.
    #[inline]
    pub fn into_error(self) -> Error {
        self.error
    }

    /// Split into byte count and failure.
    #[inline]
    pub fn into_parts(self) -> (usize, Error) {
        (self.bytes, self.error)
    }
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stopped after {} bytes: {}", self.bytes, self.error)
    }
}

impl std::error::Error for Incomplete {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<Incomplete> for Error {
    fn from(incomplete: Incomplete) -> Self {
        incomplete.error
    }
}

/// Error returned when parsing a [`ByteOrder`](crate::ByteOrder) from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseByteOrderError {
    input: String,
}

impl ParseByteOrderError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }
}

impl fmt::Display for ParseByteOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown byte order `{}`: expected `big-endian` or `little-endian`",
            self.input
        )
    }
}

impl std::error::Error for ParseByteOrderError {}
