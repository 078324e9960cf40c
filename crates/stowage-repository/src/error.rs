//! Repository error types.

use std::io;

use stowage_uri::{Uri, UriError};
use thiserror::Error;

/// Coarse classification of a [`RepositoryError`].
///
/// Callers that only care about "what kind of failure" match on this rather
/// than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No repository for the scheme, or no resource at the URI.
    NotFound,
    /// The repository lacks the requested capability.
    NotSupported,
    /// Malformed input to a URI operation.
    InvalidUri,
    /// The destination of a copy already exists.
    AlreadyExists,
    /// A move copied the resource but could not delete the source.
    PartialFailure,
    /// Backend or stream I/O failure.
    Io,
}

/// Repository error type.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No repository is registered for the scheme.
    #[error("no repository registered for scheme {scheme}")]
    NoRepository { scheme: String },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The repository does not implement the requested capability.
    #[error("{operation} not supported for scheme {scheme}")]
    NotSupported {
        operation: &'static str,
        scheme: String,
    },

    /// Invalid URI input.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// URI failed to parse.
    #[error(transparent)]
    Uri(#[from] UriError),

    /// Destination already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected a container.
    #[error("not a container: {0}")]
    NotAContainer(String),

    /// Expected a leaf resource.
    #[error("is a container: {0}")]
    IsAContainer(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Opening a reader failed.
    #[error("cannot open {uri} for reading")]
    OpenReader {
        uri: String,
        #[source]
        source: Box<RepositoryError>,
    },

    /// Opening a writer failed.
    #[error("cannot open {uri} for writing")]
    OpenWriter {
        uri: String,
        #[source]
        source: Box<RepositoryError>,
    },

    /// Streaming bytes between two resources failed.
    #[error("transfer from {source_uri} to {destination} failed")]
    Transfer {
        source_uri: String,
        destination: String,
        #[source]
        source: io::Error,
    },

    /// The source was copied but could not be deleted.
    ///
    /// `destination` now holds a duplicate of `source_uri`.
    #[error("moved {source_uri} to {destination} but the source was not deleted")]
    PartialFailure {
        source_uri: String,
        destination: String,
        #[source]
        source: Box<RepositoryError>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl RepositoryError {
    /// Create a NoRepository error.
    pub fn no_repository(scheme: impl Into<String>) -> Self {
        Self::NoRepository {
            scheme: scheme.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(uri: impl ToString) -> Self {
        Self::NotFound(uri.to_string())
    }

    /// Create a NotSupported error for an operation against a URI's scheme.
    pub fn not_supported(operation: &'static str, uri: &Uri) -> Self {
        Self::NotSupported {
            operation,
            scheme: uri.scheme().to_string(),
        }
    }

    /// Create an InvalidUri error.
    pub fn invalid_uri(msg: impl Into<String>) -> Self {
        Self::InvalidUri(msg.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(uri: impl ToString) -> Self {
        Self::AlreadyExists(uri.to_string())
    }

    /// Create a NotAContainer error.
    pub fn not_a_container(uri: impl ToString) -> Self {
        Self::NotAContainer(uri.to_string())
    }

    /// Create an IsAContainer error.
    pub fn is_a_container(uri: impl ToString) -> Self {
        Self::IsAContainer(uri.to_string())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(uri: impl ToString) -> Self {
        Self::PermissionDenied(uri.to_string())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Classify this error.
    ///
    /// Wrapped open failures report the kind of the underlying error, so a
    /// missing copy source is still `NotFound`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRepository { .. } | Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::InvalidUri(_) | Self::Uri(_) => ErrorKind::InvalidUri,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::PartialFailure { .. } => ErrorKind::PartialFailure,
            Self::OpenReader { source, .. } | Self::OpenWriter { source, .. } => source.kind(),
            Self::NotAContainer(_)
            | Self::IsAContainer(_)
            | Self::PermissionDenied(_)
            | Self::Transfer { .. }
            | Self::Io(_)
            | Self::Other(_) => ErrorKind::Io,
        }
    }

    /// True when a failed move left a copy at the destination.
    pub fn duplicate_exists(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }
}

/// Convert RepositoryError to std::io::Error for `Read`/`Write` implementations.
impl From<RepositoryError> for io::Error {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Io(e) => e,
            RepositoryError::Transfer { source, .. } => source,
            RepositoryError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            RepositoryError::AlreadyExists(msg) => {
                io::Error::new(io::ErrorKind::AlreadyExists, msg)
            }
            RepositoryError::NotAContainer(msg) => {
                io::Error::new(io::ErrorKind::NotADirectory, msg)
            }
            RepositoryError::IsAContainer(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            e => match e.kind() {
                ErrorKind::NotFound => io::Error::new(io::ErrorKind::NotFound, e),
                ErrorKind::NotSupported => io::Error::new(io::ErrorKind::Unsupported, e),
                ErrorKind::InvalidUri => io::Error::new(io::ErrorKind::InvalidInput, e),
                ErrorKind::AlreadyExists => io::Error::new(io::ErrorKind::AlreadyExists, e),
                ErrorKind::PartialFailure | ErrorKind::Io => io::Error::other(e),
            },
        }
    }
}

/// Repository result type.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
