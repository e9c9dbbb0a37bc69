use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("listing line matched no known format: {line:?}")]
    LineUnparseable { line: String },
    #[error("invalid month: {value:?}")]
    InvalidMonth { value: String },
    #[error("listing line carries no timestamp")]
    EmptyTimestamp,
    #[error("invalid date {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidDate {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
    #[error("failed to build entry from {line:?}: {source}")]
    LineFailed {
        line: String,
        #[source]
        source: Box<ListingError>,
    },
}

pub type ListingResult<T> = Result<T, ListingError>;

impl ListingError {
    pub fn unparseable(line: impl Into<String>) -> Self {
        Self::LineUnparseable { line: line.into() }
    }

    pub fn invalid_month(value: impl Into<String>) -> Self {
        Self::InvalidMonth {
            value: value.into(),
        }
    }

    pub fn for_line(line: impl Into<String>, source: ListingError) -> Self {
        Self::LineFailed {
            line: line.into(),
            source: Box::new(source),
        }
    }

    pub fn line(&self) -> Option<&str> {
        match self {
            Self::LineUnparseable { line } | Self::LineFailed { line, .. } => Some(line.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    NotFound,
    AuthFailure,
    NetworkFailure,
    ProtocolError,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::AuthFailure => "auth",
            Self::NetworkFailure => "network",
            Self::ProtocolError => "protocol",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport failure [{kind}]: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotFound, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::AuthFailure, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NetworkFailure, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ProtocolError, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == TransportErrorKind::NotFound
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("remote path not found during {operation}: {path}")]
    RemoteNotFound {
        operation: &'static str,
        path: String,
    },
    #[error("transport error during {operation} for {path}: {source}")]
    Transport {
        operation: &'static str,
        path: String,
        #[source]
        source: TransportError,
    },
    #[error("failed to parse listing of {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: ListingError,
    },
    #[error("server reported a non-numeric size for {path}: {value:?}")]
    InvalidSize { path: String, value: String },
    #[error("server reported an unreadable timestamp for {path}: {value:?}")]
    InvalidTimestamp { path: String, value: String },
    #[error("invalid path for {operation}: {path} ({reason})")]
    InvalidPath {
        operation: &'static str,
        path: String,
        reason: String,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub fn not_found(operation: &'static str, path: impl Into<String>) -> Self {
        Self::RemoteNotFound {
            operation,
            path: path.into(),
        }
    }

    pub fn transport(
        operation: &'static str,
        path: impl Into<String>,
        source: TransportError,
    ) -> Self {
        Self::Transport {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn invalid_path(
        operation: &'static str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPath {
            operation,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteNotFound { .. })
    }
}
