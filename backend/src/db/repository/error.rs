//! Errors raised by track stores.
//!
//! A [`RepositoryError`] is a kind, a message and an [`ErrorContext`]. The
//! search only branches on the kind: connection and timeout failures are
//! "store unavailable", everything else is a fault in the query or the data.

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failure category of a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Pool exhausted, connection refused or dropped
    Connection,
    /// No answer before the deadline
    Timeout,
    /// The store rejected or failed the query
    Query,
    /// A stored row could not be turned into a track or a record
    Decode,
    Configuration,
    Internal,
}

impl ErrorKind {
    /// The store could not be reached or did not answer.
    pub fn is_unavailable(self) -> bool {
        matches!(self, Self::Connection | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connection => "Connection",
            Self::Timeout => "Timeout",
            Self::Query => "Query",
            Self::Decode => "Decode",
            Self::Configuration => "Configuration",
            Self::Internal => "Internal",
        })
    }
}

/// Where a store error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Store operation, e.g. `find_candidates`
    pub operation: Option<String>,
    pub details: Option<String>,
    /// Set for query failures that may succeed when repeated
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            self.operation.as_deref().map(|op| format!("operation={}", op)),
            self.details.as_deref().map(|d| format!("details={}", d)),
            self.retryable.then(|| "retryable=true".to_string()),
        ];
        let fields: Vec<String> = fields.into_iter().flatten().collect();
        write!(f, "[{}]", fields.join(", "))
    }
}

/// A failed store operation.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message} {context}")]
pub struct RepositoryError {
    kind: ErrorKind,
    message: String,
    context: ErrorContext,
}

impl RepositoryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Query, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Replace the context.
    pub fn at(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    /// Set the operation, keeping the rest of the context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Whether repeating the operation could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_unavailable() || self.context.retryable
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind.is_unavailable()
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                Self::connection(info.message())
            }
            Error::DatabaseError(kind, info) => {
                let context = ErrorContext::default().with_details(format!("{:?}", kind));
                let context = if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context.retryable()
                } else {
                    context
                };
                Self::query(info.message()).at(context)
            }
            Error::DeserializationError(e) => Self::decode(e.to_string()),
            other => Self::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::connection(err.to_string()).at(ErrorContext::new("get_connection"))
    }
}
