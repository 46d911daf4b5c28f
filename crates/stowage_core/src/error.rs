//! Protocol-level error taxonomy.
//!
//! # Responsibility
//! - Give every visitor and manager call one error type.
//! - Separate caller mistakes from storage-medium failures.
//!
//! # Invariants
//! - `InvalidArgument` and `Unsupported` are always surfaced to the caller.
//! - Medium failures (`Registry`, `Document`, `Io`) may be absorbed by
//!   managers; visitors never swallow them on their own except where a
//!   backend documents it (registry nested restore).

use crate::codec::CodecError;
use crate::db::DbError;
use crate::registry::RegistryError;
use crate::xml::DocumentError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Error raised by visitors and persistence managers.
#[derive(Debug)]
pub enum PersistError {
    /// Malformed key, missing required input or undecodable stored bytes.
    InvalidArgument(String),
    /// The backend cannot represent the requested operation.
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
    Registry(RegistryError),
    Document(DocumentError),
    Io(std::io::Error),
}

impl PersistError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns whether this error comes from the backing medium rather than
    /// from the caller's input.
    pub fn is_medium_failure(&self) -> bool {
        matches!(self, Self::Registry(_) | Self::Document(_) | Self::Io(_))
    }
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Unsupported { backend, operation } => {
                write!(f, "{backend} backend does not support {operation}")
            }
            Self::Registry(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Unsupported { .. } => None,
            Self::Registry(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<CodecError> for PersistError {
    fn from(value: CodecError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<RegistryError> for PersistError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Registry(RegistryError::Db(value))
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Registry(RegistryError::Db(DbError::Sqlite(value)))
    }
}

impl From<DocumentError> for PersistError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::PersistError;
    use crate::codec::CodecError;

    #[test]
    fn codec_failures_become_invalid_argument() {
        let err = PersistError::from(CodecError::LengthMismatch {
            type_name: "i32",
            expected: 4,
            actual: 3,
        });
        assert!(matches!(err, PersistError::InvalidArgument(_)));
        assert!(!err.is_medium_failure());
    }

    #[test]
    fn io_failures_are_medium_failures() {
        let err = PersistError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.is_medium_failure());
    }
}
