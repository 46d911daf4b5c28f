//! Registry-backed persistence.
//!
//! # Responsibility
//! - Model a hierarchical key/value registry on top of SQLite.
//! - Map the visitor protocol onto registry nodes.
//!
//! # Invariants
//! - Scalars are byte-array entries of the visitor's node.
//! - Group `key` is a child node `key`; item `i` is its child `key_i`.
//!
//! # See also
//! - `crate::db` for connection bootstrap and schema.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod manager;
mod node;
mod visitor;

pub use manager::{RegistryNamespace, RegistryPersistenceManager};
pub use node::RegistryNode;
pub use visitor::{RegistryLoadVisitor, RegistrySaveVisitor};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from registry node access.
#[derive(Debug)]
pub enum RegistryError {
    Db(DbError),
    /// Node path is empty, absolute or has an empty segment.
    InvalidPath(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidPath(path) => write!(f, "invalid registry path `{path}`"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidPath(_) => None,
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
