//! XML document tree persistence.
//!
//! # Responsibility
//! - Hold and (de)serialize XML documents (`XmlDocument`, `DocumentIo`).
//! - Map the visitor protocol onto elements of a document tree.
//!
//! # Invariants
//! - Scalar `key` is a child element `key` with base64 text.
//! - Group `key` is a child element `key` holding `{key}Item` elements in
//!   save order.
//! - Writing a document to disk is never done by the manager itself.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) mod document;
mod manager;
mod visitor;

pub use document::{DocumentIo, XmlDocument};
pub use manager::{XmlPersistenceManager, DEFAULT_ROOT_ELEMENT};
pub use visitor::{XmlLoadVisitor, XmlSaveVisitor, XML_ITEM_SUFFIX};

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Failure to read, parse or write an XML document.
#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Parse(xmltree::ParseError),
    Write(xmltree::Error),
    /// Well-formed XML with an unexpected shape.
    Malformed(String),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "document i/o failed: {err}"),
            Self::Parse(err) => write!(f, "document is not valid xml: {err}"),
            Self::Write(err) => write!(f, "document could not be written: {err}"),
            Self::Malformed(message) => write!(f, "unexpected document shape: {message}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Write(err) => Some(err),
            Self::Malformed(_) => None,
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<xmltree::ParseError> for DocumentError {
    fn from(value: xmltree::ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<xmltree::Error> for DocumentError {
    fn from(value: xmltree::Error) -> Self {
        Self::Write(value)
    }
}
