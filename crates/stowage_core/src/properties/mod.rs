//! Flat property-file persistence.
//!
//! # Responsibility
//! - Keep a flat string map (`PropertyDocument`) and its XML file format.
//! - Map scalar visitor calls onto base64-encoded entries.
//!
//! # Invariants
//! - Every entry value is standard base64 of the stored bytes.
//! - Nested groups are not representable; both directions report
//!   `PersistError::Unsupported`.

mod document;
mod manager;
mod visitor;

pub use document::PropertyDocument;
pub use manager::{PropertiesPersistenceManager, DEFAULT_PROPERTIES_PATH};
pub use visitor::{PropertiesLoadVisitor, PropertiesSaveVisitor};
