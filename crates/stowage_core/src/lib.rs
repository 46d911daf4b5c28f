//! Storage-agnostic persistence through save/load visitors.
//!
//! Application types implement `Saveable`/`Loadable` once and can then be
//! stored in any backend: a SQLite-backed registry, a flat property file or
//! an XML document tree.

pub mod codec;
pub mod db;
pub mod error;
pub mod logging;
pub mod manager;
pub mod properties;
pub mod registry;
mod text_encoding;
pub mod visitor;
pub mod xml;

pub use error::{PersistError, PersistResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use manager::PersistenceManager;
pub use properties::{PropertiesPersistenceManager, PropertyDocument, DEFAULT_PROPERTIES_PATH};
pub use registry::{RegistryNamespace, RegistryNode, RegistryPersistenceManager};
pub use visitor::{
    ItemWriter, LoadVisitor, Loadable, NestedVisitors, Persistable, SaveVisitor, Saveable,
    PATH_SEPARATOR,
};
pub use xml::{DocumentIo, XmlDocument, XmlPersistenceManager, DEFAULT_ROOT_ELEMENT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
