//! In-memory XML document and its file I/O.

use super::{DocumentError, DocumentResult};
use log::{error, info};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use xmltree::{Element, EmitterConfig};

/// XML document with at most one root element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlDocument {
    root: Option<Element>,
}

impl XmlDocument {
    /// Creates an empty document without root element.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    pub fn parse(reader: impl Read) -> DocumentResult<Self> {
        Ok(Self::from_root(Element::parse(reader)?))
    }

    /// Writes the document as indented UTF-8 XML with declaration.
    pub fn write(&self, writer: impl Write) -> DocumentResult<()> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| DocumentError::Malformed("document has no root element".to_string()))?;
        root.write_with_config(writer, emitter_config())?;
        Ok(())
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    /// Returns the root element, creating `default_name` when absent.
    pub fn root_or_insert(&mut self, default_name: &str) -> &mut Element {
        self.root.get_or_insert_with(|| Element::new(default_name))
    }

    pub fn into_root(self) -> Option<Element> {
        self.root
    }
}

pub(crate) fn emitter_config() -> EmitterConfig {
    EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ")
        .write_document_declaration(true)
}

/// Reads and writes `XmlDocument`s on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentIo;

impl DocumentIo {
    pub fn new() -> Self {
        Self
    }

    /// Parses the document stored at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> DocumentResult<XmlDocument> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let document = XmlDocument::parse(BufReader::new(file))?;
        info!(
            "event=document_load module=xml status=ok path={}",
            path.display()
        );
        Ok(document)
    }

    /// Writes `document` to `path`, creating parent directories first.
    ///
    /// Failures are logged before being returned.
    pub fn write(&self, document: &XmlDocument, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let result = write_file(path, |writer| document.write(writer));
        match &result {
            Ok(()) => info!(
                "event=document_write module=xml status=ok path={}",
                path.display()
            ),
            Err(err) => error!(
                "event=document_write module=xml status=error path={} error={err}",
                path.display()
            ),
        }
        result
    }
}

/// Creates parent directories, then writes `path` through a buffered,
/// truncating writer.
pub(crate) fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> DocumentResult<()>,
) -> DocumentResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}
