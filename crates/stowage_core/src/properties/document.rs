//! Ordered property map and its XML representation.
//!
//! File shape:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <properties>
//!   <comment>optional</comment>
//!   <entry key="name">value</entry>
//! </properties>
//! ```

use crate::xml::document::emitter_config;
use crate::xml::{DocumentError, DocumentResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use xmltree::{Element, XMLNode};

const ROOT_ELEMENT: &str = "properties";
const COMMENT_ELEMENT: &str = "comment";
const ENTRY_ELEMENT: &str = "entry";
const KEY_ATTRIBUTE: &str = "key";

/// Flat, key-ordered string map persisted as an XML properties document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDocument {
    comment: Option<String>,
    entries: BTreeMap<String, String>,
}

impl PropertyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or replaces `key`; returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Parses a properties document.
    ///
    /// # Errors
    /// - `Parse` for malformed XML.
    /// - `Malformed` for a wrong root, an unknown element or an entry
    ///   without `key` attribute.
    pub fn read_xml(reader: impl Read) -> DocumentResult<Self> {
        let root = Element::parse(reader)?;
        if root.name != ROOT_ELEMENT {
            return Err(DocumentError::Malformed(format!(
                "expected <{ROOT_ELEMENT}> root, found <{}>",
                root.name
            )));
        }

        let mut document = Self::new();
        for element in root.children.iter().filter_map(|node| match node {
            XMLNode::Element(element) => Some(element),
            _ => None,
        }) {
            match element.name.as_str() {
                COMMENT_ELEMENT => document.comment = Some(element_text(element)),
                ENTRY_ELEMENT => {
                    let key = element.attributes.get(KEY_ATTRIBUTE).ok_or_else(|| {
                        DocumentError::Malformed("entry without key attribute".to_string())
                    })?;
                    document.set(key.clone(), element_text(element));
                }
                other => {
                    return Err(DocumentError::Malformed(format!(
                        "unexpected element <{other}> in properties document"
                    )));
                }
            }
        }
        Ok(document)
    }

    /// Writes the document as indented UTF-8 XML.
    pub fn write_xml(&self, writer: impl Write) -> DocumentResult<()> {
        let mut root = Element::new(ROOT_ELEMENT);
        if let Some(comment) = &self.comment {
            let mut element = Element::new(COMMENT_ELEMENT);
            element.children.push(XMLNode::Text(comment.clone()));
            root.children.push(XMLNode::Element(element));
        }
        for (key, value) in &self.entries {
            let mut element = Element::new(ENTRY_ELEMENT);
            element
                .attributes
                .insert(KEY_ATTRIBUTE.to_string(), key.clone());
            if !value.is_empty() {
                element.children.push(XMLNode::Text(value.clone()));
            }
            root.children.push(XMLNode::Element(element));
        }
        root.write_with_config(writer, emitter_config())?;
        Ok(())
    }
}

fn element_text(element: &Element) -> String {
    element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(text) | XMLNode::CData(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
