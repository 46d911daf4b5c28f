//! Visitor adapters over `xmltree::Element` nodes.

use crate::error::{PersistError, PersistResult};
use crate::text_encoding::{decode_text, encode_text};
use crate::visitor::{
    validate_group_key, validate_scalar_key, ItemWriter, LoadVisitor, NestedVisitors, SaveVisitor,
};
use log::debug;
use xmltree::{Element, XMLNode};

/// Suffix of the element name used for each nested item.
pub const XML_ITEM_SUFFIX: &str = "Item";

fn item_element_name(key: &str) -> String {
    format!("{key}{XML_ITEM_SUFFIX}")
}

/// Rejects keys that cannot be written as an element name: the first
/// character must be a letter or `_`, the rest letters, digits, `-`, `_`
/// or `.`.
fn validate_element_name(key: &str) -> PersistResult<()> {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidArgument(format!(
            "key `{key}` is not a valid xml element name"
        )))
    }
}

fn scalar_key(key: &str) -> PersistResult<()> {
    validate_scalar_key(key)?;
    validate_element_name(key)
}

/// Validates `key` and returns the element name of its items.
fn group_key(key: &str) -> PersistResult<String> {
    validate_group_key(key)?;
    validate_element_name(key)?;
    let item_name = item_element_name(key);
    validate_element_name(&item_name)?;
    Ok(item_name)
}

fn as_element(node: &XMLNode) -> Option<&Element> {
    match node {
        XMLNode::Element(element) => Some(element),
        _ => None,
    }
}

fn child_element<'e>(parent: &'e Element, name: &str) -> Option<&'e Element> {
    parent
        .children
        .iter()
        .filter_map(as_element)
        .find(|element| element.name == name)
}

fn child_element_mut<'e>(parent: &'e mut Element, name: &str) -> Option<&'e mut Element> {
    parent.children.iter_mut().find_map(|node| match node {
        XMLNode::Element(element) if element.name == name => Some(element),
        _ => None,
    })
}

fn text_of(element: &Element) -> Option<String> {
    let mut text = None::<String>;
    for node in &element.children {
        if let XMLNode::Text(value) | XMLNode::CData(value) = node {
            text.get_or_insert_with(String::new).push_str(value);
        }
    }
    text
}

/// Writes into the children of one element.
pub struct XmlSaveVisitor<'n> {
    node: &'n mut Element,
}

impl<'n> XmlSaveVisitor<'n> {
    pub fn new(node: &'n mut Element) -> Self {
        Self { node }
    }
}

impl SaveVisitor for XmlSaveVisitor<'_> {
    /// Overwrites or appends element `key`. `None` leaves the tree as is:
    /// this backend never deletes scalar elements.
    fn persist_bytes(&mut self, key: &str, value: Option<&[u8]>) -> PersistResult<()> {
        scalar_key(key)?;
        let Some(bytes) = value else {
            debug!(
                "event=scalar_skipped module=xml status=skip element={} key={key} reason=absent_value",
                self.node.name
            );
            return Ok(());
        };

        let text = vec![XMLNode::Text(encode_text(bytes))];
        match child_element_mut(self.node, key) {
            Some(element) => element.children = text,
            None => {
                let mut element = Element::new(key);
                element.children = text;
                self.node.children.push(XMLNode::Element(element));
            }
        }
        Ok(())
    }

    fn persist_group(
        &mut self,
        key: &str,
        items: &mut dyn Iterator<Item = ItemWriter<'_>>,
    ) -> PersistResult<()> {
        let item_name = group_key(key)?;

        let mut written = Vec::new();
        for writer in items {
            let mut item = Element::new(&item_name);
            writer(&mut XmlSaveVisitor::new(&mut item))?;
            written.push(XMLNode::Element(item));
        }
        debug!(
            "event=group_saved module=xml status=ok element={} key={key} items={}",
            self.node.name,
            written.len()
        );

        match child_element_mut(self.node, key) {
            Some(group) => group.children = written,
            None => {
                let mut group = Element::new(key);
                group.children = written;
                self.node.children.push(XMLNode::Element(group));
            }
        }
        Ok(())
    }
}

/// Reads from the children of one element.
pub struct XmlLoadVisitor<'n> {
    node: &'n Element,
}

impl<'n> XmlLoadVisitor<'n> {
    pub fn new(node: &'n Element) -> Self {
        Self { node }
    }
}

impl LoadVisitor for XmlLoadVisitor<'_> {
    /// Uses the first element named `key` that carries text. An element
    /// without text holds an empty value.
    fn restore_bytes(&mut self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        scalar_key(key)?;
        let mut matching = self
            .node
            .children
            .iter()
            .filter_map(as_element)
            .filter(|element| element.name == key)
            .peekable();
        if matching.peek().is_none() {
            return Ok(None);
        }
        let text = matching.find_map(text_of).unwrap_or_default();
        decode_text(key, &text).map(Some)
    }

    fn restore_group(&mut self, key: &str) -> PersistResult<NestedVisitors<'_>> {
        let item_name = group_key(key)?;
        let items = child_element(self.node, key)
            .into_iter()
            .flat_map(|group| group.children.iter())
            .filter_map(as_element)
            .filter(move |element| element.name == item_name)
            .map(|element| Box::new(XmlLoadVisitor::new(element)) as Box<dyn LoadVisitor + '_>);
        Ok(Box::new(items))
    }
}
