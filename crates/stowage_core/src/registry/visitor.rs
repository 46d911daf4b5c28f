//! Visitor adapters over `RegistryNode`.

use super::node::RegistryNode;
use crate::error::PersistResult;
use crate::visitor::{
    validate_group_key, validate_scalar_key, ItemWriter, LoadVisitor, NestedVisitors, SaveVisitor,
};
use log::{debug, warn};

const ITEM_SEPARATOR: char = '_';

fn item_name(key: &str, index: usize) -> String {
    format!("{key}{ITEM_SEPARATOR}{index}")
}

/// Parses the index of an item node named `{key}_{index}`.
fn item_index(key: &str, name: &str) -> Option<usize> {
    name.strip_prefix(key)?
        .strip_prefix(ITEM_SEPARATOR)?
        .parse()
        .ok()
}

/// Writes into one registry node.
pub struct RegistrySaveVisitor<'conn> {
    node: RegistryNode<'conn>,
}

impl<'conn> RegistrySaveVisitor<'conn> {
    pub fn new(node: RegistryNode<'conn>) -> Self {
        Self { node }
    }
}

impl SaveVisitor for RegistrySaveVisitor<'_> {
    fn persist_bytes(&mut self, key: &str, value: Option<&[u8]>) -> PersistResult<()> {
        validate_scalar_key(key)?;
        match value {
            Some(bytes) => self.node.put_bytes(key, bytes)?,
            None => {
                if self.node.remove(key)? {
                    debug!(
                        "event=scalar_removed module=registry status=ok node={} key={key}",
                        self.node.path()
                    );
                }
            }
        }
        Ok(())
    }

    fn persist_group(
        &mut self,
        key: &str,
        items: &mut dyn Iterator<Item = ItemWriter<'_>>,
    ) -> PersistResult<()> {
        validate_group_key(key)?;
        self.node.remove_child(key)?;
        let group = self.node.child(key)?;

        let mut written = 0;
        for (index, writer) in items.enumerate() {
            let mut item = RegistrySaveVisitor::new(group.child(&item_name(key, index))?);
            writer(&mut item)?;
            written += 1;
        }
        debug!(
            "event=group_saved module=registry status=ok node={} key={key} items={written}",
            self.node.path()
        );
        Ok(())
    }
}

/// Reads from one registry node.
pub struct RegistryLoadVisitor<'conn> {
    node: RegistryNode<'conn>,
}

impl<'conn> RegistryLoadVisitor<'conn> {
    pub fn new(node: RegistryNode<'conn>) -> Self {
        Self { node }
    }

    /// Item nodes of group `key`, ordered by index.
    fn item_nodes(&self, key: &str) -> PersistResult<Vec<RegistryNode<'conn>>> {
        let Some(group) = self.node.find_child(key)? else {
            return Ok(Vec::new());
        };

        let mut indexed = Vec::new();
        for name in group.children_names()? {
            match item_index(key, &name) {
                Some(index) => indexed.push((index, name)),
                None => debug!(
                    "event=group_child_skipped module=registry status=skip node={} child={name}",
                    group.path()
                ),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        let mut nodes = Vec::with_capacity(indexed.len());
        for (_, name) in indexed {
            if let Some(node) = group.find_child(&name)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}

impl LoadVisitor for RegistryLoadVisitor<'_> {
    fn restore_bytes(&mut self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        validate_scalar_key(key)?;
        Ok(self.node.get_bytes(key)?)
    }

    fn restore_group(&mut self, key: &str) -> PersistResult<NestedVisitors<'_>> {
        validate_group_key(key)?;
        let nodes = match self.item_nodes(key) {
            Ok(nodes) => nodes,
            Err(err) if err.is_medium_failure() => {
                warn!(
                    "event=group_restore module=registry status=error node={} key={key} error={err}",
                    self.node.path()
                );
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        Ok(Box::new(nodes.into_iter().map(|node| {
            Box::new(RegistryLoadVisitor::new(node)) as Box<dyn LoadVisitor + '_>
        })))
    }
}
