// src/catalog.rs
//
// Process-wide registry of node types.
//
// Pure lookup table: descriptors are immutable once registered, and the
// factories only run when a patch is constructed.

use std::collections::HashMap;
use std::fmt;

use crate::node::AudioNode;
use crate::node_factory::NodeFactory;
use crate::nodes::register_standard_nodes;
use crate::state::{NodeType, NodeTypeDescriptor};

struct CatalogEntry {
    descriptor: NodeTypeDescriptor,
    factory: Box<dyn NodeFactory>,
}

/// Registry mapping a node type to its descriptor and factory.
#[derive(Default)]
pub struct NodeCatalog {
    entries: HashMap<NodeType, CatalogEntry>,
}

impl NodeCatalog {
    /// An empty catalog. Most hosts want [`NodeCatalog::standard`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of every standard node type.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        register_standard_nodes(&mut catalog);
        catalog
    }

    /// Register (or replace) a node type.
    pub fn register(&mut self, descriptor: NodeTypeDescriptor, factory: impl NodeFactory + 'static) {
        self.entries.insert(
            descriptor.node_type,
            CatalogEntry {
                descriptor,
                factory: Box::new(factory),
            },
        );
    }

    pub fn describe(&self, node_type: NodeType) -> Option<&NodeTypeDescriptor> {
        self.entries.get(&node_type).map(|e| &e.descriptor)
    }

    /// Types offered in the palette, in ascending slot order.
    pub fn list_palette_types(&self) -> Vec<NodeType> {
        let mut offered: Vec<(usize, NodeType)> = self
            .entries
            .values()
            .filter_map(|e| e.descriptor.palette_slot.map(|slot| (slot, e.descriptor.node_type)))
            .collect();
        offered.sort();
        offered.into_iter().map(|(_, t)| t).collect()
    }

    /// Construct a fresh processing node for `node_type`.
    pub fn build(&self, node_type: NodeType) -> Option<Box<dyn AudioNode>> {
        self.entries.get(&node_type).map(|e| e.factory.create())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for NodeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCatalog")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
