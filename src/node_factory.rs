// src/node_factory.rs

use crate::node::AudioNode;

/// A factory capable of creating fresh node instances.
///
/// Called once per patch, at construction.
pub trait NodeFactory: Send + Sync {
    /// Create one node instance
    fn create(&self) -> Box<dyn AudioNode>;
}

/// Convenience factory wrapping a closure.
pub struct SimpleNodeFactory<F>
where
    F: Fn() -> Box<dyn AudioNode> + Send + Sync,
{
    create_fn: F,
}

impl<F> SimpleNodeFactory<F>
where
    F: Fn() -> Box<dyn AudioNode> + Send + Sync,
{
    pub fn new(create_fn: F) -> Self {
        Self { create_fn }
    }
}

impl<F> NodeFactory for SimpleNodeFactory<F>
where
    F: Fn() -> Box<dyn AudioNode> + Send + Sync,
{
    fn create(&self) -> Box<dyn AudioNode> {
        (self.create_fn)()
    }
}
