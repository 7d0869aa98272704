//! In-memory physical routing table.
//!
//! [`RoutingTable`] is the default [`AudioEngine`]: it applies wiring
//! directives with the same channel-granular semantics a real audio
//! backend has, keeps a log of every directive it received, and can hand
//! a host pipeline the node evaluation order.

use std::collections::HashMap;

use crate::engine::{AudioEngine, Directive};
use crate::state::PatchId;

/// One physical edge: `source.output -> dest.input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: PatchId,
    pub output: usize,
    pub dest: PatchId,
    pub input: usize,
}

#[derive(Debug, Clone)]
struct RoutedNode {
    inputs: usize,
    outputs: usize,
}

/// Physical audio graph.
#[derive(Debug, Default)]
pub struct RoutingTable {
    /// Live nodes in creation order.
    order: Vec<PatchId>,
    nodes: HashMap<PatchId, RoutedNode>,
    /// Fan-out of each `(node, output)` in connection order.
    fan_out: HashMap<(PatchId, usize), Vec<(PatchId, usize)>>,
    log: Vec<Directive>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_node(&self, node: PatchId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Declared `(inputs, outputs)` of a live node.
    pub fn arity(&self, node: PatchId) -> Option<(usize, usize)> {
        self.nodes.get(&node).map(|n| (n.inputs, n.outputs))
    }

    /// Inputs fed by `source.output`, in connection order.
    pub fn targets_of(&self, source: PatchId, output: usize) -> &[(PatchId, usize)] {
        self.fan_out
            .get(&(source, output))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outputs feeding `dest.input`.
    pub fn sources_of(&self, dest: PatchId, input: usize) -> Vec<(PatchId, usize)> {
        self.edges()
            .into_iter()
            .filter(|e| e.dest == dest && e.input == input)
            .map(|e| (e.source, e.output))
            .collect()
    }

    pub fn has_edge(&self, source: PatchId, output: usize, dest: PatchId, input: usize) -> bool {
        self.targets_of(source, output).contains(&(dest, input))
    }

    /// Every edge, grouped by source node in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for &source in &self.order {
            let outputs = self.nodes.get(&source).map_or(0, |n| n.outputs);
            for output in 0..outputs {
                for &(dest, input) in self.targets_of(source, output) {
                    edges.push(Edge {
                        source,
                        output,
                        dest,
                        input,
                    });
                }
            }
        }
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.fan_out.values().map(Vec::len).sum()
    }

    /// Directives received so far.
    pub fn directives(&self) -> &[Directive] {
        &self.log
    }

    /// Drain the directive log.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.log)
    }

    /// Node evaluation order for a pull-free pipeline (Kahn's algorithm).
    ///
    /// Sources come before the nodes they feed. Nodes caught in a cycle
    /// are appended at the end in creation order.
    pub fn eval_order(&self) -> Vec<PatchId> {
        let index: HashMap<PatchId, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let n = self.order.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for edge in self.edges() {
            let (Some(&src), Some(&dst)) = (index.get(&edge.source), index.get(&edge.dest)) else {
                continue;
            };
            // Parallel edges between the same two nodes count once.
            if !dependents[src].contains(&dst) {
                dependents[src].push(dst);
                in_degree[dst] += 1;
            }
        }

        // Start with nodes that have no inputs (sources)
        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).rev().collect();
        let mut processed = vec![false; n];
        let mut result = Vec::with_capacity(n);

        while let Some(idx) = queue.pop() {
            processed[idx] = true;
            result.push(self.order[idx]);

            for &dependent in dependents[idx].iter().rev() {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push(dependent);
                }
            }
        }

        if result.len() < n {
            log::warn!(
                "routing contains a cycle through {} node(s)",
                n - result.len()
            );
            for (i, &was_processed) in processed.iter().enumerate() {
                if !was_processed {
                    result.push(self.order[i]);
                }
            }
        }

        result
    }
}

impl AudioEngine for RoutingTable {
    fn add_node(&mut self, node: PatchId, inputs: usize, outputs: usize) {
        self.log.push(Directive::AddNode {
            node,
            inputs,
            outputs,
        });
        if self.nodes.insert(node, RoutedNode { inputs, outputs }).is_none() {
            self.order.push(node);
        }
    }

    fn connect(&mut self, source: PatchId, output: usize, dest: PatchId, input: usize) {
        self.log.push(Directive::Connect {
            source,
            output,
            dest,
            input,
        });

        let in_range = self.arity(source).is_some_and(|(_, outs)| output < outs)
            && self.arity(dest).is_some_and(|(ins, _)| input < ins);
        if !in_range {
            log::warn!(
                "ignoring connect {:?}.{} -> {:?}.{}: no such channel",
                source,
                output,
                dest,
                input
            );
            return;
        }

        let targets = self.fan_out.entry((source, output)).or_default();
        if !targets.contains(&(dest, input)) {
            targets.push((dest, input));
        }
    }

    fn disconnect_output(&mut self, source: PatchId, output: usize) {
        self.log.push(Directive::DisconnectOutput { source, output });
        self.fan_out.remove(&(source, output));
    }

    fn remove_node(&mut self, node: PatchId) {
        self.log.push(Directive::RemoveNode { node });
        self.nodes.remove(&node);
        self.order.retain(|&id| id != node);
        self.fan_out.retain(|&(source, _), targets| {
            targets.retain(|&(dest, _)| dest != node);
            source != node && !targets.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<PatchId> {
        let mut keys: SlotMap<PatchId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn test_disconnect_output_is_total() {
        let id = ids(4);
        let mut table = RoutingTable::new();
        for &n in &id {
            table.add_node(n, 1, 1);
        }

        table.connect(id[0], 0, id[1], 0);
        table.connect(id[0], 0, id[2], 0);
        table.connect(id[0], 0, id[3], 0);
        table.connect(id[0], 0, id[3], 0);
        assert_eq!(table.edge_count(), 3);

        table.disconnect_output(id[0], 0);
        assert_eq!(table.edge_count(), 0);
        assert!(table.targets_of(id[0], 0).is_empty());
    }

    #[test]
    fn test_connect_out_of_range_is_ignored() {
        let id = ids(2);
        let mut table = RoutingTable::new();
        table.add_node(id[0], 0, 1);
        table.add_node(id[1], 1, 0);

        table.connect(id[0], 1, id[1], 0);
        table.connect(id[0], 0, id[1], 3);
        assert_eq!(table.edge_count(), 0);
        assert_eq!(table.directives().len(), 4);

        table.connect(id[0], 0, id[1], 0);
        assert_eq!(table.arity(id[1]), Some((1, 0)));
        assert!(table.has_edge(id[0], 0, id[1], 0));
    }

    #[test]
    fn test_sources_of_reports_fan_in() {
        let id = ids(3);
        let mut table = RoutingTable::new();
        for &n in &id {
            table.add_node(n, 1, 1);
        }
        table.connect(id[0], 0, id[2], 0);
        table.connect(id[1], 0, id[2], 0);

        assert_eq!(table.sources_of(id[2], 0), vec![(id[0], 0), (id[1], 0)]);
        assert!(table.has_edge(id[1], 0, id[2], 0));
    }

    #[test]
    fn test_eval_order_puts_sources_first() {
        let id = ids(4);
        let mut table = RoutingTable::new();
        // Created sink-first on purpose.
        table.add_node(id[3], 1, 0);
        table.add_node(id[2], 1, 1);
        table.add_node(id[1], 1, 1);
        table.add_node(id[0], 0, 1);

        table.connect(id[0], 0, id[1], 0);
        table.connect(id[1], 0, id[2], 0);
        table.connect(id[2], 0, id[3], 0);

        assert_eq!(table.eval_order(), vec![id[0], id[1], id[2], id[3]]);
    }

    #[test]
    fn test_eval_order_appends_cycles() {
        let id = ids(3);
        let mut table = RoutingTable::new();
        for &n in &id {
            table.add_node(n, 1, 1);
        }
        table.connect(id[1], 0, id[2], 0);
        table.connect(id[2], 0, id[1], 0);

        assert_eq!(table.eval_order(), vec![id[0], id[1], id[2]]);
    }

    #[test]
    fn test_remove_node_drops_its_edges() {
        let id = ids(3);
        let mut table = RoutingTable::new();
        for &n in &id {
            table.add_node(n, 1, 1);
        }
        table.connect(id[0], 0, id[1], 0);
        table.connect(id[1], 0, id[2], 0);

        table.remove_node(id[1]);
        assert!(!table.contains_node(id[1]));
        assert_eq!(table.edge_count(), 0);
        assert_eq!(table.node_count(), 2);
        assert_eq!(
            table.directives().last(),
            Some(&Directive::RemoveNode { node: id[1] })
        );
    }
}
