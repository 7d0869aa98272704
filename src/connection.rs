// src/connection.rs
//
// Connection protocol.
//
// The logical peer sets on ports are authoritative. The physical engine can
// only add an edge or cut every edge leaving an output channel, so any
// removal that must spare sibling edges is done by cutting the whole output
// and re-issuing a connect for each peer that remains.

use crate::engine::AudioEngine;
use crate::error::ConnectionError;
use crate::graph::PatchGraph;
use crate::state::{Location, Port, PortDirection, PortId};

impl<E: AudioEngine> PatchGraph<E> {
    fn existing_port(&self, id: PortId) -> Result<&Port, ConnectionError> {
        self.ports.get(id).ok_or(ConnectionError::UnknownPort(id))
    }

    fn existing_port_mut(&mut self, id: PortId) -> Result<&mut Port, ConnectionError> {
        self.ports.get_mut(id).ok_or(ConnectionError::UnknownPort(id))
    }

    /// Order a validated pair as `(output, input)`.
    fn oriented(&self, a: PortId, b: PortId) -> Result<(PortId, PortId), ConnectionError> {
        let (pa, pb) = (self.existing_port(a)?, self.existing_port(b)?);
        if pa.direction() == pb.direction() {
            return Err(ConnectionError::SameDirection { a, b });
        }
        if pa.owner() == pb.owner() {
            return Err(ConnectionError::SameOwner {
                a,
                b,
                patch: pa.owner(),
            });
        }
        for (port, patch) in [(a, pa.owner()), (b, pb.owner())] {
            if self.location(patch) != Location::OnCanvas {
                return Err(ConnectionError::NotOnCanvas { port, patch });
            }
        }
        Ok(match pa.direction() {
            PortDirection::Output => (a, b),
            PortDirection::Input => (b, a),
        })
    }

    fn issue_connect(&mut self, output: PortId, input: PortId) {
        let (Some(out), Some(inp)) = (self.ports.get(output), self.ports.get(input)) else {
            return;
        };
        let (source, channel, dest, dest_channel) =
            (out.owner(), out.channel(), inp.owner(), inp.channel());
        log::debug!(
            "connect {:?}.{} -> {:?}.{}",
            source,
            channel,
            dest,
            dest_channel
        );
        self.engine.connect(source, channel, dest, dest_channel);
    }

    /// Wire two ports together.
    ///
    /// Returns `Ok(false)` if they were already peers; nothing is issued in
    /// that case. Otherwise both peer sets gain the other port and exactly
    /// one physical connect goes from the output-role port to the
    /// input-role port.
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<bool, ConnectionError> {
        let (output, input) = self.oriented(a, b)?;
        if self.existing_port(output)?.has_peer(input) {
            return Ok(false);
        }

        self.existing_port_mut(output)?.add_peer(input);
        self.existing_port_mut(input)?.add_peer(output);
        self.issue_connect(output, input);
        Ok(true)
    }

    /// Remove every wire attached to `port`. Returns the former peers.
    ///
    /// Cutting an output is a single physical disconnect. Cutting an input
    /// reconciles each former peer, so their edges to other inputs survive.
    pub fn disconnect_all(&mut self, port: PortId) -> Result<Vec<PortId>, ConnectionError> {
        let direction = self.existing_port(port)?.direction();
        let former = self.existing_port_mut(port)?.take_peers();
        if former.is_empty() {
            return Ok(former);
        }

        for &peer in &former {
            if let Some(peer) = self.ports.get_mut(peer) {
                peer.remove_peer(port);
            }
        }

        match direction {
            PortDirection::Output => {
                let out = self.existing_port(port)?;
                let (source, channel) = (out.owner(), out.channel());
                log::debug!("disconnect {:?}.{} from {} peer(s)", source, channel, former.len());
                self.engine.disconnect_output(source, channel);
            }
            PortDirection::Input => {
                for &peer in &former {
                    self.reconcile_output(peer)?;
                }
            }
        }
        Ok(former)
    }

    /// Remove the single wire between `a` and `b`.
    ///
    /// Returns `Ok(false)` if they were not peers.
    pub fn disconnect(&mut self, a: PortId, b: PortId) -> Result<bool, ConnectionError> {
        let (output, input) = self.oriented(a, b)?;
        if !self.existing_port(output)?.has_peer(input) {
            return Ok(false);
        }

        self.existing_port_mut(output)?.remove_peer(input);
        self.existing_port_mut(input)?.remove_peer(output);
        self.reconcile_output(output)?;
        Ok(true)
    }

    /// Rebuild the physical edges of `output` from its peer set.
    ///
    /// Issues one disconnect for the channel, then one connect per
    /// remaining peer in peer order.
    pub fn reconcile_output(&mut self, output: PortId) -> Result<(), ConnectionError> {
        let port = self.existing_port(output)?;
        if port.direction() != PortDirection::Output {
            return Err(ConnectionError::NotAnOutput(output));
        }
        let (source, channel) = (port.owner(), port.channel());
        let peers = port.peers().to_vec();

        log::debug!(
            "reconcile {:?}.{} with {} peer(s)",
            source,
            channel,
            peers.len()
        );
        self.engine.disconnect_output(source, channel);
        for input in peers {
            self.issue_connect(output, input);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NodeCatalog;
    use crate::config::PatchGeometry;
    use crate::engine::Directive;
    use crate::geometry::Point;
    use crate::routing::RoutingTable;
    use crate::state::{NodeType, PatchId};

    fn graph<E: AudioEngine>(engine: E) -> PatchGraph<E> {
        PatchGraph::new(NodeCatalog::standard(), PatchGeometry::default(), engine)
    }

    fn place<E: AudioEngine>(graph: &mut PatchGraph<E>, node_type: NodeType) -> PatchId {
        graph
            .create_patch(node_type, Location::OnCanvas, Point::new(300.0, 200.0))
            .unwrap()
    }

    fn input<E: AudioEngine>(graph: &PatchGraph<E>, patch: PatchId, ch: usize) -> PortId {
        graph.patch(patch).unwrap().inputs()[ch]
    }

    fn output<E: AudioEngine>(graph: &PatchGraph<E>, patch: PatchId, ch: usize) -> PortId {
        graph.patch(patch).unwrap().outputs()[ch]
    }

    /// Every output's peer set matches its physical fan-out.
    fn assert_agrees(graph: &PatchGraph<RoutingTable>) {
        for patch in graph.patches() {
            for &out in patch.outputs() {
                let port = graph.port(out).unwrap();
                let mut logical: Vec<(PatchId, usize)> = port
                    .peers()
                    .iter()
                    .map(|&p| {
                        let peer = graph.port(p).unwrap();
                        (peer.owner(), peer.channel())
                    })
                    .collect();
                let mut physical = graph.engine().targets_of(patch.id(), port.channel()).to_vec();
                logical.sort();
                physical.sort();
                assert_eq!(logical, physical, "output {:?}", out);
            }
        }
    }

    #[test]
    fn test_connect_is_mutual_and_oriented() {
        let mut graph = graph(Vec::new());
        let osc = place(&mut graph, NodeType::Oscillator);
        let gain = place(&mut graph, NodeType::Gain);
        let (o, i) = (output(&graph, osc, 0), input(&graph, gain, 0));
        graph.engine_mut().clear();

        // Input-first argument order still wires output to input.
        assert_eq!(graph.connect(i, o), Ok(true));
        assert_eq!(graph.port(o).unwrap().peers(), &[i]);
        assert_eq!(graph.port(i).unwrap().peers(), &[o]);
        assert_eq!(
            graph.engine().as_slice(),
            &[Directive::Connect {
                source: osc,
                output: 0,
                dest: gain,
                input: 0
            }]
        );
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut graph = graph(Vec::new());
        let osc = place(&mut graph, NodeType::Oscillator);
        let gain = place(&mut graph, NodeType::Gain);
        let (o, i) = (output(&graph, osc, 0), input(&graph, gain, 0));
        graph.engine_mut().clear();

        assert_eq!(graph.connect(o, i), Ok(true));
        assert_eq!(graph.connect(o, i), Ok(false));
        assert_eq!(graph.connect(i, o), Ok(false));
        assert_eq!(graph.port(o).unwrap().peers().len(), 1);
        assert_eq!(graph.engine().len(), 1);
    }

    #[test]
    fn test_invalid_connections_change_nothing() {
        let mut graph = graph(Vec::new());
        let g1 = place(&mut graph, NodeType::Gain);
        let g2 = place(&mut graph, NodeType::Gain);
        graph.engine_mut().clear();

        let (o1, i1) = (output(&graph, g1, 0), input(&graph, g1, 0));
        let (o2, i2) = (output(&graph, g2, 0), input(&graph, g2, 0));

        assert_eq!(
            graph.connect(o1, o2),
            Err(ConnectionError::SameDirection { a: o1, b: o2 })
        );
        assert_eq!(
            graph.connect(i1, i2),
            Err(ConnectionError::SameDirection { a: i1, b: i2 })
        );
        assert_eq!(
            graph.connect(o1, i1),
            Err(ConnectionError::SameOwner {
                a: o1,
                b: i1,
                patch: g1
            })
        );
        assert!(!graph.is_wired(g1));
        assert!(!graph.is_wired(g2));
        assert!(graph.engine().is_empty());
    }

    #[test]
    fn test_disconnect_input_preserves_fan_out() {
        let mut graph = graph(RoutingTable::new());
        let osc = place(&mut graph, NodeType::Oscillator);
        let targets: Vec<PatchId> = (0..3).map(|_| place(&mut graph, NodeType::Gain)).collect();
        let o = output(&graph, osc, 0);
        let inputs: Vec<PortId> = targets.iter().map(|&t| input(&graph, t, 0)).collect();
        for &i in &inputs {
            graph.connect(o, i).unwrap();
        }
        graph.engine_mut().take_directives();

        assert_eq!(graph.disconnect_all(inputs[1]), Ok(vec![o]));
        assert_eq!(graph.port(o).unwrap().peers(), &[inputs[0], inputs[2]]);
        assert!(!graph.port(inputs[1]).unwrap().is_connected());
        assert_eq!(
            graph.engine().directives(),
            &[
                Directive::DisconnectOutput {
                    source: osc,
                    output: 0
                },
                Directive::Connect {
                    source: osc,
                    output: 0,
                    dest: targets[0],
                    input: 0
                },
                Directive::Connect {
                    source: osc,
                    output: 0,
                    dest: targets[2],
                    input: 0
                },
            ]
        );
        assert_agrees(&graph);
    }

    #[test]
    fn test_disconnect_output_is_single_directive() {
        let mut graph = graph(RoutingTable::new());
        let osc = place(&mut graph, NodeType::Oscillator);
        let g1 = place(&mut graph, NodeType::Gain);
        let g2 = place(&mut graph, NodeType::Gain);
        let o = output(&graph, osc, 0);
        graph.connect(o, input(&graph, g1, 0)).unwrap();
        graph.connect(o, input(&graph, g2, 0)).unwrap();
        graph.engine_mut().take_directives();

        let former = graph.disconnect_all(o).unwrap();
        assert_eq!(former.len(), 2);
        assert_eq!(
            graph.engine().directives(),
            &[Directive::DisconnectOutput {
                source: osc,
                output: 0
            }]
        );
        assert!(!graph.is_wired(g1));
        assert!(!graph.is_wired(g2));
        assert_agrees(&graph);
    }

    #[test]
    fn test_disconnect_all_unwired_is_noop() {
        let mut graph = graph(Vec::new());
        let gain = place(&mut graph, NodeType::Gain);
        graph.engine_mut().clear();

        assert_eq!(graph.disconnect_all(input(&graph, gain, 0)), Ok(vec![]));
        assert_eq!(graph.disconnect_all(output(&graph, gain, 0)), Ok(vec![]));
        assert!(graph.engine().is_empty());
    }

    #[test]
    fn test_disconnect_input_with_fan_in() {
        let mut graph = graph(RoutingTable::new());
        let a = place(&mut graph, NodeType::Oscillator);
        let b = place(&mut graph, NodeType::Oscillator);
        let g1 = place(&mut graph, NodeType::Gain);
        let g2 = place(&mut graph, NodeType::Gain);

        let (oa, ob) = (output(&graph, a, 0), output(&graph, b, 0));
        let (i1, i2) = (input(&graph, g1, 0), input(&graph, g2, 0));
        graph.connect(oa, i1).unwrap();
        graph.connect(ob, i1).unwrap();
        graph.connect(oa, i2).unwrap();
        graph.connect(ob, i2).unwrap();

        graph.disconnect_all(i1).unwrap();
        assert!(graph.engine().has_edge(a, 0, g2, 0));
        assert!(graph.engine().has_edge(b, 0, g2, 0));
        assert_eq!(graph.engine().edge_count(), 2);
        assert_agrees(&graph);
    }

    #[test]
    fn test_single_edge_disconnect() {
        let mut graph = graph(RoutingTable::new());
        let splitter = place(&mut graph, NodeType::ChannelSplitter);
        let merger = place(&mut graph, NodeType::ChannelMerger);
        let g = place(&mut graph, NodeType::Gain);

        let left = output(&graph, splitter, 0);
        graph.connect(left, input(&graph, merger, 1)).unwrap();
        graph.connect(left, input(&graph, g, 0)).unwrap();

        assert_eq!(graph.disconnect(input(&graph, merger, 1), left), Ok(true));
        assert_eq!(graph.disconnect(left, input(&graph, merger, 1)), Ok(false));
        assert_eq!(graph.engine().targets_of(splitter, 0), &[(g, 0)]);
        assert_agrees(&graph);
    }

    #[test]
    fn test_reconcile_requires_output() {
        let mut graph = graph(Vec::new());
        let gain = place(&mut graph, NodeType::Gain);
        let i = input(&graph, gain, 0);
        assert_eq!(graph.reconcile_output(i), Err(ConnectionError::NotAnOutput(i)));
    }

    #[test]
    fn test_connect_unknown_port() {
        let mut graph = graph(Vec::new());
        let gain = place(&mut graph, NodeType::Gain);
        let osc = place(&mut graph, NodeType::Oscillator);
        let stale = input(&graph, gain, 0);
        graph.delete_patch(gain).unwrap();

        let o = output(&graph, osc, 0);
        assert_eq!(graph.connect(o, stale), Err(ConnectionError::UnknownPort(stale)));
        assert!(!graph.is_wired(osc));
    }

    #[test]
    fn test_delete_wired_patch_is_refused() {
        let mut graph = graph(Vec::new());
        let osc = place(&mut graph, NodeType::Oscillator);
        let gain = place(&mut graph, NodeType::Gain);
        graph
            .connect(output(&graph, osc, 0), input(&graph, gain, 0))
            .unwrap();

        assert_eq!(
            graph.delete_patch(gain),
            Err(crate::error::PatchError::StillWired(gain))
        );
        assert_eq!(graph.location(gain), Location::OnCanvas);
    }

    #[test]
    fn test_connect_requires_canvas_owners() {
        let mut graph = graph(Vec::new());
        let gain = place(&mut graph, NodeType::Gain);
        let palette_osc = graph
            .create_patch(NodeType::Oscillator, Location::InPalette, Point::new(60.0, 698.0))
            .unwrap();
        let dragging_osc = graph
            .create_patch(NodeType::Oscillator, Location::Dragging, Point::new(200.0, 200.0))
            .unwrap();
        graph.engine_mut().clear();

        let i = input(&graph, gain, 0);
        for osc in [palette_osc, dragging_osc] {
            let o = output(&graph, osc, 0);
            assert_eq!(
                graph.connect(o, i),
                Err(ConnectionError::NotOnCanvas { port: o, patch: osc })
            );
            assert_eq!(
                graph.connect(i, o),
                Err(ConnectionError::NotOnCanvas { port: o, patch: osc })
            );
            assert!(!graph.is_wired(osc));
        }
        assert!(!graph.is_wired(gain));
        assert!(graph.engine().is_empty());
    }
}
