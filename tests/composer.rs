// tests/composer.rs
//
// End-to-end scenarios against the public composer API.

use patchbay::{
    Composer, ComposerConfig, ComposerError, ConnectionError, Directive, Gesture, Location,
    NodeType, PatchEvent, PatchId, Point, PortId, RejectReason, RoutingTable,
};

// --------------------------------
// Helpers
// --------------------------------

fn composer() -> Composer {
    let mut composer = Composer::new(ComposerConfig::default()).unwrap();
    composer.drain_events();
    composer
}

fn drag(composer: &mut Composer, from: Point, to: Point) {
    composer
        .handle(Gesture::DragStart {
            point: from,
            target: None,
        })
        .unwrap();
    composer.handle(Gesture::DragMove { point: to }).unwrap();
    composer.handle(Gesture::DragRelease { point: to }).unwrap();
}

/// Scroll the palette by dragging empty strip space until `node_type`'s
/// slot is on stage. Returns the slot centre.
fn reveal(composer: &mut Composer, node_type: NodeType) -> Point {
    let patch = composer.palette_patch(node_type).unwrap();
    let at = composer.patch(patch).unwrap().position();
    let (stage, half) = (composer.config().stage_width, composer.config().patch.width / 2.0);
    let overshoot = if at.x + half > stage {
        at.x + half - stage
    } else if at.x - half < 0.0 {
        at.x - half
    } else {
        0.0
    };
    if overshoot != 0.0 {
        let grab = Point::new(stage / 2.0, composer.config().palette_bounds().y + 5.0);
        drag(composer, grab, Point::new(grab.x - overshoot, grab.y));
    }
    composer.patch(patch).unwrap().position()
}

fn place(composer: &mut Composer, node_type: NodeType, at: Point) -> PatchId {
    let patch = composer.palette_patch(node_type).unwrap();
    let from = reveal(composer, node_type);
    drag(composer, from, at);
    assert_eq!(composer.location(patch), Location::OnCanvas);
    patch
}

fn input(composer: &Composer, patch: PatchId, ch: usize) -> PortId {
    composer.patch(patch).unwrap().inputs()[ch]
}

fn output(composer: &Composer, patch: PatchId, ch: usize) -> PortId {
    composer.patch(patch).unwrap().outputs()[ch]
}

fn peers(composer: &Composer, port: PortId) -> Vec<PortId> {
    composer.graph().port(port).unwrap().peers().to_vec()
}

/// Physical fan-out of every canvas output equals its logical peer set.
fn assert_physical_matches_logical(composer: &Composer) {
    let engine: &RoutingTable = composer.engine();
    let mut logical = 0;
    for &patch in composer.canvas_patches() {
        for (ch, &out) in composer.patch(patch).unwrap().outputs().iter().enumerate() {
            let mut expected: Vec<(PatchId, usize)> = peers(composer, out)
                .into_iter()
                .map(|p| {
                    let port = composer.graph().port(p).unwrap();
                    (port.owner(), port.channel())
                })
                .collect();
            let mut actual = engine.targets_of(patch, ch).to_vec();
            expected.sort();
            actual.sort();
            assert_eq!(expected, actual);
            logical += expected.len();
        }
    }
    assert_eq!(engine.edge_count(), logical);
}

// --------------------------------
// Connection scenarios
// --------------------------------

#[test]
fn test_mutual_peering() {
    let mut composer = composer();
    let osc = place(&mut composer, NodeType::Oscillator, Point::new(100.0, 100.0));
    let gain = place(&mut composer, NodeType::Gain, Point::new(300.0, 100.0));
    let (o, i) = (output(&composer, osc, 0), input(&composer, gain, 0));

    assert!(composer.connect(o, i).unwrap());
    assert_eq!(peers(&composer, o), vec![i]);
    assert_eq!(peers(&composer, i), vec![o]);
    assert!(composer.engine().has_edge(osc, 0, gain, 0));
    assert_physical_matches_logical(&composer);
}

#[test]
fn test_fan_out_survives_input_disconnect() {
    let mut composer = composer();
    let osc = place(&mut composer, NodeType::Oscillator, Point::new(100.0, 250.0));
    let gains: Vec<PatchId> = [100.0, 250.0, 400.0]
        .into_iter()
        .map(|y| place(&mut composer, NodeType::Gain, Point::new(350.0, y)))
        .collect();
    let o = output(&composer, osc, 0);
    for &g in &gains {
        composer.connect(o, input(&composer, g, 0)).unwrap();
    }
    composer.engine_mut().take_directives();

    let i2 = input(&composer, gains[1], 0);
    composer.disconnect_all(i2).unwrap();

    assert_eq!(
        peers(&composer, o),
        vec![input(&composer, gains[0], 0), input(&composer, gains[2], 0)]
    );
    assert!(peers(&composer, i2).is_empty());
    assert_eq!(
        composer.engine().directives(),
        &[
            Directive::DisconnectOutput {
                source: osc,
                output: 0
            },
            Directive::Connect {
                source: osc,
                output: 0,
                dest: gains[0],
                input: 0
            },
            Directive::Connect {
                source: osc,
                output: 0,
                dest: gains[2],
                input: 0
            },
        ]
    );
    assert_physical_matches_logical(&composer);
}

#[test]
fn test_connect_is_idempotent() {
    let mut composer = composer();
    let osc = place(&mut composer, NodeType::Oscillator, Point::new(100.0, 100.0));
    let gain = place(&mut composer, NodeType::Gain, Point::new(300.0, 100.0));
    let (o, i) = (output(&composer, osc, 0), input(&composer, gain, 0));
    composer.engine_mut().take_directives();

    assert!(composer.connect(o, i).unwrap());
    assert!(!composer.connect(o, i).unwrap());
    assert_eq!(peers(&composer, o).len(), 1);
    assert_eq!(composer.engine().directives().len(), 1);
}

#[test]
fn test_invalid_connection_is_rejected() {
    let mut composer = composer();
    let g1 = place(&mut composer, NodeType::Gain, Point::new(100.0, 100.0));
    let g2 = place(&mut composer, NodeType::Gain, Point::new(300.0, 100.0));

    assert!(composer
        .connect(output(&composer, g1, 0), output(&composer, g2, 0))
        .is_err());
    assert!(composer
        .connect(output(&composer, g1, 0), input(&composer, g1, 0))
        .is_err());
    assert_eq!(composer.engine().edge_count(), 0);
}

#[test]
fn test_splitter_to_merger_channels() {
    let mut composer = composer();
    let split = place(&mut composer, NodeType::ChannelSplitter, Point::new(150.0, 200.0));
    let merge = place(&mut composer, NodeType::ChannelMerger, Point::new(450.0, 200.0));

    // Swap left and right.
    composer
        .connect(output(&composer, split, 0), input(&composer, merge, 1))
        .unwrap();
    composer
        .connect(output(&composer, split, 1), input(&composer, merge, 0))
        .unwrap();
    assert!(composer.engine().has_edge(split, 0, merge, 1));
    assert!(composer.engine().has_edge(split, 1, merge, 0));

    composer.disconnect_all(input(&composer, merge, 1)).unwrap();
    assert!(!composer.engine().has_edge(split, 0, merge, 1));
    assert!(composer.engine().has_edge(split, 1, merge, 0));
    assert_physical_matches_logical(&composer);
}

// --------------------------------
// Placement scenarios
// --------------------------------

#[test]
fn test_singleton_ceiling() {
    let mut composer = composer();
    place(&mut composer, NodeType::Destination, Point::new(600.0, 300.0));
    composer.drain_events();

    let second = composer.palette_patch(NodeType::Destination).unwrap();
    let from = reveal(&mut composer, NodeType::Destination);
    drag(&mut composer, from, Point::new(700.0, 300.0));

    assert_eq!(composer.location(second), Location::Deleted);
    let count = composer
        .canvas_patches()
        .iter()
        .filter(|&&p| composer.patch(p).unwrap().node_type() == NodeType::Destination)
        .count();
    assert_eq!(count, 1);
    assert!(composer.drain_events().iter().any(|e| matches!(
        e,
        PatchEvent::Rejected {
            reason: RejectReason::InstanceLimitExceeded,
            ..
        }
    )));
}

#[test]
fn test_singleton_dropped_outside_canvas() {
    let mut composer = composer();
    let dest = composer.palette_patch(NodeType::Destination).unwrap();
    let from = reveal(&mut composer, NodeType::Destination);

    drag(&mut composer, from, Point::new(from.x - 30.0, from.y));

    assert_eq!(composer.location(dest), Location::Deleted);
    assert!(composer.canvas_patches().is_empty());
    let replacement = composer.palette_patch(NodeType::Destination).unwrap();
    assert_ne!(replacement, dest);
    assert_eq!(composer.location(replacement), Location::InPalette);
    assert_eq!(composer.placement().slots().len(), 12);

    // The replacement can still be placed.
    place(&mut composer, NodeType::Destination, Point::new(500.0, 300.0));
}

#[test]
fn test_palette_patch_cannot_be_wired() {
    let mut composer = composer();
    let gain = place(&mut composer, NodeType::Gain, Point::new(400.0, 200.0));
    let osc = composer.palette_patch(NodeType::Oscillator).unwrap();
    let (o, i) = (output(&composer, osc, 0), input(&composer, gain, 0));
    composer.engine_mut().take_directives();

    assert_eq!(
        composer.connect(o, i),
        Err(ComposerError::Connection(ConnectionError::NotOnCanvas {
            port: o,
            patch: osc
        }))
    );
    assert!(peers(&composer, o).is_empty());
    assert!(composer.engine().directives().is_empty());

    // Dropped below the canvas it is discarded cleanly.
    let from = reveal(&mut composer, NodeType::Oscillator);
    drag(&mut composer, from, Point::new(from.x, from.y + 40.0));
    assert_eq!(composer.location(osc), Location::Deleted);
    assert!(composer.interaction().is_idle());
    assert!(peers(&composer, i).is_empty());
    assert_physical_matches_logical(&composer);
}

#[test]
fn test_deletion_clears_wiring() {
    let mut composer = composer();
    let osc = place(&mut composer, NodeType::Oscillator, Point::new(100.0, 200.0));
    let gain = place(&mut composer, NodeType::Gain, Point::new(300.0, 200.0));
    let dest = place(&mut composer, NodeType::Destination, Point::new(500.0, 200.0));
    composer
        .connect(output(&composer, osc, 0), input(&composer, gain, 0))
        .unwrap();
    composer
        .connect(output(&composer, gain, 0), input(&composer, dest, 0))
        .unwrap();

    let osc_out = output(&composer, osc, 0);
    let dest_in = input(&composer, dest, 0);
    let trash = composer.config().trash_bounds();
    drag(
        &mut composer,
        Point::new(300.0, 200.0),
        Point::new(trash.x, trash.y + 10.0),
    );

    assert_eq!(composer.location(gain), Location::Deleted);
    assert!(peers(&composer, osc_out).is_empty());
    assert!(peers(&composer, dest_in).is_empty());
    assert!(!composer.engine().contains_node(gain));
    assert_eq!(composer.engine().edge_count(), 0);
    assert_physical_matches_logical(&composer);
}

#[test]
fn test_gain_chain_delete_upstream() {
    let mut composer = composer();
    let g1 = place(&mut composer, NodeType::Gain, Point::new(150.0, 200.0));
    let g2 = place(&mut composer, NodeType::Gain, Point::new(400.0, 200.0));
    let (o1, i2) = (output(&composer, g1, 0), input(&composer, g2, 0));
    composer.connect(o1, i2).unwrap();
    composer.engine_mut().take_directives();
    composer.drain_events();

    let trash = composer.config().trash_bounds();
    drag(
        &mut composer,
        Point::new(150.0, 200.0),
        Point::new(trash.x, trash.y + 10.0),
    );

    assert_eq!(composer.location(g1), Location::Deleted);
    assert!(peers(&composer, i2).is_empty());
    assert_eq!(composer.location(g2), Location::OnCanvas);
    assert_eq!(composer.canvas_patches(), &[g2]);
    assert_eq!(
        composer.engine().directives(),
        &[
            Directive::DisconnectOutput {
                source: g1,
                output: 0
            },
            Directive::RemoveNode { node: g1 },
        ]
    );
    assert_eq!(
        composer.drain_events(),
        vec![
            PatchEvent::TrashHover {
                patch: g1,
                armed: true
            },
            PatchEvent::Deleted { patch: g1 },
        ]
    );
    assert_physical_matches_logical(&composer);
}

#[test]
fn test_gain_chain_delete_downstream() {
    let mut composer = composer();
    let g1 = place(&mut composer, NodeType::Gain, Point::new(150.0, 200.0));
    let g2 = place(&mut composer, NodeType::Gain, Point::new(400.0, 200.0));

    // Wire with a gesture from G2's input back to G1's output.
    let from = composer
        .graph()
        .port_position(input(&composer, g2, 0))
        .unwrap();
    let to = composer
        .graph()
        .port_position(output(&composer, g1, 0))
        .unwrap();
    drag(&mut composer, from, to);
    assert!(composer.engine().has_edge(g1, 0, g2, 0));
    composer.engine_mut().take_directives();

    composer.delete_patch(g2).unwrap();

    assert!(peers(&composer, output(&composer, g1, 0)).is_empty());
    assert_eq!(
        composer.engine().directives(),
        &[
            Directive::DisconnectOutput {
                source: g1,
                output: 0
            },
            Directive::RemoveNode { node: g2 },
        ]
    );
    assert_eq!(composer.canvas_patches(), &[g1]);
}

#[test]
fn test_eval_order_follows_wiring() {
    let mut composer = composer();
    let dest = place(&mut composer, NodeType::Destination, Point::new(600.0, 200.0));
    let delay = place(&mut composer, NodeType::Delay, Point::new(400.0, 200.0));
    let osc = place(&mut composer, NodeType::Oscillator, Point::new(150.0, 200.0));
    composer
        .connect(output(&composer, osc, 0), input(&composer, delay, 0))
        .unwrap();
    composer
        .connect(output(&composer, delay, 0), input(&composer, dest, 0))
        .unwrap();

    let order: Vec<PatchId> = composer
        .engine()
        .eval_order()
        .into_iter()
        .filter(|id| composer.canvas_patches().contains(id))
        .collect();
    assert_eq!(order, vec![osc, delay, dest]);
}
