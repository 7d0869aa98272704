// src/main.rs
//
// Scripted sanity run: drives the composer with the gestures a user would
// make and prints the resulting routing.

use patchbay::{
    Composer, ComposerConfig, ComposerResult, Gesture, NodeType, PatchEvent, PatchId, Point,
    PortId,
};

fn drag(composer: &mut Composer, from: Point, to: Point) -> ComposerResult<()> {
    composer.handle(Gesture::DragStart {
        point: from,
        target: None,
    })?;
    composer.handle(Gesture::DragMove { point: to })?;
    composer.handle(Gesture::DragRelease { point: to })
}

/// Pull a palette patch onto the canvas, scrolling the strip first if its
/// slot is off stage. Returns the placed patch.
fn place(composer: &mut Composer, node_type: NodeType, to: Point) -> ComposerResult<Option<PatchId>> {
    let Some(patch) = composer.palette_patch(node_type) else {
        return Ok(None);
    };
    let Some(at) = composer.patch(patch).map(|p| p.position()) else {
        return Ok(None);
    };

    let config = *composer.config();
    let half = config.patch.width / 2.0;
    let overshoot = (at.x + half - config.stage_width).max(0.0) + (at.x - half).min(0.0);
    if overshoot != 0.0 {
        let grab = Point::new(config.stage_width / 2.0, config.palette_bounds().y + 5.0);
        drag(composer, grab, Point::new(grab.x - overshoot, grab.y))?;
    }

    let Some(from) = composer.patch(patch).map(|p| p.position()) else {
        return Ok(None);
    };
    drag(composer, from, to)?;
    Ok(composer.canvas_patches().contains(&patch).then_some(patch))
}

fn port_position(composer: &Composer, port: PortId) -> Point {
    composer.graph().port_position(port).unwrap_or_default()
}

/// Wire `output` of `source` to `input` of `dest` with a drag gesture.
fn wire(
    composer: &mut Composer,
    source: PatchId,
    output: usize,
    dest: PatchId,
    input: usize,
) -> ComposerResult<()> {
    let from = composer.patch(source).and_then(|p| p.outputs().get(output).copied());
    let to = composer.patch(dest).and_then(|p| p.inputs().get(input).copied());
    if let (Some(from), Some(to)) = (from, to) {
        let (a, b) = (port_position(composer, from), port_position(composer, to));
        drag(composer, a, b)?;
    }
    Ok(())
}

fn report(composer: &mut Composer) {
    for event in composer.drain_events() {
        match event {
            PatchEvent::Created { .. } => {}
            other => println!("  event: {:?}", other),
        }
    }
}

fn name_of(composer: &Composer, patch: PatchId) -> &'static str {
    composer
        .patch(patch)
        .map_or("?", |p| p.node_type().name())
}

fn main() -> ComposerResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut composer = Composer::new(ComposerConfig::default())?;
    report(&mut composer);

    // --------------------------------
    // Placement
    // --------------------------------

    println!("Placing patches…");

    let osc = place(&mut composer, NodeType::Oscillator, Point::new(120.0, 150.0))?;
    let g1 = place(&mut composer, NodeType::Gain, Point::new(320.0, 100.0))?;
    let g2 = place(&mut composer, NodeType::Gain, Point::new(320.0, 300.0))?;
    let dest = place(&mut composer, NodeType::Destination, Point::new(600.0, 200.0))?;
    // A second destination is over its instance limit.
    place(&mut composer, NodeType::Destination, Point::new(700.0, 400.0))?;
    report(&mut composer);

    let (Some(osc), Some(g1), Some(g2), Some(dest)) = (osc, g1, g2, dest) else {
        println!("Placement failed.");
        return Ok(());
    };

    // --------------------------------
    // Wiring
    // --------------------------------

    println!("Wiring…");

    wire(&mut composer, osc, 0, g1, 0)?;
    wire(&mut composer, osc, 0, g2, 0)?;
    wire(&mut composer, g1, 0, dest, 0)?;
    wire(&mut composer, g2, 0, dest, 0)?;
    report(&mut composer);

    for edge in composer.engine().edges() {
        println!(
            "  {}.{} -> {}.{}",
            name_of(&composer, edge.source),
            edge.output,
            name_of(&composer, edge.dest),
            edge.input
        );
    }

    // --------------------------------
    // Trash one gain
    // --------------------------------

    println!("Deleting a gain…");

    let at = composer.patch(g1).map(|p| p.position()).unwrap_or_default();
    let trash = composer.config().trash_bounds();
    drag(&mut composer, at, Point::new(trash.x, trash.y + trash.height))?;
    report(&mut composer);

    let order: Vec<&str> = composer
        .engine()
        .eval_order()
        .into_iter()
        .filter(|&id| composer.canvas_patches().contains(&id))
        .map(|id| name_of(&composer, id))
        .collect();
    println!("  evaluation order: {}", order.join(" -> "));
    println!("  {} edge(s) remain", composer.engine().edge_count());

    println!("Sanity run completed.");
    Ok(())
}
