// src/config.rs
//
// Stage layout configuration.
//
// The composer has no configuration file; hosts construct a `ComposerConfig`
// from the size of their drawing surface and keep the defaults for the rest.

use crate::geometry::{Point, Rect};

const DEFAULT_STAGE_WIDTH: f32 = 1024.0;
const DEFAULT_STAGE_HEIGHT: f32 = 768.0;
const PALETTE_HEIGHT: f32 = 140.0;
const PATCH_WIDTH: f32 = 100.0;
const PATCH_HEIGHT: f32 = 80.0;
const PATCH_MARGIN: f32 = 10.0;
const PORT_RADIUS: f32 = 4.0;
const PORT_INSET: f32 = 8.0;
const TRASH_SIZE: f32 = 20.0;
const TRASH_INSET: f32 = 25.0;

/// Layout of the stage: canvas on top, palette strip underneath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposerConfig {
    /// Width of the whole drawing surface.
    pub stage_width: f32,
    /// Height of the whole drawing surface.
    pub stage_height: f32,
    /// Height of the palette strip at the bottom of the stage.
    pub palette_height: f32,
    /// Horizontal gap between palette slots.
    pub patch_margin: f32,
    /// Side length of the trash target.
    pub trash_size: f32,
    /// Size of a patch and its ports.
    pub patch: PatchGeometry,
}

impl ComposerConfig {
    pub fn new(stage_width: f32, stage_height: f32) -> Self {
        Self {
            stage_width,
            stage_height,
            ..Self::default()
        }
    }

    /// The canvas ("composite area") in stage coordinates.
    pub fn canvas_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.stage_width,
            self.stage_height - self.palette_height,
        )
    }

    /// The palette ("stock area") in stage coordinates.
    pub fn palette_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            self.stage_height - self.palette_height,
            self.stage_width,
            self.palette_height,
        )
    }

    /// The trash target, pinned to the top-right corner of the canvas.
    pub fn trash_bounds(&self) -> Rect {
        Rect::new(
            self.stage_width - TRASH_INSET,
            5.0,
            self.trash_size,
            self.trash_size,
        )
    }

    /// Canonical centre of a palette slot in stage coordinates.
    pub fn slot_position(&self, slot: usize) -> Point {
        let origin = self.palette_bounds();
        let x = self.patch_margin
            + self.patch.width / 2.0
            + (self.patch.width + self.patch_margin) * slot as f32;
        let y = self.patch.height / 2.0 + (self.palette_height - self.patch.height) / 2.0;
        Point::new(origin.x + x, origin.y + y)
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            stage_width: DEFAULT_STAGE_WIDTH,
            stage_height: DEFAULT_STAGE_HEIGHT,
            palette_height: PALETTE_HEIGHT,
            patch_margin: PATCH_MARGIN,
            trash_size: TRASH_SIZE,
            patch: PatchGeometry::default(),
        }
    }
}

/// Fixed geometry shared by every patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchGeometry {
    pub width: f32,
    pub height: f32,
    pub port_radius: f32,
}

impl PatchGeometry {
    /// Bounds of a patch centred on `position`.
    pub fn bounds(&self, position: Point) -> Rect {
        Rect::centered(position, self.width, self.height)
    }

    /// Offset of a port from its patch centre.
    ///
    /// Inputs run down the left edge, outputs down the right edge, spaced
    /// evenly over the patch height.
    pub fn port_offset(&self, is_input: bool, channel: usize, count: usize) -> Point {
        let x = if is_input {
            PORT_INSET - self.width / 2.0
        } else {
            self.width / 2.0 - PORT_INSET
        };
        let y = (channel + 1) as f32 * self.height / (count + 1) as f32 - self.height / 2.0;
        Point::new(x, y)
    }

    /// Hit box of a port centred on `center`.
    pub fn port_bounds(&self, center: Point) -> Rect {
        Rect::centered(center, 2.0 * self.port_radius, 2.0 * self.port_radius)
    }
}

impl Default for PatchGeometry {
    fn default() -> Self {
        Self {
            width: PATCH_WIDTH,
            height: PATCH_HEIGHT,
            port_radius: PORT_RADIUS,
        }
    }
}
