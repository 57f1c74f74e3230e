//! Layout engine — grid auto-placement and drag-bounds clamping.
//!
//! Both functions are pure and total: they always return a coordinate pair,
//! never fail, and never touch shared state. Placement is a cheap O(1) grid
//! walk tied to arrival order, not a true packing search.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

/// Fixed rendered note width in pixels.
pub const NOTE_WIDTH: f64 = 200.0;

/// Fixed rendered note height in pixels.
pub const NOTE_HEIGHT: f64 = 200.0;

/// Grid cell pitch used by auto-placement.
pub const GRID_CELL: f64 = 100.0;

/// Margin from the container origin to the first grid cell.
pub const GRID_MARGIN: f64 = 20.0;

/// Viewport width assumed before a session reports its own.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

/// Container dimensions the drag clamp runs against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub width: f64,
    pub height: f64,
}

impl ContainerBounds {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Assign grid coordinates to the note at `index` in arrival order.
///
/// `notes_per_row = floor(viewport_width / GRID_CELL)`, held at a minimum of
/// one so narrow viewports still produce a single left-aligned column.
/// Deterministic: equal inputs always yield equal coordinates.
#[must_use]
pub fn auto_place(index: usize, viewport_width: f64) -> (f64, f64) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let notes_per_row = ((viewport_width / GRID_CELL).floor() as usize).max(1);
    let row = index / notes_per_row;
    let col = index % notes_per_row;

    #[allow(clippy::cast_precision_loss)]
    (
        GRID_MARGIN + (col as f64) * GRID_CELL,
        GRID_MARGIN + (row as f64) * GRID_CELL,
    )
}

/// Clamp a proposed position so the full note rectangle stays inside the
/// container. When the container is narrower (or shorter) than a note the
/// floor wins and the coordinate pins to zero.
#[must_use]
pub fn clamp(proposed_x: f64, proposed_y: f64, bounds: ContainerBounds) -> (f64, f64) {
    (
        proposed_x.min(bounds.width - NOTE_WIDTH).max(0.0),
        proposed_y.min(bounds.height - NOTE_HEIGHT).max(0.0),
    )
}
