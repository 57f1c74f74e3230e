#![allow(clippy::float_cmp)]

use super::*;

// --- auto_place ---

#[test]
fn auto_place_first_note_at_margin() {
    assert_eq!(auto_place(0, 500.0), (20.0, 20.0));
}

#[test]
fn auto_place_fills_row_left_to_right() {
    // width 500 -> five per row
    assert_eq!(auto_place(1, 500.0), (120.0, 20.0));
    assert_eq!(auto_place(4, 500.0), (420.0, 20.0));
}

#[test]
fn auto_place_wraps_to_next_row() {
    assert_eq!(auto_place(5, 500.0), (20.0, 120.0));
    assert_eq!(auto_place(6, 500.0), (120.0, 120.0));
}

#[test]
fn auto_place_two_per_row_at_width_250() {
    assert_eq!(auto_place(0, 250.0), (20.0, 20.0));
    assert_eq!(auto_place(1, 250.0), (120.0, 20.0));
    assert_eq!(auto_place(2, 250.0), (20.0, 120.0));
}

#[test]
fn auto_place_is_deterministic() {
    for index in 0..32 {
        assert_eq!(auto_place(index, 777.0), auto_place(index, 777.0));
    }
}

#[test]
fn auto_place_narrow_viewport_single_column() {
    // width below one grid cell must not divide to zero per row
    assert_eq!(auto_place(0, 60.0), (20.0, 20.0));
    assert_eq!(auto_place(1, 60.0), (20.0, 120.0));
    assert_eq!(auto_place(2, 60.0), (20.0, 220.0));
}

#[test]
fn auto_place_zero_viewport_single_column() {
    assert_eq!(auto_place(3, 0.0), (20.0, 320.0));
}

// --- clamp ---

#[test]
fn clamp_inside_bounds_is_identity() {
    let bounds = ContainerBounds::new(600.0, 400.0);
    assert_eq!(clamp(100.0, 150.0, bounds), (100.0, 150.0));
}

#[test]
fn clamp_negative_pins_to_origin() {
    let bounds = ContainerBounds::new(600.0, 400.0);
    assert_eq!(clamp(-50.0, -50.0, bounds), (0.0, 0.0));
}

#[test]
fn clamp_overflow_pins_to_far_edge() {
    let bounds = ContainerBounds::new(600.0, 400.0);
    assert_eq!(clamp(1000.0, 1000.0, bounds), (400.0, 200.0));
}

#[test]
fn clamp_container_narrower_than_note_prefers_floor() {
    // lower bound exceeds upper bound; floor wins
    let bounds = ContainerBounds::new(150.0, 120.0);
    assert_eq!(clamp(75.0, 75.0, bounds), (0.0, 0.0));
}

#[test]
fn clamp_is_idempotent() {
    let bounds = ContainerBounds::new(600.0, 400.0);
    for &(x, y) in &[(-50.0, -50.0), (0.0, 0.0), (399.0, 199.0), (1000.0, 1000.0), (250.0, 125.0)] {
        let once = clamp(x, y, bounds);
        let twice = clamp(once.0, once.1, bounds);
        assert_eq!(once, twice);
    }
}

#[test]
fn clamp_edge_position_stays_put() {
    let bounds = ContainerBounds::new(600.0, 400.0);
    assert_eq!(clamp(400.0, 200.0, bounds), (400.0, 200.0));
}
