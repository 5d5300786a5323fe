//! Axis-aligned rectangles and the hit test shared by every collision check
//!
//! Rectangles are anchored at their top-left corner, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::HIT_MARGIN;

/// An axis-aligned rectangle (top-left anchored)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Check whether two rectangles overlap
///
/// The far edge of each rectangle is pulled in by `HIT_MARGIN` on both axes
/// so that sprites grazing each other's bounding boxes don't count as a hit.
/// The margin is applied to both operands, so `intersects(a, b)` always
/// equals `intersects(b, a)`.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    if a.width < 0.0 || b.width < 0.0 {
        return false;
    }

    b.x <= a.right() - HIT_MARGIN
        && a.x <= b.right() - HIT_MARGIN
        && b.y <= a.bottom() - HIT_MARGIN
        && a.y <= b.bottom() - HIT_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laser_overlapping_enemy() {
        let laser = Rect::new(100.0, 50.0, 5.0, 20.0);
        let enemy = Rect::new(98.0, 55.0, 100.0, 100.0);
        assert!(intersects(&laser, &enemy));
        assert!(intersects(&enemy, &laser));
    }

    #[test]
    fn test_edge_graze_is_not_a_hit() {
        // Touching edges exactly: within the margin, so no hit
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        assert!(!intersects(&a, &b));

        // 6 units of overlap clears the 5 unit margin
        let c = Rect::new(94.0, 0.0, 100.0, 100.0);
        assert!(intersects(&a, &c));
    }

    #[test]
    fn test_disjoint_on_one_axis() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(10.0, 200.0, 50.0, 50.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_negative_width_never_hits() {
        let a = Rect::new(0.0, 0.0, -10.0, 50.0);
        let b = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!intersects(&a, &b));
        assert!(!intersects(&b, &a));
    }
}
