//! Circle contact tests
//!
//! Every gameplay contact in the arena (projectile vs tank, projectile vs
//! obstacle, tank vs obstacle) is a circle-circle overlap.

use glam::Vec2;

/// True iff the circles overlap (touching edges do not count)
#[inline]
pub fn intersects(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    a_pos.distance(b_pos) < a_radius + b_radius
}

/// True iff a blast of `blast_radius` at `center` reaches a target circle
///
/// Inclusive: a target whose edge exactly touches the blast edge is caught.
#[inline]
pub fn in_blast(center: Vec2, blast_radius: f32, target_pos: Vec2, target_radius: f32) -> bool {
    center.distance(target_pos) <= blast_radius + target_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        assert!(intersects(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
    }

    #[test]
    fn test_intersects_touching_is_miss() {
        assert!(!intersects(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
    }

    #[test]
    fn test_blast_edge_inclusive() {
        assert!(in_blast(Vec2::ZERO, 80.0, Vec2::new(100.0, 0.0), 20.0));
        assert!(!in_blast(Vec2::ZERO, 80.0, Vec2::new(100.5, 0.0), 20.0));
    }
}
