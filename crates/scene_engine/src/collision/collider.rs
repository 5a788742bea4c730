//! Collider shapes attached to scene nodes
//!
//! A collider carries local geometry only; world-space corners and centers
//! are derived through the world matrix of the node it rides on (see the
//! geometry helpers on [`crate::scene::Scene`]).

use crate::foundation::math::{Vec2, Vec3};
use crate::scene::NodeKey;

/// Sphere collider: a radius around the owning node's world position
#[derive(Debug, Clone, Copy)]
pub struct SphereCollider {
    /// Sphere radius; negative values are treated as their absolute value
    pub radius: f32,
}

impl SphereCollider {
    /// Create a sphere collider with the given radius
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

/// Plane collider: a finite quad of the given half-extents in the owning
/// node's local XY plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneCollider {
    /// Half-extents of the quad along local X and Y
    pub extents: Vec2,
}

impl PlaneCollider {
    /// Create a plane collider with the given half-extents
    pub fn new(extents: Vec2) -> Self {
        Self { extents }
    }

    /// The quad's 4 corners in the owning node's local space (CCW, z = 0)
    pub fn local_corners(&self) -> [Vec3; 4] {
        let (x, y) = (self.extents.x, self.extents.y);
        [
            Vec3::new(-x, -y, 0.0),
            Vec3::new(x, -y, 0.0),
            Vec3::new(x, y, 0.0),
            Vec3::new(-x, y, 0.0),
        ]
    }
}

/// Curve collider: a corridor of chained quadrilateral wall segments.
///
/// The 2D corner polyline lives in the owning node's local XY plane and is
/// extruded vertically across `[z0, z1]`; consecutive corner pairs each
/// become one wall quad. Attached sphere colliders (non-owning node keys)
/// are tested and resolved against the corridor every scene update.
#[derive(Debug, Clone)]
pub struct CurveCollider {
    corners: Vec<Vec2>,
    z0: f32,
    z1: f32,
    attached: Vec<NodeKey>,
}

impl CurveCollider {
    /// Build a corridor from 2D corner points and an extrusion height.
    ///
    /// With `extrude_from_center` the walls span `[-height/2, height/2]`,
    /// otherwise `[0, height]`.
    pub fn new(corners: Vec<Vec2>, height: f32, extrude_from_center: bool) -> Self {
        let (z0, z1) = if extrude_from_center {
            let half = height / 2.0;
            (-half, half)
        } else {
            (0.0, height)
        };

        Self {
            corners,
            z0,
            z1,
            attached: Vec::new(),
        }
    }

    /// Lower extrusion bound
    pub fn z0(&self) -> f32 {
        self.z0
    }

    /// Upper extrusion bound
    pub fn z1(&self) -> f32 {
        self.z1
    }

    /// The 2D corner polyline
    pub fn corners(&self) -> &[Vec2] {
        &self.corners
    }

    /// Number of wall segments (corners minus one)
    pub fn segment_count(&self) -> usize {
        self.corners.len().saturating_sub(1)
    }

    /// Segment `index`'s 4 corners in the owning node's local space:
    /// the corner pair extruded across `[z0, z1]`
    pub fn local_segment_corners(&self, index: usize) -> [Vec3; 4] {
        let a = self.corners[index];
        let b = self.corners[index + 1];

        [
            Vec3::new(a.x, a.y, self.z0),
            Vec3::new(b.x, b.y, self.z0),
            Vec3::new(b.x, b.y, self.z1),
            Vec3::new(a.x, a.y, self.z1),
        ]
    }

    /// Keys of sphere-collider nodes tested against this corridor
    pub fn attached(&self) -> &[NodeKey] {
        &self.attached
    }

    pub(crate) fn attach(&mut self, key: NodeKey) -> bool {
        if self.attached.contains(&key) {
            return false;
        }
        self.attached.push(key);
        true
    }

    pub(crate) fn detach(&mut self, key: NodeKey) -> bool {
        let before = self.attached.len();
        self.attached.retain(|k| *k != key);
        self.attached.len() != before
    }

    /// Drop attachments on clone-for-instantiate: they reference nodes
    /// outside the copied subtree.
    pub(crate) fn clear_attachments(&mut self) {
        self.attached.clear();
    }

    /// Index of the wall segment closest to a 2D query point.
    ///
    /// Scans all corners for the nearest one (Z ignored) and biases toward
    /// the segment just before it: `clamp(nearest - 1, 0, segments - 1)`.
    /// Always in range, no matter how far outside the corridor the query
    /// lies. Returns `None` only when the polyline has no segments.
    pub fn closest_segment_index(&self, query: Vec2) -> Option<usize> {
        let segments = self.segment_count();
        if segments == 0 {
            return None;
        }

        let mut nearest = 0_usize;
        let mut best = f32::MAX;
        for (i, corner) in self.corners.iter().enumerate() {
            let dist = (corner - query).norm();
            if dist < best {
                best = dist;
                nearest = i;
            }
        }

        Some(nearest.saturating_sub(1).min(segments - 1))
    }
}

/// Collider variants a node can carry
#[derive(Debug, Clone)]
pub enum Collider {
    /// Moving-actor sphere
    Sphere(SphereCollider),
    /// Static finite quad
    Plane(PlaneCollider),
    /// Static multi-segment corridor
    Curve(CurveCollider),
}

impl Collider {
    /// Shorthand for a sphere collider
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(SphereCollider::new(radius))
    }

    /// Shorthand for a plane collider
    pub fn plane(extents: Vec2) -> Self {
        Self::Plane(PlaneCollider::new(extents))
    }

    /// Shorthand for a curve collider extruded from z = 0
    pub fn curve(corners: Vec<Vec2>, height: f32) -> Self {
        Self::Curve(CurveCollider::new(corners, height, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> CurveCollider {
        CurveCollider::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(20.0, 0.0),
                Vec2::new(20.0, 10.0),
            ],
            5.0,
            false,
        )
    }

    #[test]
    fn segment_count_is_corners_minus_one() {
        assert_eq!(corridor().segment_count(), 3);
        assert_eq!(
            CurveCollider::new(vec![Vec2::zeros()], 5.0, false).segment_count(),
            0
        );
    }

    #[test]
    fn centered_extrusion_splits_height() {
        let c = CurveCollider::new(vec![Vec2::zeros(), Vec2::x()], 6.0, true);
        assert_eq!(c.z0(), -3.0);
        assert_eq!(c.z1(), 3.0);
    }

    #[test]
    fn closest_segment_index_is_always_in_range() {
        let c = corridor();
        let segments = c.segment_count();

        let queries = [
            Vec2::new(-100.0, -100.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.1),
            Vec2::new(20.0, 10.0),
            Vec2::new(1000.0, 1000.0),
            Vec2::new(5.0, -50.0),
        ];
        for q in queries {
            let idx = c.closest_segment_index(q).unwrap();
            assert!(idx < segments, "index {idx} out of range for query {q:?}");
        }
    }

    #[test]
    fn closest_segment_biases_before_nearest_corner() {
        let c = corridor();
        // Nearest corner to (10, 0.1) is corner 1; bias lands on segment 0
        assert_eq!(c.closest_segment_index(Vec2::new(10.0, 0.1)), Some(0));
        // Far past the last corner still clamps into range
        assert_eq!(
            c.closest_segment_index(Vec2::new(20.0, 100.0)),
            Some(2)
        );
    }

    #[test]
    fn segment_corners_extrude_corner_pair() {
        let c = corridor();
        let quad = c.local_segment_corners(0);
        assert_eq!(quad[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(quad[1], Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(quad[2], Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(quad[3], Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn plane_corners_span_extents() {
        let p = PlaneCollider::new(Vec2::new(2.0, 3.0));
        let corners = p.local_corners();
        assert_eq!(corners[0], Vec3::new(-2.0, -3.0, 0.0));
        assert_eq!(corners[2], Vec3::new(2.0, 3.0, 0.0));
    }
}
