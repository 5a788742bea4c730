//! Stateless pairwise intersection tests
//!
//! All tests operate on world-space geometry passed in by the caller and
//! keep their scratch values on the stack, so they are reentrant and safe
//! to call from anywhere in the frame.
//!
//! The plane here is always a finite quad given by 4 corner points; the
//! implicit plane equation is derived from three of them on every call.

use crate::foundation::math::{constants::GEOMETRY_EPSILON, Vec3};

/// Number of interpolation steps in the boundary-sampling fallback of
/// [`plane_sphere`]. The sweep visits `BOUNDARY_SAMPLES + 1` points
/// (t = 0.0, 0.1, ... 1.0). This is an approximation with bounded cost,
/// not an analytic boundary test.
pub const BOUNDARY_SAMPLES: u32 = 10;

/// Angular-containment acceptance threshold, a hair under 2*pi.
///
/// The interior-angle sum at a point inside the quad is exactly 2*pi in
/// real arithmetic; the slack absorbs accumulated `acos` rounding.
const CONTAINMENT_ANGLE_SUM: f32 = 6.283;

/// Implicit plane equation `Ax + By + Cz + D = 0` derived from three points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaneEquation {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
}

impl PlaneEquation {
    /// Derive the equation from three corner points via the 3x3 determinant
    /// expansion.
    pub(crate) fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let a = (p1.y * p2.z) + (p0.y * p1.z) + (p0.z * p2.y)
            - (p1.y * p0.z)
            - (p2.y * p1.z)
            - (p2.z * p0.y);
        let b = (p0.x * p2.z) + (p1.z * p2.x) + (p0.z * p1.x)
            - (p2.x * p0.z)
            - (p1.z * p0.x)
            - (p2.z * p1.x);
        let c = (p0.x * p1.y) + (p0.y * p2.x) + (p1.x * p2.y)
            - (p2.x * p1.y)
            - (p2.y * p0.x)
            - (p1.x * p0.y);
        let d = (p0.x * p1.y * p2.z) + (p0.y * p1.z * p2.x) + (p0.z * p1.x * p2.y)
            - (p2.x * p1.y * p0.z)
            - (p2.y * p1.z * p0.x)
            - (p2.z * p1.x * p0.y);

        Self { a, b, c, d }
    }

    /// `A^2 + B^2 + C^2`; zero when the three sampled points are collinear.
    pub(crate) fn denominator(&self) -> f32 {
        (self.a * self.a) + (self.b * self.b) + (self.c * self.c)
    }

    /// Evaluate `Ax + By + Cz + D` at a point.
    pub(crate) fn evaluate(&self, p: Vec3) -> f32 {
        (self.a * p.x) + (self.b * p.y) + (self.c * p.z) + self.d
    }

    fn normal_unscaled(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }
}

/// Sphere-sphere overlap: Euclidean center distance against summed radii.
///
/// Radii are taken as absolute values; the test is symmetric in its
/// arguments.
pub fn sphere_sphere(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> bool {
    let distance = (center_a - center_b).norm();
    distance <= radius_a.abs() + radius_b.abs()
}

/// Finite-quad / sphere overlap test.
///
/// Two phases: if the sphere center's projection onto the quad plane lands
/// inside the quad (angular containment), that settles it. Otherwise points
/// along the intersection circle's boundary are sampled toward the edge of
/// the quad nearest the projection, reporting overlap on the first sample
/// that lands inside. Degenerate quads (collinear sample corners) report no
/// intersection instead of propagating NaN.
pub fn plane_sphere(quad: &[Vec3; 4], center: Vec3, radius: f32) -> bool {
    let eq = PlaneEquation::from_points(quad[0], quad[1], quad[2]);
    let denom = eq.denominator();
    if denom <= GEOMETRY_EPSILON {
        log::warn!("plane_sphere: degenerate quad (collinear corners), reporting no overlap");
        return false;
    }

    let signed = eq.evaluate(center);
    let distance = signed.abs() / denom.sqrt();
    let radius = radius.abs();
    if distance > radius {
        return false;
    }

    // Project the sphere center onto the plane
    let circle_center = center - eq.normal_unscaled() * (signed / denom);
    if point_in_quad(circle_center, quad) {
        return true;
    }

    // Radius of the circle cut from the sphere by the plane
    let circle_radius = ((radius * radius) - (distance * distance)).max(0.0).sqrt();

    let centroid = (quad[0] + quad[1] + quad[2] + quad[3]) / 4.0;
    let toward_quad = centroid - circle_center;
    if toward_quad.norm_squared() <= GEOMETRY_EPSILON {
        // Projection sits on the centroid; containment above already ruled
        return false;
    }
    let toward_quad = toward_quad.normalize();

    let mut directions = [Vec3::zeros(); 4];
    let mut dots = [0.0_f32; 4];
    for i in 0..4 {
        let v = quad[i] - circle_center;
        if v.norm_squared() <= GEOMETRY_EPSILON {
            // Projection coincides with a corner
            return true;
        }
        directions[i] = v.normalize();
        dots[i] = directions[i].dot(&toward_quad);
    }

    // The two corner directions least aligned with the quad interior bracket
    // the arc of the circle facing the nearest edge
    let mut order = [0_usize, 1, 2, 3];
    order.sort_by(|&l, &r| dots[l].total_cmp(&dots[r]));
    let (start, end) = (order[0], order[1]);

    for step in 0..=BOUNDARY_SAMPLES {
        let t = step as f32 / BOUNDARY_SAMPLES as f32;
        let swept = directions[start].lerp(&directions[end], t);
        let length = swept.norm();
        if length <= GEOMETRY_EPSILON {
            continue;
        }
        let sample = circle_center + (swept / length) * circle_radius;
        if point_in_quad(sample, quad) {
            return true;
        }
    }

    false
}

/// Plane-plane intersection is not supported: always reports no overlap.
///
/// The corridor/actor collision model never tests two static quads against
/// each other, so this has intentionally been left as a stub rather than
/// given invented semantics.
pub fn plane_plane(_a: &[Vec3; 4], _b: &[Vec3; 4]) -> bool {
    false
}

/// Angular containment test: sum the interior angles subtended at `point`
/// by consecutive quad corners; the point is inside iff the sum reaches
/// (a conservative band under) 2*pi.
pub(crate) fn point_in_quad(point: Vec3, quad: &[Vec3; 4]) -> bool {
    let mut directions = [Vec3::zeros(); 4];
    for i in 0..4 {
        let v = quad[i] - point;
        if v.norm_squared() <= GEOMETRY_EPSILON {
            // On a corner counts as inside
            return true;
        }
        directions[i] = v.normalize();
    }

    let mut sum = 0.0_f32;
    for i in 0..4 {
        let next = (i + 1) % 4;
        let dot = directions[i].dot(&directions[next]).clamp(-1.0, 1.0);
        sum += dot.acos();
    }

    sum >= CONTAINMENT_ANGLE_SUM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_quad() -> [Vec3; 4] {
        [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn plane_equation_satisfies_all_four_corners() {
        // Reconstructed from 3 corners, the equation must also vanish at the 4th
        let quad = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(2.0, 3.0, 1.0),
            Vec3::new(0.0, 3.0, 1.0),
        ];
        let eq = PlaneEquation::from_points(quad[0], quad[1], quad[2]);
        let scale = eq.denominator().sqrt();

        for corner in &quad {
            assert_relative_eq!(eq.evaluate(*corner) / scale, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn sphere_sphere_is_symmetric() {
        let configs = [
            (Vec3::zeros(), 1.0, Vec3::new(3.0, 0.0, 0.0), 1.0),
            (Vec3::zeros(), 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0),
            (Vec3::new(1.0, -2.0, 4.0), 0.5, Vec3::new(1.0, -2.0, 4.2), 0.1),
            (Vec3::zeros(), -1.0, Vec3::new(1.5, 0.0, 0.0), -1.0),
        ];

        for (ca, ra, cb, rb) in configs {
            assert_eq!(
                sphere_sphere(ca, ra, cb, rb),
                sphere_sphere(cb, rb, ca, ra),
            );
        }
    }

    #[test]
    fn sphere_sphere_distance_threshold() {
        // distance 3 > sum 2: apart; distance 1.5 <= 2: overlap
        assert!(!sphere_sphere(
            Vec3::zeros(),
            1.0,
            Vec3::new(3.0, 0.0, 0.0),
            1.0
        ));
        assert!(sphere_sphere(
            Vec3::zeros(),
            1.0,
            Vec3::new(1.5, 0.0, 0.0),
            1.0
        ));
    }

    #[test]
    fn sphere_sphere_uses_absolute_radii() {
        assert!(sphere_sphere(
            Vec3::zeros(),
            -1.0,
            Vec3::new(1.5, 0.0, 0.0),
            -1.0
        ));
    }

    #[test]
    fn point_inside_quad_by_angle_sum() {
        let quad = unit_quad();
        assert!(point_in_quad(Vec3::zeros(), &quad));
        assert!(point_in_quad(Vec3::new(0.9, 0.9, 0.0), &quad));
        assert!(!point_in_quad(Vec3::new(2.0, 0.0, 0.0), &quad));
        assert!(!point_in_quad(Vec3::new(0.0, 0.0, 5.0), &quad));
    }

    #[test]
    fn plane_sphere_center_over_quad() {
        let quad = unit_quad();
        assert!(plane_sphere(&quad, Vec3::new(0.0, 0.0, 0.5), 1.0));
    }

    #[test]
    fn plane_sphere_too_far_from_plane() {
        let quad = unit_quad();
        assert!(!plane_sphere(&quad, Vec3::new(0.0, 0.0, 5.0), 1.0));
    }

    #[test]
    fn plane_sphere_boundary_sampling_near_edge() {
        // Projection lands outside the quad, but the intersection circle
        // reaches back across the nearest edge
        let quad = unit_quad();
        assert!(plane_sphere(&quad, Vec3::new(1.5, 0.0, 0.0), 0.8));
    }

    #[test]
    fn plane_sphere_outside_reach_of_circle() {
        let quad = unit_quad();
        assert!(!plane_sphere(&quad, Vec3::new(3.0, 0.0, 0.0), 0.5));
    }

    #[test]
    fn degenerate_quad_reports_no_overlap() {
        // All corners collinear: no plane can be derived
        let quad = [
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ];
        assert!(!plane_sphere(&quad, Vec3::new(1.0, 0.0, 0.0), 10.0));
    }

    #[test]
    fn plane_plane_is_unsupported() {
        let quad = unit_quad();
        assert!(!plane_plane(&quad, &quad));
    }
}
