//! Collision module: collider shapes and the bounds/intersection engine
//!
//! Colliders carry local geometry and ride on scene nodes; the pairwise
//! tests in [`bounds`] are stateless and operate on world-space geometry.
//! Curve-corridor resolution (wall sliding) runs inside
//! [`crate::scene::Scene::update`].

pub mod bounds;
pub mod collider;

pub use bounds::{plane_plane, plane_sphere, sphere_sphere, BOUNDARY_SAMPLES};
pub use collider::{Collider, CurveCollider, PlaneCollider, SphereCollider};
