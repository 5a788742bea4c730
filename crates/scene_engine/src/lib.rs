//! # Scene Engine
//!
//! A retained 3D scene graph with collision-aware updates and a
//! renderer-agnostic draw pass.
//!
//! ## Features
//!
//! - **Scene Graph**: Flat node arena with parent/child transforms and
//!   lazy world-matrix caching
//! - **Layers**: Ordered top-level containers driving traversal order
//! - **Collision**: Sphere, finite-plane, and extruded-corridor colliders
//!   with wall-sliding resolution
//! - **Draw Pass**: Classified, ordered draw-call emission (sky, terrain,
//!   models, sprites) with cached projection and view matrices
//! - **Headless Core**: No graphics API dependency; a binding layer
//!   consumes the emitted [`scene::FrameDraw`]
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.add_layer(Layer::new("world"));
//!
//! let camera = scene.spawn(Node::with_kind("camera", NodeKind::Camera(Camera::default())));
//! scene.set_main_camera(camera).unwrap();
//!
//! let corridor = scene.spawn(Node::new("corridor").with_collider(Collider::curve(
//!     vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
//!     4.0,
//! )));
//! let actor = scene.spawn(Node::new("actor").with_position(Vec3::new(5.0, -2.0, 1.0)));
//! let hull = scene.spawn(Node::new("hull").with_collider(Collider::sphere(1.0)));
//! scene.set_parent(hull, actor).unwrap();
//! scene.attach_to_curve(hull, corridor).unwrap();
//!
//! let layer = scene.layer_by_name_mut("world").unwrap();
//! layer.add(corridor);
//! layer.add(actor);
//!
//! let mut context = RenderContext::new(800, 600);
//! scene.update();
//! let frame = context.draw(&mut scene);
//! assert!(frame.lights.len() == 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod collision;
pub mod config;
pub mod error;
pub mod foundation;
pub mod scene;

pub use error::SceneError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        collision::{bounds, Collider, CurveCollider, PlaneCollider, SphereCollider},
        config::{Config, EngineConfig},
        error::SceneError,
        foundation::math::{Mat4, Mat4Ext, Point3, Vec2, Vec3, Vec4},
        scene::{
            Camera, CullMode, DrawCall, FrameDraw, Layer, Light, LightKind, MeshHandle, Model,
            Node, NodeKey, NodeKind, ProjectionKind, RenderContext, Scene, ShaderVariant, SkyDome,
            Sprite, Terrain, TextureHandle,
        },
    };
}
