//! Scene module: the node hierarchy, layers, and the per-frame passes
//!
//! A [`Scene`] owns every node in a keyed arena and is the only way to
//! mutate transforms, so world-matrix caching stays sound. A
//! [`RenderContext`] turns a scene into an ordered [`FrameDraw`] for the
//! GPU binding layer; [`Scene::update`] runs the collision pass first.

pub mod context;
pub mod draw;
pub mod graph;
pub mod layer;
pub mod node;

pub use context::RenderContext;
pub use draw::{CullMode, DrawCall, FrameDraw, LightUniform, MeshHandle, ShaderVariant, TextureHandle};
pub use graph::Scene;
pub use layer::Layer;
pub use node::{
    AnimationState, Camera, Light, LightKind, Material, Model, Node, NodeKey, NodeKind,
    ProjectionKind, SkyDome, Sprite, Terrain,
};
