//! Frame draw sequence handed to the GPU binding layer
//!
//! The engine core never talks to a graphics API. Each draw pass produces
//! an ordered list of [`DrawCall`] values (plus the frame's light block);
//! binding shaders, buffers, and uniforms is the consumer's business.

use crate::foundation::math::{Mat4, Vec4};

/// Opaque handle to mesh geometry owned by the external asset loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Opaque handle to a texture owned by the external asset loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Shader variant selecting how a draw call is shaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderVariant {
    /// Unlit flat color (material without a texture)
    FlatColor,
    /// Lit, textured static mesh
    Textured,
    /// Skinned mesh without a texture
    SkinnedFlatColor,
    /// Skinned mesh with a texture
    SkinnedTextured,
    /// Sky dome, drawn first
    Sky,
    /// Terrain mesh, front-face culled
    Terrain,
    /// Screen-space transparent sprite, drawn last
    Sprite,
}

/// Face culling state for a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// Cull back faces (models, sky)
    Back,
    /// Cull front faces (terrain, viewed from above)
    Front,
    /// No culling (screen-space sprites)
    None,
}

/// One light's packed uniform data.
///
/// `position.w` tags the kind: 0 for directional (xyz = negated forward),
/// 1 for point (xyz = world position).
#[derive(Debug, Clone, Copy)]
pub struct LightUniform {
    /// Packed position/direction with the kind tag in `w`
    pub position: Vec4,
    /// RGB light color
    pub color: [f32; 3],
    /// Falloff range (point lights)
    pub range: f32,
    /// Intensity multiplier
    pub intensity: f32,
}

/// A single draw operation in the frame sequence
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Shader variant to bind
    pub shader: ShaderVariant,
    /// Mesh to draw; `None` for the implicit screen-space sprite quad
    pub mesh: Option<MeshHandle>,
    /// Base texture, when the variant samples one
    pub texture: Option<TextureHandle>,
    /// Flat base color used by untextured variants
    pub color: [f32; 3],
    /// World matrix of the drawn object
    pub world: Mat4,
    /// Combined model-view-projection matrix
    pub mvp: Mat4,
    /// Face culling state
    pub cull: CullMode,
    /// Matrix-palette frame for skinned variants
    pub palette_frame: Option<usize>,
    /// Horizontal UV window `[u0, u1]` for sprite-strip frames
    pub uv_window: Option<[f32; 2]>,
}

/// Everything the binding layer needs to render one frame
#[derive(Debug, Clone, Default)]
pub struct FrameDraw {
    /// Lights classified this frame (or the scene default light)
    pub lights: Vec<LightUniform>,
    /// Draw operations in issue order
    pub calls: Vec<DrawCall>,
}

impl FrameDraw {
    /// Number of draw operations in the frame
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}
