//! Scene nodes and their render components
//!
//! A node is a positioned, oriented entity in the hierarchy. Rather than a
//! deep inheritance chain, every node is the same flat type: shared
//! transform state plus a closed [`NodeKind`] variant for render
//! classification and an optional collider component.

use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::foundation::math::{orthonormal_basis, Mat4, Vec3};
use crate::scene::draw::{MeshHandle, TextureHandle};

slotmap::new_key_type! {
    /// Stable handle to a node in a [`crate::scene::Scene`] arena
    pub struct NodeKey;
}

/// Render-classification variant of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain transform group, nothing drawn
    Group,
    /// Mesh model with a material and optional skeletal animation
    Model(Model),
    /// Terrain mesh, drawn front-face culled before models
    Terrain(Terrain),
    /// Screen-space transparent sprite, drawn last
    Sprite(Sprite),
    /// Light source contributing to the frame's light block
    Light(Light),
    /// Camera defining projection and view
    Camera(Camera),
}

/// Material state of a model: optional texture with a flat-color fallback
#[derive(Debug, Clone)]
pub struct Material {
    /// Base texture; `None` falls back to flat-color shading
    pub base_texture: Option<TextureHandle>,
    /// RGB base color used when no texture is bound
    pub base_color: [f32; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_texture: None,
            base_color: [0.8, 0.8, 0.8],
        }
    }
}

/// Skeletal animation playback state supplied by the external player.
///
/// The engine only consumes the current frame index; clip bookkeeping
/// happens elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct AnimationState {
    /// Current frame as reported by the animation player
    pub current_frame: i32,
    /// First frame covered by the matrix palette
    pub frame_offset: i32,
    /// Number of palette entries available
    pub palette_len: usize,
}

impl AnimationState {
    /// Palette index for the current frame, clamped into
    /// `[0, palette_len - 1]`. `None` when the palette is empty.
    pub fn palette_frame(&self) -> Option<usize> {
        if self.palette_len == 0 {
            return None;
        }
        let frame = self.current_frame - self.frame_offset;
        let max = self.palette_len - 1;
        Some(frame.clamp(0, max as i32) as usize)
    }
}

/// Mesh model component
#[derive(Debug, Clone)]
pub struct Model {
    /// Mesh geometry handle
    pub mesh: MeshHandle,
    /// Surface material
    pub material: Material,
    /// Whether the mesh carries bone weights (selects skinned shaders)
    pub skinned: bool,
    /// Animation state when the model is animated
    pub animation: Option<AnimationState>,
}

impl Model {
    /// Create a static model with a default material
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            material: Material::default(),
            skinned: false,
            animation: None,
        }
    }
}

/// Terrain component
#[derive(Debug, Clone)]
pub struct Terrain {
    /// Terrain mesh handle
    pub mesh: MeshHandle,
    /// Optional diffuse texture; flat color otherwise
    pub base_texture: Option<TextureHandle>,
}

/// Screen-space sprite component, optionally a horizontal frame strip
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Sprite texture; a sprite without one is skipped at draw time
    pub texture: Option<TextureHandle>,
    /// Total frames in the strip (1 for a plain sprite)
    pub total_frames: u32,
    /// Current frame supplied by the external animation player
    pub current_frame: u32,
}

impl Sprite {
    /// Create a single-frame sprite
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture: Some(texture),
            total_frames: 1,
            current_frame: 0,
        }
    }

    /// Horizontal UV window `[u0, u1]` of the current strip frame.
    ///
    /// The frame index is clamped into the strip rather than wrapping.
    pub fn uv_window(&self) -> [f32; 2] {
        let frames = self.total_frames.max(1);
        let frame = self.current_frame.min(frames - 1);
        let width = 1.0 / frames as f32;
        let u0 = frame as f32 * width;
        [u0, u0 + width]
    }
}

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Infinitely distant light along the node's forward direction
    Directional,
    /// Positional light with a falloff range
    Point,
}

/// Light component
#[derive(Debug, Clone)]
pub struct Light {
    /// Directional or point
    pub kind: LightKind,
    /// RGB light color
    pub color: [f32; 3],
    /// Falloff range for point lights
    pub range: f32,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            color: [1.0, 1.0, 1.0],
            range: 10.0,
            intensity: 1.0,
        }
    }
}

/// Camera projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Perspective frustum
    Perspective,
    /// Orthographic box
    Orthographic,
}

/// Sky dome drawn centered on the camera before everything else
#[derive(Debug, Clone, Copy)]
pub struct SkyDome {
    /// Dome mesh handle
    pub mesh: MeshHandle,
    /// Dome texture
    pub texture: TextureHandle,
}

/// Camera component
#[derive(Debug, Clone)]
pub struct Camera {
    /// Projection kind
    pub projection: ProjectionKind,
    /// Far range of the viewing volume
    pub range: f32,
    /// Optional sky dome
    pub sky: Option<SkyDome>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            range: 100.0,
            sky: None,
        }
    }
}

/// A node in the scene hierarchy.
///
/// Transform fields are private: all mutation goes through
/// [`crate::scene::Scene`], which owns dirty-flag propagation for the
/// cached world matrices. The world is Z-up; a fresh node faces +Y.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) active: bool,

    pub(crate) position: Vec3,
    pub(crate) forward: Vec3,
    pub(crate) up: Vec3,
    pub(crate) scale: Vec3,

    pub(crate) world: Mat4,
    pub(crate) world_dirty: bool,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    /// Render-classification variant
    pub kind: NodeKind,
    /// Optional collider component
    pub collider: Option<Collider>,
}

impl Node {
    /// Create a plain group node
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    /// Create a node with the given render variant
    pub fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            active: true,
            position: Vec3::zeros(),
            forward: Vec3::y(),
            up: Vec3::z(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            world: Mat4::identity(),
            world_dirty: true,
            parent: None,
            children: Vec::new(),
            kind,
            collider: None,
        }
    }

    /// Builder: attach a collider
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Builder: set the local position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder: set the local scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the node (and therefore its whole subtree) participates in
    /// update and draw
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or deactivate the node. An inactive node short-circuits
    /// its entire subtree during classification.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local forward direction (facing)
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Local up direction
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Parent node key, if attached
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Child node keys in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Local transform matrix: translation x basis rotation x scale.
    ///
    /// The rotation maps local +X to right, +Y to forward, +Z to up.
    pub(crate) fn local_matrix(&self) -> Mat4 {
        let (right, forward, up) = orthonormal_basis(self.forward, self.up);

        let rotation = Mat4::new(
            right.x, forward.x, up.x, 0.0,
            right.y, forward.y, up.y, 0.0,
            right.z, forward.z, up.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        Mat4::new_translation(&self.position) * rotation * Mat4::new_nonuniform_scaling(&self.scale)
    }
}
