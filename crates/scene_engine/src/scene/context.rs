//! Per-frame draw pass: matrix caching, classification, and draw-call
//! emission
//!
//! The context owns everything derived from the surface and the camera
//! (projection, view, the sprite overlay matrices) and rebuilds each piece
//! only when its inputs changed. The draw pass walks the active layers,
//! classifies nodes into render categories, and emits an ordered
//! [`FrameDraw`]: sky, then terrains, then models, then sprites.

use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3, Vec4};
use crate::scene::draw::{CullMode, DrawCall, FrameDraw, LightUniform, ShaderVariant};
use crate::scene::graph::Scene;
use crate::scene::node::{Camera, LightKind, NodeKey, NodeKind, ProjectionKind};

/// Distance ahead of the camera used as the look-at target
const LOOK_TARGET_DISTANCE: f32 = 10.0;

/// Sky dome scale relative to the camera range; keeps the dome inside the
/// far plane with a small margin
const SKY_RANGE_DIVISOR: f32 = 2.1;

/// Cached per-surface and per-camera draw state.
///
/// One context per render surface; it holds no scene data beyond the
/// transient per-frame classification lists.
pub struct RenderContext {
    aspect: f32,

    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    overlay_view_projection: Mat4,

    projection_dirty: bool,
    view_dirty: bool,

    projection_rebuilds: u32,
    view_rebuilds: u32,

    // Per-frame classification scratch, cleared before reuse
    terrains: Vec<NodeKey>,
    models: Vec<NodeKey>,
    sprites: Vec<NodeKey>,
    lights: Vec<NodeKey>,
}

impl RenderContext {
    /// Create a context for a surface of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            projection: Mat4::identity(),
            view: Mat4::identity(),
            view_projection: Mat4::identity(),
            overlay_view_projection: Mat4::identity(),
            projection_dirty: true,
            view_dirty: true,
            projection_rebuilds: 0,
            view_rebuilds: 0,
            terrains: Vec::new(),
            models: Vec::new(),
            sprites: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Surface aspect ratio currently in effect
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Times the projection matrix has been rebuilt
    pub fn projection_rebuilds(&self) -> u32 {
        self.projection_rebuilds
    }

    /// Times the view matrix has been rebuilt
    pub fn view_rebuilds(&self) -> u32 {
        self.view_rebuilds
    }

    /// Note a surface resize; the projection is rebuilt on the next draw
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
        self.projection_dirty = true;
        log::debug!("surface changed, aspect now {:.3}", self.aspect);
    }

    /// Force both cached matrices to rebuild on the next draw (e.g. after
    /// a surface context loss)
    pub fn reset(&mut self) {
        self.projection_dirty = true;
        self.view_dirty = true;
    }

    /// Produce the frame's draw sequence.
    ///
    /// Rebuilds the projection and view matrices only when dirty, then
    /// classifies the scene's active layers and emits draw calls in fixed
    /// category order. Without a main camera the frame is empty.
    pub fn draw(&mut self, scene: &mut Scene) -> FrameDraw {
        let Some(camera_key) = scene.main_camera() else {
            log::debug!("draw skipped: no main camera registered");
            return FrameDraw::default();
        };
        if scene.take_camera_moved() {
            self.view_dirty = true;
        }

        let camera = match &scene.node(camera_key).map(|n| &n.kind) {
            Some(NodeKind::Camera(camera)) => (*camera).clone(),
            _ => {
                log::warn!("main camera key no longer resolves to a camera node");
                return FrameDraw::default();
            }
        };

        let camera_world = scene.world_matrix(camera_key);
        let eye = camera_world.translation_part();
        let forward = normalized_or(camera_world.transform_vector(&Vec3::y()), Vec3::y());
        let up = normalized_or(camera_world.transform_vector(&Vec3::z()), Vec3::z());

        self.rebuild_projection_if_dirty(&camera);
        self.rebuild_view_if_dirty(eye, forward, up);
        self.view_projection = self.projection * self.view;

        self.classify(scene);

        let mut frame = FrameDraw::default();
        self.emit_lights(scene, &mut frame);
        self.emit_sky(&camera, eye, &mut frame);
        self.emit_terrains(scene, &mut frame);
        self.emit_models(scene, &mut frame);
        self.emit_sprites(scene, &mut frame);

        self.terrains.clear();
        self.models.clear();
        self.sprites.clear();
        self.lights.clear();

        frame
    }

    fn rebuild_projection_if_dirty(&mut self, camera: &Camera) {
        if !self.projection_dirty {
            return;
        }
        let (a, range) = (self.aspect, camera.range);
        self.projection = match camera.projection {
            ProjectionKind::Perspective => Mat4::frustum(-a, a, -1.0, 1.0, 1.0, range),
            ProjectionKind::Orthographic => Mat4::new_orthographic(-a, a, -1.0, 1.0, 1.0, range),
        };

        // Sprite overlay: unit screen square, y growing downward, viewed
        // head-on from +Z
        let overlay_projection = Mat4::new_orthographic(0.0, 1.0, 1.0, 0.0, 1.0, 10.0);
        let overlay_view = Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::origin(),
            &Vec3::y(),
        );
        self.overlay_view_projection = overlay_projection * overlay_view;

        self.projection_dirty = false;
        self.projection_rebuilds += 1;
    }

    fn rebuild_view_if_dirty(&mut self, eye: Vec3, forward: Vec3, up: Vec3) {
        if !self.view_dirty {
            return;
        }
        let target = eye + forward * LOOK_TARGET_DISTANCE;
        self.view = Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up);
        self.view_dirty = false;
        self.view_rebuilds += 1;
    }

    /// Walk the active layers and bucket drawable nodes by category.
    /// An inactive node cuts off its entire subtree.
    fn classify(&mut self, scene: &Scene) {
        self.terrains.clear();
        self.models.clear();
        self.sprites.clear();
        self.lights.clear();

        let mut stack: Vec<NodeKey> = Vec::new();
        for layer in scene.layers() {
            if !layer.is_active() {
                continue;
            }
            stack.extend(layer.iter().copied());
            while let Some(key) = stack.pop() {
                let Some(node) = scene.node(key) else {
                    log::debug!("layer member key is stale, skipping");
                    continue;
                };
                if !node.is_active() {
                    continue;
                }
                match &node.kind {
                    NodeKind::Group | NodeKind::Camera(_) => {}
                    NodeKind::Model(_) => self.models.push(key),
                    NodeKind::Terrain(_) => self.terrains.push(key),
                    NodeKind::Sprite(_) => self.sprites.push(key),
                    NodeKind::Light(_) => self.lights.push(key),
                }
                stack.extend(node.children().iter().copied());
            }
        }
    }

    fn emit_lights(&mut self, scene: &mut Scene, frame: &mut FrameDraw) {
        for key in self.lights.clone() {
            let Some(NodeKind::Light(light)) = scene.node(key).map(|n| n.kind.clone()) else {
                continue;
            };
            let world = scene.world_matrix(key);
            let position = match light.kind {
                LightKind::Directional => {
                    let dir = normalized_or(world.transform_vector(&Vec3::y()), Vec3::y());
                    Vec4::new(-dir.x, -dir.y, -dir.z, 0.0)
                }
                LightKind::Point => {
                    let p = world.translation_part();
                    Vec4::new(p.x, p.y, p.z, 1.0)
                }
            };
            frame.lights.push(LightUniform {
                position,
                color: light.color,
                range: light.range,
                intensity: light.intensity,
            });
        }

        if frame.lights.is_empty() {
            let fallback = scene.default_light().clone();
            // Fallback light shines straight down
            frame.lights.push(LightUniform {
                position: Vec4::new(0.0, 0.0, 1.0, 0.0),
                color: fallback.color,
                range: fallback.range,
                intensity: fallback.intensity,
            });
        }
    }

    fn emit_sky(&mut self, camera: &Camera, eye: Vec3, frame: &mut FrameDraw) {
        let Some(sky) = camera.sky else {
            return;
        };
        // The dome follows the camera on the ground plane and scales to
        // just inside the far plane
        let scale = camera.range / SKY_RANGE_DIVISOR;
        let world = Mat4::new_translation(&Vec3::new(eye.x, eye.y, 0.0)) * Mat4::new_scaling(scale);
        frame.calls.push(DrawCall {
            shader: ShaderVariant::Sky,
            mesh: Some(sky.mesh),
            texture: Some(sky.texture),
            color: [1.0, 1.0, 1.0],
            world,
            mvp: self.view_projection * world,
            cull: CullMode::Back,
            palette_frame: None,
            uv_window: None,
        });
    }

    fn emit_terrains(&mut self, scene: &mut Scene, frame: &mut FrameDraw) {
        for key in self.terrains.clone() {
            let Some(NodeKind::Terrain(terrain)) = scene.node(key).map(|n| n.kind.clone()) else {
                continue;
            };
            // Terrain ignores rotation and scale; only its world position
            // places the tile
            let world = Mat4::new_translation(&scene.world_matrix(key).translation_part());
            frame.calls.push(DrawCall {
                shader: ShaderVariant::Terrain,
                mesh: Some(terrain.mesh),
                texture: terrain.base_texture,
                color: [0.8, 0.8, 0.8],
                world,
                mvp: self.view_projection * world,
                cull: CullMode::Front,
                palette_frame: None,
                uv_window: None,
            });
        }
    }

    fn emit_models(&mut self, scene: &mut Scene, frame: &mut FrameDraw) {
        for key in self.models.clone() {
            let Some(NodeKind::Model(model)) = scene.node(key).map(|n| n.kind.clone()) else {
                continue;
            };
            let textured = model.material.base_texture.is_some();
            let shader = match (model.skinned, textured) {
                (false, false) => ShaderVariant::FlatColor,
                (false, true) => ShaderVariant::Textured,
                (true, false) => ShaderVariant::SkinnedFlatColor,
                (true, true) => ShaderVariant::SkinnedTextured,
            };
            let palette_frame = model
                .animation
                .as_ref()
                .and_then(super::node::AnimationState::palette_frame);

            let world = scene.world_matrix(key);
            frame.calls.push(DrawCall {
                shader,
                mesh: Some(model.mesh),
                texture: model.material.base_texture,
                color: model.material.base_color,
                world,
                mvp: self.view_projection * world,
                cull: CullMode::Back,
                palette_frame,
                uv_window: None,
            });
        }
    }

    fn emit_sprites(&mut self, scene: &mut Scene, frame: &mut FrameDraw) {
        for key in self.sprites.clone() {
            let Some(node) = scene.node(key) else {
                continue;
            };
            let NodeKind::Sprite(sprite) = node.kind.clone() else {
                continue;
            };
            let Some(texture) = sprite.texture else {
                log::debug!("sprite `{}` has no texture, skipping", node.name());
                continue;
            };
            // Sprites live in overlay space: position and scale are unit
            // screen coordinates, hierarchy and rotation do not apply
            let world = Mat4::new_translation(&node.position())
                * Mat4::new_nonuniform_scaling(&node.scale());
            frame.calls.push(DrawCall {
                shader: ShaderVariant::Sprite,
                mesh: None,
                texture: Some(texture),
                color: [1.0, 1.0, 1.0],
                world,
                mvp: self.overlay_view_projection * world,
                cull: CullMode::None,
                palette_frame: None,
                uv_window: Some(sprite.uv_window()),
            });
        }
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

fn normalized_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.norm_squared() > crate::foundation::math::constants::GEOMETRY_EPSILON {
        v.normalize()
    } else {
        fallback
    }
}
