//! The scene: node arena, hierarchy operations, layers, and the per-frame
//! update pass
//!
//! Nodes live in a keyed arena and reference each other through
//! [`NodeKey`]s, which keeps the hierarchy a tree of plain data with no
//! shared mutable state. All transform mutation funnels through the scene
//! so cached world matrices can be invalidated for the whole affected
//! subtree.

use slotmap::SlotMap;

use crate::collision::{bounds, Collider, CurveCollider};
use crate::error::SceneError;
use crate::foundation::math::{
    constants::GEOMETRY_EPSILON, Mat4, Mat4Ext, Point3, Unit, Vec2, Vec3,
};
use crate::scene::layer::{Layer, LAYER_CHUNK};
use crate::scene::node::{Light, Node, NodeKey, NodeKind};

/// A retained scene: the node arena, registered layers, and the active
/// camera/light state
pub struct Scene {
    nodes: SlotMap<NodeKey, Node>,
    layers: Vec<Layer>,
    main_camera: Option<NodeKey>,
    default_light: Light,
    camera_moved: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with a default directional light
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            layers: Vec::with_capacity(LAYER_CHUNK),
            main_camera: None,
            default_light: Light::default(),
            camera_moved: false,
        }
    }

    // ------------------------------------------------------------------
    // Node lifecycle

    /// Insert a detached node into the scene, returning its key
    pub fn spawn(&mut self, node: Node) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Shared access to a node
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Exclusive access to a node (kind, collider, name, active flag).
    ///
    /// Transform fields are deliberately not reachable here; use the
    /// scene-level mutators so dirty flags stay correct.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Remove a node and its whole subtree from the scene.
    ///
    /// The subtree is detached from its parent, scrubbed from every layer,
    /// and dropped from curve-collider attachment lists.
    pub fn despawn(&mut self, key: NodeKey) -> Result<(), SceneError> {
        if !self.nodes.contains_key(key) {
            return Err(SceneError::NodeNotFound);
        }
        let _ = self.detach(key);

        let mut doomed = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            doomed.push(k);
            if let Some(node) = self.nodes.get(k) {
                stack.extend(node.children.iter().copied());
            }
        }

        for layer in &mut self.layers {
            for k in &doomed {
                layer.remove(*k);
            }
        }
        for (_, node) in &mut self.nodes {
            if let Some(Collider::Curve(curve)) = &mut node.collider {
                for k in &doomed {
                    curve.detach(*k);
                }
            }
        }
        for k in doomed {
            self.nodes.remove(k);
            if self.main_camera == Some(k) {
                self.main_camera = None;
            }
        }
        Ok(())
    }

    /// Produce a detached deep copy of a node and its subtree.
    ///
    /// The clone shares no mutable state with the original: fresh keys,
    /// copied transforms and components, and curve attachment lists
    /// dropped (they reference nodes outside the copied subtree).
    pub fn instantiate(&mut self, key: NodeKey) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(key) {
            return Err(SceneError::NodeNotFound);
        }
        Ok(self.clone_subtree(key, None))
    }

    fn clone_subtree(&mut self, key: NodeKey, parent: Option<NodeKey>) -> NodeKey {
        let mut copy = self.nodes[key].clone();
        let original_children = std::mem::take(&mut copy.children);
        copy.parent = parent;
        copy.world_dirty = true;
        if let Some(Collider::Curve(curve)) = &mut copy.collider {
            curve.clear_attachments();
        }

        let new_key = self.nodes.insert(copy);
        for child in original_children {
            let child_copy = self.clone_subtree(child, Some(new_key));
            self.nodes[new_key].children.push(child_copy);
        }
        new_key
    }

    // ------------------------------------------------------------------
    // Hierarchy

    /// Attach `child` under `parent`.
    ///
    /// Fails without touching the tree when either key is stale, the child
    /// already has a parent, or the attachment would create a cycle.
    pub fn set_parent(&mut self, child: NodeKey, parent: NodeKey) -> Result<(), SceneError> {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound);
        }
        if child == parent {
            return Err(SceneError::CycleDetected);
        }
        if self.nodes[child].parent.is_some() {
            return Err(SceneError::AlreadyParented);
        }

        // Walk up from the prospective parent; finding the child there
        // would make it its own ancestor
        let mut cursor = Some(parent);
        while let Some(k) = cursor {
            if k == child {
                return Err(SceneError::CycleDetected);
            }
            cursor = self.nodes[k].parent;
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.mark_subtree_dirty(child);
        Ok(())
    }

    /// Detach a node from its parent, leaving it a root
    pub fn detach(&mut self, child: NodeKey) -> Result<(), SceneError> {
        let parent = self
            .nodes
            .get(child)
            .ok_or(SceneError::NodeNotFound)?
            .parent;
        let Some(parent) = parent else {
            return Ok(());
        };

        self.nodes[parent].children.retain(|k| *k != child);
        self.nodes[child].parent = None;
        self.mark_subtree_dirty(child);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transform

    /// Set a node's local position
    pub fn set_position(&mut self, key: NodeKey, position: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        node.position = position;
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Translate a node's local position by a delta
    pub fn translate(&mut self, key: NodeKey, delta: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        node.position += delta;
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Point a node's forward direction; zero-length input is ignored
    pub fn set_forward(&mut self, key: NodeKey, forward: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        if forward.norm_squared() <= GEOMETRY_EPSILON {
            log::warn!("set_forward ignored zero-length direction for `{}`", node.name);
            return Ok(());
        }
        node.forward = forward.normalize();
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Set a node's up reference direction; zero-length input is ignored
    pub fn set_up(&mut self, key: NodeKey, up: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        if up.norm_squared() <= GEOMETRY_EPSILON {
            log::warn!("set_up ignored zero-length direction for `{}`", node.name);
            return Ok(());
        }
        node.up = up.normalize();
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Set a node's local scale
    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        node.scale = scale;
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Turn a node to face a target point (both in the parent's space).
    /// The up reference is kept; a target on top of the node is ignored.
    pub fn look_at(&mut self, key: NodeKey, target: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        let toward = target - node.position;
        if toward.norm_squared() <= GEOMETRY_EPSILON {
            log::warn!("look_at ignored: target coincides with `{}`", node.name);
            return Ok(());
        }
        node.forward = toward.normalize();
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// Rotate a node's forward/up basis around an axis (radians)
    pub fn rotate(&mut self, key: NodeKey, axis: Vec3, angle: f32) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        if axis.norm_squared() <= GEOMETRY_EPSILON {
            log::warn!("rotate ignored zero-length axis for `{}`", node.name);
            return Ok(());
        }
        let rotation = nalgebra::Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
        node.forward = rotation * node.forward;
        node.up = rotation * node.up;
        self.mark_subtree_dirty(key);
        Ok(())
    }

    /// World matrix of a node: parent chain composed with the local
    /// transform, memoized until a local transform or ancestor changes.
    pub fn world_matrix(&mut self, key: NodeKey) -> Mat4 {
        let Some(node) = self.nodes.get(key) else {
            log::debug!("world_matrix queried with a stale node key");
            return Mat4::identity();
        };
        let (dirty, parent) = (node.world_dirty, node.parent);
        if dirty {
            let parent_world = parent.map_or_else(Mat4::identity, |p| self.world_matrix(p));
            let node = &mut self.nodes[key];
            node.world = parent_world * node.local_matrix();
            node.world_dirty = false;
        }
        self.nodes[key].world
    }

    fn mark_subtree_dirty(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if self.main_camera == Some(k) {
                self.camera_moved = true;
            }
            if let Some(node) = self.nodes.get_mut(k) {
                node.world_dirty = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // ------------------------------------------------------------------
    // Camera & light

    /// Register the active camera. Fails if the node is not a camera.
    pub fn set_main_camera(&mut self, key: NodeKey) -> Result<(), SceneError> {
        match self.nodes.get(key) {
            Some(node) if matches!(node.kind, NodeKind::Camera(_)) => {
                self.main_camera = Some(key);
                self.camera_moved = true;
                Ok(())
            }
            Some(_) => Err(SceneError::NotACamera),
            None => Err(SceneError::NodeNotFound),
        }
    }

    /// The active camera node, if one is registered
    pub fn main_camera(&self) -> Option<NodeKey> {
        self.main_camera
    }

    /// Light used when a frame classifies no light nodes
    pub fn default_light(&self) -> &Light {
        &self.default_light
    }

    /// Replace the fallback light
    pub fn set_default_light(&mut self, light: Light) {
        self.default_light = light;
    }

    /// Whether the active camera's transform changed since this was last
    /// polled (consumed by the draw pass to dirty the view matrix)
    pub(crate) fn take_camera_moved(&mut self) -> bool {
        std::mem::take(&mut self.camera_moved)
    }

    // ------------------------------------------------------------------
    // Layers

    /// Register a layer. Returns `false` when a layer with the same name
    /// is already registered.
    pub fn add_layer(&mut self, layer: Layer) -> bool {
        if self.contains_layer(layer.name()) {
            return false;
        }
        if self.layers.len() == self.layers.capacity() {
            self.layers.reserve_exact(LAYER_CHUNK);
        }
        self.layers.push(layer);
        true
    }

    /// Remove a layer by name, compacting and preserving the order of the
    /// remaining layers
    pub fn remove_layer(&mut self, name: &str) -> bool {
        match self.layers.iter().position(|l| l.name() == name) {
            Some(index) => {
                self.layers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Layer at a registration position
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Exclusive access to a layer by position
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Layer lookup by name
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// Exclusive layer lookup by name
    pub fn layer_by_name_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name() == name)
    }

    /// Number of registered layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether a layer with this name is registered
    pub fn contains_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name() == name)
    }

    pub(crate) fn layers(&self) -> &[Layer] {
        &self.layers
    }

    // ------------------------------------------------------------------
    // Collider plumbing

    /// Register a sphere-collider node against a curve collider for
    /// per-update corridor resolution. The curve only references the
    /// sphere; it takes no ownership.
    pub fn attach_to_curve(&mut self, sphere: NodeKey, curve: NodeKey) -> Result<(), SceneError> {
        match self.nodes.get(sphere) {
            Some(node) if matches!(node.collider, Some(Collider::Sphere(_))) => {}
            Some(_) => return Err(SceneError::NotASphereCollider),
            None => return Err(SceneError::NodeNotFound),
        }
        match self.nodes.get_mut(curve) {
            Some(node) => match &mut node.collider {
                Some(Collider::Curve(c)) => {
                    if c.attach(sphere) {
                        Ok(())
                    } else {
                        Err(SceneError::DuplicateMember)
                    }
                }
                _ => Err(SceneError::NotACurveCollider),
            },
            None => Err(SceneError::NodeNotFound),
        }
    }

    /// Unregister a sphere from a curve collider. Returns whether it was
    /// attached.
    pub fn detach_from_curve(
        &mut self,
        sphere: NodeKey,
        curve: NodeKey,
    ) -> Result<bool, SceneError> {
        match self.nodes.get_mut(curve) {
            Some(node) => match &mut node.collider {
                Some(Collider::Curve(c)) => Ok(c.detach(sphere)),
                _ => Err(SceneError::NotACurveCollider),
            },
            None => Err(SceneError::NodeNotFound),
        }
    }

    /// World-space center and radius of a sphere-collider node
    pub fn sphere_world_geometry(&mut self, key: NodeKey) -> Result<(Vec3, f32), SceneError> {
        let radius = match self.nodes.get(key).ok_or(SceneError::NodeNotFound)?.collider {
            Some(Collider::Sphere(s)) => s.radius.abs(),
            _ => return Err(SceneError::NotASphereCollider),
        };
        let world = self.world_matrix(key);
        Ok((world.translation_part(), radius))
    }

    /// World-space corners of a plane-collider node's quad
    pub fn plane_world_corners(&mut self, key: NodeKey) -> Result<[Vec3; 4], SceneError> {
        let local = match &self.nodes.get(key).ok_or(SceneError::NodeNotFound)?.collider {
            Some(Collider::Plane(p)) => p.local_corners(),
            _ => return Err(SceneError::NotAPlaneCollider),
        };
        let world = self.world_matrix(key);
        Ok(local.map(|c| world.transform_point(&Point3::from(c)).coords))
    }

    /// World-space corners of one wall segment of a curve-collider node
    pub fn curve_segment_world_corners(
        &mut self,
        key: NodeKey,
        index: usize,
    ) -> Result<[Vec3; 4], SceneError> {
        let local = match &self.nodes.get(key).ok_or(SceneError::NodeNotFound)?.collider {
            Some(Collider::Curve(c)) if index < c.segment_count() => {
                c.local_segment_corners(index)
            }
            Some(Collider::Curve(_)) => return Err(SceneError::SegmentOutOfRange),
            _ => return Err(SceneError::NotACurveCollider),
        };
        let world = self.world_matrix(key);
        Ok(local.map(|c| world.transform_point(&Point3::from(c)).coords))
    }

    // ------------------------------------------------------------------
    // Frame update

    /// Advance the scene one frame: walk the active layers and resolve
    /// every curve collider against its attached spheres.
    ///
    /// Gameplay mutates transforms between frames through the scene API;
    /// this pass applies the geometric corrections (wall sliding) so the
    /// subsequent draw sees settled orientations.
    pub fn update(&mut self) {
        let roots: Vec<NodeKey> = self
            .layers
            .iter()
            .filter(|l| l.is_active())
            .flat_map(|l| l.iter().copied())
            .collect();

        let mut curves = Vec::new();
        for root in roots {
            self.collect_active_curves(root, &mut curves);
        }
        for curve in curves {
            self.resolve_curve(curve);
        }
    }

    fn collect_active_curves(&self, key: NodeKey, out: &mut Vec<NodeKey>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if !node.active {
            return;
        }
        if matches!(node.collider, Some(Collider::Curve(_))) {
            out.push(key);
        }
        for child in &node.children {
            self.collect_active_curves(*child, out);
        }
    }

    /// Test one corridor against all attached spheres and steer actors
    /// that are pushing into a wall onto the wall tangent.
    fn resolve_curve(&mut self, curve_key: NodeKey) {
        let curve: CurveCollider = match &self.nodes.get(curve_key).and_then(|n| n.collider.as_ref())
        {
            Some(Collider::Curve(c)) => (*c).clone(),
            _ => return,
        };
        let segments = curve.segment_count();
        if segments == 0 {
            return;
        }
        let curve_world = self.world_matrix(curve_key);
        // The corner polyline lives in the corridor's local frame; sphere
        // centers must be brought into it before the 2D nearest-corner scan
        let Some(world_to_curve) = curve_world.try_inverse() else {
            log::warn!("corridor world matrix is singular, skipping resolution");
            return;
        };

        for sphere_key in curve.attached().to_vec() {
            let radius = match self.nodes.get(sphere_key).map(|n| &n.collider) {
                Some(Some(Collider::Sphere(s))) => s.radius.abs(),
                Some(_) => {
                    log::warn!("curve attachment without a sphere collider, skipping");
                    continue;
                }
                None => continue,
            };
            let center = self.world_matrix(sphere_key).translation_part();
            let local_center = world_to_curve.transform_point(&Point3::from(center)).coords;

            let Some(candidate) =
                curve.closest_segment_index(Vec2::new(local_center.x, local_center.y))
            else {
                continue;
            };
            // Candidate plus its two cyclic neighbors, wrapping at the ends
            let previous = if candidate == 0 { segments - 1 } else { candidate - 1 };
            let next = if candidate + 1 == segments { 0 } else { candidate + 1 };

            for index in [candidate, previous, next] {
                let quad = curve
                    .local_segment_corners(index)
                    .map(|c| curve_world.transform_point(&Point3::from(c)).coords);

                if !bounds::plane_sphere(&quad, center, radius) {
                    continue;
                }

                self.slide_along_wall(sphere_key, &quad);
                // One resolution per sphere per update
                break;
            }
        }
    }

    /// Redirect the actor's forward onto the wall tangent when it is
    /// moving into the wall rather than away from it.
    fn slide_along_wall(&mut self, sphere_key: NodeKey, quad: &[Vec3; 4]) {
        let v1 = quad[2] - quad[0];
        let v2 = quad[3] - quad[0];
        let normal = v1.cross(&v2);
        if normal.norm_squared() <= GEOMETRY_EPSILON {
            return;
        }
        let normal = normal.normalize();
        let back = -normal;

        let up = Vec3::z();
        let left = up.cross(&normal);
        let right = normal.cross(&up);
        if left.norm_squared() <= GEOMETRY_EPSILON || right.norm_squared() <= GEOMETRY_EPSILON {
            // Horizontal wall; no lateral tangent to slide along
            return;
        }
        let left = left.normalize();
        let right = right.normalize();

        // The moving actor is the sphere's parent when it has one
        let actor = self.nodes[sphere_key].parent.unwrap_or(sphere_key);
        let forward = self.nodes[actor].forward;

        let d_left = left.dot(&forward);
        let d_right = right.dot(&forward);
        let d_forward = normal.dot(&forward);
        let d_back = back.dot(&forward);

        if d_back > d_forward {
            if d_left >= d_right && d_left < 1.0 {
                log::debug!("wall slide: steering `{}` left", self.nodes[actor].name);
                let _ = self.set_forward(actor, left);
            } else if d_right < 1.0 {
                log::debug!("wall slide: steering `{}` right", self.nodes[actor].name);
                let _ = self.set_forward(actor, right);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Collider;
    use crate::scene::node::Camera;
    use approx::assert_relative_eq;

    fn scene_with_layer() -> Scene {
        let mut scene = Scene::new();
        scene.add_layer(Layer::new("world"));
        scene
    }

    #[test]
    fn world_matrix_composes_parent_chain() {
        let mut scene = Scene::new();
        let parent = scene.spawn(Node::new("parent").with_position(Vec3::new(1.0, 0.0, 0.0)));
        let child = scene.spawn(Node::new("child").with_position(Vec3::new(0.0, 2.0, 0.0)));
        scene.set_parent(child, parent).unwrap();

        let world = scene.world_matrix(child);
        assert_relative_eq!(
            world.translation_part(),
            Vec3::new(1.0, 2.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn ancestor_change_dirties_descendants() {
        let mut scene = Scene::new();
        let parent = scene.spawn(Node::new("parent"));
        let child = scene.spawn(Node::new("child").with_position(Vec3::new(0.0, 1.0, 0.0)));
        scene.set_parent(child, parent).unwrap();

        // Prime the caches, then move the parent
        let _ = scene.world_matrix(child);
        scene.set_position(parent, Vec3::new(5.0, 0.0, 0.0)).unwrap();

        let world = scene.world_matrix(child);
        assert_relative_eq!(
            world.translation_part(),
            Vec3::new(5.0, 1.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn reparenting_into_cycle_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node::new("a"));
        let b = scene.spawn(Node::new("b"));
        let c = scene.spawn(Node::new("c"));
        scene.set_parent(b, a).unwrap();
        scene.set_parent(c, b).unwrap();

        assert_eq!(scene.set_parent(a, c), Err(SceneError::CycleDetected));
        assert_eq!(scene.set_parent(a, a), Err(SceneError::CycleDetected));
        // Tree untouched
        assert_eq!(scene.node(a).unwrap().parent(), None);
    }

    #[test]
    fn double_parenting_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.spawn(Node::new("a"));
        let b = scene.spawn(Node::new("b"));
        let child = scene.spawn(Node::new("child"));
        scene.set_parent(child, a).unwrap();

        assert_eq!(scene.set_parent(child, b), Err(SceneError::AlreadyParented));
    }

    #[test]
    fn instantiate_shares_no_state_with_original() {
        let mut scene = Scene::new();
        let original = scene.spawn(
            Node::new("actor")
                .with_position(Vec3::new(1.0, 1.0, 0.0))
                .with_collider(Collider::sphere(2.0)),
        );
        let child = scene.spawn(Node::new("gear"));
        scene.set_parent(child, original).unwrap();

        let copy = scene.instantiate(original).unwrap();
        assert_ne!(copy, original);
        assert_eq!(scene.node(copy).unwrap().parent(), None);
        assert_eq!(scene.node(copy).unwrap().children().len(), 1);

        // Mutating the copy leaves the original alone
        scene.set_position(copy, Vec3::new(9.0, 9.0, 9.0)).unwrap();
        assert_relative_eq!(
            scene.node(original).unwrap().position(),
            Vec3::new(1.0, 1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn instantiate_drops_curve_attachments() {
        let mut scene = Scene::new();
        let sphere = scene.spawn(Node::new("probe").with_collider(Collider::sphere(1.0)));
        let curve = scene.spawn(Node::new("corridor").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));
        scene.attach_to_curve(sphere, curve).unwrap();

        let copy = scene.instantiate(curve).unwrap();
        match &scene.node(copy).unwrap().collider {
            Some(Collider::Curve(c)) => assert!(c.attached().is_empty()),
            other => panic!("expected curve collider, found {other:?}"),
        }
    }

    #[test]
    fn duplicate_curve_attachment_is_rejected() {
        let mut scene = Scene::new();
        let sphere = scene.spawn(Node::new("probe").with_collider(Collider::sphere(1.0)));
        let curve = scene.spawn(Node::new("corridor").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));

        assert!(scene.attach_to_curve(sphere, curve).is_ok());
        assert_eq!(
            scene.attach_to_curve(sphere, curve),
            Err(SceneError::DuplicateMember)
        );
        assert!(scene.detach_from_curve(sphere, curve).unwrap());
        assert!(!scene.detach_from_curve(sphere, curve).unwrap());
    }

    #[test]
    fn collinear_corridor_still_reports_overlap() {
        // Three collinear 2D corners; the sphere sits on the shared corner
        let mut scene = scene_with_layer();
        let curve = scene.spawn(Node::new("fence").with_collider(Collider::curve(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(20.0, 0.0),
            ],
            5.0,
        )));
        let sphere = scene.spawn(
            Node::new("probe")
                .with_position(Vec3::new(10.0, 0.0, 0.0))
                .with_collider(Collider::sphere(2.0)),
        );

        let (center, radius) = scene.sphere_world_geometry(sphere).unwrap();
        let index = match &scene.node(curve).unwrap().collider {
            Some(Collider::Curve(c)) => c
                .closest_segment_index(Vec2::new(center.x, center.y))
                .unwrap(),
            _ => unreachable!(),
        };
        assert!(index <= 1);

        let quad = scene.curve_segment_world_corners(curve, index).unwrap();
        assert!(bounds::plane_sphere(&quad, center, radius));
    }

    #[test]
    fn wall_slide_redirects_actor_along_tangent() {
        let mut scene = scene_with_layer();
        let curve = scene.spawn(Node::new("wall").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));
        let actor = scene.spawn(Node::new("walker").with_position(Vec3::new(5.0, -0.5, 1.0)));
        let sphere = scene.spawn(Node::new("hull").with_collider(Collider::sphere(1.0)));
        scene.set_parent(sphere, actor).unwrap();
        scene.attach_to_curve(sphere, curve).unwrap();
        // Walking straight into the wall from the -Y side
        scene.set_forward(actor, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        scene.layer_by_name_mut("world").unwrap().add(curve);
        scene.layer_by_name_mut("world").unwrap().add(actor);

        scene.update();

        let forward = scene.node(actor).unwrap().forward();
        // Steered onto the wall tangent (ties prefer left = +X here)
        assert_relative_eq!(forward, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn transformed_corridor_steers_like_identity_corridor() {
        // Same world wall (x = 0, running along +Y) built two ways: corners
        // laid out along world Y directly, and corners along local X on a
        // corridor node rotated to face -X. Long enough that a wrong-frame
        // corner scan would test only far-away segments.
        let along_y: Vec<Vec2> = (0..=5).map(|i| Vec2::new(0.0, i as f32 * 10.0)).collect();
        let along_x: Vec<Vec2> = (0..=5).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();

        let mut steered = Vec::new();
        for (corners, rotate) in [(along_y, false), (along_x, true)] {
            let mut scene = scene_with_layer();
            let curve = scene.spawn(Node::new("wall").with_collider(Collider::curve(corners, 4.0)));
            if rotate {
                // Basis maps local +X onto world +Y
                scene.set_forward(curve, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
            }
            let actor = scene.spawn(Node::new("walker").with_position(Vec3::new(0.5, 25.0, 1.0)));
            let sphere = scene.spawn(Node::new("hull").with_collider(Collider::sphere(1.0)));
            scene.set_parent(sphere, actor).unwrap();
            scene.attach_to_curve(sphere, curve).unwrap();
            scene.set_forward(actor, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
            scene.layer_by_name_mut("world").unwrap().add(curve);

            scene.update();
            steered.push(scene.node(actor).unwrap().forward());
        }

        assert_relative_eq!(steered[0], Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(steered[1], steered[0], epsilon = 1e-4);
    }

    #[test]
    fn actor_moving_away_from_wall_keeps_heading() {
        let mut scene = scene_with_layer();
        let curve = scene.spawn(Node::new("wall").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));
        let actor = scene.spawn(Node::new("walker").with_position(Vec3::new(5.0, -0.5, 1.0)));
        let sphere = scene.spawn(Node::new("hull").with_collider(Collider::sphere(1.0)));
        scene.set_parent(sphere, actor).unwrap();
        scene.attach_to_curve(sphere, curve).unwrap();
        // Retreating from the wall; overlap alone must not steer
        scene.set_forward(actor, Vec3::new(0.0, -1.0, 0.0)).unwrap();

        scene.layer_by_name_mut("world").unwrap().add(curve);

        scene.update();

        let forward = scene.node(actor).unwrap().forward();
        assert_relative_eq!(forward, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn inactive_curve_is_skipped_by_update() {
        let mut scene = scene_with_layer();
        let curve = scene.spawn(Node::new("wall").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));
        let actor = scene.spawn(Node::new("walker").with_position(Vec3::new(5.0, -0.5, 1.0)));
        let sphere = scene.spawn(Node::new("hull").with_collider(Collider::sphere(1.0)));
        scene.set_parent(sphere, actor).unwrap();
        scene.attach_to_curve(sphere, curve).unwrap();
        scene.set_forward(actor, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        scene.layer_by_name_mut("world").unwrap().add(curve);
        scene.node_mut(curve).unwrap().set_active(false);

        scene.update();

        let forward = scene.node(actor).unwrap().forward();
        assert_relative_eq!(forward, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn despawn_scrubs_layers_and_attachments() {
        let mut scene = scene_with_layer();
        let curve = scene.spawn(Node::new("wall").with_collider(Collider::curve(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            5.0,
        )));
        let sphere = scene.spawn(Node::new("probe").with_collider(Collider::sphere(1.0)));
        scene.attach_to_curve(sphere, curve).unwrap();
        scene.layer_by_name_mut("world").unwrap().add(sphere);

        scene.despawn(sphere).unwrap();

        assert!(scene.node(sphere).is_none());
        assert!(!scene.layer_by_name("world").unwrap().contains(sphere));
        match &scene.node(curve).unwrap().collider {
            Some(Collider::Curve(c)) => assert!(c.attached().is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut scene = Scene::new();
        let node = scene.spawn(Node::new("eye").with_position(Vec3::new(0.0, 0.0, 2.0)));

        scene.look_at(node, Vec3::new(0.0, 10.0, 2.0)).unwrap();
        assert_relative_eq!(
            scene.node(node).unwrap().forward(),
            Vec3::new(0.0, 1.0, 0.0),
            epsilon = 1e-5
        );

        // Degenerate target leaves the heading alone
        scene.look_at(node, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert_relative_eq!(
            scene.node(node).unwrap().forward(),
            Vec3::new(0.0, 1.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn main_camera_requires_camera_kind() {
        let mut scene = Scene::new();
        let plain = scene.spawn(Node::new("not a camera"));
        assert!(scene.set_main_camera(plain).is_err());

        let camera = scene.spawn(Node::with_kind("eye", NodeKind::Camera(Camera::default())));
        assert!(scene.set_main_camera(camera).is_ok());
        assert_eq!(scene.main_camera(), Some(camera));
    }
}
