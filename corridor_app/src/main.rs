//! Corridor demo application
//!
//! Drives the engine headlessly: an actor walks down an L-shaped corridor,
//! the collision pass steers it along the walls, and every frame's draw
//! sequence is logged instead of being handed to a GPU.

use scene_engine::prelude::*;

const FRAMES: u32 = 120;
const STEP: f32 = 0.25;

pub struct CorridorApp {
    scene: Scene,
    context: RenderContext,
    actor: NodeKey,
}

impl CorridorApp {
    pub fn new(config: &EngineConfig) -> Result<Self, SceneError> {
        log::info!("Creating corridor demo scene...");
        let mut scene = Scene::new();
        scene.add_layer(Layer::new("world"));
        scene.add_layer(Layer::new("overlay"));

        // Camera looking down the corridor from behind the start
        let camera = scene.spawn(Node::with_kind(
            "camera",
            NodeKind::Camera(Camera {
                projection: config.camera.projection,
                range: config.camera.range,
                sky: None,
            }),
        ));
        scene.set_position(camera, Vec3::new(5.0, -20.0, 4.0))?;
        scene.look_at(camera, Vec3::new(10.0, 10.0, 1.0))?;
        scene.set_main_camera(camera)?;

        // L-shaped corridor wall: east along X, then north along Y
        let corridor = scene.spawn(Node::new("corridor").with_collider(Collider::curve(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(20.0, 0.0),
                Vec2::new(20.0, 20.0),
            ],
            4.0,
        )));

        // The walking actor: a group carrying its collision hull as a child
        let actor = scene.spawn(
            Node::with_kind("walker", NodeKind::Model(Model::new(MeshHandle(0))))
                .with_position(Vec3::new(2.0, -3.0, 1.0)),
        );
        let hull = scene.spawn(Node::new("walker_hull").with_collider(Collider::sphere(1.0)));
        scene.set_parent(hull, actor)?;
        scene.attach_to_curve(hull, corridor)?;
        // Start out walking straight at the south wall
        scene.set_forward(actor, Vec3::new(0.0, 1.0, 0.0))?;

        let ground = scene.spawn(Node::with_kind(
            "ground",
            NodeKind::Terrain(Terrain {
                mesh: MeshHandle(1),
                base_texture: None,
            }),
        ));

        if let Some(world) = scene.layer_by_name_mut("world") {
            world.add(camera);
            world.add(corridor);
            world.add(actor);
            world.add(ground);
        }

        let context = RenderContext::new(config.surface.width, config.surface.height);
        Ok(Self {
            scene,
            context,
            actor,
        })
    }

    /// Step the simulation one frame: walk, resolve collisions, draw
    pub fn frame(&mut self, index: u32) -> Result<FrameDraw, SceneError> {
        let heading = self
            .scene
            .node(self.actor)
            .ok_or(SceneError::NodeNotFound)?
            .forward();
        self.scene.translate(self.actor, heading * STEP)?;

        self.scene.update();
        let frame = self.context.draw(&mut self.scene);

        let position = self
            .scene
            .node(self.actor)
            .ok_or(SceneError::NodeNotFound)?
            .position();
        log::info!(
            "frame {index:3}: walker at ({:6.2}, {:6.2}), heading ({:5.2}, {:5.2}), {} draw calls",
            position.x,
            position.y,
            heading.x,
            heading.y,
            frame.call_count()
        );
        Ok(frame)
    }
}

fn main() {
    scene_engine::foundation::logging::init();

    let config = EngineConfig::load_from_file("corridor_app/settings.toml").unwrap_or_else(|e| {
        log::warn!("no settings file loaded ({e}), using defaults");
        EngineConfig::default()
    });

    let mut app = match CorridorApp::new(&config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("failed to build demo scene: {e}");
            std::process::exit(1);
        }
    };

    for index in 0..FRAMES {
        if let Err(e) = app.frame(index) {
            log::error!("frame {index} failed: {e}");
            std::process::exit(1);
        }
    }
    log::info!("corridor demo finished after {FRAMES} frames");
}
