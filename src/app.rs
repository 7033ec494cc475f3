// Application context and the per-frame update

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::input::{FrameInput, Key};
use crate::mesh::{cube_template, sphere_template, MeshRef};
use crate::picking::Selection;
use crate::render::Drawer;
use crate::scene::{Object, ObjectId, ObjectSet};

/// All state the frame loop touches. Passed explicitly; nothing is global.
#[derive(Debug)]
pub struct AppContext {
    pub camera: Camera,
    pub objects: ObjectSet,
    pub drawer: Drawer,
    pub selection: Selection,
    pub gravity_enabled: bool,
    pub draw_normals: bool,
    pub config: ViewerConfig,
}

impl AppContext {
    /// Empty scene with buffers sized from `config`.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let drawer = Drawer::new(config.width, config.height)?;
        let mut camera = Camera::new();
        camera.set_preset(0)?;

        Ok(Self {
            camera,
            objects: ObjectSet::new(),
            drawer,
            selection: Selection::new(),
            gravity_enabled: false,
            draw_normals: config.draw_normals,
            config,
        })
    }

    /// The demo scene: a floor with cubes and spheres in front of the camera.
    pub fn with_default_scene(config: ViewerConfig) -> Result<Self> {
        let mut app = Self::new(config)?;
        populate_default_scene(&mut app.objects);
        log::info!("scene ready with {} objects", app.objects.len());
        Ok(app)
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selection.get()
    }

    /// Reallocates the frame buffers for a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.drawer.resize(width, height)?;
        log::debug!("viewport resized to {}x{}", width, height);
        Ok(())
    }

    /// Input, physics, then a full draw pass.
    pub fn do_frame(&mut self, input: &FrameInput) {
        self.handle_input(input);
        self.objects.do_all_physics(input.dt_ms / 1000.0);
        self.render();
    }

    /// Clears the buffers and draws every object.
    pub fn render(&mut self) {
        self.drawer.reset_depth_buffer();
        self.drawer.draw_sky(&self.camera);

        if self.draw_normals {
            self.objects.draw_all_with_normals(&mut self.drawer, &self.camera);
        } else {
            self.objects.draw_all(&mut self.drawer, &self.camera);
        }
    }

    pub fn handle_input(&mut self, input: &FrameInput) {
        self.move_camera(input);

        if input.left_down {
            let sensitivity = self.config.mouse_sensitivity;
            self.camera.rotate(
                -input.mouse_delta.y * sensitivity,
                -input.mouse_delta.x * sensitivity,
                0.0,
            );
        }

        // Last frame's draw pass knows what was under the cursor; take it
        // before deciding whether to watch a pixel during this frame's pass.
        self.selection.consume_pick(
            &mut self.drawer.pixel_tracker,
            &mut self.objects,
            self.config.selected_opacity,
        );

        let pos = input.mouse_pos;
        if input.right_pressed && pos.x >= 0.0 && pos.y >= 0.0 {
            self.drawer.pixel_tracker.arm(pos.x as u32, pos.y as u32);
        } else {
            self.drawer.pixel_tracker.disarm();
        }

        if input.key_pressed(Key::Enter) {
            self.selection.deselect(&mut self.objects);
        }

        if input.key_pressed(Key::G) {
            self.toggle_gravity();
        }

        if input.key_pressed(Key::Z) {
            let v = self.config.impulse_velocity;
            self.objects.set_velocity_all(v.x, v.y, v.z);
        }

        if input.key_pressed(Key::N) {
            self.draw_normals = !self.draw_normals;
        }

        let presets = [(Key::Digit1, 0), (Key::Digit2, 1), (Key::Digit3, 2)];
        for (key, preset) in presets {
            if input.key_pressed(key) {
                if let Err(err) = self.camera.set_preset(preset) {
                    log::warn!("{}", err);
                }
            }
        }
    }

    pub fn toggle_gravity(&mut self) {
        self.gravity_enabled = !self.gravity_enabled;
        let gravity = if self.gravity_enabled {
            self.config.gravity
        } else {
            0.0
        };
        self.objects.set_gravity_all(gravity);
        log::info!("gravity set to {}", gravity);
    }

    fn move_camera(&mut self, input: &FrameInput) {
        let mut dist = self.camera.movement_speed * (input.dt_ms / 1000.0);
        if input.key_down(Key::Shift) {
            dist *= self.camera.sprint_factor;
        }

        if input.key_down(Key::Space) {
            self.camera.move_vertical(dist);
        }
        if input.key_down(Key::Control) {
            self.camera.move_vertical(-dist);
        }

        let mut planar = Vec2::ZERO;
        if input.key_down(Key::W) {
            planar.y += dist;
        }
        if input.key_down(Key::S) {
            planar.y -= dist;
        }
        if input.key_down(Key::A) {
            planar.x -= dist;
        }
        if input.key_down(Key::D) {
            planar.x += dist;
        }
        self.camera.move_planar(planar);
    }
}

fn populate_default_scene(objects: &mut ObjectSet) {
    let cube = cube_template();
    let sphere = sphere_template();

    // floor
    objects.push_back(
        Object::new()
            .with_mesh(MeshRef::copied(&cube))
            .scale_by(Vec3::new(150.0, 1.0, 150.0))
            .move_by(Vec3::new(0.0, -50.0, 50.0))
            .with_color(0xFF99_9999),
    );
    // central cube
    objects.push_back(
        Object::new()
            .with_mesh(cube.clone())
            .scale_by(Vec3::splat(25.0))
            .move_by(Vec3::new(0.0, 0.0, 50.0))
            .with_color(0xFF2A_4D69),
    );
    objects.push_back(
        Object::new()
            .with_mesh(MeshRef::copied(&cube))
            .scale_by(Vec3::new(80.0, 4.0, 4.0))
            .move_by(Vec3::new(0.0, 5.0, 101.0))
            .with_color(0xFF55_5B6E),
    );
    objects.push_back(
        Object::new()
            .with_mesh(MeshRef::copied(&cube))
            .scale_by(Vec3::new(10.0, 5.0, 15.0))
            .move_by(Vec3::new(40.0, 0.0, 60.0))
            .rotate_by(Vec3::new(40.0, 20.0, 60.0))
            .with_color(0xFFF7_B733),
    );
    objects.push_back(
        Object::new()
            .with_mesh(sphere.clone())
            .scale_by(Vec3::splat(20.0))
            .move_by(Vec3::new(0.0, 10.0, 50.0))
            .with_color(0xFF70_C1B3),
    );
    objects.push_back(
        Object::new()
            .with_mesh(MeshRef::copied(&sphere))
            .scale_by(Vec3::splat(25.0))
            .move_by(Vec3::new(-10.0, 0.0, 95.0))
            .rotate_by(Vec3::new(45.0, 20.0, 50.0))
            .with_color(0xFFF0_E5D8),
    );
    objects.push_back(
        Object::new()
            .with_mesh(MeshRef::copied(&cube))
            .scale_by(Vec3::splat(10.0))
            .move_by(Vec3::new(-10.0, 15.0, 90.0))
            .rotate_by(Vec3::new(10.0, 0.0, 40.0))
            .with_color(0xFFF2_5F5C),
    );
}
