// Scene objects and their physics

use std::fmt;

use glam::Vec3;

use crate::camera::Camera;
use crate::math::Transform;
use crate::mesh::MeshRef;
use crate::render::Drawer;

/// Scene-unique object identifier, handed out by [`ObjectSet::push_back`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A physics-driven, drawable object.
#[derive(Debug, Clone)]
pub struct Object {
    pub mesh: Option<MeshRef>,
    pub transform: Transform,
    /// Packed 0xAARRGGBB.
    pub color: u32,
    /// 1.0 unless the object is selected.
    pub opacity: f32,
    pub velocity: Vec3,
    /// Acceleration along y; negative pulls down.
    pub gravity: f32,
}

impl Object {
    pub fn new() -> Self {
        Self {
            mesh: None,
            transform: Transform::identity(),
            color: 0xFFFF_FFFF,
            opacity: 1.0,
            velocity: Vec3::ZERO,
            gravity: 0.0,
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<MeshRef>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Multiplies the scale per axis.
    pub fn scale_by(mut self, scale: Vec3) -> Self {
        self.transform.scale *= scale;
        self
    }

    pub fn move_by(mut self, offset: Vec3) -> Self {
        self.transform.position += offset;
        self
    }

    /// Adds per-axis rotation in degrees.
    pub fn rotate_by(mut self, degrees: Vec3) -> Self {
        self.transform.rotation += degrees;
        self
    }

    /// One forward Euler step: velocity first, then position.
    pub fn do_physics(&mut self, dt: f32) {
        self.velocity.y += self.gravity * dt;
        self.transform.position += self.velocity * dt;
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// The scene's objects, in draw order.
///
/// Draw order is insertion order. Nothing is sorted by depth; the depth
/// buffer alone resolves occlusion.
#[derive(Debug)]
pub struct ObjectSet {
    objects: Vec<(ObjectId, Object)>,
    next_id: u32,
}

impl ObjectSet {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends an object and returns its new id.
    pub fn push_back(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, object));
        log::debug!("added object {}", id);
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, object)| object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, object)| object)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut Object)> {
        self.objects.iter_mut().map(|(id, object)| (*id, object))
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|(id, _)| *id).collect()
    }

    pub fn set_gravity_all(&mut self, gravity: f32) {
        for (_, object) in &mut self.objects {
            object.gravity = gravity;
        }
    }

    pub fn set_velocity_all(&mut self, vx: f32, vy: f32, vz: f32) {
        let velocity = Vec3::new(vx, vy, vz);
        for (_, object) in &mut self.objects {
            object.velocity = velocity;
        }
    }

    /// Advances every object by `dt` seconds.
    pub fn do_all_physics(&mut self, dt: f32) {
        for (_, object) in &mut self.objects {
            object.do_physics(dt);
        }
    }

    pub fn draw_all(&self, drawer: &mut Drawer, camera: &Camera) {
        for (id, object) in &self.objects {
            drawer.draw_object(*id, object, camera);
        }
    }

    /// Shaded faces plus a normal vector per face (or per vertex when the mesh has normals).
    pub fn draw_all_with_normals(&self, drawer: &mut Drawer, camera: &Camera) {
        for (id, object) in &self.objects {
            drawer.draw_object_with_normals(*id, object, camera);
        }
    }
}

impl Default for ObjectSet {
    fn default() -> Self {
        Self::new()
    }
}
