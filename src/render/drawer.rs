// Depth-buffered triangle drawer

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::scene::{Object, ObjectId};

use super::buffer::FrameBuffers;
use super::color;
use super::sky;
use super::tracker::PixelTracker;

const AMBIENT: f32 = 0.35;
const NORMAL_COLOR: u32 = 0xFFFF_E14D;
/// Normal lines are this fraction of the object's largest scale axis.
const NORMAL_LENGTH: f32 = 0.3;
/// Pulls normal lines just in front of the face they start on.
const LINE_DEPTH_BIAS: f32 = 1e-5;

/// A projected vertex: pixel position and depth in [0, 1].
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
}

/// Depth-buffered triangle rasterizer that owns the frame buffers and the pick tracker.
#[derive(Debug)]
pub struct Drawer {
    buffers: FrameBuffers,
    pub pixel_tracker: PixelTracker,
    /// Unit vector pointing towards the light.
    light_dir: Vec3,
}

impl Drawer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            buffers: FrameBuffers::new(width, height)?,
            pixel_tracker: PixelTracker::new(),
            light_dir: Vec3::new(0.4, 1.0, -0.6).normalize(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.buffers.resize(width, height)
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn reset_depth_buffer(&mut self) {
        self.buffers.reset_depth();
    }

    /// Writes every color pixel, so it doubles as the per-frame color clear.
    pub fn draw_sky(&mut self, camera: &Camera) {
        sky::draw_sky(&mut self.buffers, camera);
    }

    /// Rasterizes `object`'s mesh. Objects without geometry draw nothing.
    pub fn draw_object(&mut self, id: ObjectId, object: &Object, camera: &Camera) {
        let Some(mesh) = object.mesh.as_deref().filter(|mesh| !mesh.is_empty()) else {
            return;
        };

        self.pixel_tracker.begin_object(id);
        self.draw_faces(object, mesh, camera);
        self.pixel_tracker.end_object();
    }

    /// Like [`Drawer::draw_object`], plus a line along each normal.
    pub fn draw_object_with_normals(&mut self, id: ObjectId, object: &Object, camera: &Camera) {
        let Some(mesh) = object.mesh.as_deref().filter(|mesh| !mesh.is_empty()) else {
            return;
        };

        self.pixel_tracker.begin_object(id);
        self.draw_faces(object, mesh, camera);
        self.draw_normals(object, mesh, camera);
        self.pixel_tracker.end_object();
    }

    fn draw_faces(&mut self, object: &Object, mesh: &Mesh, camera: &Camera) {
        let model = object.transform.matrix();
        let view_proj = camera.view_projection(self.buffers.aspect());
        let opacity = object.opacity.clamp(0.0, 1.0);

        for i in 0..mesh.faces.len() {
            let Some(corners) = mesh.face(i) else {
                continue;
            };
            let world = corners.map(|v| model.transform_point3(v));

            let mut normal = (world[1] - world[0])
                .cross(world[2] - world[0])
                .normalize_or_zero();
            if normal.dot(camera.position - world[0]) < 0.0 {
                normal = -normal;
            }
            let intensity = AMBIENT + (1.0 - AMBIENT) * normal.dot(self.light_dir).max(0.0);
            let shaded = color::shade(object.color, intensity);

            let clip = world.map(|p| view_proj * p.extend(1.0));
            if outside_frustum(&clip) {
                continue;
            }

            let polygon = clip_near(&clip);
            if polygon.len() < 3 {
                continue;
            }

            let screen: Vec<ScreenVertex> =
                polygon.iter().map(|c| self.to_screen(*c)).collect();
            for k in 1..screen.len() - 1 {
                self.fill_triangle([screen[0], screen[k], screen[k + 1]], shaded, opacity);
            }
        }
    }

    fn draw_normals(&mut self, object: &Object, mesh: &Mesh, camera: &Camera) {
        let model = object.transform.matrix();
        let view_proj = camera.view_projection(self.buffers.aspect());
        let length = NORMAL_LENGTH * object.transform.scale.abs().max_element();

        let mut segments = Vec::new();
        let normal_matrix = Mat3::from_mat4(model);
        let vertex_normals = mesh
            .normals
            .as_ref()
            .filter(|_| normal_matrix.determinant().abs() > f32::EPSILON);

        if let Some(normals) = vertex_normals {
            let normal_matrix = normal_matrix.inverse().transpose();
            for (v, n) in mesh.vertices.iter().zip(normals) {
                let start = model.transform_point3(*v);
                let dir = (normal_matrix * *n).normalize_or_zero();
                segments.push((start, start + dir * length));
            }
        } else {
            for corners in (0..mesh.faces.len()).filter_map(|i| mesh.face(i)) {
                let world = corners.map(|v| model.transform_point3(v));
                let centroid = (world[0] + world[1] + world[2]) / 3.0;
                let dir = (world[1] - world[0])
                    .cross(world[2] - world[0])
                    .normalize_or_zero();
                segments.push((centroid, centroid + dir * length));
            }
        }

        for (start, end) in segments {
            self.draw_line(&view_proj, start, end, NORMAL_COLOR);
        }
    }

    fn to_screen(&self, clip: Vec4) -> ScreenVertex {
        let ndc = clip.truncate() / clip.w;
        ScreenVertex {
            pos: Vec2::new(
                (ndc.x * 0.5 + 0.5) * self.buffers.width() as f32,
                (0.5 - ndc.y * 0.5) * self.buffers.height() as f32,
            ),
            depth: ndc.z,
        }
    }

    /// Single depth-tested pixel write, reported to the tracker when it lands.
    fn plot(&mut self, x: u32, y: u32, depth: f32, src: u32, opacity: f32) {
        if self
            .buffers
            .test_and_set(x, y, depth, |dst| color::blend(src, dst, opacity))
        {
            self.pixel_tracker.record_write(x, y);
        }
    }

    /// Edge-function fill sampled at pixel centers.
    fn fill_triangle(&mut self, tri: [ScreenVertex; 3], src: u32, opacity: f32) {
        let [a, b, c] = tri;
        let mut area = edge(a.pos, b.pos, c.pos);
        if area.abs() < f32::EPSILON {
            return;
        }
        let sign = area.signum();
        area *= sign;

        let width = self.buffers.width() as f32;
        let height = self.buffers.height() as f32;
        let min = a.pos.min(b.pos).min(c.pos).max(Vec2::ZERO).floor();
        let max = a.pos.max(b.pos).max(c.pos).min(Vec2::new(width - 1.0, height - 1.0)).ceil();
        if min.x > max.x || min.y > max.y {
            return;
        }

        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.pos, c.pos, p) * sign;
                let w1 = edge(c.pos, a.pos, p) * sign;
                let w2 = edge(a.pos, b.pos, p) * sign;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = (w0 * a.depth + w1 * b.depth + w2 * c.depth) / area;
                self.plot(x, y, depth, src, opacity);
            }
        }
    }

    fn draw_line(&mut self, view_proj: &Mat4, start: Vec3, end: Vec3, src: u32) {
        let mut a = *view_proj * start.extend(1.0);
        let mut b = *view_proj * end.extend(1.0);

        // near plane: z >= 0
        if a.z < 0.0 && b.z < 0.0 {
            return;
        }
        if a.z < 0.0 {
            a = a.lerp(b, a.z / (a.z - b.z));
        } else if b.z < 0.0 {
            b = b.lerp(a, b.z / (b.z - a.z));
        }

        let a = self.to_screen(a);
        let b = self.to_screen(b);
        let bounds = Vec2::new(self.buffers.width() as f32, self.buffers.height() as f32);
        let Some((t0, t1)) = clip_segment(a.pos, b.pos, bounds) else {
            return;
        };

        let p0 = a.pos.lerp(b.pos, t0);
        let p1 = a.pos.lerp(b.pos, t1);
        let steps = (p1 - p0).abs().max_element().ceil().max(1.0) as u32;

        for i in 0..=steps {
            let s = i as f32 / steps as f32;
            let t = t0 + (t1 - t0) * s;
            let p = a.pos.lerp(b.pos, t);
            if p.x < 0.0 || p.y < 0.0 || p.x >= bounds.x || p.y >= bounds.y {
                continue;
            }
            let depth = a.depth + (b.depth - a.depth) * t - LINE_DEPTH_BIAS;
            self.plot(p.x as u32, p.y as u32, depth, src, 1.0);
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// True when every vertex lies outside the same frustum plane.
fn outside_frustum(clip: &[Vec4; 3]) -> bool {
    let all = |f: fn(&Vec4) -> bool| clip.iter().all(f);
    all(|c| c.x > c.w)
        || all(|c| c.x < -c.w)
        || all(|c| c.y > c.w)
        || all(|c| c.y < -c.w)
        || all(|c| c.z > c.w)
        || all(|c| c.z < 0.0)
}

/// Clips a triangle against the near plane (z >= 0), returning a convex polygon.
fn clip_near(tri: &[Vec4; 3]) -> Vec<Vec4> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let cur = tri[i];
        let next = tri[(i + 1) % 3];
        let cur_in = cur.z >= 0.0;
        let next_in = next.z >= 0.0;

        if cur_in {
            out.push(cur);
        }
        if cur_in != next_in {
            out.push(cur.lerp(next, cur.z / (cur.z - next.z)));
        }
    }
    out
}

/// Liang-Barsky clip of `a -> b` to `[0, bounds)`, as a parameter range.
fn clip_segment(a: Vec2, b: Vec2, bounds: Vec2) -> Option<(f32, f32)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    let checks = [
        (-d.x, a.x),
        (d.x, bounds.x - a.x),
        (-d.y, a.y),
        (d.y, bounds.y - a.y),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{cube_template, sphere_template, Mesh};
    use crate::render::FAR_DEPTH;

    const SIZE: u32 = 64;
    const CENTER: u32 = SIZE / 2;

    fn quad_mesh() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn quad(z: f32, color: u32) -> Object {
        Object::new()
            .with_mesh(quad_mesh())
            .scale_by(Vec3::splat(4.0))
            .move_by(Vec3::new(0.0, 0.0, z))
            .with_color(color)
    }

    fn fresh(camera: &Camera) -> Drawer {
        let mut drawer = Drawer::new(SIZE, SIZE).unwrap();
        drawer.reset_depth_buffer();
        drawer.draw_sky(camera);
        drawer
    }

    #[test]
    fn nearer_face_wins_in_either_order() {
        let camera = Camera::new();
        let near = quad(10.0, 0xFFFF_0000);
        let far = quad(20.0, 0xFF00_00FF);

        let mut expected = fresh(&camera);
        expected.draw_object(ObjectId(1), &near, &camera);
        let near_color = expected.buffers().color_at(CENTER, CENTER);
        let near_depth = expected.buffers().depth_at(CENTER, CENTER);

        let mut near_first = fresh(&camera);
        near_first.draw_object(ObjectId(1), &near, &camera);
        near_first.draw_object(ObjectId(2), &far, &camera);

        let mut far_first = fresh(&camera);
        far_first.draw_object(ObjectId(2), &far, &camera);
        far_first.draw_object(ObjectId(1), &near, &camera);

        for drawer in [&near_first, &far_first] {
            assert_eq!(drawer.buffers().color_at(CENTER, CENTER), near_color);
            assert_eq!(drawer.buffers().depth_at(CENTER, CENTER), near_depth);
        }
        assert!(near_depth.unwrap() < 1.0);
    }

    #[test]
    fn missing_or_empty_mesh_draws_nothing() {
        let camera = Camera::new();
        let mut drawer = fresh(&camera);
        let before = drawer.buffers().color().to_vec();

        drawer.pixel_tracker.arm(CENTER, CENTER);
        drawer.draw_object(ObjectId(1), &Object::new(), &camera);
        drawer.draw_object(ObjectId(2), &Object::new().with_mesh(Mesh::default()), &camera);
        drawer.draw_object_with_normals(ObjectId(3), &Object::new(), &camera);

        assert_eq!(drawer.buffers().color(), &before[..]);
        assert!(drawer.buffers().depth().iter().all(|d| *d == FAR_DEPTH));
        assert_eq!(drawer.pixel_tracker.found_object(), None);
    }

    #[test]
    fn geometry_behind_the_camera_is_discarded() {
        let camera = Camera::new();
        let mut drawer = fresh(&camera);
        drawer.draw_object(ObjectId(1), &quad(-10.0, 0xFFFF_FFFF), &camera);
        assert!(drawer.buffers().depth().iter().all(|d| *d == FAR_DEPTH));
    }

    #[test]
    fn geometry_off_screen_is_discarded() {
        let camera = Camera::new();
        let mut drawer = fresh(&camera);
        let object = quad(10.0, 0xFFFF_FFFF).move_by(Vec3::new(500.0, 0.0, 0.0));
        drawer.draw_object(ObjectId(1), &object, &camera);
        assert!(drawer.buffers().depth().iter().all(|d| *d == FAR_DEPTH));
    }

    #[test]
    fn face_crossing_the_near_plane_is_clipped() {
        let camera = Camera::new();
        let mut drawer = fresh(&camera);
        // floor quad under the camera reaching from behind to in front of it
        let floor = Object::new()
            .with_mesh(quad_mesh())
            .scale_by(Vec3::splat(40.0))
            .rotate_by(Vec3::new(90.0, 0.0, 0.0))
            .move_by(Vec3::new(0.0, -2.0, 0.0));
        drawer.draw_object(ObjectId(1), &floor, &camera);

        let depth = drawer.buffers().depth();
        assert!(depth.iter().any(|d| *d < FAR_DEPTH));
        assert!(depth.iter().all(|d| *d == FAR_DEPTH || (0.0..=1.0).contains(d)));
        // the floor is below the horizon only
        assert_eq!(drawer.buffers().depth_at(CENTER, 0), Some(FAR_DEPTH));
        assert!(drawer.buffers().depth_at(CENTER, SIZE - 1).unwrap() < FAR_DEPTH);
    }

    #[test]
    fn tracker_reports_the_visible_object() {
        let camera = Camera::new();
        let near = quad(10.0, 0xFFFF_0000);
        let far = quad(20.0, 0xFF00_00FF);

        for order in [[1, 2], [2, 1]] {
            let mut drawer = fresh(&camera);
            drawer.pixel_tracker.arm(CENTER, CENTER);
            for id in order {
                let object = if id == 1 { &near } else { &far };
                drawer.draw_object(ObjectId(id), object, &camera);
                assert_eq!(drawer.pixel_tracker.current_object(), None);
            }
            assert_eq!(drawer.pixel_tracker.take_found(), Some(ObjectId(1)));
        }
    }

    #[test]
    fn coplanar_tie_keeps_first_drawn() {
        let camera = Camera::new();
        let red = (ObjectId(1), quad(10.0, 0xFFFF_0000));
        let blue = (ObjectId(2), quad(10.0, 0xFF00_00FF));

        for order in [[&red, &blue], [&blue, &red]] {
            let (first, first_object) = order[0];
            let mut alone = fresh(&camera);
            alone.draw_object(*first, first_object, &camera);

            let mut drawer = fresh(&camera);
            drawer.pixel_tracker.arm(CENTER, CENTER);
            for (id, object) in order {
                drawer.draw_object(*id, object, &camera);
            }

            assert_eq!(
                drawer.buffers().color_at(CENTER, CENTER),
                alone.buffers().color_at(CENTER, CENTER)
            );
            assert_eq!(drawer.pixel_tracker.take_found(), Some(*first));
        }
    }

    #[test]
    fn tracker_misses_on_empty_sky() {
        let camera = Camera::new();
        let mut drawer = fresh(&camera);
        drawer.pixel_tracker.arm(0, 0);
        drawer.draw_object(ObjectId(1), &quad(10.0, 0xFFFF_0000), &camera);
        assert_eq!(drawer.pixel_tracker.found_object(), None);
    }

    #[test]
    fn half_opacity_blends_with_the_background() {
        let camera = Camera::new();
        let mut opaque = fresh(&camera);
        opaque.draw_object(ObjectId(1), &quad(10.0, 0xFFFF_0000), &camera);

        let mut faded = fresh(&camera);
        let background = faded.buffers().color_at(CENTER, CENTER);
        let mut object = quad(10.0, 0xFFFF_0000);
        object.opacity = 0.5;
        faded.draw_object(ObjectId(1), &object, &camera);

        let faded_color = faded.buffers().color_at(CENTER, CENTER);
        assert_ne!(faded_color, opaque.buffers().color_at(CENTER, CENTER));
        assert_ne!(faded_color, background);
    }

    #[test]
    fn normals_mode_draws_and_attributes_lines() {
        let camera = Camera::new();
        let sphere = Object::new()
            .with_mesh(sphere_template())
            .scale_by(Vec3::splat(6.0))
            .move_by(Vec3::new(0.0, 0.0, 20.0));
        let cube = Object::new()
            .with_mesh(cube_template())
            .scale_by(Vec3::splat(6.0))
            .move_by(Vec3::new(0.0, 0.0, 20.0));

        for object in [sphere, cube] {
            let mut plain = fresh(&camera);
            plain.draw_object(ObjectId(1), &object, &camera);

            let mut normals = fresh(&camera);
            normals.pixel_tracker.arm(CENTER, CENTER);
            normals.draw_object_with_normals(ObjectId(1), &object, &camera);

            let lines = normals
                .buffers()
                .color()
                .iter()
                .filter(|c| **c == NORMAL_COLOR)
                .count();
            assert!(lines > 0);
            assert_ne!(plain.buffers().color(), normals.buffers().color());
            assert_eq!(normals.pixel_tracker.take_found(), Some(ObjectId(1)));
        }
    }

    #[test]
    fn segment_clipping() {
        let bounds = Vec2::new(10.0, 10.0);
        assert_eq!(
            clip_segment(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), bounds),
            Some((0.0, 1.0))
        );
        assert_eq!(
            clip_segment(Vec2::new(-5.0, 20.0), Vec2::new(-1.0, 30.0), bounds),
            None
        );
        let (t0, t1) = clip_segment(Vec2::new(-10.0, 5.0), Vec2::new(20.0, 5.0), bounds).unwrap();
        assert!((t0 - 1.0 / 3.0).abs() < 1e-6);
        assert!((t1 - 2.0 / 3.0).abs() < 1e-6);
    }
}
