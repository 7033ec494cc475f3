// Mesh templates for Kiwi3D

use std::f32::consts::PI;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use glam::Vec3;

/// Triangle mesh in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    /// Vertex indices, three per face.
    pub faces: Vec<[u32; 3]>,
    /// Optional per-vertex normals, parallel to `vertices`.
    pub normals: Option<Vec<Vec3>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() || self.vertices.is_empty()
    }

    /// Corner positions of face `i`, or `None` if it indexes past the vertex list.
    pub fn face(&self, i: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = *self.faces.get(i)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Axis-aligned unit cube centered at the origin.
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];

        #[rustfmt::skip]
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // front (-z)
            [4, 5, 6], [4, 6, 7], // back (+z)
            [0, 4, 7], [0, 7, 3], // left
            [1, 2, 6], [1, 6, 5], // right
            [3, 7, 6], [3, 6, 2], // top
            [0, 1, 5], [0, 5, 4], // bottom
        ];

        Self::new(vertices, faces)
    }

    /// UV sphere of diameter 1 centered at the origin, with per-vertex normals.
    ///
    /// # Panics
    ///
    /// Panics if `segments` < 3 or `rings` < 2.
    pub fn uv_sphere(segments: u32, rings: u32) -> Self {
        assert!(segments > 2 && rings > 1);

        let mut vertices = Vec::new();
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32 * PI;
            for seg in 0..segments {
                let u = seg as f32 / segments as f32 * PI * 2.0;
                vertices.push(Vec3::new(u.cos() * v.sin(), v.cos(), u.sin() * v.sin()) * 0.5);
            }
        }

        let mut faces = Vec::new();
        for ring in 0..rings {
            for seg in 0..segments {
                let next = (seg + 1) % segments;
                let i0 = ring * segments + seg;
                let i1 = (ring + 1) * segments + seg;
                let i2 = (ring + 1) * segments + next;
                let i3 = ring * segments + next;

                // pole rings collapse to a single triangle per segment
                if ring != 0 {
                    faces.push([i0, i3, i2]);
                }
                if ring != rings - 1 {
                    faces.push([i0, i2, i1]);
                }
            }
        }

        let normals = vertices.iter().map(|v| v.normalize_or_zero()).collect();
        Self::new(vertices, faces).with_normals(normals)
    }
}

/// Process-wide cube template, built on first use.
pub fn cube_template() -> Arc<Mesh> {
    static CUBE: OnceLock<Arc<Mesh>> = OnceLock::new();
    CUBE.get_or_init(|| Arc::new(Mesh::cube())).clone()
}

/// Process-wide sphere template, built on first use.
pub fn sphere_template() -> Arc<Mesh> {
    static SPHERE: OnceLock<Arc<Mesh>> = OnceLock::new();
    SPHERE.get_or_init(|| Arc::new(Mesh::uv_sphere(24, 16))).clone()
}

/// The mesh an object draws: a shared template or its own copy.
///
/// A shared template is never written through: [`MeshRef::to_mut`] copies it
/// as soon as another holder still points at it.
#[derive(Debug, Clone)]
pub enum MeshRef {
    Shared(Arc<Mesh>),
    Owned(Mesh),
}

impl MeshRef {
    pub fn shared(mesh: Arc<Mesh>) -> Self {
        Self::Shared(mesh)
    }

    /// Deep copy of a template.
    pub fn copied(mesh: &Mesh) -> Self {
        Self::Owned(mesh.clone())
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }

    /// Mutable access. A template still referenced elsewhere is copied first.
    pub fn to_mut(&mut self) -> &mut Mesh {
        match self {
            Self::Shared(mesh) => Arc::make_mut(mesh),
            Self::Owned(mesh) => mesh,
        }
    }
}

impl Deref for MeshRef {
    type Target = Mesh;

    fn deref(&self) -> &Mesh {
        match self {
            Self::Shared(mesh) => mesh,
            Self::Owned(mesh) => mesh,
        }
    }
}

impl From<Mesh> for MeshRef {
    fn from(mesh: Mesh) -> Self {
        Self::Owned(mesh)
    }
}

impl From<Arc<Mesh>> for MeshRef {
    fn from(mesh: Arc<Mesh>) -> Self {
        Self::Shared(mesh)
    }
}
