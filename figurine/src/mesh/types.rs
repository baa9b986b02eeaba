//! Indexed triangle mesh used by the model generator.

use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh.
///
/// Positions and faces are stored separately, with faces referencing
/// positions by index. Faces use counter-clockwise winding when viewed
/// from outside, so normals point outward by the right-hand rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Triangle faces as indices into the position array.
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create a new empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Translate the mesh by the given offset.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    /// Merge another mesh into this one.
    ///
    /// The other mesh's positions and faces are appended, with face indices
    /// shifted by the current vertex count. Indices are u32, so meshes past
    /// ~4 billion vertices are unsupported.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let vertex_offset = self.positions.len() as u32;

        self.positions.extend(other.positions.iter().copied());

        for face in &other.faces {
            self.faces.push([
                face[0] + vertex_offset,
                face[1] + vertex_offset,
                face[2] + vertex_offset,
            ]);
        }
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Uses the divergence theorem: the signed volume is the sum of signed
    /// tetrahedra volumes formed by each face and the origin. A closed mesh
    /// with outward-facing normals yields a positive value; near-zero means
    /// the mesh is not closed or has inconsistent winding.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.positions[i0 as usize];
            let v1 = &self.positions[i1 as usize];
            let v2 = &self.positions[i2 as usize];

            // Signed volume of tetrahedron with origin = (v0 . (v1 x v2)) / 6
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Absolute volume of the mesh.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }
}
