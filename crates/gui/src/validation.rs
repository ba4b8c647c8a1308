//! Integrity checks for loaded model meshes.
//!
//! Picking walks the index buffer directly, so a model is rejected before it
//! reaches the picking service if its buffers are malformed.

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    /// Check that the vertex buffer length is a multiple of 9 (the stride).
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % 9 == 0
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.mesh.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// No NaN or infinite components anywhere in the vertex buffer
    pub fn are_vertices_finite(&self) -> bool {
        self.mesh.vertices.iter().all(|v| v.is_finite())
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        self.mesh.vertices.chunks_exact(9).all(|v| {
            let len = (v[3] * v[3] + v[4] * v[4] + v[5] * v[5]).sqrt();
            (len - 1.0).abs() <= epsilon
        })
    }

    /// Triangles whose area is (nearly) zero; they can never be hit by a pick
    pub fn degenerate_triangle_count(&self) -> usize {
        (0..self.mesh.triangle_count())
            .filter(|&t| {
                let [a, b, c] = self.mesh.triangle(t);
                (b - a).cross(c - a).length_squared() < 1e-12
            })
            .count()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_mesh(self.mesh)
    }

    /// Compute the dimensions (width, height, depth) of the bounding box.
    pub fn dimensions(&self) -> [f32; 3] {
        let aabb = self.aabb();
        (aabb.max - aabb.min).to_array()
    }

    /// Run the blocking checks and return a list of error messages.
    /// An empty list means the mesh can be used for picking.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.mesh.indices.is_empty() {
            errors.push("Mesh has no triangles".to_string());
        }

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of 9",
                self.mesh.vertices.len()
            ));
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.mesh.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if !self.are_vertices_finite() {
            errors.push("Vertex buffer contains NaN or infinite values".to_string());
        }

        errors
    }
}
