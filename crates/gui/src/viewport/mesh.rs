use glam::Vec3;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `i`
    pub fn position(&self, i: usize) -> Vec3 {
        let base = i * 9;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i0 = self.indices[tri * 3] as usize;
        let i1 = self.indices[tri * 3 + 1] as usize;
        let i2 = self.indices[tri * 3 + 2] as usize;
        [self.position(i0), self.position(i1), self.position(i2)]
    }

    /// Append another mesh, re-basing its indices
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Move every vertex by `offset`
    pub fn translated(mut self, offset: Vec3) -> Self {
        for chunk in self.vertices.chunks_exact_mut(9) {
            chunk[0] += offset.x;
            chunk[1] += offset.y;
            chunk[2] += offset.z;
        }
        self
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Debug, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn push_segment(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        push_line_vert(&mut self.vertices, a.x, a.y, a.z, color);
        push_line_vert(&mut self.vertices, b.x, b.y, b.z, color);
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Translucent triangle list, same vertex layout as `LineMeshData`
#[derive(Clone, Debug, Default)]
pub struct FillMeshData {
    pub vertices: Vec<f32>,
}

impl FillMeshData {
    /// Triangulate a polygon as a fan around its first point
    pub fn push_fan(&mut self, outline: &[Vec3], color: [f32; 4]) {
        if outline.len() < 3 {
            return;
        }
        let first = outline[0];
        for pair in outline[1..].windows(2) {
            for p in [first, pair[0], pair[1]] {
                push_line_vert(&mut self.vertices, p.x, p.y, p.z, color);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

// ── Primitive generation ─────────────────────────────────────

pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * 9);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / 9) as u32;
        for v in quad {
            push_vert(&mut vertices, v.x, v.y, v.z, *normal, color);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Flat square in the XZ plane at height `y`, facing +Y
pub fn ground_plane(size: f32, y: f32, color: [f32; 3]) -> MeshData {
    let h = size * 0.5;
    let mut vertices = Vec::with_capacity(4 * 9);
    for (x, z) in [(-h, h), (h, h), (h, -h), (-h, -h)] {
        push_vert(&mut vertices, x, y, z, Vec3::Y, color);
    }
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Wedge rising along +X from height 0 to `h`, footprint `w` × `d` centred on the origin
pub fn ramp(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hd = d * 0.5;
    let a = Vec3::new(-hw, 0.0, hd);
    let b = Vec3::new(hw, 0.0, hd);
    let c = Vec3::new(hw, 0.0, -hd);
    let e = Vec3::new(-hw, 0.0, -hd);
    let bt = Vec3::new(hw, h, hd);
    let ct = Vec3::new(hw, h, -hd);

    let mut mesh = MeshData::default();
    let mut quad = |q: [Vec3; 4]| {
        let n = (q[1] - q[0]).cross(q[2] - q[0]).normalize_or_zero();
        let base = mesh.vertex_count() as u32;
        for v in q {
            push_vert(&mut mesh.vertices, v.x, v.y, v.z, n, color);
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    };
    // Slope, back wall, bottom
    quad([a, bt, ct, e]);
    quad([b, c, ct, bt]);
    quad([a, e, c, b]);

    let mut tri = |t: [Vec3; 3]| {
        let n = (t[1] - t[0]).cross(t[2] - t[0]).normalize_or_zero();
        let base = mesh.vertex_count() as u32;
        for v in t {
            push_vert(&mut mesh.vertices, v.x, v.y, v.z, n, color);
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    };
    tri([a, b, bt]);
    tri([e, ct, c]);

    mesh
}

pub fn sphere(radius: f32, rings: u32, sectors: u32, color: [f32; 3]) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for r in 0..=rings {
        let phi = std::f32::consts::PI * r as f32 / rings as f32;
        let sp = phi.sin();
        let cp = phi.cos();

        for s in 0..=sectors {
            let theta = std::f32::consts::TAU * s as f32 / sectors as f32;
            let st = theta.sin();
            let ct = theta.cos();

            let x = sp * ct;
            let y = cp;
            let z = sp * st;

            let n = Vec3::new(x, y, z);
            push_vert(&mut vertices, radius * x, radius * y, radius * z, n, color);
        }
    }

    for r in 0..rings {
        for s in 0..sectors {
            let i0 = r * (sectors + 1) + s;
            let i1 = i0 + 1;
            let i2 = i0 + sectors + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    MeshData { vertices, indices }
}

/// Replace per-vertex normals with the normal of the last triangle using each vertex.
/// Used for imported meshes that carry no normals.
pub fn compute_flat_normals(mesh: &mut MeshData) {
    for tri in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle(tri);
        let n = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        for k in 0..3 {
            let base = mesh.indices[tri * 3 + k] as usize * 9;
            mesh.vertices[base + 3] = n.x;
            mesh.vertices[base + 4] = n.y;
            mesh.vertices[base + 5] = n.z;
        }
    }
}

// ── Grid and axes ────────────────────────────────────────────

pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let grid_color = [0.25_f32, 0.25, 0.25, opacity];
    let origin_color_x = [0.5_f32, 0.2, 0.2, opacity * 0.7];
    let origin_color_z = [0.2_f32, 0.2, 0.5, opacity * 0.7];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let color = if i == 0 { origin_color_z } else { grid_color };
        // Line along Z
        push_line_vert(&mut vertices, f, 0.0, -extent, color);
        push_line_vert(&mut vertices, f, 0.0, extent, color);

        let color = if i == 0 { origin_color_x } else { grid_color };
        // Line along X
        push_line_vert(&mut vertices, -extent, 0.0, f, color);
        push_line_vert(&mut vertices, extent, 0.0, f, color);
    }

    LineMeshData { vertices }
}

pub fn axes(length: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let r = [0.9_f32, 0.2, 0.2, 1.0];
    let g = [0.2_f32, 0.8, 0.2, 1.0];
    let b = [0.2_f32, 0.3, 0.9, 1.0];

    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, r);
    push_line_vert(&mut vertices, length, 0.0, 0.0, r);
    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, g);
    push_line_vert(&mut vertices, 0.0, length, 0.0, g);
    push_line_vert(&mut vertices, 0.0, 0.0, 0.0, b);
    push_line_vert(&mut vertices, 0.0, 0.0, length, b);

    LineMeshData { vertices }
}

// ── Helpers ──────────────────────────────────────────────────

pub(crate) fn push_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[px, py, pz, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}
