//! Model collaborator: loads meshes into the 9-float `MeshData` layout.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::validation::MeshValidator;
use crate::viewport::mesh::{compute_flat_normals, cube, ground_plane, push_vert, ramp, MeshData};

/// Fallback vertex color for files without materials
pub const DEFAULT_MODEL_COLOR: [f32; 3] = [0.67, 0.65, 0.61];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("model contains no triangles")]
    Empty,
    #[error("invalid mesh: {0}")]
    Invalid(String),
}

/// A model ready for rendering and picking
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub mesh: MeshData,
}

impl LoadedModel {
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Load a Wavefront OBJ file, merging all of its objects into one mesh
pub fn load_obj(path: &Path) -> Result<LoadedModel, ModelError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options)?;
    let materials = materials.unwrap_or_else(|e| {
        tracing::debug!("No materials for {:?}: {}", path, e);
        Vec::new()
    });

    let mut mesh = MeshData::default();
    let mut missing_normals = false;

    for model in &models {
        let m = &model.mesh;
        let color = m
            .material_id
            .and_then(|id| materials.get(id))
            .and_then(|mat| mat.diffuse)
            .unwrap_or(DEFAULT_MODEL_COLOR);
        let has_normals = m.normals.len() == m.positions.len();
        let has_colors = m.vertex_color.len() == m.positions.len();
        missing_normals |= !has_normals;

        let mut part = MeshData::default();
        for (i, p) in m.positions.chunks_exact(3).enumerate() {
            let n = if has_normals {
                Vec3::from_slice(&m.normals[i * 3..i * 3 + 3]).normalize_or_zero()
            } else {
                Vec3::ZERO
            };
            let c = if has_colors {
                [m.vertex_color[i * 3], m.vertex_color[i * 3 + 1], m.vertex_color[i * 3 + 2]]
            } else {
                color
            };
            push_vert(&mut part.vertices, p[0], p[1], p[2], n, c);
        }
        part.indices = m.indices.clone();
        mesh.append(&part);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    finish_model(name, mesh, missing_normals)
}

/// Validate a mesh and fill in normals; shared by all loaders
pub fn finish_model(name: String, mut mesh: MeshData, missing_normals: bool) -> Result<LoadedModel, ModelError> {
    if mesh.indices.is_empty() {
        return Err(ModelError::Empty);
    }
    let errors = MeshValidator::new(&mesh).validate_all();
    if !errors.is_empty() {
        return Err(ModelError::Invalid(errors.join("; ")));
    }
    if missing_normals {
        compute_flat_normals(&mut mesh);
    }
    let degenerate = MeshValidator::new(&mesh).degenerate_triangle_count();
    if degenerate > 0 {
        tracing::warn!("{}: {} degenerate triangle(s)", name, degenerate);
    }
    tracing::info!(
        "Loaded model {} ({} vertices, {} triangles)",
        name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(LoadedModel { name, mesh })
}

/// Built-in scene: a ground slab with a block and a ramp on it
pub fn demo_site() -> LoadedModel {
    let mut mesh = ground_plane(30.0, 0.0, [0.45, 0.5, 0.42]);
    mesh.append(&cube(4.0, 3.0, 4.0, [0.7, 0.62, 0.55]).translated(Vec3::new(-5.0, 1.5, -4.0)));
    mesh.append(&ramp(6.0, 2.0, 3.0, [0.6, 0.6, 0.65]).translated(Vec3::new(4.0, 0.0, 3.0)));
    LoadedModel {
        name: "demo-site".to_string(),
        mesh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::picking::{PickingService, Ray};

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("tapeline-obj-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const QUAD: &str = "o floor
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
f 1 4 3 2
";

    #[test]
    fn test_load_obj_quad_triangulated() {
        let path = write_temp("floor.obj", QUAD);
        let model = load_obj(&path).unwrap();
        assert_eq!(model.name, "floor.obj");
        assert_eq!(model.triangle_count(), 2);
        let service = PickingService::new(model.mesh);
        assert!(service.pick_surface(&Ray::down_at(0.5, 0.5)).is_some());
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let path = write_temp("floor.obj", QUAD);
        let model = load_obj(&path).unwrap();
        assert!(MeshValidator::new(&model.mesh).are_normals_normalized(1e-4));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_obj(Path::new("/nonexistent/nothing.obj")).unwrap_err();
        assert!(matches!(err, ModelError::Obj(_)));
    }

    #[test]
    fn test_obj_without_faces_is_empty() {
        let path = write_temp("points.obj", "v 0 0 0\nv 1 0 0\n");
        assert!(load_obj(&path).is_err());
    }

    #[test]
    fn test_demo_site_is_valid_and_pickable() {
        let site = demo_site();
        assert!(MeshValidator::new(&site.mesh).validate_all().is_empty());
        let service = PickingService::new(site.mesh);
        let top = service.pick_surface(&Ray::down_at(-5.0, -4.0)).unwrap();
        assert!((top.y - 3.0).abs() < 1e-3);
        let ground = service.pick_surface(&Ray::down_at(10.0, -10.0)).unwrap();
        assert!(ground.y.abs() < 1e-3);
    }
}
