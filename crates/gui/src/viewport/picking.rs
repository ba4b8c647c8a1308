use glam::Vec3;

use super::mesh::MeshData;

/// A ray in world space
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Straight-down ray from above `(x, z)`, used by headless callers
    pub fn down_at(x: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, 1000.0, z), Vec3::NEG_Y)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Compute AABB from MeshData (9 floats per vertex: pos+normal+color)
    pub fn from_mesh(data: &MeshData) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for i in 0..data.vertex_count() {
            let p = data.position(i);
            min = min.min(p);
            max = max.max(p);
        }

        Self { min, max }
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    // NaN from 0 * inf on a flat box face is dropped by min/max
    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Distance along the ray to the first intersection with a sphere, if any
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = -b - sq;
    let t1 = -b + sq;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// Result of picking a triangle in a mesh
#[derive(Clone, Debug)]
pub struct TriangleHit {
    /// Index of the triangle (into mesh.indices / 3)
    pub triangle_index: usize,
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Find the nearest triangle in a mesh intersected by the ray.
pub fn pick_triangle(ray: &Ray, mesh: &MeshData) -> Option<TriangleHit> {
    let mut best: Option<TriangleHit> = None;

    for tri_idx in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle(tri_idx);

        if let Some(dist) = ray_triangle_intersect(ray, v0, v1, v2) {
            if best.as_ref().is_none_or(|b| dist < b.distance) {
                best = Some(TriangleHit {
                    triangle_index: tri_idx,
                    distance: dist,
                    point: ray.at(dist),
                });
            }
        }
    }

    best
}

/// Pick the nearest sphere-shaped target intersected by the ray.
pub fn pick_nearest_sphere<K, I>(ray: &Ray, targets: I, radius: f32) -> Option<K>
where
    I: IntoIterator<Item = (K, Vec3)>,
{
    let mut best: Option<(K, f32)> = None;

    for (key, center) in targets {
        if let Some(dist) = ray_sphere(ray, center, radius) {
            if best.as_ref().is_none_or(|(_, d)| dist < *d) {
                best = Some((key, dist));
            }
        }
    }

    best.map(|(key, _)| key)
}

struct PickModel {
    mesh: MeshData,
    aabb: Aabb,
}

/// Converts rays into surface points on the loaded model.
///
/// Holds a read-only copy of the model geometry; "no hit" is a normal outcome.
#[derive(Default)]
pub struct PickingService {
    model: Option<PickModel>,
}

impl PickingService {
    pub fn new(mesh: MeshData) -> Self {
        let mut service = Self::default();
        service.set_model(mesh);
        service
    }

    /// Install the model that surface picks run against
    pub fn set_model(&mut self, mesh: MeshData) {
        let aabb = Aabb::from_mesh(&mesh);
        self.model = Some(PickModel { mesh, aabb });
    }

    pub fn clear_model(&mut self) {
        self.model = None;
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_bounds(&self) -> Option<Aabb> {
        self.model.as_ref().map(|m| m.aabb)
    }

    pub fn model_mesh(&self) -> Option<&MeshData> {
        self.model.as_ref().map(|m| &m.mesh)
    }

    /// Nearest surface point hit by the ray
    pub fn pick_surface(&self, ray: &Ray) -> Option<Vec3> {
        let model = self.model.as_ref()?;
        ray_aabb(ray, &model.aabb)?;
        pick_triangle(ray, &model.mesh).map(|hit| hit.point)
    }

    /// Nearest marker hit by the ray among `markers`
    pub fn pick_marker<K, I>(&self, ray: &Ray, markers: I, radius: f32) -> Option<K>
    where
        I: IntoIterator<Item = (K, Vec3)>,
    {
        pick_nearest_sphere(ray, markers, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh::{cube, ground_plane};

    #[test]
    fn test_triangle_hit_front() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::NEG_Z);
        let t = ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((t.unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let ray = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, -5.0), Vec3::NEG_Z);
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let hit = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((ray_aabb(&hit, &aabb).unwrap() - 4.0).abs() < 1e-5);
        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray_aabb(&miss, &aabb).is_none());
    }

    #[test]
    fn test_ray_sphere_front_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
        assert!(ray_sphere(&ray, Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_pick_surface_ground() {
        let service = PickingService::new(ground_plane(10.0, 0.0, [1.0; 3]));
        let p = service.pick_surface(&Ray::down_at(1.5, -2.0)).unwrap();
        assert!((p - Vec3::new(1.5, 0.0, -2.0)).length() < 1e-3);
    }

    #[test]
    fn test_pick_surface_empty_space_is_none() {
        let service = PickingService::new(ground_plane(10.0, 0.0, [1.0; 3]));
        assert!(service.pick_surface(&Ray::down_at(50.0, 0.0)).is_none());
        let no_model = PickingService::default();
        assert!(no_model.pick_surface(&Ray::down_at(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_pick_surface_nearest_wins() {
        // Box top at y=1 sits above the ground at y=0
        let mut mesh = ground_plane(10.0, 0.0, [1.0; 3]);
        mesh.append(&cube(2.0, 2.0, 2.0, [1.0; 3]));
        let service = PickingService::new(mesh);
        let p = service.pick_surface(&Ray::down_at(0.0, 0.0)).unwrap();
        assert!((p.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_pick_nearest_sphere_prefers_closest() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let targets = vec![("far", Vec3::new(0.0, 0.0, -2.0)), ("near", Vec3::new(0.0, 0.0, 2.0))];
        assert_eq!(pick_nearest_sphere(&ray, targets, 0.5), Some("near"));
    }
}
