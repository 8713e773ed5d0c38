//! Ray picking against object bounds.
//!
//! The click handler only needs to know whether the pointer landed on the
//! character, so picking works on world-space AABBs rather than triangle
//! geometry.

use crate::engine::components::camera::Camera;
use crate::engine::utils::math::{Mat4x4, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_positions(positions: &[f32]) -> Self {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in positions.chunks_exact(3) {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Self { min, max }
    }

    /// Axis-aligned bounds of this box under an affine transform, taken
    /// over the transformed corners.
    pub fn transformed(&self, m: &Mat4x4) -> Self {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for corner in 0..8 {
            let p = [
                if corner & 1 == 0 { self.min[0] } else { self.max[0] },
                if corner & 2 == 0 { self.min[1] } else { self.max[1] },
                if corner & 4 == 0 { self.min[2] } else { self.max[2] },
            ];
            let world = [
                m[0] * p[0] + m[1] * p[1] + m[2] * p[2] + m[3],
                m[4] * p[0] + m[5] * p[1] + m[6] * p[2] + m[7],
                m[8] * p[0] + m[9] * p[1] + m[10] * p[2] + m[11],
            ];
            for i in 0..3 {
                min[i] = min[i].min(world[i]);
                max[i] = max[i].max(world[i]);
            }
        }
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object: usize,
    pub distance: f32,
}

/// Cast a ray through the pointer (NDC, y up) and return every bound it
/// crosses, nearest first.
pub fn pick(ndc_x: f32, ndc_y: f32, camera: &Camera, bounds: &[Aabb]) -> Vec<Hit> {
    let (origin, dir) = camera.ray_through(ndc_x, ndc_y);
    let mut hits: Vec<Hit> = bounds
        .iter()
        .enumerate()
        .filter_map(|(object, aabb)| {
            ray_aabb(origin, dir, aabb).map(|distance| Hit { object, distance })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

// Slab test. Returns the entry distance along the ray, if any.
fn ray_aabb(origin: Vec3, dir: Vec3, aabb: &Aabb) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for i in 0..3 {
        if dir[i].abs() < 1e-8 {
            if origin[i] < aabb.min[i] || origin[i] > aabb.max[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t0 = (aabb.min[i] - origin[i]) * inv;
        let mut t1 = (aabb.max[i] - origin[i]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(z: f32) -> Aabb {
        Aabb {
            min: [-1.0, -1.0, z - 1.0],
            max: [1.0, 1.0, z + 1.0],
        }
    }

    #[test]
    fn center_ray_hits_a_box_in_front() {
        let camera = Camera::new([0.0, 0.0, 10.0], 50.0);
        let hits = pick(0.0, 0.0, &camera, &[box_at(0.0)]);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn ray_misses_a_box_off_to_the_side() {
        let camera = Camera::new([0.0, 0.0, 10.0], 50.0);
        let offset = Aabb {
            min: [30.0, -1.0, -1.0],
            max: [32.0, 1.0, 1.0],
        };
        assert!(pick(0.0, 0.0, &camera, &[offset]).is_empty());
    }

    #[test]
    fn hits_are_ordered_nearest_first() {
        let camera = Camera::new([0.0, 0.0, 10.0], 50.0);
        let hits = pick(0.0, 0.0, &camera, &[box_at(-5.0), box_at(5.0)]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, 1);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn transformed_bounds_follow_the_model_matrix() {
        use crate::engine::utils::math::mat4x4_translate;
        let aabb = box_at(0.0);
        let moved = aabb.transformed(&mat4x4_translate(5.0, 0.0, 0.0));
        assert_eq!(moved.min[0], 4.0);
        assert_eq!(moved.max[0], 6.0);
    }

    #[test]
    fn bounds_from_positions_cover_all_vertices() {
        let aabb = Aabb::from_positions(&[0.0, 0.0, 0.0, -2.0, 3.0, 1.0, 1.0, -1.0, 0.5]);
        assert_eq!(aabb.min, [-2.0, -1.0, 0.0]);
        assert_eq!(aabb.max, [1.0, 3.0, 1.0]);
    }
}
