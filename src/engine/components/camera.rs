use crate::engine::utils::math::{
    build_view_matrix, camera_basis, mat4x4_mul, mat4x4_perspective, vec3_add, vec3_normalize,
    vec3_scale, Mat4x4, Vec3,
};

/// Perspective camera. Orientation is pitch/yaw Euler, matching the view
/// matrix helpers in `utils::math`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, fov_y_degrees: f32) -> Self {
        Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            fov_y: fov_y_degrees.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4x4 {
        build_view_matrix(self.position, self.pitch, self.yaw)
    }

    pub fn view_projection(&self) -> Mat4x4 {
        mat4x4_mul(
            mat4x4_perspective(self.fov_y, self.aspect, self.near, self.far),
            self.view_matrix(),
        )
    }

    /// World-space ray through a point given in normalized device
    /// coordinates (x right, y up, both in [-1, 1]).
    pub fn ray_through(&self, ndc_x: f32, ndc_y: f32) -> (Vec3, Vec3) {
        let (right, up, forward) = camera_basis(self.pitch, self.yaw);
        let tan_half = (self.fov_y * 0.5).tan();

        let mut dir = vec3_scale(forward, -1.0);
        dir = vec3_add(dir, vec3_scale(right, ndc_x * tan_half * self.aspect));
        dir = vec3_add(dir, vec3_scale(up, ndc_y * tan_half));

        (self.position, vec3_normalize(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_matches_look_direction() {
        let camera = Camera::new([0.0, 0.0, 30.0], 50.0);
        let (origin, dir) = camera.ray_through(0.0, 0.0);
        assert_eq!(origin, [0.0, 0.0, 30.0]);
        // Default orientation looks down negative z.
        assert!((dir[0]).abs() < 1e-6);
        assert!((dir[1]).abs() < 1e-6);
        assert!(dir[2] < -0.99);
    }

    #[test]
    fn off_center_rays_tilt_toward_the_pointer() {
        let camera = Camera::new([0.0, 0.0, 10.0], 60.0);
        let (_, right_ray) = camera.ray_through(1.0, 0.0);
        let (_, up_ray) = camera.ray_through(0.0, 1.0);
        assert!(right_ray[0] > 0.0);
        assert!(up_ray[1] > 0.0);
    }
}
