use crate::engine::utils::math::{mat4x4_mul, mat4x4_scale, mat4x4_translate, Mat4x4};

/// World placement of a rendered object.
#[derive(Debug, Clone)]
pub struct Transform {
    translation: [f32; 3],
    scale: [f32; 3],
}

impl Transform {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.translation[0] += x;
        self.translation[1] += y;
        self.translation[2] += z;
    }

    pub fn set_scale(&mut self, s: f32) {
        self.scale = [s, s, s];
    }

    pub fn get_matrix(&self) -> Mat4x4 {
        let t = self.translation;
        mat4x4_mul(
            mat4x4_translate(t[0], t[1], t[2]),
            mat4x4_scale(self.scale[0], self.scale[1], self.scale[2]),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
