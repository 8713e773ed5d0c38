//! The interactive character: one skinned model that watches the pointer
//! and plays a random gesture when clicked.

use std::time::Instant;

use glow::HasContext;
use log::warn;

use crate::config::Settings;
use crate::engine::components::mixer::{AnimationMixer, LoopMode};
use crate::engine::components::{Camera, Material, Mesh, Skeleton, Transform};
use crate::engine::managers::CharacterAsset;
use crate::engine::systems::gesture::{GestureController, GestureSettings};
use crate::engine::systems::picking::{pick, Aabb};
use crate::engine::systems::pointer_tracking::JointTracker;
use crate::engine::utils::math::{mat4x4_identity, Mat4x4};

const MAX_JOINTS: usize = 64;

pub struct Character {
    transform: Transform,
    mesh: Mesh,
    material: Material,
    skeleton: Skeleton,
    mixer: AnimationMixer,
    tracker: JointTracker,
    gestures: Option<GestureController>,
    bounds: Aabb,
    viewport: (f32, f32),
}

impl Character {
    pub fn from_asset(asset: CharacterAsset, settings: &Settings) -> Self {
        let CharacterAsset {
            mesh,
            material,
            skeleton,
            mut clips,
            bounds,
        } = asset;

        // The tracked joints belong to the pointer, not the clips. Strip
        // their channels from every clip so playback and tracking never
        // fight over the same bones.
        let tracked = [settings.neck_bone.as_str(), settings.waist_bone.as_str()];
        for clip in &mut clips {
            clip.strip_joints(&tracked);
        }

        let idle_pos = clips.iter().position(|c| c.name == settings.idle_clip);
        if idle_pos.is_none() && !clips.is_empty() {
            warn!(
                "idle clip '{}' not found, falling back to '{}'",
                settings.idle_clip, clips[0].name
            );
        }
        let idle_pos = idle_pos.unwrap_or(0);

        let mut mixer = AnimationMixer::new(&skeleton);
        let mut idle = None;
        let mut gestures = Vec::new();
        for (i, clip) in clips.into_iter().enumerate() {
            if i == idle_pos {
                idle = Some(mixer.add_clip(clip, LoopMode::Repeat));
            } else {
                gestures.push(mixer.add_clip(clip, LoopMode::Once));
            }
        }

        let controller = idle.map(|idle| {
            let action = mixer.action_mut(idle);
            action.play();
            action.weight = 1.0;
            GestureController::new(
                idle,
                gestures,
                GestureSettings {
                    fade_in: settings.fade_in_seconds,
                    fade_out: settings.fade_out_seconds,
                },
            )
        });
        if controller.is_none() {
            warn!("model has no animation clips, character will hold the rest pose");
        }

        let tracker = JointTracker::resolve(
            &skeleton,
            &settings.neck_bone,
            &settings.waist_bone,
            settings.neck_limit_degrees,
            settings.waist_limit_degrees,
        );

        let mut transform = Transform::new(0.0, settings.model_offset_y, 0.0);
        transform.set_scale(settings.model_scale);

        Self {
            transform,
            mesh,
            material,
            skeleton,
            mixer,
            tracker,
            gestures: controller,
            bounds,
            viewport: (1.0, 1.0),
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = (width, height);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gestures.as_ref().is_some_and(|g| g.is_busy())
    }

    /// Pointer moved: repose the tracked joints immediately. The mapping
    /// is stateless, so there is nothing to interpolate here.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let (w, h) = self.viewport;
        self.tracker.apply(&mut self.skeleton, x, y, w, h);
    }

    /// Click or tap at window coordinates. Starts a gesture when the ray
    /// through the pointer hits the character and nothing is in flight.
    pub fn on_activate(&mut self, x: f32, y: f32, camera: &Camera, now: Instant) -> bool {
        let Some(controller) = self.gestures.as_mut() else {
            return false;
        };

        let (w, h) = self.viewport;
        let ndc_x = (2.0 * x) / w - 1.0;
        let ndc_y = 1.0 - (2.0 * y) / h;

        let world_bounds = self.bounds.transformed(&self.transform.get_matrix());
        if pick(ndc_x, ndc_y, camera, &[world_bounds]).is_empty() {
            return false;
        }

        controller.trigger(&mut self.mixer, now)
    }

    pub fn update(&mut self, now: Instant, dt: f32) {
        if let Some(controller) = self.gestures.as_mut() {
            controller.update(&mut self.mixer, now);
        }
        self.mixer.update(dt, &mut self.skeleton);
    }

    /// Drop any scheduled idle return so it cannot fire after teardown.
    pub fn shutdown(&mut self) {
        if let Some(controller) = self.gestures.as_mut() {
            controller.cancel();
        }
    }

    pub fn render(&self, gl: &glow::Context, shader_program: glow::Program, viewport_txfm: &Mat4x4) {
        self.material.bind(gl);

        unsafe {
            gl.use_program(Some(shader_program));
            gl.bind_vertex_array(Some(self.mesh.vao));

            if self.material.double_sided {
                gl.disable(glow::CULL_FACE);
            } else {
                gl.enable(glow::CULL_FACE);
            }

            let mut bone_matrices = vec![mat4x4_identity(); MAX_JOINTS];
            let mut inverse_bone_matrices = vec![mat4x4_identity(); MAX_JOINTS];
            for (i, &joint_id) in self.skeleton.joint_ids.iter().enumerate() {
                if i >= MAX_JOINTS {
                    warn!("skeleton exceeds {} joints, extra joints ignored", MAX_JOINTS);
                    break;
                }
                bone_matrices[i] = self.skeleton.node_world_txfm(joint_id as usize);
                if let Some(inv) = self.skeleton.joint_inverse_mats.get(i) {
                    inverse_bone_matrices[i] = *inv;
                }
            }

            if let Some(loc) = gl.get_uniform_location(shader_program, "viewport_txfm") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), true, viewport_txfm);
            }
            if let Some(loc) = gl.get_uniform_location(shader_program, "world_txfm") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), true, &self.transform.get_matrix());
            }

            let flat_bones: Vec<f32> = bone_matrices.iter().flatten().copied().collect();
            let flat_inverse: Vec<f32> = inverse_bone_matrices.iter().flatten().copied().collect();
            if let Some(loc) = gl.get_uniform_location(shader_program, "bone_matrix") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), true, &flat_bones);
            }
            if let Some(loc) = gl.get_uniform_location(shader_program, "inverse_bone_matrix") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), true, &flat_inverse);
            }
            if let Some(loc) = gl.get_uniform_location(shader_program, "has_texture") {
                gl.uniform_1_i32(Some(&loc), self.material.has_texture() as i32);
            }

            gl.draw_elements(
                glow::TRIANGLES,
                self.mesh.index_count as i32,
                glow::UNSIGNED_INT,
                0,
            );
            gl.bind_vertex_array(None);
        }
    }
}
