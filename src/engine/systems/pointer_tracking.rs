//! Pointer-driven joint tracking.
//!
//! Converts the pointer position into bounded neck/waist rotations so the
//! character appears to watch the cursor. The mapping is stateless; the
//! latest pointer position fully determines the pose.

use log::warn;

use crate::engine::components::skeleton::Skeleton;

/// Map a pointer position to a pair of rotations in degrees:
/// `(horizontal, vertical)` around the joint's Y and X axes.
///
/// The viewport is split into four half-planes around its center. On each
/// axis the rotation grows linearly from 0 at the center to `degree_limit`
/// at the edge. Looking up is deliberately muted: above the center only
/// half the limit is applied.
pub fn pointer_rotation(
    x: f32,
    y: f32,
    viewport_w: f32,
    viewport_h: f32,
    degree_limit: f32,
) -> (f32, f32) {
    let half_w = viewport_w / 2.0;
    let half_h = viewport_h / 2.0;

    let mut dx = 0.0;
    let mut dy = 0.0;

    // Left of center rotates toward -limit, right of center toward +limit.
    if x <= half_w {
        let ratio = (half_w - x) / half_w;
        dx = -degree_limit * ratio;
    }
    if x >= half_w {
        let ratio = (x - half_w) / half_w;
        dx = degree_limit * ratio;
    }

    // Up gets half the limit, down the full limit.
    if y <= half_h {
        let ratio = (half_h - y) / half_h;
        dy = -(degree_limit * 0.5) * ratio;
    }
    if y >= half_h {
        let ratio = (y - half_h) / half_h;
        dy = degree_limit * ratio;
    }

    (dx, dy)
}

/// Applies the pointer mapping to the two tracked joints.
///
/// Bone indices are resolved once, right after the model loads. When
/// either bone is missing from the skeleton the tracker stays inert and
/// the rest of the scene keeps working.
#[derive(Debug, Clone)]
pub struct JointTracker {
    neck: Option<usize>,
    waist: Option<usize>,
    neck_limit: f32,
    waist_limit: f32,
}

impl JointTracker {
    pub fn resolve(
        skeleton: &Skeleton,
        neck_bone: &str,
        waist_bone: &str,
        neck_limit: f32,
        waist_limit: f32,
    ) -> Self {
        let neck = skeleton.find_bone(neck_bone);
        let waist = skeleton.find_bone(waist_bone);
        if neck.is_none() {
            warn!("neck bone '{}' not found, pointer tracking disabled", neck_bone);
        }
        if waist.is_none() {
            warn!("waist bone '{}' not found, pointer tracking disabled", waist_bone);
        }
        Self {
            neck,
            waist,
            neck_limit,
            waist_limit,
        }
    }

    pub fn is_active(&self) -> bool {
        self.neck.is_some() && self.waist.is_some()
    }

    /// Overwrite both tracked joints' rotations from the pointer position.
    /// No-op unless both bones resolved.
    pub fn apply(&self, skeleton: &mut Skeleton, x: f32, y: f32, viewport_w: f32, viewport_h: f32) {
        let (Some(neck), Some(waist)) = (self.neck, self.waist) else {
            return;
        };
        for (joint, limit) in [(neck, self.neck_limit), (waist, self.waist_limit)] {
            let (dx, dy) = pointer_rotation(x, y, viewport_w, viewport_h, limit);
            skeleton.set_joint_pitch_yaw(joint, dy.to_radians(), dx.to_radians());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::skeleton::Node;
    use crate::engine::utils::math::quat_from_pitch_yaw;

    const W: f32 = 1000.0;
    const H: f32 = 1000.0;

    #[test]
    fn center_maps_to_zero() {
        assert_eq!(pointer_rotation(500.0, 500.0, W, H, 50.0), (0.0, 0.0));
    }

    #[test]
    fn horizontal_edges_reach_the_limit() {
        let (dx, _) = pointer_rotation(W, 500.0, W, H, 50.0);
        assert_eq!(dx, 50.0);
        let (dx, _) = pointer_rotation(0.0, 500.0, W, H, 50.0);
        assert_eq!(dx, -50.0);
    }

    #[test]
    fn vertical_limit_is_asymmetric() {
        // Bottom edge: full limit. Top edge: half the limit, negated.
        let (_, dy) = pointer_rotation(500.0, H, W, H, 50.0);
        assert_eq!(dy, 50.0);
        let (_, dy) = pointer_rotation(500.0, 0.0, W, H, 50.0);
        assert_eq!(dy, -25.0);
    }

    #[test]
    fn mapping_is_linear_per_axis() {
        let (quarter, _) = pointer_rotation(750.0, 500.0, W, H, 40.0);
        let (half, _) = pointer_rotation(875.0, 500.0, W, H, 40.0);
        assert!((quarter - 20.0).abs() < 1e-4);
        assert!((half - 30.0).abs() < 1e-4);
    }

    #[test]
    fn axes_do_not_couple() {
        // Sweeping y must not change dx, and vice versa.
        let (dx_top, _) = pointer_rotation(800.0, 0.0, W, H, 50.0);
        let (dx_bottom, _) = pointer_rotation(800.0, H, W, H, 50.0);
        assert_eq!(dx_top, dx_bottom);

        let (_, dy_left) = pointer_rotation(0.0, 200.0, W, H, 50.0);
        let (_, dy_right) = pointer_rotation(W, 200.0, W, H, 50.0);
        assert_eq!(dy_left, dy_right);
    }

    #[test]
    fn right_edge_vertical_center_hits_full_neck_limit() {
        let (dx, dy) = pointer_rotation(1000.0, 500.0, 1000.0, 1000.0, 50.0);
        assert_eq!((dx, dy), (50.0, 0.0));
    }

    fn tracked_skeleton() -> Skeleton {
        let mk = |name: &str| Node {
            name: name.to_string(),
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
            parent: u32::MAX,
        };
        Skeleton {
            nodes: vec![mk("mixamorigNeck"), mk("mixamorigSpine")],
            joint_ids: vec![0, 1],
            joint_inverse_mats: vec![],
        }
    }

    #[test]
    fn apply_writes_both_joints_and_is_idempotent() {
        let mut skeleton = tracked_skeleton();
        let tracker =
            JointTracker::resolve(&skeleton, "mixamorigNeck", "mixamorigSpine", 50.0, 30.0);
        assert!(tracker.is_active());

        tracker.apply(&mut skeleton, 1000.0, 500.0, W, H);
        let neck = skeleton.nodes[0].rotation;
        let waist = skeleton.nodes[1].rotation;
        assert_eq!(neck, quat_from_pitch_yaw(0.0, 50.0_f32.to_radians()));
        assert_eq!(waist, quat_from_pitch_yaw(0.0, 30.0_f32.to_radians()));

        tracker.apply(&mut skeleton, 1000.0, 500.0, W, H);
        assert_eq!(skeleton.nodes[0].rotation, neck);
        assert_eq!(skeleton.nodes[1].rotation, waist);
    }

    #[test]
    fn missing_bone_leaves_skeleton_untouched() {
        let mut skeleton = tracked_skeleton();
        let tracker = JointTracker::resolve(&skeleton, "mixamorigNeck", "nope", 50.0, 30.0);
        assert!(!tracker.is_active());

        let before = skeleton.nodes.clone();
        tracker.apply(&mut skeleton, 1000.0, 0.0, W, H);
        for (a, b) in skeleton.nodes.iter().zip(before.iter()) {
            assert_eq!(a.rotation, b.rotation);
        }
    }
}
