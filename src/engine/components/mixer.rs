use std::collections::HashMap;

use crate::engine::components::animation::{AnimationClip, AnimationType};
use crate::engine::components::skeleton::{Node, Skeleton};
use crate::engine::utils::math::{lerp, quat_dot, quat_normalize, smoothstep};

const WEIGHT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Wrap back to the start when the clip ends (idle).
    Repeat,
    /// Clamp at the last keyframe and stop (gestures).
    Once,
}

#[derive(Debug, Clone)]
struct WeightRamp {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    smooth: bool,
}

/// Playback state for one clip. All actions of a character share one mixer
/// and are blended by weight into the same skeleton.
#[derive(Debug, Clone)]
pub struct Action {
    pub clip: AnimationClip,
    pub time: f32,
    pub weight: f32,
    pub enabled: bool,
    pub playing: bool,
    pub loop_mode: LoopMode,
    ramp: Option<WeightRamp>,
}

impl Action {
    fn new(clip: AnimationClip, loop_mode: LoopMode) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 0.0,
            enabled: false,
            playing: false,
            loop_mode,
            ramp: None,
        }
    }

    pub fn set_loop(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Rewind the playback cursor and make the action eligible again.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.enabled = true;
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.enabled = true;
    }

    fn advance(&mut self, dt: f32) {
        if let Some(ramp) = &mut self.ramp {
            ramp.elapsed += dt;
            let t = if ramp.duration > 0.0 {
                (ramp.elapsed / ramp.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let t = if ramp.smooth { smoothstep(t) } else { t };
            self.weight = lerp(ramp.from, ramp.to, t);

            if ramp.elapsed >= ramp.duration {
                self.weight = ramp.to;
                if self.weight <= WEIGHT_EPSILON {
                    self.enabled = false;
                }
                self.ramp = None;
            }
        }

        if !self.playing {
            return;
        }
        self.time += dt;
        match self.loop_mode {
            LoopMode::Repeat => {
                if self.clip.duration > 0.0 {
                    self.time %= self.clip.duration;
                }
            }
            LoopMode::Once => {
                if self.time >= self.clip.duration {
                    self.time = self.clip.duration;
                    self.playing = false;
                }
            }
        }
    }

    fn fade_to(&mut self, target: f32, duration: f32, smooth: bool) {
        if duration <= 0.0 {
            self.weight = target;
            self.enabled = target > WEIGHT_EPSILON;
            self.ramp = None;
            return;
        }
        self.ramp = Some(WeightRamp {
            from: self.weight,
            to: target,
            elapsed: 0.0,
            duration,
            smooth,
        });
    }
}

/// Blends all active actions into one skeleton per tick. Weights are
/// normalized across actions and any remaining influence falls back to
/// the rest pose.
pub struct AnimationMixer {
    actions: Vec<Action>,
    rest_pose: Vec<Node>,
}

impl AnimationMixer {
    pub fn new(skeleton: &Skeleton) -> Self {
        Self {
            actions: Vec::new(),
            rest_pose: skeleton.nodes.clone(),
        }
    }

    /// Wrap a clip as a playable action; returns its handle.
    pub fn add_clip(&mut self, clip: AnimationClip, loop_mode: LoopMode) -> usize {
        self.actions.push(Action::new(clip, loop_mode));
        self.actions.len() - 1
    }

    pub fn action(&self, idx: usize) -> &Action {
        &self.actions[idx]
    }

    pub fn action_mut(&mut self, idx: usize) -> &mut Action {
        &mut self.actions[idx]
    }

    pub fn find_action(&self, clip_name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.clip.name == clip_name)
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Ramp `from` out and `to` in over `duration` seconds. With `smooth`
    /// the ramp is warped by a smoothstep ease.
    pub fn crossfade(&mut self, from: usize, to: usize, duration: f32, smooth: bool) {
        if from == to {
            return;
        }
        self.actions[from].fade_to(0.0, duration, smooth);
        self.actions[to].fade_to(1.0, duration, smooth);
    }

    /// Advance every action by `dt` seconds and write the blended pose
    /// into the skeleton. Must run before the frame is rendered.
    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        for action in &mut self.actions {
            action.advance(dt);
        }

        // (node, property) -> (weighted accumulator, total weight)
        let mut accum: HashMap<(u32, AnimationType), ([f32; 4], f32)> = HashMap::new();

        for action in &self.actions {
            if !action.enabled || action.weight <= WEIGHT_EPSILON {
                continue;
            }
            let mut sampled = [0.0_f32; 4];
            for channel in &action.clip.channels {
                channel.sample(action.time, &mut sampled);
                let entry = accum
                    .entry((channel.target, channel.animation_type))
                    .or_insert(([0.0; 4], 0.0));
                if channel.animation_type == AnimationType::Rotation {
                    // Keep quaternion hemispheres consistent before
                    // accumulating.
                    let sign = if entry.1 > 0.0 && quat_dot(entry.0, sampled) < 0.0 {
                        -1.0
                    } else {
                        1.0
                    };
                    for i in 0..4 {
                        entry.0[i] += sampled[i] * action.weight * sign;
                    }
                } else {
                    for i in 0..3 {
                        entry.0[i] += sampled[i] * action.weight;
                    }
                }
                entry.1 += action.weight;
            }
        }

        for ((target, animation_type), (mut value, total)) in accum {
            let Some(node) = skeleton.nodes.get_mut(target as usize) else {
                continue;
            };
            let Some(rest) = self.rest_pose.get(target as usize) else {
                continue;
            };
            match animation_type {
                AnimationType::Translation | AnimationType::Scale => {
                    let rest_value = if animation_type == AnimationType::Translation {
                        rest.translation
                    } else {
                        rest.scale
                    };
                    let out = if total >= 1.0 {
                        [value[0] / total, value[1] / total, value[2] / total]
                    } else {
                        [
                            value[0] + rest_value[0] * (1.0 - total),
                            value[1] + rest_value[1] * (1.0 - total),
                            value[2] + rest_value[2] * (1.0 - total),
                        ]
                    };
                    if animation_type == AnimationType::Translation {
                        node.translation = out;
                    } else {
                        node.scale = out;
                    }
                }
                AnimationType::Rotation => {
                    if total < 1.0 {
                        let mut rest_q = rest.rotation;
                        if quat_dot(value, rest_q) < 0.0 {
                            for c in &mut rest_q {
                                *c = -*c;
                            }
                        }
                        for i in 0..4 {
                            value[i] += rest_q[i] * (1.0 - total);
                        }
                    }
                    node.rotation = quat_normalize(value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::animation::AnimationChannel;

    fn skeleton_with_nodes(count: usize) -> Skeleton {
        let nodes = (0..count)
            .map(|i| Node {
                name: format!("bone{i}"),
                translation: [0.0, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0, 1.0, 1.0],
                parent: u32::MAX,
            })
            .collect::<Vec<_>>();
        Skeleton {
            joint_ids: (0..count as u32).collect(),
            joint_inverse_mats: vec![],
            nodes,
        }
    }

    fn translation_clip(name: &str, target: u32, duration: f32, end: [f32; 3]) -> AnimationClip {
        AnimationClip::new(
            name,
            vec![AnimationChannel {
                target,
                target_name: format!("bone{target}"),
                animation_type: AnimationType::Translation,
                times: vec![0.0, duration],
                data: vec![0.0, 0.0, 0.0, end[0], end[1], end[2]],
            }],
        )
    }

    #[test]
    fn repeat_action_wraps_its_cursor() {
        let mut skeleton = skeleton_with_nodes(1);
        let mut mixer = AnimationMixer::new(&skeleton);
        let idle = mixer.add_clip(translation_clip("idle", 0, 2.0, [1.0, 0.0, 0.0]), LoopMode::Repeat);
        mixer.action_mut(idle).play();
        mixer.action_mut(idle).weight = 1.0;

        mixer.update(3.0, &mut skeleton);
        assert!((mixer.action(idle).time - 1.0).abs() < 1e-6);
        assert!(mixer.action(idle).playing);
    }

    #[test]
    fn one_shot_action_clamps_and_stops() {
        let mut skeleton = skeleton_with_nodes(1);
        let mut mixer = AnimationMixer::new(&skeleton);
        let wave = mixer.add_clip(translation_clip("wave", 0, 1.5, [1.0, 0.0, 0.0]), LoopMode::Once);
        mixer.action_mut(wave).play();
        mixer.action_mut(wave).weight = 1.0;

        mixer.update(5.0, &mut skeleton);
        assert_eq!(mixer.action(wave).time, 1.5);
        assert!(!mixer.action(wave).playing);
        // The clamped last keyframe keeps driving the pose.
        assert_eq!(skeleton.nodes[0].translation, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn crossfade_hands_influence_over() {
        let mut skeleton = skeleton_with_nodes(1);
        let mut mixer = AnimationMixer::new(&skeleton);
        let idle = mixer.add_clip(translation_clip("idle", 0, 10.0, [0.0, 0.0, 0.0]), LoopMode::Repeat);
        let wave = mixer.add_clip(translation_clip("wave", 0, 10.0, [2.0, 0.0, 0.0]), LoopMode::Once);
        mixer.action_mut(idle).play();
        mixer.action_mut(idle).weight = 1.0;
        mixer.action_mut(wave).play();

        mixer.crossfade(idle, wave, 0.5, false);
        mixer.update(0.25, &mut skeleton);
        assert!((mixer.action(idle).weight - 0.5).abs() < 1e-5);
        assert!((mixer.action(wave).weight - 0.5).abs() < 1e-5);

        mixer.update(0.25, &mut skeleton);
        assert_eq!(mixer.action(idle).weight, 0.0);
        assert_eq!(mixer.action(wave).weight, 1.0);
        // Fully faded-out actions stop contributing.
        assert!(!mixer.action(idle).enabled);
        assert!(mixer.action(wave).enabled);
    }

    #[test]
    fn underweight_blend_falls_back_to_rest_pose() {
        let mut skeleton = skeleton_with_nodes(1);
        skeleton.nodes[0].translation = [10.0, 0.0, 0.0];
        let mut mixer = AnimationMixer::new(&skeleton);
        let wave = mixer.add_clip(translation_clip("wave", 0, 1.0, [0.0, 0.0, 0.0]), LoopMode::Once);
        mixer.action_mut(wave).play();
        mixer.action_mut(wave).weight = 0.25;

        mixer.update(0.0, &mut skeleton);
        // 0.25 of the clip start (origin) plus 0.75 of the rest pose.
        assert!((skeleton.nodes[0].translation[0] - 7.5).abs() < 1e-5);
    }

    #[test]
    fn untracked_joints_are_left_alone() {
        let mut skeleton = skeleton_with_nodes(2);
        skeleton.nodes[1].rotation = [0.5, 0.0, 0.0, 0.5];
        let mut mixer = AnimationMixer::new(&skeleton);
        let idle = mixer.add_clip(translation_clip("idle", 0, 1.0, [1.0, 0.0, 0.0]), LoopMode::Repeat);
        mixer.action_mut(idle).play();
        mixer.action_mut(idle).weight = 1.0;

        mixer.update(0.5, &mut skeleton);
        // Node 1 has no channels; whatever was written there stays.
        assert_eq!(skeleton.nodes[1].rotation, [0.5, 0.0, 0.0, 0.5]);
    }
}
