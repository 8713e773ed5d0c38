//! Gesture playback state machine.
//!
//! Orchestrates the click-triggered one-shot gestures: fade out of idle,
//! play the gesture once, and fade back so the character lands in idle
//! exactly as the gesture clip ends. A single busy flag guards against
//! overlapping triggers; clicks while a transition is in flight are
//! silently dropped.

use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::components::mixer::{AnimationMixer, LoopMode};

#[derive(Debug, Clone, Copy)]
pub struct GestureSettings {
    pub fade_in: f32,
    pub fade_out: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            fade_in: 0.25,
            fade_out: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingReturn {
    deadline: Instant,
    gesture: usize,
}

pub struct GestureController {
    idle: usize,
    gestures: Vec<usize>,
    settings: GestureSettings,
    busy: bool,
    pending: Option<PendingReturn>,
    rng: StdRng,
}

impl GestureController {
    pub fn new(idle: usize, gestures: Vec<usize>, settings: GestureSettings) -> Self {
        Self::with_rng(idle, gestures, settings, StdRng::from_os_rng())
    }

    /// Construct with an explicit random source so gesture selection can
    /// be made deterministic in tests.
    pub fn with_rng(idle: usize, gestures: Vec<usize>, settings: GestureSettings, rng: StdRng) -> Self {
        Self {
            idle,
            gestures,
            settings,
            busy: false,
            pending: None,
            rng,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Start a randomly chosen gesture. Returns false when a transition is
    /// already in flight or there are no gestures to pick from; neither
    /// case disturbs the current playback.
    pub fn trigger(&mut self, mixer: &mut AnimationMixer, now: Instant) -> bool {
        if self.busy || self.gestures.is_empty() {
            return false;
        }
        // Set synchronously, before anything deferred can run.
        self.busy = true;

        let pick = self.rng.random_range(0..self.gestures.len());
        let gesture = self.gestures[pick];

        let action = mixer.action_mut(gesture);
        action.set_loop(LoopMode::Once);
        action.reset();
        action.play();
        let clip_duration = action.clip.duration;
        mixer.crossfade(self.idle, gesture, self.settings.fade_in, true);

        // The return fade should finish exactly as the one-shot clip does,
        // so schedule it a fade-in plus a fade-out before the clip end. A
        // short clip makes this non-positive: fire on the next update.
        let delay = (clip_duration - (self.settings.fade_in + self.settings.fade_out)).max(0.0);
        self.pending = Some(PendingReturn {
            deadline: now + Duration::from_secs_f32(delay),
            gesture,
        });
        debug!(
            "gesture '{}' started, returning to idle in {:.2}s",
            mixer.action(gesture).clip.name,
            delay
        );
        true
    }

    /// Poll the deferred return. Fires at most once per trigger; clearing
    /// the busy flag happens only here.
    pub fn update(&mut self, mixer: &mut AnimationMixer, now: Instant) {
        let Some(pending) = self.pending else {
            return;
        };
        if now < pending.deadline {
            return;
        }
        self.pending = None;

        mixer.action_mut(self.idle).enabled = true;
        mixer.crossfade(pending.gesture, self.idle, self.settings.fade_out, true);
        self.busy = false;
    }

    /// Drop the deferred return on teardown so it can never fire into a
    /// dismantled scene.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::animation::{AnimationChannel, AnimationClip, AnimationType};
    use crate::engine::components::skeleton::{Node, Skeleton};

    fn clip(name: &str, duration: f32) -> AnimationClip {
        AnimationClip::new(
            name,
            vec![AnimationChannel {
                target: 0,
                target_name: "bone0".to_string(),
                animation_type: AnimationType::Translation,
                times: vec![0.0, duration],
                data: vec![0.0; 6],
            }],
        )
    }

    fn skeleton() -> Skeleton {
        Skeleton {
            nodes: vec![Node {
                name: "bone0".to_string(),
                translation: [0.0, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0, 1.0, 1.0],
                parent: u32::MAX,
            }],
            joint_ids: vec![0],
            joint_inverse_mats: vec![],
        }
    }

    fn controller(
        gesture_durations: &[f32],
        settings: GestureSettings,
    ) -> (AnimationMixer, GestureController) {
        let skeleton = skeleton();
        let mut mixer = AnimationMixer::new(&skeleton);
        let idle = mixer.add_clip(clip("idle", 4.0), LoopMode::Repeat);
        mixer.action_mut(idle).play();
        mixer.action_mut(idle).weight = 1.0;
        let gestures = gesture_durations
            .iter()
            .enumerate()
            .map(|(i, &d)| mixer.add_clip(clip(&format!("gesture{i}"), d), LoopMode::Once))
            .collect();
        let ctrl =
            GestureController::with_rng(idle, gestures, settings, StdRng::seed_from_u64(7));
        (mixer, ctrl)
    }

    #[test]
    fn trigger_sets_busy_synchronously() {
        let (mut mixer, mut ctrl) = controller(&[2.0], GestureSettings::default());
        let now = Instant::now();
        assert!(ctrl.trigger(&mut mixer, now));
        assert!(ctrl.is_busy());
        assert!(mixer.action(1).playing);
        assert_eq!(mixer.action(1).loop_mode, LoopMode::Once);
    }

    #[test]
    fn return_fires_a_fade_pair_before_the_clip_ends() {
        let (mut mixer, mut ctrl) = controller(&[2.0], GestureSettings::default());
        let now = Instant::now();
        ctrl.trigger(&mut mixer, now);
        let deadline = ctrl.pending_deadline().expect("return scheduled");
        assert_eq!(deadline - now, Duration::from_secs_f32(1.5));
    }

    #[test]
    fn short_clip_clamps_the_delay_to_zero() {
        let (mut mixer, mut ctrl) = controller(&[0.3], GestureSettings::default());
        let now = Instant::now();
        ctrl.trigger(&mut mixer, now);
        // fade_in + fade_out exceeds the clip; the return must be
        // immediate rather than scheduled in the past or panicking.
        assert_eq!(ctrl.pending_deadline(), Some(now));
        ctrl.update(&mut mixer, now);
        assert!(!ctrl.is_busy());
    }

    #[test]
    fn triggers_while_busy_are_ignored() {
        let (mut mixer, mut ctrl) = controller(&[2.0, 3.0, 5.0], GestureSettings::default());
        let now = Instant::now();
        ctrl.trigger(&mut mixer, now);
        let deadline = ctrl.pending_deadline();

        assert!(!ctrl.trigger(&mut mixer, now + Duration::from_millis(100)));
        // Neither the timer nor the selection moved.
        assert_eq!(ctrl.pending_deadline(), deadline);
        assert!(ctrl.is_busy());
    }

    #[test]
    fn empty_gesture_set_is_a_no_op() {
        let (mut mixer, mut ctrl) = controller(&[], GestureSettings::default());
        let now = Instant::now();
        assert!(!ctrl.trigger(&mut mixer, now));
        assert!(!ctrl.is_busy());
        assert_eq!(ctrl.pending_deadline(), None);
    }

    #[test]
    fn busy_clears_exactly_once_via_the_deferred_return() {
        let (mut mixer, mut ctrl) = controller(&[2.0], GestureSettings::default());
        let now = Instant::now();
        ctrl.trigger(&mut mixer, now);

        // Early polls do nothing.
        ctrl.update(&mut mixer, now + Duration::from_secs_f32(1.0));
        assert!(ctrl.is_busy());

        ctrl.update(&mut mixer, now + Duration::from_secs_f32(1.5));
        assert!(!ctrl.is_busy());
        assert!(mixer.action(0).enabled);
        assert_eq!(ctrl.pending_deadline(), None);

        // A new trigger is accepted again afterwards.
        assert!(ctrl.trigger(&mut mixer, now + Duration::from_secs_f32(2.0)));
    }

    #[test]
    fn cancel_drops_the_pending_return() {
        let (mut mixer, mut ctrl) = controller(&[2.0], GestureSettings::default());
        let now = Instant::now();
        ctrl.trigger(&mut mixer, now);
        ctrl.cancel();
        assert_eq!(ctrl.pending_deadline(), None);
        // With the timer gone the update is inert.
        ctrl.update(&mut mixer, now + Duration::from_secs(10));
        assert!(ctrl.is_busy());
    }
}
