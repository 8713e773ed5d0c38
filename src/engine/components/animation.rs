#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationType {
    Translation,
    Rotation,
    Scale,
}

/// One sampler track of a clip: keyframe times plus flat keyframe data for
/// a single property of a single target node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub target: u32,
    pub target_name: String,
    pub animation_type: AnimationType,
    pub times: Vec<f32>,
    pub data: Vec<f32>,
}

impl AnimationChannel {
    pub fn components(&self) -> usize {
        match self.animation_type {
            AnimationType::Translation | AnimationType::Scale => 3,
            AnimationType::Rotation => 4,
        }
    }

    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Sample the channel at `time` (clamped to the keyframe range) into
    /// `out`. Keyframes are linearly interpolated.
    pub fn sample(&self, time: f32, out: &mut [f32; 4]) {
        if self.times.is_empty() {
            return;
        }

        let mut last_timestep = 0;
        for (i, &t) in self.times.iter().enumerate().rev() {
            if time >= t {
                last_timestep = i;
                break;
            }
        }

        let next_timestep = if last_timestep + 1 < self.times.len() {
            last_timestep + 1
        } else {
            last_timestep
        };

        let components = self.components();
        let last_data = &self.data[last_timestep * components..(last_timestep + 1) * components];
        let next_data = &self.data[next_timestep * components..(next_timestep + 1) * components];

        let last_time = self.times[last_timestep];
        let next_time = self.times[next_timestep];
        let t = if next_time != last_time {
            ((time - last_time) / (next_time - last_time)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        for i in 0..components {
            out[i] = crate::engine::utils::math::lerp(last_data[i], next_data[i], t);
        }
    }
}

/// A named, time-bounded set of keyframe channels loaded once from the
/// asset.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Self {
        let duration = channels
            .iter()
            .map(|c| c.duration())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Remove every channel targeting one of the given joints, matched by
    /// the node name recorded in the channel rather than by track position
    /// in the source file. Pointer tracking owns those joints; leaving
    /// their channels in place would make clip playback fight the pointer.
    pub fn strip_joints(&mut self, joints: &[&str]) {
        self.channels
            .retain(|c| !joints.contains(&c.target_name.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(target: u32, name: &str, animation_type: AnimationType) -> AnimationChannel {
        let components = match animation_type {
            AnimationType::Rotation => 4,
            _ => 3,
        };
        AnimationChannel {
            target,
            target_name: name.to_string(),
            animation_type,
            times: vec![0.0, 1.0, 2.0],
            data: vec![0.0; components * 3],
        }
    }

    #[test]
    fn clip_duration_is_longest_channel() {
        let mut long = channel(0, "mixamorigHips", AnimationType::Translation);
        long.times = vec![0.0, 3.5];
        long.data = vec![0.0; 6];
        let clip = AnimationClip::new(
            "wave",
            vec![channel(1, "mixamorigNeck", AnimationType::Rotation), long],
        );
        assert_eq!(clip.duration, 3.5);
    }

    #[test]
    fn strip_joints_matches_by_name_not_track_order() {
        let mut clip = AnimationClip::new(
            "wave",
            vec![
                channel(3, "mixamorigHips", AnimationType::Translation),
                channel(7, "mixamorigNeck", AnimationType::Rotation),
                channel(5, "mixamorigSpine", AnimationType::Rotation),
                channel(7, "mixamorigNeck", AnimationType::Scale),
                channel(9, "mixamorigHead", AnimationType::Rotation),
            ],
        );
        clip.strip_joints(&["mixamorigNeck", "mixamorigSpine"]);
        let remaining: Vec<&str> = clip.channels.iter().map(|c| c.target_name.as_str()).collect();
        assert_eq!(remaining, vec!["mixamorigHips", "mixamorigHead"]);
    }

    #[test]
    fn sample_interpolates_between_keyframes() {
        let mut chan = channel(0, "mixamorigHips", AnimationType::Translation);
        chan.data = vec![
            0.0, 0.0, 0.0, //
            2.0, 4.0, 6.0, //
            2.0, 4.0, 6.0,
        ];
        let mut out = [0.0; 4];
        chan.sample(0.5, &mut out);
        assert_eq!(&out[..3], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn sample_clamps_past_the_end() {
        let mut chan = channel(0, "mixamorigHips", AnimationType::Translation);
        chan.data = vec![
            0.0, 0.0, 0.0, //
            1.0, 1.0, 1.0, //
            5.0, 5.0, 5.0,
        ];
        let mut out = [0.0; 4];
        chan.sample(10.0, &mut out);
        assert_eq!(&out[..3], &[5.0, 5.0, 5.0]);
    }
}
