//! Transform sources: where a steady state's pose data comes from.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;
use crate::animation::trigger::TriggerState;
use crate::animation::TransformData;

/// Named target → blended transform data, the unit every state and layer
/// produces per update.
pub type SourceData = FxHashMap<String, TransformData>;

/// How a clip instance treats its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end, clamp, and report the source ended.
    Once,
    /// Wrap around indefinitely.
    Loop,
}

/// A source of named transform data driven by global time.
pub trait TransformSource {
    /// Advance to the given global time, refreshing [`source_data`].
    ///
    /// Returns `false` once the source has ended (a `Once` clip past its
    /// last keyframe); steady states use that to arm their end transition.
    ///
    /// [`source_data`]: Self::source_data
    fn set_time(&mut self, global_time: f64) -> bool;

    /// The data sampled by the last [`set_time`](Self::set_time) call.
    fn source_data(&self) -> &SourceData;

    /// Rewind to start playing at the given global time.
    fn reset(&mut self, global_start: f64);

    fn is_active(&self) -> bool;

    /// The trigger machine for timed events, when the source has one.
    fn trigger_state(&mut self) -> Option<&mut TriggerState> {
        None
    }
}

/// A playing instance of an [`AnimationClip`].
pub struct ClipSource {
    clip: Arc<AnimationClip>,
    start_time: f64,
    time_scale: f64,
    loop_mode: LoopMode,
    active: bool,
    prev_local_time: f32,
    data: SourceData,
    trigger: TriggerState,
}

impl ClipSource {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            start_time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Loop,
            active: true,
            prev_local_time: 0.0,
            data: SourceData::default(),
            trigger: TriggerState::new(),
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Map global time onto the clip's local timeline, arming any triggers
    /// whose window this step crossed.
    fn advance(&mut self, global_time: f64) -> f32 {
        let raw = ((global_time - self.start_time) * self.time_scale).max(0.0) as f32;
        let max = self.clip.max_time();
        if max <= 0.0 {
            return 0.0;
        }

        let local = match self.loop_mode {
            LoopMode::Once => {
                if raw >= max {
                    self.active = false;
                    max
                } else {
                    raw
                }
            }
            LoopMode::Loop => raw % max,
        };

        if let Some(channel) = self.clip.trigger_channel() {
            let trigger = &mut self.trigger;
            if local >= self.prev_local_time {
                channel.keys_in_window(self.prev_local_time, local, |key| trigger.arm(key));
            } else {
                // Wrapped: finish the old lap, then the start of the new one.
                channel.keys_in_window(self.prev_local_time, max, |key| trigger.arm(key));
                channel.keys_in_window(-f32::EPSILON, local, |key| trigger.arm(key));
            }
        }
        self.prev_local_time = local;
        local
    }
}

impl TransformSource for ClipSource {
    fn set_time(&mut self, global_time: f64) -> bool {
        if !self.active {
            return false;
        }
        let local = self.advance(global_time);
        for channel in self.clip.channels() {
            let sample = channel.sample(local);
            // Keys are stable per clip; avoid re-allocating them every frame.
            match self.data.get_mut(channel.target()) {
                Some(slot) => *slot = sample,
                None => {
                    self.data.insert(channel.target().to_string(), sample);
                }
            }
        }
        self.active
    }

    fn source_data(&self) -> &SourceData {
        &self.data
    }

    fn reset(&mut self, global_start: f64) {
        self.start_time = global_start;
        self.prev_local_time = 0.0;
        self.active = true;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn trigger_state(&mut self) -> Option<&mut TriggerState> {
        Some(&mut self.trigger)
    }
}

/// Programmatic pose data: whatever the application writes in.
#[derive(Default)]
pub struct ManagedTransformSource {
    data: SourceData,
}

impl ManagedTransformSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_transform(&mut self, target: impl Into<String>, transform: TransformData) {
        self.data.insert(target.into(), transform);
    }

    pub fn clear_transform(&mut self, target: &str) {
        self.data.remove(target);
    }
}

impl TransformSource for ManagedTransformSource {
    fn set_time(&mut self, _global_time: f64) -> bool {
        true
    }

    fn source_data(&self) -> &SourceData {
        &self.data
    }

    fn reset(&mut self, _global_start: f64) {}

    fn is_active(&self) -> bool {
        true
    }
}
