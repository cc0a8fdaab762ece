//! Animation clips: keyframed transform channels plus an optional trigger
//! channel, shared immutably between any number of playing instances.

use crate::animation::TransformData;
use crate::errors::{KilnError, Result};

/// Keyframed [`TransformData`] samples for one named target.
#[derive(Debug, Clone)]
pub struct TransformChannel {
    target: String,
    times: Vec<f32>,
    values: Vec<TransformData>,
}

impl TransformChannel {
    /// Times must be non-empty, sorted ascending, and match `values` 1:1.
    pub fn new(
        target: impl Into<String>,
        times: Vec<f32>,
        values: Vec<TransformData>,
    ) -> Result<Self> {
        if times.is_empty() || times.len() != values.len() {
            return Err(KilnError::InvalidConfiguration(format!(
                "transform channel needs matching, non-empty times and values ({} vs {})",
                times.len(),
                values.len()
            )));
        }
        if times.windows(2).any(|w| w[0] > w[1]) {
            return Err(KilnError::InvalidConfiguration(
                "transform channel times must be sorted ascending".into(),
            ));
        }
        Ok(Self {
            target: target.into(),
            times,
            values,
        })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn max_time(&self) -> f32 {
        *self.times.last().expect("validated non-empty")
    }

    /// Sample at a local clip time, clamped to the channel's range.
    #[must_use]
    pub fn sample(&self, time: f32) -> TransformData {
        if time <= self.times[0] {
            return self.values[0];
        }
        if time >= self.max_time() {
            return *self.values.last().expect("validated non-empty");
        }
        // Index of the first keyframe strictly after `time`.
        let after = self.times.partition_point(|&t| t <= time);
        let before = after - 1;
        let span = self.times[after] - self.times[before];
        let fraction = if span > 0.0 {
            (time - self.times[before]) / span
        } else {
            0.0
        };
        self.values[before].blend(&self.values[after], fraction)
    }
}

/// Named event points fired as playback crosses them.
#[derive(Debug, Clone)]
pub struct TriggerChannel {
    times: Vec<f32>,
    keys: Vec<String>,
}

impl TriggerChannel {
    pub fn new(times: Vec<f32>, keys: Vec<String>) -> Result<Self> {
        if times.len() != keys.len() {
            return Err(KilnError::InvalidConfiguration(format!(
                "trigger channel needs matching times and keys ({} vs {})",
                times.len(),
                keys.len()
            )));
        }
        if times.windows(2).any(|w| w[0] > w[1]) {
            return Err(KilnError::InvalidConfiguration(
                "trigger channel times must be sorted ascending".into(),
            ));
        }
        Ok(Self { times, keys })
    }

    /// Visit the keys with time in `(from, to]`.
    pub fn keys_in_window(&self, from: f32, to: f32, mut visit: impl FnMut(&str)) {
        for (time, key) in self.times.iter().zip(&self.keys) {
            if *time > from && *time <= to {
                visit(key);
            }
        }
    }
}

/// An immutable set of channels with a derived duration.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    channels: Vec<TransformChannel>,
    trigger_channel: Option<TriggerChannel>,
    max_time: f32,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, channels: Vec<TransformChannel>) -> Self {
        let max_time = channels
            .iter()
            .map(TransformChannel::max_time)
            .fold(0.0, f32::max);
        Self {
            name: name.into(),
            channels,
            trigger_channel: None,
            max_time,
        }
    }

    #[must_use]
    pub fn with_trigger_channel(mut self, trigger_channel: TriggerChannel) -> Self {
        self.trigger_channel = Some(trigger_channel);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn channels(&self) -> &[TransformChannel] {
        &self.channels
    }

    #[must_use]
    pub fn trigger_channel(&self) -> Option<&TriggerChannel> {
        self.trigger_channel.as_ref()
    }

    /// Duration: the latest keyframe across all channels.
    #[must_use]
    pub fn max_time(&self) -> f32 {
        self.max_time
    }
}
