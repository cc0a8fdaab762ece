//! Animation states: steady states and the two-state lerp transition.
//!
//! A transition is one struct with a tagged [`TransitionKind`] selecting how
//! its percent and blended data are computed, not a hierarchy of subtypes.
//! Transitions are transient: the owning layer replaces a completed
//! transition with its destination steady state.

use rustc_hash::FxHashMap;

use crate::animation::source::{SourceData, TransformSource};
use crate::errors::{KilnError, Result};

/// Shaping applied to the raw elapsed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendStyle {
    Linear,
    SmoothStep,
}

impl BlendStyle {
    fn shape(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Which side of the blend the elapsed ramp drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Cross-fade from the calling state toward the target.
    FadeOut,
    /// The inverted ramp: the target side carries the blend, so a state
    /// fades in over whatever was playing.
    FadeIn,
    /// Blend against the base layer's current data instead of a sibling
    /// state; the catch-all for upper layers.
    Multilayer,
}

/// Static transition configuration, attached to steady states and layers.
#[derive(Debug, Clone)]
pub struct TransitionDef {
    pub target: String,
    pub duration: f64,
    pub kind: TransitionKind,
    pub style: BlendStyle,
}

impl TransitionDef {
    /// Duration must be finite and positive.
    pub fn new(
        target: impl Into<String>,
        duration: f64,
        kind: TransitionKind,
        style: BlendStyle,
    ) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(KilnError::InvalidConfiguration(format!(
                "transition duration must be finite and positive, got {duration}"
            )));
        }
        Ok(Self {
            target: target.into(),
            duration,
            kind,
            style,
        })
    }
}

/// Outcome of advancing a live transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionOutcome {
    Continue,
    Complete,
}

/// A live, self-eliminating fade between two states on one layer.
pub struct TransitionState {
    def: TransitionDef,
    /// Global time the transition was armed at.
    start: f64,
    /// The steady state being faded from; `None` when armed on an empty
    /// layer.
    state_a: Option<String>,
    /// The resolved destination steady state.
    state_b: Option<String>,
    forced: bool,
    /// Reusable blend output; cleared when the pairing is armed.
    blended: SourceData,
}

impl TransitionState {
    pub(crate) fn new(
        def: TransitionDef,
        start: f64,
        state_a: Option<String>,
        state_b: Option<String>,
    ) -> Self {
        Self {
            def,
            start,
            state_a,
            state_b,
            forced: false,
            blended: SourceData::default(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.def.target
    }

    #[must_use]
    pub fn kind(&self) -> TransitionKind {
        self.def.kind
    }

    /// Raw elapsed fraction, shaped and clamped to [0, 1].
    ///
    /// Non-decreasing for non-decreasing global time; pinned to 1 once
    /// forced.
    #[must_use]
    pub fn base_percent(&self, global_time: f64) -> f32 {
        if self.forced {
            return 1.0;
        }
        let fraction = ((global_time - self.start) / self.def.duration).clamp(0.0, 1.0) as f32;
        self.def.style.shape(fraction)
    }

    /// The percent the blend actually uses: fade-in variants ride the
    /// inverted ramp.
    #[must_use]
    pub fn effective_percent(&self, global_time: f64) -> f32 {
        let base = self.base_percent(global_time);
        match self.def.kind {
            TransitionKind::FadeIn => 1.0 - base,
            TransitionKind::FadeOut | TransitionKind::Multilayer => base,
        }
    }

    /// Treat the transition as finished now. Explicit operation, not a
    /// timeout.
    pub fn force_complete(&mut self) {
        self.forced = true;
    }

    /// Advance both side states so underlying animations keep playing, then
    /// report whether the fade has run its course.
    pub(crate) fn update(
        &mut self,
        global_time: f64,
        states: &mut FxHashMap<String, SteadyState>,
    ) -> TransitionOutcome {
        for name in [self.state_a.as_deref(), self.state_b.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(state) = states.get_mut(name) {
                state.source.set_time(global_time);
            }
        }
        if self.base_percent(global_time) >= 1.0 {
            TransitionOutcome::Complete
        } else {
            TransitionOutcome::Continue
        }
    }

    /// Blend the two sides' data into the reusable output map.
    ///
    /// Side B falls back to the base layer's current data when no sibling
    /// state backs it (the multilayer catch-all); keys present on only one
    /// side pass through unblended.
    pub(crate) fn blended_data(
        &mut self,
        global_time: f64,
        states: &FxHashMap<String, SteadyState>,
        base_data: Option<&SourceData>,
    ) -> &SourceData {
        let weight = self.effective_percent(global_time);

        // Multilayer pins side A to the base layer so the target blends in
        // over whatever is already playing below; otherwise each side falls
        // back to the base data only when it has no state of its own.
        let a_data = match self.def.kind {
            TransitionKind::Multilayer => base_data,
            _ => side_data(states, self.state_a.as_deref()).or(base_data),
        };
        let b_data = side_data(states, self.state_b.as_deref()).or(base_data);

        self.blended.clear();
        if let Some(a) = a_data {
            for (key, value) in a {
                let out = match (self.def.kind, b_data.and_then(|b| b.get(key))) {
                    (TransitionKind::FadeIn, Some(b)) => b.blend(value, weight),
                    (_, Some(b)) => value.blend(b, weight),
                    (_, None) => *value,
                };
                self.blended.insert(key.clone(), out);
            }
        }
        if let Some(b) = b_data {
            for (key, value) in b {
                if a_data.is_some_and(|a| a.contains_key(key)) {
                    continue;
                }
                self.blended.insert(key.clone(), *value);
            }
        }
        &self.blended
    }
}

fn side_data<'a>(
    states: &'a FxHashMap<String, SteadyState>,
    name: Option<&str>,
) -> Option<&'a SourceData> {
    name.and_then(|n| states.get(n))
        .map(|state| state.source.source_data())
}

/// A concrete, stand-alone animation state (vs. one that transitions
/// between two others).
pub struct SteadyState {
    name: String,
    pub(crate) source: Box<dyn TransformSource>,
    transitions: FxHashMap<String, TransitionDef>,
    end_transition: Option<TransitionDef>,
}

impl SteadyState {
    #[must_use]
    pub fn new(name: impl Into<String>, source: Box<dyn TransformSource>) -> Self {
        Self {
            name: name.into(),
            source,
            transitions: FxHashMap::default(),
            end_transition: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_transition(&mut self, key: impl Into<String>, def: TransitionDef) {
        let key = key.into();
        if self.transitions.insert(key.clone(), def).is_some() {
            log::warn!("steady state {:?}: transition key {key:?} replaced", self.name);
        }
    }

    /// A keyed transition, falling back to this state's `"*"` wildcard.
    #[must_use]
    pub fn transition_for(&self, key: &str) -> Option<&TransitionDef> {
        self.transitions.get(key).or_else(|| self.transitions.get("*"))
    }

    /// Taken when this state's source ends. `None` clears the layer instead.
    pub fn set_end_transition(&mut self, def: Option<TransitionDef>) {
        self.end_transition = def;
    }

    #[must_use]
    pub fn end_transition(&self) -> Option<&TransitionDef> {
        self.end_transition.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn TransformSource {
        self.source.as_mut()
    }
}
