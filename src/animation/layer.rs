//! Animation layers: independent per-layer state machines.
//!
//! A layer is in at most one state at a time: a steady state or a live
//! transition. The layer stores the *name* of a current steady state rather
//! than a pointer to it; a completed transition rewrites that name, which is
//! how transitions eliminate themselves without aliasing the states they
//! fade between.

use rustc_hash::FxHashMap;

use crate::animation::source::SourceData;
use crate::animation::state::{
    SteadyState, TransitionDef, TransitionOutcome, TransitionState,
};

/// The layer's current occupant.
enum LayerState {
    Steady(String),
    Transition(TransitionState),
}

/// What an update decided to do with the current state; applied after the
/// borrow on it ends.
enum NextState {
    Keep,
    Clear,
    Arm(TransitionDef, Option<String>),
    Replace(String),
}

pub struct AnimationLayer {
    name: String,
    steady_states: FxHashMap<String, SteadyState>,
    /// Layer-wide transitions, consulted after the current state's own map;
    /// `"*"` is the wildcard key.
    transitions: FxHashMap<String, TransitionDef>,
    current: Option<LayerState>,
    /// The interactive variant: a request against an empty layer enters the
    /// named steady state directly instead of requiring a transition.
    transition_on_empty: bool,
}

impl AnimationLayer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steady_states: FxHashMap::default(),
            transitions: FxHashMap::default(),
            current: None,
            transition_on_empty: false,
        }
    }

    /// The interactive variant used for player-driven layers.
    #[must_use]
    pub fn interactive(name: impl Into<String>) -> Self {
        let mut layer = Self::new(name);
        layer.transition_on_empty = true;
        layer
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_steady_state(&mut self, state: SteadyState) {
        let key = state.name().to_string();
        if self.steady_states.insert(key.clone(), state).is_some() {
            log::warn!("layer {:?}: steady state {key:?} replaced", self.name);
        }
    }

    #[must_use]
    pub fn steady_state(&self, name: &str) -> Option<&SteadyState> {
        self.steady_states.get(name)
    }

    pub fn steady_state_mut(&mut self, name: &str) -> Option<&mut SteadyState> {
        self.steady_states.get_mut(name)
    }

    pub fn add_transition(&mut self, key: impl Into<String>, def: TransitionDef) {
        let key = key.into();
        if self.transitions.insert(key.clone(), def).is_some() {
            log::warn!("layer {:?}: transition key {key:?} replaced", self.name);
        }
    }

    /// Force the current state to a named steady state.
    ///
    /// A name this layer does not know is logged and leaves the layer
    /// unchanged. `rewind` restarts the state's source at `global_time`.
    pub fn set_current_state(&mut self, name: &str, rewind: bool, global_time: f64) -> bool {
        let Some(state) = self.steady_states.get_mut(name) else {
            log::warn!("layer {:?}: no steady state named {name:?}", self.name);
            return false;
        };
        if rewind {
            state.source.reset(global_time);
        }
        self.current = Some(LayerState::Steady(name.to_string()));
        true
    }

    pub fn clear_current_state(&mut self) {
        self.current = None;
    }

    /// The current steady state's name, when not transitioning.
    #[must_use]
    pub fn current_state_name(&self) -> Option<&str> {
        match &self.current {
            Some(LayerState::Steady(name)) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(&self.current, Some(LayerState::Transition(_)))
    }

    /// The live transition, when one is in flight.
    #[must_use]
    pub fn current_transition(&self) -> Option<&TransitionState> {
        match &self.current {
            Some(LayerState::Transition(transition)) => Some(transition),
            _ => None,
        }
    }

    /// Force a live transition to finish on the next update.
    pub fn force_complete_transition(&mut self) {
        if let Some(LayerState::Transition(transition)) = &mut self.current {
            transition.force_complete();
        }
    }

    /// Request a keyed transition.
    ///
    /// Lookup order: the current steady state's own transitions, then the
    /// layer map, then the layer's `"*"` wildcard. Requests are ignored
    /// while a transition is live. On an empty layer, the interactive
    /// variant enters the steady state named by `key` directly; otherwise
    /// only layer/wildcard transitions apply.
    pub fn transition_to(&mut self, key: &str, global_time: f64) -> bool {
        let next = match &self.current {
            Some(LayerState::Transition(_)) => {
                log::debug!("layer {:?}: transition request {key:?} ignored mid-fade", self.name);
                return false;
            }
            Some(LayerState::Steady(name)) => {
                let def = self
                    .steady_states
                    .get(name)
                    .and_then(|state| state.transition_for(key))
                    .or_else(|| self.layer_transition_for(key));
                match def {
                    Some(def) => NextState::Arm(def.clone(), Some(name.clone())),
                    None => {
                        log::warn!(
                            "layer {:?}: no transition {key:?} from state {name:?}",
                            self.name
                        );
                        NextState::Keep
                    }
                }
            }
            None => {
                if self.transition_on_empty && self.steady_states.contains_key(key) {
                    return self.set_current_state(key, true, global_time);
                }
                match self.layer_transition_for(key) {
                    Some(def) => NextState::Arm(def.clone(), None),
                    None => {
                        log::warn!("layer {:?}: no transition {key:?} from empty", self.name);
                        NextState::Keep
                    }
                }
            }
        };
        self.apply_next(next, global_time)
    }

    fn layer_transition_for(&self, key: &str) -> Option<&TransitionDef> {
        self.transitions.get(key).or_else(|| self.transitions.get("*"))
    }

    /// Advance the layer's state machine.
    pub fn update(&mut self, global_time: f64) {
        let next = match &mut self.current {
            None => NextState::Keep,
            Some(LayerState::Steady(name)) => match self.steady_states.get_mut(name.as_str()) {
                None => {
                    log::warn!("layer {:?}: current state {name:?} vanished", self.name);
                    NextState::Clear
                }
                Some(state) => {
                    if state.source.set_time(global_time) {
                        NextState::Keep
                    } else if let Some(def) = state.end_transition().cloned() {
                        NextState::Arm(def, Some(name.clone()))
                    } else {
                        // Source ended with nowhere to go.
                        NextState::Clear
                    }
                }
            },
            Some(LayerState::Transition(transition)) => {
                match transition.update(global_time, &mut self.steady_states) {
                    TransitionOutcome::Continue => NextState::Keep,
                    TransitionOutcome::Complete => NextState::Replace(transition.target().to_string()),
                }
            }
        };
        self.apply_next(next, global_time);
    }

    fn apply_next(&mut self, next: NextState, global_time: f64) -> bool {
        match next {
            NextState::Keep => false,
            NextState::Clear => {
                self.current = None;
                false
            }
            NextState::Arm(def, from) => {
                if !self.steady_states.contains_key(&def.target) {
                    log::warn!(
                        "layer {:?}: transition target {:?} not found; staying put",
                        self.name,
                        def.target
                    );
                    return false;
                }
                let target = def.target.clone();
                self.current = Some(LayerState::Transition(TransitionState::new(
                    def,
                    global_time,
                    from,
                    Some(target),
                )));
                true
            }
            // A completed transition replaces itself with its destination.
            NextState::Replace(target) => {
                if self.steady_states.contains_key(&target) {
                    self.current = Some(LayerState::Steady(target));
                } else {
                    log::warn!(
                        "layer {:?}: transition completed into missing state {target:?}",
                        self.name
                    );
                    self.current = None;
                }
                true
            }
        }
    }

    /// The layer's output for the current update.
    pub fn current_source_data(&mut self, global_time: f64, base_data: Option<&SourceData>) -> Option<&SourceData> {
        let states = &self.steady_states;
        match &mut self.current {
            None => None,
            Some(LayerState::Steady(name)) => {
                states.get(name.as_str()).map(|state| state.source.source_data())
            }
            Some(LayerState::Transition(transition)) => {
                Some(transition.blended_data(global_time, states, base_data))
            }
        }
    }

    /// Fire any timed-event triggers armed by this update.
    pub fn fire_triggers(&mut self) {
        for state in self.steady_states.values_mut() {
            if let Some(trigger) = state.source_mut().trigger_state() {
                trigger.fire_armed();
            }
        }
    }
}
