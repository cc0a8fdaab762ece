use smallvec::SmallVec;

/// Listener invoked once per fired trigger key.
pub type TriggerListener = Box<dyn FnMut(&str)>;

/// Arm/fire/disarm state machine for timed animation events.
///
/// Sampling a clip arms the keys whose window the sample crossed; the
/// animation manager fires armed keys once per update, after every layer has
/// advanced, then the machine disarms itself.
#[derive(Default)]
pub struct TriggerState {
    armed: SmallVec<[String; 2]>,
    listeners: Vec<TriggerListener>,
}

impl TriggerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a key. Multiple keys armed between firings accumulate.
    pub fn arm(&mut self, key: impl Into<String>) {
        self.armed.push(key.into());
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        !self.armed.is_empty()
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Notify every listener of every armed key, then disarm.
    pub fn fire_armed(&mut self) {
        if self.armed.is_empty() {
            return;
        }
        let armed = std::mem::take(&mut self.armed);
        for key in &armed {
            for listener in &mut self.listeners {
                listener(key);
            }
        }
    }

    /// Drop armed keys without notifying.
    pub fn disarm(&mut self) {
        self.armed.clear();
    }
}

impl std::fmt::Debug for TriggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerState")
            .field("armed", &self.armed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
