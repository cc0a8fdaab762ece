//! The animation manager: an ordered set of layers driven by one global
//! clock, merged into a single pose per update.

use crate::animation::layer::AnimationLayer;
use crate::animation::source::SourceData;
use crate::scene::SceneGraph;

/// Name of the always-present base layer.
pub const BASE_LAYER_NAME: &str = "-base-";

/// Drives every animation layer and merges their outputs.
///
/// Layers update in order, base layer first; its output snapshot is what
/// upper-layer transitions blend against. Within a layer updates are
/// strictly sequential; across layers, later layers override earlier ones
/// per target key in the merged pose.
pub struct AnimationManager {
    layers: Vec<AnimationLayer>,
    global_time: f64,
    /// Base layer output, reused every update.
    base_snapshot: SourceData,
    /// Merged output across layers, reused every update.
    pose: SourceData,
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: vec![AnimationLayer::new(BASE_LAYER_NAME)],
            global_time: 0.0,
            base_snapshot: SourceData::default(),
            pose: SourceData::default(),
        }
    }

    pub fn base_layer_mut(&mut self) -> &mut AnimationLayer {
        &mut self.layers[0]
    }

    /// Append a layer above the existing ones. A duplicate name is absorbed:
    /// both layers run, name lookup finds the first.
    pub fn add_layer(&mut self, layer: AnimationLayer) {
        if self.layers.iter().any(|l| l.name() == layer.name()) {
            log::warn!("animation layer {:?} added twice", layer.name());
        }
        self.layers.push(layer);
    }

    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&AnimationLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut AnimationLayer> {
        self.layers.iter_mut().find(|l| l.name() == name)
    }

    #[must_use]
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// Advance every layer to `global_time` and rebuild the merged pose.
    ///
    /// The clock is expected to be non-decreasing; a backward step is logged
    /// and otherwise tolerated (transition percents clamp at zero).
    pub fn update(&mut self, global_time: f64) {
        if global_time < self.global_time {
            log::debug!(
                "animation clock stepped backward: {} -> {global_time}",
                self.global_time
            );
        }
        self.global_time = global_time;

        self.layers[0].update(global_time);
        self.base_snapshot.clear();
        if let Some(data) = self.layers[0].current_source_data(global_time, None) {
            for (key, value) in data {
                self.base_snapshot.insert(key.clone(), *value);
            }
        }

        for i in 1..self.layers.len() {
            self.layers[i].update(global_time);
        }

        self.pose.clear();
        for (key, value) in &self.base_snapshot {
            self.pose.insert(key.clone(), *value);
        }
        for i in 1..self.layers.len() {
            if let Some(data) =
                self.layers[i].current_source_data(global_time, Some(&self.base_snapshot))
            {
                for (key, value) in data {
                    self.pose.insert(key.clone(), *value);
                }
            }
        }

        for layer in &mut self.layers {
            layer.fire_triggers();
        }
    }

    /// The merged pose of the last update: named target → blended transform.
    #[must_use]
    pub fn current_source_data(&self) -> &SourceData {
        &self.pose
    }

    /// Write the pose into the scene: each target name poses the spatial of
    /// the same name. Unmatched targets are left for the skinning layer
    /// above this crate.
    pub fn apply_to_scene(&self, scene: &mut SceneGraph) {
        for (target, transform) in &self.pose {
            if let Some(key) = scene.find(target) {
                if let Some(spatial) = scene.get_mut(key) {
                    spatial.world_translation = transform.translation;
                }
            }
        }
    }
}
