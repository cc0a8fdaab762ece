//! Scene elements: the spatial arena the render queue draws from.
//!
//! Spatials arrive here with resolved world transforms and bounding volumes;
//! transform propagation belongs to the scene-graph layer above this crate.

pub mod bounds;
pub mod spatial;

use glam::Vec3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

pub use bounds::BoundingSphere;
pub use spatial::Spatial;

slotmap::new_key_type! {
    /// Stable, non-owning handle to a [`Spatial`] in a [`SceneGraph`].
    pub struct SpatialKey;
}

/// The distance reference point for queue sorting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Camera {
    pub position: Vec3,
}

/// Owning arena of spatials with a name index.
#[derive(Default)]
pub struct SceneGraph {
    spatials: SlotMap<SpatialKey, Spatial>,
    by_name: FxHashMap<String, SpatialKey>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spatial, indexing it by name.
    ///
    /// A duplicate name is absorbed: the index now points at the new spatial
    /// and the collision is logged.
    pub fn insert(&mut self, spatial: Spatial) -> SpatialKey {
        let name = spatial.name.clone();
        let key = self.spatials.insert(spatial);
        if let Some(old) = self.by_name.insert(name.clone(), key) {
            if self.spatials.contains_key(old) {
                log::warn!("duplicate spatial name {name:?}; name now resolves to the new spatial");
            }
        }
        key
    }

    pub fn remove(&mut self, key: SpatialKey) -> Option<Spatial> {
        let spatial = self.spatials.remove(key)?;
        if self.by_name.get(&spatial.name) == Some(&key) {
            self.by_name.remove(&spatial.name);
        }
        Some(spatial)
    }

    #[must_use]
    pub fn get(&self, key: SpatialKey) -> Option<&Spatial> {
        self.spatials.get(key)
    }

    pub fn get_mut(&mut self, key: SpatialKey) -> Option<&mut Spatial> {
        self.spatials.get_mut(key)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<SpatialKey> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpatialKey, &Spatial)> {
        self.spatials.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SpatialKey, &mut Spatial)> {
        self.spatials.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spatials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spatials.is_empty()
    }
}
