use glam::Vec3;

use crate::queue::BucketKind;
use crate::renderer::state::StateSet;
use crate::scene::BoundingSphere;

/// Sentinel meaning "not computed this frame".
pub(crate) const DISTANCE_UNKNOWN: f32 = f32::NEG_INFINITY;

/// A drawable scene element.
///
/// The scene graph owns spatials; render buckets hold only their keys for the
/// duration of one frame. World transforms are resolved by the caller before
/// submission; this core does not compute them.
#[derive(Debug)]
pub struct Spatial {
    pub name: String,
    pub world_translation: Vec3,
    pub bound: Option<BoundingSphere>,
    /// Per-object render states, overridden by any enforced context state.
    pub states: StateSet,
    /// Which bucket this spatial is queued into. `Inherit` resolves to the
    /// enqueue-time default; `Skip` keeps it out of the queue entirely.
    pub bucket: BucketKind,
    pub visible: bool,

    /// Camera distance cached for the current frame.
    pub(crate) cached_distance: f32,
}

impl Spatial {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world_translation: Vec3::ZERO,
            bound: None,
            states: StateSet::new(),
            bucket: BucketKind::Inherit,
            visible: true,
            cached_distance: DISTANCE_UNKNOWN,
        }
    }

    /// Invalidate the distance cache so the next sort recomputes it.
    pub(crate) fn reset_distance(&mut self) {
        self.cached_distance = DISTANCE_UNKNOWN;
    }

    /// Camera distance for sorting, cached per frame.
    ///
    /// Falls back from bounding-volume edge distance to raw translation
    /// distance. An invalid (non-finite) position yields `f32::INFINITY` so
    /// the spatial sorts after every finite-distance item instead of
    /// poisoning the comparator.
    pub fn distance_to_camera(&mut self, camera_position: Vec3) -> f32 {
        if self.cached_distance != DISTANCE_UNKNOWN {
            return self.cached_distance;
        }

        let distance = match self.bound {
            Some(bound) if bound.is_valid() => bound.distance_to_edge(camera_position),
            _ if self.world_translation.is_finite() => {
                self.world_translation.distance(camera_position)
            }
            _ => f32::INFINITY,
        };

        // NaN can still leak out of arithmetic on exotic inputs; sort last.
        let distance = if distance.is_nan() {
            f32::INFINITY
        } else {
            distance
        };
        self.cached_distance = distance;
        distance
    }
}
