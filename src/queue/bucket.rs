use std::cmp::Ordering;

use glam::Vec3;

use crate::errors::{KilnError, Result};
use crate::queue::sort;
use crate::renderer::Renderer;
use crate::renderer::context::RenderContext;
use crate::scene::{SceneGraph, SpatialKey};

/// How a bucket orders its contents before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Submission order is insertion order.
    Unsorted,
    /// Near items first; reduces overdraw for opaque geometry.
    FrontToBack,
    /// Far items first; required for correct alpha blending.
    BackToFront,
}

impl SortPolicy {
    fn compare(self, a: f32, b: f32) -> Ordering {
        // The invalid-position sentinel sorts last under every policy, even
        // back-to-front where a real far distance would sort first.
        match (a == f32::INFINITY, b == f32::INFINITY) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self {
                Self::Unsorted => Ordering::Equal,
                Self::FrontToBack => a.total_cmp(&b),
                Self::BackToFront => b.total_cmp(&a),
            },
        }
    }
}

/// An ordered, growable collection of spatial keys for one pass category.
///
/// Buckets are created once at queue construction, filled and cleared every
/// frame, and pushed/popped transiently when a nested pass (render-to-texture
/// triggered mid-bucket) needs isolated contents on the same thread.
pub struct RenderBucket {
    sort_policy: SortPolicy,
    small_sort_cutoff: usize,
    items: Vec<SpatialKey>,
    /// Merge-sort working copy, reused across frames.
    scratch: Vec<SpatialKey>,
    /// Saved lists for nested passes.
    stack: Vec<Vec<SpatialKey>>,
    /// Spent backing arrays, reused LIFO to avoid per-pass allocation.
    pool: Vec<Vec<SpatialKey>>,
}

impl RenderBucket {
    #[must_use]
    pub fn new(sort_policy: SortPolicy, small_sort_cutoff: usize) -> Self {
        Self {
            sort_policy,
            small_sort_cutoff,
            items: Vec::new(),
            scratch: Vec::new(),
            stack: Vec::new(),
            pool: Vec::new(),
        }
    }

    pub fn add(&mut self, key: SpatialKey) {
        self.items.push(key);
    }

    /// Remove a key by linear scan, shifting later entries left.
    ///
    /// O(n); acceptable because buckets are cleared every frame and removal
    /// only happens on explicit mid-frame detach.
    pub fn remove(&mut self, key: SpatialKey) -> bool {
        match self.items.iter().position(|k| *k == key) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpatialKey> + '_ {
        self.items.iter().copied()
    }

    /// Order the bucket contents for submission.
    ///
    /// First fills every live spatial's per-frame distance cache, then sorts
    /// the key list against those cached values. Keys whose spatial has been
    /// removed since enqueue sort last and are logged.
    pub fn sort(&mut self, scene: &mut SceneGraph, camera_position: Vec3) {
        if self.items.len() <= 1 || self.sort_policy == SortPolicy::Unsorted {
            return;
        }

        for key in &self.items {
            match scene.get_mut(*key) {
                Some(spatial) => {
                    spatial.distance_to_camera(camera_position);
                }
                None => log::warn!("stale spatial key in render bucket; sorting it last"),
            }
        }

        let policy = self.sort_policy;
        let distance = |key: SpatialKey| -> f32 {
            scene
                .get(key)
                .map_or(f32::INFINITY, |s| s.cached_distance)
        };
        sort::sort(
            &mut self.items,
            &mut self.scratch,
            self.small_sort_cutoff,
            &mut |a, b| policy.compare(distance(*a), distance(*b)),
        );
    }

    /// Submit every item in current list order. No further reordering.
    ///
    /// Per item, the context tracker resolves which render states actually
    /// changed; only those are applied before the draw.
    pub fn render(
        &self,
        scene: &SceneGraph,
        context: &mut RenderContext,
        renderer: &mut dyn Renderer,
    ) {
        for key in &self.items {
            let Some(spatial) = scene.get(*key) else {
                log::warn!("stale spatial key in render bucket; skipping draw");
                continue;
            };
            for state in context.resolve_states(&spatial.states) {
                renderer.apply_state(&state);
            }
            renderer.draw(spatial);
        }
    }

    /// Save the live list and swap in a fresh one for a nested pass.
    pub fn push_bucket(&mut self) {
        let fresh = self.pool.pop().unwrap_or_default();
        let saved = std::mem::replace(&mut self.items, fresh);
        self.stack.push(saved);
    }

    /// Restore the list saved by the matching [`push_bucket`](Self::push_bucket).
    ///
    /// The nested pass's backing array is cleared and returned to the pool.
    pub fn pop_bucket(&mut self) -> Result<()> {
        let Some(saved) = self.stack.pop() else {
            return Err(KilnError::BucketStackUnderflow);
        };
        let mut spent = std::mem::replace(&mut self.items, saved);
        spent.clear();
        self.pool.push(spent);
        Ok(())
    }

    /// Nesting depth of pushed passes.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}
