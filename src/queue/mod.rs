//! Render queue: per-kind buckets rendered in a configured total order.
//!
//! Each frame the scene's drawable spatials are enqueued by bucket kind,
//! sorted per bucket policy, submitted in bucket order, and cleared. Nested
//! passes (a render target populated mid-frame) isolate their contents with
//! [`RenderQueue::push_all`] / [`RenderQueue::pop_all`].

pub mod bucket;
pub(crate) mod sort;

use glam::Vec3;

use crate::errors::{KilnError, Result};
use crate::renderer::Renderer;
use crate::renderer::context::RenderContext;
use crate::scene::{SceneGraph, SpatialKey};
use crate::settings::QueueSettings;

pub use bucket::{RenderBucket, SortPolicy};
pub use sort::SMALL_SORT_CUTOFF;

/// Bucket categories.
///
/// The first five are real buckets; `Inherit` and `Skip` are scene hints
/// resolved at enqueue time and can never hold items themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Pre,
    Opaque,
    Transparent,
    Ortho,
    Post,
    Inherit,
    Skip,
}

impl BucketKind {
    /// Whether this kind names an actual bucket.
    #[must_use]
    pub fn is_queueable(self) -> bool {
        !matches!(self, Self::Inherit | Self::Skip)
    }
}

/// The set of render buckets, iterated in the configured order.
pub struct RenderQueue {
    buckets: Vec<(BucketKind, RenderBucket)>,
}

impl RenderQueue {
    /// Build the queue from validated settings.
    pub fn new(settings: &QueueSettings) -> Result<Self> {
        settings.validate()?;
        let buckets = settings
            .bucket_order
            .iter()
            .map(|&kind| {
                let bucket = RenderBucket::new(
                    settings.sort_policy_for(kind),
                    settings.small_sort_cutoff,
                );
                (kind, bucket)
            })
            .collect();
        Ok(Self { buckets })
    }

    #[must_use]
    pub fn bucket(&self, kind: BucketKind) -> Option<&RenderBucket> {
        self.buckets
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, b)| b)
    }

    pub fn bucket_mut(&mut self, kind: BucketKind) -> Option<&mut RenderBucket> {
        self.buckets
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, b)| b)
    }

    /// Append a spatial to the bucket its hint resolves to.
    ///
    /// `Skip` spatials are left out. `Inherit` resolves to `inherit_default`,
    /// which must itself name a real bucket. Enqueueing resets the spatial's
    /// cached camera distance so the new frame recomputes it.
    pub fn enqueue(
        &mut self,
        scene: &mut SceneGraph,
        key: SpatialKey,
        inherit_default: BucketKind,
    ) -> Result<()> {
        let Some(spatial) = scene.get_mut(key) else {
            log::warn!("enqueue of a removed spatial ignored");
            return Ok(());
        };

        let kind = match spatial.bucket {
            BucketKind::Skip => return Ok(()),
            BucketKind::Inherit => inherit_default,
            kind => kind,
        };
        if !kind.is_queueable() {
            return Err(KilnError::UnqueueableBucket(kind));
        }

        spatial.reset_distance();
        match self.bucket_mut(kind) {
            Some(bucket) => {
                bucket.add(key);
                Ok(())
            }
            // A queueable kind missing from the configured order.
            None => Err(KilnError::UnqueueableBucket(kind)),
        }
    }

    /// Remove a spatial from whichever bucket holds it (explicit detach).
    pub fn remove(&mut self, key: SpatialKey) -> bool {
        self.buckets.iter_mut().any(|(_, b)| b.remove(key))
    }

    pub fn sort_all(&mut self, scene: &mut SceneGraph, camera_position: Vec3) {
        for (_, bucket) in &mut self.buckets {
            bucket.sort(scene, camera_position);
        }
    }

    /// Render buckets in configured order; within a bucket, post-sort order.
    pub fn render_all(
        &self,
        scene: &SceneGraph,
        context: &mut RenderContext,
        renderer: &mut dyn Renderer,
    ) {
        for (_, bucket) in &self.buckets {
            bucket.render(scene, context, renderer);
        }
    }

    pub fn clear_all(&mut self) {
        for (_, bucket) in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn push_all(&mut self) {
        for (_, bucket) in &mut self.buckets {
            bucket.push_bucket();
        }
    }

    pub fn pop_all(&mut self) -> Result<()> {
        for (_, bucket) in &mut self.buckets {
            bucket.pop_bucket()?;
        }
        Ok(())
    }

    /// Total item count across buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|(_, b)| b.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
