//! Queue configuration.
//!
//! An explicit settings value handed to [`RenderQueue::new`]; there is no
//! process-global configuration state.
//!
//! [`RenderQueue::new`]: crate::queue::RenderQueue::new

use crate::errors::{KilnError, Result};
use crate::queue::{BucketKind, SMALL_SORT_CUTOFF, SortPolicy};

/// Bucket order and per-bucket sort policies.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Total render order of the buckets. Must be duplicate-free and name
    /// only queueable kinds.
    pub bucket_order: Vec<BucketKind>,
    /// Opaque geometry can trade sort cost against overdraw.
    pub opaque_sort: SortPolicy,
    /// Transparent geometry must stay back-to-front for correct blending.
    pub transparent_sort: SortPolicy,
    /// Item count at or below which buckets shell-sort in place.
    pub small_sort_cutoff: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            bucket_order: vec![
                BucketKind::Pre,
                BucketKind::Opaque,
                BucketKind::Transparent,
                BucketKind::Ortho,
                BucketKind::Post,
            ],
            opaque_sort: SortPolicy::FrontToBack,
            transparent_sort: SortPolicy::BackToFront,
            small_sort_cutoff: SMALL_SORT_CUTOFF,
        }
    }
}

impl QueueSettings {
    pub fn validate(&self) -> Result<()> {
        if self.bucket_order.is_empty() {
            return Err(KilnError::InvalidConfiguration(
                "bucket order must not be empty".into(),
            ));
        }
        for (i, kind) in self.bucket_order.iter().enumerate() {
            if !kind.is_queueable() {
                return Err(KilnError::UnqueueableBucket(*kind));
            }
            if self.bucket_order[..i].contains(kind) {
                return Err(KilnError::InvalidConfiguration(format!(
                    "bucket kind {kind:?} listed more than once"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn sort_policy_for(&self, kind: BucketKind) -> SortPolicy {
        match kind {
            BucketKind::Opaque => self.opaque_sort,
            BucketKind::Transparent => self.transparent_sort,
            _ => SortPolicy::Unsorted,
        }
    }
}
