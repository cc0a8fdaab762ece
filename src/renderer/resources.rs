//! Context-scoped GPU resource lifetime tracking.
//!
//! A compiled GPU resource (texture, buffer object, display list) belongs to
//! an owner object the tracker must not keep alive. The owner holds an
//! [`OwnerRef`] reclaim token; dropping the token (which happens exactly
//! when the owner is dropped) sends the owner id into a reclaim channel.
//! The per-frame [`ResourceTracker::sweep`] drains that channel without
//! blocking, batches the stale handles per context, and either deletes them
//! immediately (context current, renderer at hand) or defers the batch to
//! the context's task queue.

use flume::{Receiver, Sender};
use rustc_hash::FxHashMap;

use crate::renderer::Renderer;
use crate::renderer::context::{ContextId, ContextRegistry};

/// Identity of a tracked owner object.
pub type OwnerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Vbo,
    DisplayList,
}

/// A compiled GPU resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuHandle {
    pub kind: ResourceKind,
    pub id: u32,
}

/// Reclaim token held by a resource owner.
///
/// Dropping it enqueues the owner id for the next sweep. Deliberately not
/// `Clone`: one owner, one token.
pub struct OwnerRef {
    id: OwnerId,
    reclaim: Sender<OwnerId>,
}

impl std::fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerRef").field("id", &self.id).finish()
    }
}

impl OwnerRef {
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }
}

impl Drop for OwnerRef {
    fn drop(&mut self) {
        // The tracker half of the channel outliving the send is not
        // required; a dead receiver just means nothing is left to clean.
        let _ = self.reclaim.send(self.id);
    }
}

/// One owner's handles: a single-context association until a second context
/// appears, then a per-context map.
#[derive(Debug)]
enum ContextValues {
    Single(ContextId, GpuHandle),
    Multi(FxHashMap<ContextId, GpuHandle>),
}

impl ContextValues {
    fn get(&self, context: ContextId) -> Option<GpuHandle> {
        match self {
            Self::Single(id, handle) if *id == context => Some(*handle),
            Self::Single(..) => None,
            Self::Multi(map) => map.get(&context).copied(),
        }
    }

    /// Install a handle, upgrading to multi-context mode on the second
    /// distinct context. Returns the handle replaced on the same context,
    /// which the caller must schedule for deletion.
    fn put(&mut self, context: ContextId, handle: GpuHandle) -> Option<GpuHandle> {
        match self {
            Self::Single(id, existing) if *id == context => {
                Some(std::mem::replace(existing, handle))
            }
            Self::Single(id, existing) => {
                let mut map = FxHashMap::default();
                map.insert(*id, *existing);
                map.insert(context, handle);
                *self = Self::Multi(map);
                None
            }
            Self::Multi(map) => map.insert(context, handle),
        }
    }

    fn for_each(&self, mut f: impl FnMut(ContextId, GpuHandle)) {
        match self {
            Self::Single(id, handle) => f(*id, *handle),
            Self::Multi(map) => {
                for (id, handle) in map {
                    f(*id, *handle);
                }
            }
        }
    }
}

/// Arena of owner → per-context handle associations plus the reclaim queue.
pub struct ResourceTracker {
    entries: FxHashMap<OwnerId, ContextValues>,
    reclaim_tx: Sender<OwnerId>,
    reclaim_rx: Receiver<OwnerId>,
    next_owner: OwnerId,
}

impl Default for ResourceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTracker {
    #[must_use]
    pub fn new() -> Self {
        let (reclaim_tx, reclaim_rx) = flume::unbounded();
        Self {
            entries: FxHashMap::default(),
            reclaim_tx,
            reclaim_rx,
            next_owner: 1,
        }
    }

    /// Mint the reclaim token a resource owner stores alongside itself.
    pub fn register_owner(&mut self) -> OwnerRef {
        let id = self.next_owner;
        self.next_owner += 1;
        OwnerRef {
            id,
            reclaim: self.reclaim_tx.clone(),
        }
    }

    /// Associate a compiled handle with an owner on one context.
    ///
    /// Any handle this replaces (owner re-compiled on the same context) is
    /// scheduled for deletion.
    pub fn associate(
        &mut self,
        owner: &OwnerRef,
        context: ContextId,
        handle: GpuHandle,
        registry: &mut ContextRegistry,
        renderer: Option<&mut dyn Renderer>,
    ) {
        let replaced = self
            .entries
            .entry(owner.id)
            .or_insert(ContextValues::Single(context, handle))
            .put(context, handle);
        // First insert via or_insert already holds the handle; put on a fresh
        // entry returns it back as "replaced by itself"; filter that out.
        if let Some(old) = replaced {
            if old != handle {
                schedule_deletes(vec![(context, old)], registry, renderer);
            }
        }
    }

    /// The handle compiled for `owner` on `context`, if any.
    #[must_use]
    pub fn value_for(&self, owner: &OwnerRef, context: ContextId) -> Option<GpuHandle> {
        self.entries.get(&owner.id).and_then(|v| v.get(context))
    }

    /// Explicit release (the dispose path): forget the owner's handles and
    /// schedule their deletion without waiting for the token to drop.
    pub fn release_owner(
        &mut self,
        owner: &OwnerRef,
        registry: &mut ContextRegistry,
        renderer: Option<&mut dyn Renderer>,
    ) {
        if let Some(values) = self.entries.remove(&owner.id) {
            let mut stale = Vec::new();
            values.for_each(|context, handle| stale.push((context, handle)));
            schedule_deletes(stale, registry, renderer);
        }
    }

    /// Drain the reclaim queue and schedule deletion of every handle whose
    /// owner has been dropped. Returns the number of reclaimed owners.
    ///
    /// Non-blocking; intended to run once per frame.
    pub fn sweep(
        &mut self,
        registry: &mut ContextRegistry,
        renderer: Option<&mut dyn Renderer>,
    ) -> usize {
        let mut reclaimed = 0;
        let mut stale = Vec::new();
        for owner in self.reclaim_rx.try_iter() {
            // An owner released explicitly before being dropped is absent.
            if let Some(values) = self.entries.remove(&owner) {
                values.for_each(|context, handle| stale.push((context, handle)));
                reclaimed += 1;
            }
        }
        if !stale.is_empty() {
            schedule_deletes(stale, registry, renderer);
        }
        reclaimed
    }

    /// Release every handle tied to a dying context.
    ///
    /// The context must be current: deletes run inline through the renderer.
    pub fn clean_context(&mut self, context: ContextId, renderer: &mut dyn Renderer) {
        let mut handles = Vec::new();
        self.entries.retain(|_, values| match values {
            ContextValues::Single(id, handle) => {
                if *id == context {
                    handles.push(*handle);
                    false
                } else {
                    true
                }
            }
            ContextValues::Multi(map) => {
                if let Some(handle) = map.remove(&context) {
                    handles.push(handle);
                }
                !map.is_empty()
            }
        });
        delete_batch(renderer, &handles);
    }

    /// Number of live owner associations.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}

/// Route handle deletions: inline on the current context when a renderer is
/// available, otherwise batched onto the owning context's task queue.
fn schedule_deletes(
    stale: Vec<(ContextId, GpuHandle)>,
    registry: &mut ContextRegistry,
    mut renderer: Option<&mut dyn Renderer>,
) {
    let mut per_context: FxHashMap<ContextId, Vec<GpuHandle>> = FxHashMap::default();
    for (context, handle) in stale {
        per_context.entry(context).or_default().push(handle);
    }

    for (context, handles) in per_context {
        if registry.is_current(context) {
            if let Some(renderer) = renderer.as_deref_mut() {
                delete_batch(renderer, &handles);
                continue;
            }
        }
        match registry.task_queue(context) {
            Ok(queue) => {
                queue.enqueue(Box::new(move |renderer| delete_batch(renderer, &handles)));
            }
            // The context died before its resources did; the driver loses
            // them with the context.
            Err(_) => log::warn!(
                "dropping {} stale GPU handle(s) for destroyed context {context:?}",
                handles.len()
            ),
        }
    }
}

/// One delete call per resource kind present in the batch.
fn delete_batch(renderer: &mut dyn Renderer, handles: &[GpuHandle]) {
    let mut textures = Vec::new();
    let mut vbos = Vec::new();
    let mut display_lists = Vec::new();
    for handle in handles {
        match handle.kind {
            ResourceKind::Texture => textures.push(handle.id),
            ResourceKind::Vbo => vbos.push(handle.id),
            ResourceKind::DisplayList => display_lists.push(handle.id),
        }
    }
    if !textures.is_empty() {
        renderer.delete_textures(&textures);
    }
    if !vbos.is_empty() {
        renderer.delete_vbos(&vbos);
    }
    if !display_lists.is_empty() {
        renderer.delete_display_lists(&display_lists);
    }
}
