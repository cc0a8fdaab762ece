//! The frame driver: one synchronous pass over the whole core.
//!
//! Order per frame: advance the clock, update and apply animation, enqueue
//! visible spatials, sort buckets, submit them in bucket order, clear, then
//! drain the current context's deferred work and sweep reclaimed resources.
//! Everything here runs on the single logical render thread.

use crate::animation::AnimationManager;
use crate::errors::Result;
use crate::queue::{BucketKind, RenderQueue};
use crate::renderer::context::{ContextId, ContextRegistry};
use crate::renderer::resources::ResourceTracker;
use crate::renderer::Renderer;
use crate::scene::{Camera, SceneGraph};
use crate::settings::QueueSettings;
use crate::utils::Timer;

pub struct FrameDriver {
    pub timer: Timer,
    pub queue: RenderQueue,
    /// Bucket spatials land in when their hint is `Inherit`.
    pub inherit_default: BucketKind,
}

impl FrameDriver {
    pub fn new(settings: &QueueSettings) -> Result<Self> {
        Ok(Self {
            timer: Timer::new(),
            queue: RenderQueue::new(settings)?,
            inherit_default: BucketKind::Opaque,
        })
    }

    /// Run one frame against the given context.
    pub fn run_frame(
        &mut self,
        scene: &mut SceneGraph,
        camera: &Camera,
        animation: &mut AnimationManager,
        registry: &mut ContextRegistry,
        resources: &mut ResourceTracker,
        context_id: ContextId,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        self.timer.tick();

        animation.update(self.timer.elapsed_seconds());
        animation.apply_to_scene(scene);

        let keys: Vec<_> = scene
            .iter()
            .filter(|(_, spatial)| spatial.visible)
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.queue.enqueue(scene, key, self.inherit_default)?;
        }

        self.queue.sort_all(scene, camera.position);

        registry.make_current(context_id)?;
        let context = registry.context_mut(context_id)?;
        self.queue.render_all(scene, context, renderer);
        self.queue.clear_all();

        registry.execute_tasks(context_id, renderer)?;
        resources.sweep(registry, Some(renderer));
        Ok(())
    }
}
