//! Render-side core: state model, per-context tracking, deferred task
//! queues, resource lifetime tracking, and the consumed [`Renderer`]
//! capability.
//!
//! This crate decides *what* to submit and *which* states must change;
//! actual GPU command emission lives behind the [`Renderer`] trait and is
//! supplied by the embedding application.

pub mod context;
pub mod resources;
pub mod state;
pub mod task_queue;

pub use context::{ContextId, ContextRegistry, EnforcedScope, RenderContext};
pub use resources::{GpuHandle, OwnerRef, ResourceKind, ResourceTracker};
pub use state::{RenderState, StateSet, StateType};
pub use task_queue::{RendererTask, TaskQueue};

use crate::scene::Spatial;

/// Pixel layout for screen grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenFormat {
    Rgb8,
    Rgba8,
}

/// The GPU capability this crate consumes but does not implement.
///
/// Implementations wrap a graphics API on the thread owning the target
/// context. All methods are invoked with that context current, either
/// directly by the frame driver or through the context's task queue.
pub trait Renderer {
    /// Apply one resolved render state.
    fn apply_state(&mut self, state: &RenderState);

    /// Submit one drawable. Called in bucket order, post-sort item order.
    fn draw(&mut self, spatial: &Spatial);

    fn delete_textures(&mut self, ids: &[u32]);
    fn delete_vbos(&mut self, ids: &[u32]);
    fn delete_display_lists(&mut self, ids: &[u32]);

    /// Read back a region of the framebuffer into `buffer`.
    fn grab_screen_contents(
        &mut self,
        buffer: &mut [u8],
        format: ScreenFormat,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    );
}
