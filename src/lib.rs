#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod frame;
pub mod queue;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{
    AnimationClip, AnimationLayer, AnimationManager, ClipSource, SteadyState, TransformData,
    TransitionDef, TransitionKind,
};
pub use errors::{KilnError, Result};
pub use frame::FrameDriver;
pub use queue::{BucketKind, RenderBucket, RenderQueue, SortPolicy};
pub use renderer::{
    ContextRegistry, RenderContext, RenderState, Renderer, ResourceTracker, StateSet, StateType,
};
pub use scene::{BoundingSphere, Camera, SceneGraph, Spatial, SpatialKey};
pub use settings::QueueSettings;
pub use utils::Timer;
