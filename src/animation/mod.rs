//! Skeletal animation: blend data, clips, sources, and the per-layer
//! transition state machine.

pub mod clip;
pub mod layer;
pub mod manager;
pub mod source;
pub mod state;
pub mod transform_data;
pub mod trigger;

pub use clip::{AnimationClip, TransformChannel, TriggerChannel};
pub use layer::AnimationLayer;
pub use manager::{AnimationManager, BASE_LAYER_NAME};
pub use source::{ClipSource, LoopMode, ManagedTransformSource, SourceData, TransformSource};
pub use state::{BlendStyle, SteadyState, TransitionDef, TransitionKind, TransitionState};
pub use transform_data::TransformData;
pub use trigger::TriggerState;
