//! Render state model.
//!
//! One tagged enum per applied state with a dense [`StateType`] index,
//! instead of a subclass-per-state hierarchy. Equality is what the context
//! tracker uses to elide redundant applications, so every payload derives
//! `PartialEq`.

use crate::errors::{KilnError, Result};

/// Number of distinct state types; sized for array-indexed tracking.
pub const STATE_TYPE_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateType {
    Cull,
    Blend,
    Wireframe,
    Texture,
    Light,
    ZBuffer,
}

impl StateType {
    pub const ALL: [Self; STATE_TYPE_COUNT] = [
        Self::Cull,
        Self::Blend,
        Self::Wireframe,
        Self::Texture,
        Self::Light,
        Self::ZBuffer,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Cull => 0,
            Self::Blend => 1,
            Self::Wireframe => 2,
            Self::Texture => 3,
            Self::Light => 4,
            Self::ZBuffer => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullState {
    pub enabled: bool,
    pub face: CullFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SourceAlpha,
    OneMinusSourceAlpha,
    DestinationAlpha,
    OneMinusDestinationAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub enabled: bool,
    pub source: BlendFactor,
    pub destination: BlendFactor,
}

impl BlendState {
    /// The standard source-alpha blend.
    #[must_use]
    pub fn alpha() -> Self {
        Self {
            enabled: true,
            source: BlendFactor::SourceAlpha,
            destination: BlendFactor::OneMinusSourceAlpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeState {
    pub enabled: bool,
    pub line_width: f32,
}

impl WireframeState {
    /// Line width must be finite and positive; rejected at the call site.
    pub fn with_line_width(line_width: f32) -> Result<Self> {
        if !line_width.is_finite() || line_width <= 0.0 {
            return Err(KilnError::InvalidConfiguration(format!(
                "wireframe line width must be finite and positive, got {line_width}"
            )));
        }
        Ok(Self {
            enabled: true,
            line_width,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureState {
    /// Bound texture handle, unit 0. `None` unbinds.
    pub texture: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub enabled: bool,
    pub two_sided: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunction {
    Never,
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZBufferState {
    pub writable: bool,
    pub function: CompareFunction,
}

/// An applied render state of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Cull(CullState),
    Blend(BlendState),
    Wireframe(WireframeState),
    Texture(TextureState),
    Light(LightState),
    ZBuffer(ZBufferState),
}

impl RenderState {
    #[must_use]
    pub fn state_type(&self) -> StateType {
        match self {
            Self::Cull(_) => StateType::Cull,
            Self::Blend(_) => StateType::Blend,
            Self::Wireframe(_) => StateType::Wireframe,
            Self::Texture(_) => StateType::Texture,
            Self::Light(_) => StateType::Light,
            Self::ZBuffer(_) => StateType::ZBuffer,
        }
    }

    /// The state applied when neither an enforced nor an object state exists.
    #[must_use]
    pub fn default_for(state_type: StateType) -> Self {
        match state_type {
            StateType::Cull => Self::Cull(CullState {
                enabled: false,
                face: CullFace::Back,
            }),
            StateType::Blend => Self::Blend(BlendState {
                enabled: false,
                source: BlendFactor::One,
                destination: BlendFactor::Zero,
            }),
            StateType::Wireframe => Self::Wireframe(WireframeState {
                enabled: false,
                line_width: 1.0,
            }),
            StateType::Texture => Self::Texture(TextureState { texture: None }),
            StateType::Light => Self::Light(LightState {
                enabled: false,
                two_sided: false,
            }),
            StateType::ZBuffer => Self::ZBuffer(ZBufferState {
                writable: true,
                function: CompareFunction::LessOrEqual,
            }),
        }
    }
}

/// Per-spatial render states, one optional slot per type.
#[derive(Debug, Clone, Default)]
pub struct StateSet {
    slots: [Option<RenderState>; STATE_TYPE_COUNT],
}

impl StateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a state in its type's slot, returning any previous state.
    pub fn set(&mut self, state: RenderState) -> Option<RenderState> {
        self.slots[state.state_type().index()].replace(state)
    }

    #[must_use]
    pub fn get(&self, state_type: StateType) -> Option<&RenderState> {
        self.slots[state_type.index()].as_ref()
    }

    pub fn unset(&mut self, state_type: StateType) -> Option<RenderState> {
        self.slots[state_type.index()].take()
    }
}
