pub mod advance;
pub mod blob;
pub mod collision;
pub mod color;
pub mod error;
pub mod frame;
pub mod host;
pub mod logging;
pub mod merge;
pub mod render;
pub mod settings;
pub mod slime;
pub mod trail;

pub use error::{EffectError, Result};
pub use frame::{Effect, EffectOptions};
pub use host::{Frame, FrameSource, InputEvent, Metrics, ScriptedFrames};
pub use settings::{EffectConfig, SlimeConfig, TrailConfig};
