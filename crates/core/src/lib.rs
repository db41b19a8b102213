//! Core library for the Animate interpolation engine.
//!
//! An [`Animation`] turns elapsed frame time into a progress fraction and an
//! eased value over a numeric range, handing both to a transition callback
//! once per frame. The [`FrameLoop`] in [`timeline`] pumps timestamps from a
//! [`FrameSource`] into the animation and obeys the [`Signal`] it returns,
//! while [`easing`] provides the named progress curves.

pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod timeline;

pub use animation::{Animation, AnimationBuilder, Controls, Direction, PlaybackState, Tick};
pub use config::{AnimationConfig, AppConfig, FrameConfig};
pub use easing::{Easing, TimingFunction};
pub use error::{AnimateError, Result};
pub use timeline::{FrameLoop, FrameSource, PlaybackClock, ScriptedFrames, Signal};
