use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AnimationBuilder, Direction, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub animation: AnimationConfig,
    pub frames: FrameConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Serialisable playback parameters. Callbacks are attached separately on the
/// [`AnimationBuilder`] returned by [`AnimationConfig::builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub from: f64,
    pub to: f64,
    /// Length of one iteration in milliseconds.
    #[serde(alias = "duration")]
    pub duration_ms: f64,
    #[serde(default = "default_iteration_count")]
    pub iteration_count: u32,
    /// Name of an easing curve; unknown names fall back to linear.
    #[serde(default, alias = "timingFunction")]
    pub easing: Option<String>,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            duration_ms: 1000.0,
            iteration_count: default_iteration_count(),
            easing: None,
            direction: Direction::Normal,
        }
    }
}

impl AnimationConfig {
    pub fn builder(&self) -> AnimationBuilder {
        AnimationBuilder::from_config(self)
    }
}

fn default_iteration_count() -> u32 {
    1
}

/// Configuration for the real-time frame source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: 60 }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{AnimateError, ScriptedFrames};

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "animation": { "from": 0, "to": 10, "duration": 500 } }"#,
        )
        .unwrap();

        assert_eq!(config.animation.duration_ms, 500.0);
        assert_eq!(config.animation.iteration_count, 1);
        assert_eq!(config.animation.direction, Direction::Normal);
        assert_eq!(config.animation.easing, None);
        assert_eq!(config.frames.fps, 60);
    }

    #[test]
    fn parses_full_config() {
        let config = AppConfig::from_json_str(
            r#"{
                "animation": {
                    "from": 100,
                    "to": -100,
                    "durationMs": 250,
                    "iterationCount": 4,
                    "timingFunction": "easeOutBounce",
                    "direction": "alternate-reverse"
                },
                "frames": { "fps": 30 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.animation.iteration_count, 4);
        assert_eq!(config.animation.easing.as_deref(), Some("easeOutBounce"));
        assert_eq!(config.animation.direction, Direction::AlternateReverse);
        assert_eq!(config.frames.fps, 30);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = AppConfig::from_json_str(
            r#"{ "animation": { "from": 0, "to": 1, "duration": 1, "direction": "up" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, AnimateError::Json(_)));
    }

    #[test]
    fn config_builder_validates_on_build() {
        let config = AnimationConfig {
            duration_ms: 0.0,
            ..AnimationConfig::default()
        };
        let err = config.builder().on_transition(|_| {}).build().unwrap_err();
        assert!(matches!(err, AnimateError::InvalidConfig(_)));
    }

    #[test]
    fn config_drives_an_animation() {
        let config = AnimationConfig {
            from: 0.0,
            to: 8.0,
            duration_ms: 100.0,
            iteration_count: 2,
            easing: Some("easeInQuad".to_string()),
            direction: Direction::Alternate,
        };
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = values.clone();
        let mut animation = config
            .builder()
            .on_transition(move |tick| sink.borrow_mut().push(tick.value))
            .build()
            .unwrap();

        animation.start(ScriptedFrames::every(50.0, 1000.0));

        assert_eq!(*values.borrow(), vec![0.0, 2.0, 8.0, 6.0, 0.0]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AnimateError::Io(_)));
    }
}
