//! Shared configuration for Loomcraft
//!
//! This crate provides the single source of truth for the design canvas
//! dimensions, undo history depth, and per-device pressure defaults used by
//! the drawing core and its hosts.

use serde::{Deserialize, Serialize};

/// Default design canvas width in pixels
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default design canvas height in pixels
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1000;

/// Default number of commands kept in the undo history
pub const DEFAULT_MAX_COMMANDS: usize = 100;

/// Pressure assumed for pens that report none
pub const DEFAULT_PEN_PRESSURE: f32 = 0.5;

/// Pressure assumed for touch input that reports none
pub const DEFAULT_TOUCH_PRESSURE: f32 = 0.7;

/// Pressure assumed for mice
pub const DEFAULT_MOUSE_PRESSURE: f32 = 1.0;

/// Garment loaded when a session starts
pub const DEFAULT_GARMENT: &str = "tshirt";

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("History must keep at least one command")]
    EmptyHistory,

    #[error("Default pressure for {device} out of range: {value}")]
    InvalidPressure { device: &'static str, value: f32 },
}

/// Design canvas configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in canvas pixels
    pub width: u32,
    /// Canvas height in canvas pixels
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Undo history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of commands retained; the oldest is evicted beyond this
    pub max_commands: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_commands: DEFAULT_MAX_COMMANDS,
        }
    }
}

/// Pressure substituted when the input device reports none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureDefaults {
    pub pen: f32,
    pub touch: f32,
    pub mouse: f32,
}

impl Default for PressureDefaults {
    fn default() -> Self {
        Self {
            pen: DEFAULT_PEN_PRESSURE,
            touch: DEFAULT_TOUCH_PRESSURE,
            mouse: DEFAULT_MOUSE_PRESSURE,
        }
    }
}

/// Top-level studio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub canvas: CanvasConfig,
    pub history: HistoryConfig,
    pub pressure: PressureDefaults,
    /// Garment type whose mask is activated on session start
    pub default_garment: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            history: HistoryConfig::default(),
            pressure: PressureDefaults::default(),
            default_garment: Some(DEFAULT_GARMENT.to_string()),
        }
    }
}

impl StudioConfig {
    /// Parse and validate a JSON configuration document
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that all values are usable by the drawing core
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        if self.history.max_commands == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        for (device, value) in [
            ("pen", self.pressure.pen),
            ("touch", self.pressure.touch),
            ("mouse", self.pressure.mouse),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidPressure { device, value });
            }
        }
        Ok(())
    }
}
