//! Brush settings and built-in presets
//!
//! [`BrushSettings`] is a plain value: strokes snapshot it at start so that
//! later edits to the active tool never reach an in-flight stroke.

use serde::{Deserialize, Serialize};

use crate::surface::TRANSPARENT;
use crate::types::{BlendMode, BrushType};

/// Configuration of one drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushSettings {
    #[serde(rename = "type")]
    pub brush_type: BrushType,
    /// Diameter in pixels
    pub size: f32,
    /// Base opacity 0.0-1.0
    pub opacity: f32,
    /// Paint flow 0.0-1.0
    pub flow: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard edge
    pub hardness: f32,
    /// Minimum distance between stored points as a fraction of size
    pub spacing: f32,
    /// How strongly pressure modulates size
    pub pressure_size_multiplier: f32,
    /// How strongly pressure modulates opacity
    pub pressure_opacity_multiplier: f32,
    /// Input smoothing 0.0-1.0
    pub smoothing: f32,
    pub blend_mode: BlendMode,
    /// Straight RGBA, ignored by the eraser
    pub color: [f32; 4],
}

impl Default for BrushSettings {
    fn default() -> Self {
        BrushPreset::Pencil.settings()
    }
}

impl BrushSettings {
    /// Copy with every field forced into its valid range
    pub fn normalized(mut self) -> Self {
        self.size = self.size.max(0.1);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.flow = self.flow.clamp(0.0, 1.0);
        self.hardness = self.hardness.clamp(0.0, 1.0);
        self.spacing = self.spacing.clamp(0.0, 1.0);
        self.smoothing = self.smoothing.clamp(0.0, 1.0);
        self.pressure_size_multiplier = self.pressure_size_multiplier.max(0.0);
        self.pressure_opacity_multiplier = self.pressure_opacity_multiplier.max(0.0);
        for c in &mut self.color {
            *c = c.clamp(0.0, 1.0);
        }
        self
    }

    /// Distance a new sample must travel before it is stored
    #[inline]
    pub fn spacing_distance(&self) -> f32 {
        self.size * self.spacing
    }

    #[inline]
    pub fn is_eraser(&self) -> bool {
        self.brush_type == BrushType::Eraser
    }

    /// Blend mode actually used for rendering
    ///
    /// Erasers always punch transparency; otherwise `override_mode` wins over
    /// the configured mode.
    pub fn effective_blend_mode(&self, override_mode: Option<BlendMode>) -> BlendMode {
        if self.is_eraser() {
            BlendMode::DestinationOut
        } else {
            override_mode.unwrap_or(self.blend_mode)
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Named built-in brush configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushPreset {
    Pencil,
    Marker,
    Spray,
    Eraser,
}

impl BrushPreset {
    pub const ALL: [BrushPreset; 4] = [
        BrushPreset::Pencil,
        BrushPreset::Marker,
        BrushPreset::Spray,
        BrushPreset::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BrushPreset::Pencil => "pencil",
            BrushPreset::Marker => "marker",
            BrushPreset::Spray => "spray",
            BrushPreset::Eraser => "eraser",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }

    /// The preset's settings
    pub fn settings(self) -> BrushSettings {
        match self {
            BrushPreset::Pencil => BrushSettings {
                brush_type: BrushType::Pencil,
                size: 3.0,
                opacity: 1.0,
                flow: 1.0,
                hardness: 1.0,
                spacing: 0.05,
                pressure_size_multiplier: 0.5,
                pressure_opacity_multiplier: 0.2,
                smoothing: 0.3,
                blend_mode: BlendMode::Normal,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            BrushPreset::Marker => BrushSettings {
                brush_type: BrushType::Marker,
                size: 12.0,
                opacity: 0.8,
                flow: 0.9,
                hardness: 0.7,
                spacing: 0.1,
                pressure_size_multiplier: 0.3,
                pressure_opacity_multiplier: 0.1,
                smoothing: 0.5,
                blend_mode: BlendMode::Multiply,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            BrushPreset::Spray => BrushSettings {
                brush_type: BrushType::Spray,
                size: 24.0,
                opacity: 0.35,
                flow: 0.6,
                hardness: 0.2,
                spacing: 0.15,
                pressure_size_multiplier: 0.8,
                pressure_opacity_multiplier: 0.6,
                smoothing: 0.6,
                blend_mode: BlendMode::Normal,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            BrushPreset::Eraser => BrushSettings {
                brush_type: BrushType::Eraser,
                size: 20.0,
                opacity: 1.0,
                flow: 1.0,
                hardness: 1.0,
                spacing: 0.05,
                pressure_size_multiplier: 0.0,
                pressure_opacity_multiplier: 0.0,
                smoothing: 0.3,
                blend_mode: BlendMode::DestinationOut,
                color: TRANSPARENT,
            },
        }
    }
}
