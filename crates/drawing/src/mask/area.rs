//! Print areas and garment mask definitions

use serde::{Deserialize, Serialize};

use crate::error::MaskError;

/// Axis-aligned region in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Containment shape of a print area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintAreaShape {
    #[default]
    Rectangle,
    /// Circle inscribed in the bounds, centered, radius min(width, height) / 2
    Circle,
}

/// Side of the garment a print area belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentView {
    Front,
    Back,
    Left,
    Right,
}

/// A garment-relative region where ink may be placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintArea {
    pub id: String,
    pub name: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub shape: PrintAreaShape,
    pub garment_type: String,
    pub garment_view: GarmentView,
}

impl PrintArea {
    /// Inclusive containment test in canvas coordinates
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let b = &self.bounds;
        match self.shape {
            PrintAreaShape::Rectangle => x >= b.x && x <= b.right() && y >= b.y && y <= b.bottom(),
            PrintAreaShape::Circle => {
                let radius = b.width.min(b.height) * 0.5;
                let dx = x - (b.x + b.width * 0.5);
                let dy = y - (b.y + b.height * 0.5);
                dx * dx + dy * dy <= radius * radius
            }
        }
    }

    /// Check whether any point of pixel `(px, py)` passes [`PrintArea::contains`]
    pub fn covers_pixel(&self, px: u32, py: u32) -> bool {
        let b = &self.bounds;
        let (x0, y0) = (px as f32, py as f32);
        match self.shape {
            PrintAreaShape::Rectangle => {
                x0 + 1.0 > b.x && x0 <= b.right() && y0 + 1.0 > b.y && y0 <= b.bottom()
            }
            PrintAreaShape::Circle => {
                let cx = b.x + b.width * 0.5;
                let cy = b.y + b.height * 0.5;
                // Closest point of the pixel square to the center
                let nx = cx.clamp(x0, x0 + 1.0);
                let ny = cy.clamp(y0, y0 + 1.0);
                let radius = b.width.min(b.height) * 0.5;
                (nx - cx).powi(2) + (ny - cy).powi(2) <= radius * radius
            }
        }
    }
}

/// Canvas size a mask was authored against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

/// Collection of print areas for one garment type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentMask {
    pub garment_type: String,
    pub print_areas: Vec<PrintArea>,
    pub canvas_dimensions: CanvasDimensions,
}

impl GarmentMask {
    /// Decode a mask definition fetched from a remote source
    pub fn from_json(json: &str) -> Result<Self, MaskError> {
        let mask: Self = serde_json::from_str(json)?;
        mask.validate()?;
        Ok(mask)
    }

    pub fn to_json(&self) -> Result<String, MaskError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check that every area is non-empty and lies on the canvas
    pub fn validate(&self) -> Result<(), MaskError> {
        if self.print_areas.is_empty() {
            return Err(MaskError::NoPrintAreas(self.garment_type.clone()));
        }

        let canvas_width = self.canvas_dimensions.width;
        let canvas_height = self.canvas_dimensions.height;
        for area in &self.print_areas {
            let b = &area.bounds;
            if b.width <= 0.0 || b.height <= 0.0 {
                return Err(MaskError::EmptyArea {
                    id: area.id.clone(),
                    width: b.width,
                    height: b.height,
                });
            }
            if b.x < 0.0
                || b.y < 0.0
                || b.right() > canvas_width as f32
                || b.bottom() > canvas_height as f32
            {
                return Err(MaskError::OutsideCanvas {
                    id: area.id.clone(),
                    canvas_width,
                    canvas_height,
                });
            }
        }
        Ok(())
    }

    /// Areas belonging to `view`, or all areas when `view` is None
    pub fn areas_for_view(&self, view: Option<GarmentView>) -> impl Iterator<Item = &PrintArea> {
        self.print_areas
            .iter()
            .filter(move |area| view.is_none_or(|v| area.garment_view == v))
    }
}
