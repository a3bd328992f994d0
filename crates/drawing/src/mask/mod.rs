//! Print-area mask management
//!
//! A [`MaskManager`] holds the garment mask in effect for the design and
//! answers two questions about it:
//! - Whether a canvas point lies in an active print area (stroke gating)
//! - Which pixels are printable (clipping of the exported design)
//!
//! The mask bitmap is opaque everywhere ink is *not* allowed. Active areas
//! are cut out of it with `DestinationOut`, so clipping multiplies design
//! alpha by `1 - mask alpha`. Without a mask nothing is printable.

mod area;
mod builtin;

pub use area::{Bounds, CanvasDimensions, GarmentMask, GarmentView, PrintArea, PrintAreaShape};
pub use builtin::{BUILTIN_GARMENTS, builtin_mask};

use glam::Vec2;
use tracing::{debug, info, warn};

use crate::render::{LineStyle, stroke_dashed_polyline};
use crate::surface::CpuSurface;
use crate::types::BlendMode;

const CIRCLE_OUTLINE_SEGMENTS: usize = 64;

/// Style for print-area outlines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyle {
    pub dash: f32,
    pub gap: f32,
    pub width: f32,
    pub color: [f32; 4],
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            dash: 8.0,
            gap: 4.0,
            width: 2.0,
            color: [0.2, 0.5, 1.0, 0.9],
        }
    }
}

/// Active garment mask, view filter and derived mask bitmap
#[derive(Debug, Default)]
pub struct MaskManager {
    active: Option<GarmentMask>,
    view: Option<GarmentView>,
    /// Opaque outside active areas; None without a mask
    mask_canvas: Option<CpuSurface>,
}

impl MaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the built-in mask for `garment_type`
    ///
    /// The view filter is reset to all views, since views belong to the
    /// previous garment. On a miss no mask is active afterwards. Callers
    /// that can fetch definitions remotely then call
    /// [`MaskManager::install_mask`].
    pub fn load_garment_mask(&mut self, garment_type: &str) -> Option<&GarmentMask> {
        self.view = None;
        match builtin_mask(garment_type) {
            Some(mask) => {
                info!(
                    "Loaded built-in mask for {} ({} print areas)",
                    garment_type,
                    mask.print_areas.len()
                );
                self.install_mask(mask);
                self.active.as_ref()
            }
            None => {
                warn!("No built-in mask for garment type {:?}", garment_type);
                self.clear_mask();
                None
            }
        }
    }

    /// Activate a mask obtained elsewhere (e.g. [`GarmentMask::from_json`])
    pub fn install_mask(&mut self, mask: GarmentMask) {
        debug!("install_mask: {}", mask.garment_type);
        self.active = Some(mask);
        self.update_mask_canvas();
    }

    /// Drop the active mask
    pub fn clear_mask(&mut self) {
        self.active = None;
        self.update_mask_canvas();
    }

    /// Restrict the active areas to one garment view, or None for all
    pub fn set_view(&mut self, view: Option<GarmentView>) {
        self.view = view;
        self.update_mask_canvas();
    }

    pub fn view(&self) -> Option<GarmentView> {
        self.view
    }

    pub fn active_mask(&self) -> Option<&GarmentMask> {
        self.active.as_ref()
    }

    /// Print areas of the active mask that match the current view
    pub fn active_areas(&self) -> impl Iterator<Item = &PrintArea> {
        self.active
            .iter()
            .flat_map(|mask| mask.areas_for_view(self.view))
    }

    /// Check whether a canvas point lies inside any active print area
    ///
    /// Always false without an active mask.
    pub fn is_point_in_print_area(&self, x: f32, y: f32) -> bool {
        self.active_areas().any(|area| area.contains(x, y))
    }

    /// The derived mask bitmap
    pub fn mask_canvas(&self) -> Option<&CpuSurface> {
        self.mask_canvas.as_ref()
    }

    /// Rebuild the mask bitmap from the active mask and view
    ///
    /// A pixel is cut out when any point of it lies in an active area, so
    /// every point accepted by [`MaskManager::is_point_in_print_area`] falls
    /// on a printable pixel, right and bottom edges included.
    pub fn update_mask_canvas(&mut self) {
        let Some(mask) = &self.active else {
            self.mask_canvas = None;
            return;
        };

        let CanvasDimensions { width, height } = mask.canvas_dimensions;
        let mut canvas = CpuSurface::new(width, height);
        canvas.clear([0.0, 0.0, 0.0, 1.0]);

        let mut cut = 0usize;
        for area in mask.areas_for_view(self.view) {
            let b = &area.bounds;
            let x_min = (b.x.floor().max(0.0) as u32).min(width);
            let y_min = (b.y.floor().max(0.0) as u32).min(height);
            let x_max = ((b.right().floor() + 1.0).max(0.0) as u32).min(width);
            let y_max = ((b.bottom().floor() + 1.0).max(0.0) as u32).min(height);

            for py in y_min..y_max {
                for px in x_min..x_max {
                    if area.covers_pixel(px, py) {
                        canvas.composite_pixel(
                            px,
                            py,
                            [0.0, 0.0, 0.0, 1.0],
                            1.0,
                            BlendMode::DestinationOut,
                        );
                    }
                }
            }
            cut += 1;
        }

        debug!(
            "update_mask_canvas: {}x{} with {} active areas, view={:?}",
            width, height, cut, self.view
        );
        self.mask_canvas = Some(canvas);
    }

    /// Copy `source` keeping only ink inside the active print areas
    ///
    /// Pixels beyond the mask bitmap are dropped, and with no active mask
    /// the result is fully transparent.
    pub fn clip_canvas_to_mask(&self, source: &CpuSurface) -> CpuSurface {
        let Some(mask) = &self.mask_canvas else {
            return CpuSurface::new(source.width, source.height);
        };

        let mut clipped = source.clone();
        for y in 0..source.height {
            for x in 0..source.width {
                let blocked = if x < mask.width && y < mask.height {
                    mask.alpha_at(x, y)
                } else {
                    1.0
                };
                clipped.multiply_alpha(x, y, 1.0 - blocked);
            }
        }
        clipped
    }

    /// Draw dashed outlines of the active print areas
    pub fn render_print_area_outlines(&self, surface: &mut CpuSurface, style: OutlineStyle) {
        let line = LineStyle {
            width: style.width,
            color: style.color,
            alpha: 1.0,
            hardness: 1.0,
            mode: BlendMode::Normal,
        };
        for area in self.active_areas() {
            stroke_dashed_polyline(surface, &outline_path(area), &line, style.dash, style.gap);
        }
    }
}

/// Closed outline of an area's shape
fn outline_path(area: &PrintArea) -> Vec<Vec2> {
    let b = &area.bounds;
    match area.shape {
        PrintAreaShape::Rectangle => vec![
            Vec2::new(b.x, b.y),
            Vec2::new(b.right(), b.y),
            Vec2::new(b.right(), b.bottom()),
            Vec2::new(b.x, b.bottom()),
            Vec2::new(b.x, b.y),
        ],
        PrintAreaShape::Circle => {
            let center = Vec2::new(b.x + b.width * 0.5, b.y + b.height * 0.5);
            let radius = b.width.min(b.height) * 0.5;
            (0..=CIRCLE_OUTLINE_SEGMENTS)
                .map(|i| {
                    let angle = i as f32 / CIRCLE_OUTLINE_SEGMENTS as f32 * std::f32::consts::TAU;
                    center + Vec2::new(angle.cos(), angle.sin()) * radius
                })
                .collect()
        }
    }
}
