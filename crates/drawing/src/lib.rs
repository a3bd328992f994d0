//! Loomcraft drawing core - freehand strokes on garment print areas
//!
//! This crate provides the platform-independent part of the design studio:
//! - [`engine`] - Stroke engine with smoothing and distance resampling
//! - [`render`] - Deterministic stroke rasterization onto [`surface::CpuSurface`]
//! - [`pipeline`] - Live stroke with its preview surface
//! - [`mask`] - Garment print areas, containment and print clipping
//! - [`history`] - Linear undo/redo over drawing commands
//! - [`brush`] - Brush settings and presets
//! - [`input`] - Screen-space pointer events to canvas-space strokes
//! - [`session`] - Everything above wired into one design document

pub mod brush;
pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod mask;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod types;

pub use brush::*;
pub use engine::*;
pub use error::*;
pub use history::*;
pub use input::*;
pub use mask::*;
pub use pipeline::*;
pub use session::*;
pub use stroke::*;
pub use surface::*;
pub use types::*;
