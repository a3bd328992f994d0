/// Maximum number of commands kept in history by default.
pub const MAX_HISTORY: usize = 100;

/// Floor for the elapsed time between samples, in milliseconds.
pub const MIN_ELAPSED_MS: u64 = 1;

/// Smallest smoothing window, in raw samples.
pub const MIN_SMOOTHING_WINDOW: usize = 3;

/// Hardness below which segments are drawn as quadratic curves.
pub const SOFT_BRUSH_HARDNESS: f32 = 0.9;

/// Fraction of line width removed at full velocity (1 px/ms and above).
pub const VELOCITY_TAPER: f32 = 0.3;

/// Minimum rendered line width in pixels.
pub const MIN_LINE_WIDTH: f32 = 1.0;

/// Per-segment alpha clamp.
pub const MIN_SEGMENT_ALPHA: f32 = 0.1;
pub const MAX_SEGMENT_ALPHA: f32 = 1.0;

/// Maximum deviation when flattening curves, in pixels.
pub const CURVE_TOLERANCE: f32 = 0.25;

/// Shortest dash or gap drawn by dashed outlines, in pixels.
pub const MIN_DASH_LENGTH: f32 = 0.5;
