use loomcraft_config::PressureDefaults;
use serde::{Deserialize, Serialize};

/// Class of device that produced a pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PointerKind {
    Pen = 0,
    Touch = 1,
    #[default]
    Mouse = 2,
}

impl PointerKind {
    /// Pressure to assume when the device reports none
    pub fn default_pressure(self, defaults: &PressureDefaults) -> f32 {
        match self {
            PointerKind::Pen => defaults.pen,
            PointerKind::Touch => defaults.touch,
            PointerKind::Mouse => defaults.mouse,
        }
    }
}

/// Blend modes for compositing ink onto a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal = 0,
    Multiply = 1,
    Screen = 2,
    Overlay = 3,
    Darken = 4,
    Lighten = 5,
    /// Punches transparency into the destination
    DestinationOut = 6,
}

/// Drawing tool family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BrushType {
    #[default]
    Pencil = 0,
    Marker = 1,
    Spray = 2,
    Eraser = 3,
    Texture = 4,
}

/// Unique stroke identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrokeId(pub u64);

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stroke-{}", self.0)
    }
}

/// A raw input sample in design-canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputPoint {
    pub x: f32,
    pub y: f32,
    /// Reported pressure, None when the device has no pressure sensor
    pub pressure: Option<f32>,
    pub pointer: PointerKind,
    pub timestamp_ms: u64,
    pub tilt_x: Option<f32>,
    pub tilt_y: Option<f32>,
    pub twist: Option<f32>,
}

impl InputPoint {
    /// Sample without pressure or orientation data
    pub fn new(x: f32, y: f32, pointer: PointerKind, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            pointer,
            timestamp_ms,
            tilt_x: None,
            tilt_y: None,
            twist: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Resolve the effective pressure and freeze the sample into a [`Point`]
    pub fn resolve(&self, defaults: &PressureDefaults) -> Point {
        let pressure = self
            .pressure
            .unwrap_or_else(|| self.pointer.default_pressure(defaults));
        Point {
            x: self.x,
            y: self.y,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp_ms: self.timestamp_ms,
            tilt_x: self.tilt_x,
            tilt_y: self.tilt_y,
            twist: self.twist,
        }
    }
}

/// A recorded stroke point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    /// Pressure 0.0-1.0
    pub pressure: f32,
    pub timestamp_ms: u64,
    pub tilt_x: Option<f32>,
    pub tilt_y: Option<f32>,
    pub twist: Option<f32>,
}

impl Point {
    pub fn new(x: f32, y: f32, pressure: f32, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp_ms,
            tilt_x: None,
            tilt_y: None,
            twist: None,
        }
    }

    #[inline]
    pub fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_default_pressure() {
        let defaults = PressureDefaults::default();
        let pen = InputPoint::new(1.0, 2.0, PointerKind::Pen, 0).resolve(&defaults);
        let touch = InputPoint::new(1.0, 2.0, PointerKind::Touch, 0).resolve(&defaults);
        let mouse = InputPoint::new(1.0, 2.0, PointerKind::Mouse, 0).resolve(&defaults);

        assert_eq!(pen.pressure, 0.5);
        assert_eq!(touch.pressure, 0.7);
        assert_eq!(mouse.pressure, 1.0);
    }

    #[test]
    fn test_reported_pressure_clamped() {
        let defaults = PressureDefaults::default();
        let point = InputPoint::new(0.0, 0.0, PointerKind::Pen, 5)
            .with_pressure(1.7)
            .resolve(&defaults);
        assert_eq!(point.pressure, 1.0);
        assert_eq!(point.timestamp_ms, 5);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BlendMode::DestinationOut).unwrap();
        assert_eq!(json, "\"destination-out\"");
        let kind: PointerKind = serde_json::from_str("\"touch\"").unwrap();
        assert_eq!(kind, PointerKind::Touch);
    }
}
