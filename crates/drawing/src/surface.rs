//! CPU raster surface - straight-alpha RGBA storage with compositing and export

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::{ImageFormat, RgbaImage};

use crate::error::ExportError;
use crate::types::BlendMode;

/// Transparent black
pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// An RGBA CPU surface
/// Stores pixels as straight (non-premultiplied) [f32; 4]
#[derive(Clone, PartialEq)]
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, each pixel is [r, g, b, a] as f32
    pixels: Vec<[f32; 4]>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; pixel_count],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    /// Reset a rectangle to transparent, clamped to the surface
    pub fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end || y >= y_end {
            return;
        }
        for py in y..y_end {
            let row = (py as usize) * (self.width as usize);
            self.pixels[row + x as usize..row + x_end as usize].fill(TRANSPARENT);
        }
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Alpha at the given coordinates, 0.0 when out of bounds
    #[inline]
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        self.get_pixel(x, y).map_or(0.0, |p| p[3])
    }

    /// Composite a color onto a pixel
    ///
    /// `coverage` scales the source alpha (brush opacity times edge falloff).
    /// Separable blend modes follow the W3C compositing model with
    /// source-over; `DestinationOut` removes destination alpha.
    pub fn composite_pixel(
        &mut self,
        x: u32,
        y: u32,
        color: [f32; 4],
        coverage: f32,
        mode: BlendMode,
    ) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let dst = self.pixels[index];
        let src_alpha = (color[3] * coverage).clamp(0.0, 1.0);
        if src_alpha <= 0.0 {
            return;
        }

        if mode == BlendMode::DestinationOut {
            let remaining = dst[3] * (1.0 - src_alpha);
            self.pixels[index] = if remaining <= 0.0 {
                TRANSPARENT
            } else {
                [dst[0], dst[1], dst[2], remaining]
            };
            return;
        }

        let dst_alpha = dst[3];
        let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
        let mut out = [0.0, 0.0, 0.0, out_alpha];
        for c in 0..3 {
            let cs = color[c];
            let cb = dst[c];
            let mixed = (1.0 - dst_alpha) * cs + dst_alpha * blend_channel(mode, cb, cs);
            let premultiplied = src_alpha * mixed + dst_alpha * cb * (1.0 - src_alpha);
            out[c] = if out_alpha > 0.0 {
                premultiplied / out_alpha
            } else {
                0.0
            };
        }
        self.pixels[index] = out;
    }

    /// Scale a pixel's alpha by `factor` (0-1)
    #[inline]
    pub fn multiply_alpha(&mut self, x: u32, y: u32, factor: f32) {
        if let Some(i) = self.index(x, y) {
            let p = &mut self.pixels[i];
            p[3] *= factor.clamp(0.0, 1.0);
            if p[3] <= 0.0 {
                *p = TRANSPARENT;
            }
        }
    }

    /// Whether every pixel is fully transparent
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p[3] <= 0.0)
    }

    /// Get raw pixel data for GPU upload
    /// Returns the pixel data as a byte slice of f32 components
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Quantize to 8-bit straight-alpha RGBA
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }

    /// Convert to an [`RgbaImage`]
    pub fn to_image(&self) -> Result<RgbaImage, ExportError> {
        RgbaImage::from_raw(self.width, self.height, self.to_rgba8()).ok_or(
            ExportError::Dimensions {
                width: self.width,
                height: self.height,
            },
        )
    }

    /// Encode the surface as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let image = self.to_image()?;
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Encode the surface as a `data:image/png;base64,` URL
    pub fn to_data_url(&self) -> Result<String, ExportError> {
        let png = self.encode_png()?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

/// Separable blend function B(cb, cs)
#[inline]
fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Normal | BlendMode::DestinationOut => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => {
            // Hard light with source and backdrop swapped
            if cb <= 0.5 {
                2.0 * cs * cb
            } else {
                let b = 2.0 * cb - 1.0;
                cs + b - cs * b
            }
        }
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.01)
    }

    #[test]
    fn test_new_surface() {
        let surface = CpuSurface::new(100, 100);
        assert_eq!(surface.width, 100);
        assert_eq!(surface.height, 100);
        assert_eq!(surface.pixel_count(), 10000);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = CpuSurface::new(10, 10);
        let color = [1.0, 0.5, 0.25, 1.0];

        surface.set_pixel(5, 5, color);
        assert_eq!(surface.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_clear_rect() {
        let mut surface = CpuSurface::new(10, 10);
        surface.clear([1.0, 1.0, 1.0, 1.0]);
        surface.clear_rect(2, 2, 3, 100);

        assert_eq!(surface.alpha_at(2, 2), 0.0);
        assert_eq!(surface.alpha_at(4, 9), 0.0);
        assert_eq!(surface.alpha_at(5, 2), 1.0);
        assert_eq!(surface.alpha_at(1, 2), 1.0);
    }

    #[test]
    fn test_normal_blend_over_opaque() {
        let mut surface = CpuSurface::new(10, 10);
        surface.clear([1.0, 1.0, 1.0, 1.0]);

        // Blend 50% opaque red
        surface.composite_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5, BlendMode::Normal);

        let result = surface.get_pixel(5, 5).unwrap();
        assert!(close(result, [1.0, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn test_normal_blend_over_transparent_keeps_color() {
        let mut surface = CpuSurface::new(4, 4);
        surface.composite_pixel(1, 1, [0.2, 0.4, 0.6, 1.0], 0.5, BlendMode::Normal);

        let result = surface.get_pixel(1, 1).unwrap();
        assert!(close(result, [0.2, 0.4, 0.6, 0.5]));
    }

    #[test]
    fn test_multiply_and_screen() {
        let mut surface = CpuSurface::new(2, 1);
        surface.clear([0.5, 0.5, 0.5, 1.0]);

        surface.composite_pixel(0, 0, [0.5, 0.5, 0.5, 1.0], 1.0, BlendMode::Multiply);
        surface.composite_pixel(1, 0, [0.5, 0.5, 0.5, 1.0], 1.0, BlendMode::Screen);

        assert!(close(surface.get_pixel(0, 0).unwrap(), [0.25, 0.25, 0.25, 1.0]));
        assert!(close(surface.get_pixel(1, 0).unwrap(), [0.75, 0.75, 0.75, 1.0]));
    }

    #[test]
    fn test_destination_out() {
        let mut surface = CpuSurface::new(2, 1);
        surface.clear([1.0, 0.0, 0.0, 1.0]);

        surface.composite_pixel(0, 0, [0.0, 0.0, 0.0, 1.0], 1.0, BlendMode::DestinationOut);
        surface.composite_pixel(1, 0, [0.0, 0.0, 0.0, 1.0], 0.25, BlendMode::DestinationOut);

        assert_eq!(surface.get_pixel(0, 0), Some(TRANSPARENT));
        assert!((surface.alpha_at(1, 0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_multiply_alpha() {
        let mut surface = CpuSurface::new(1, 1);
        surface.clear([0.0, 1.0, 0.0, 1.0]);
        surface.multiply_alpha(0, 0, 0.5);
        assert!((surface.alpha_at(0, 0) - 0.5).abs() < 1e-6);
        surface.multiply_alpha(0, 0, 0.0);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_as_bytes() {
        let surface = CpuSurface::new(2, 2);
        let bytes = surface.as_bytes();
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_png_export() {
        let mut surface = CpuSurface::new(3, 2);
        surface.set_pixel(1, 1, [1.0, 0.0, 0.0, 1.0]);

        let png = surface.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_data_url() {
        let surface = CpuSurface::new(1, 1);
        let url = surface.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
