use thiserror::Error;

/// Failures decoding or validating a garment mask definition
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Failed to parse mask definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Print area {id} has a non-positive size ({width}x{height})")]
    EmptyArea { id: String, width: f32, height: f32 },
    #[error("Print area {id} extends past the {canvas_width}x{canvas_height} canvas")]
    OutsideCanvas {
        id: String,
        canvas_width: u32,
        canvas_height: u32,
    },
    #[error("Mask for {0} has no print areas")]
    NoPrintAreas(String),
}

/// Failures exporting a surface to an image encoding
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Surface of {width}x{height} cannot be encoded")]
    Dimensions { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
