//! Flat raster snapshots of the board for sharing.

use crate::renderer::{RenderContext, RenderResult, RenderStyle, RendererError};
use kurbo::Size;
use melodraw_core::stroke::Stroke;
use peniko::Color;

/// Largest snapshot edge, in pixels.
pub const MAX_SNAPSHOT_DIMENSION: u32 = 8192;

/// Rendered snapshot - raw RGBA pixel data and dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// RGBA pixel data (4 bytes per pixel, straight alpha).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl RasterImage {
    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let px = self.rgba_data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode the pixels as a PNG file.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
            writer
                .write_image_data(&self.rgba_data)
                .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
            writer
                .finish()
                .map_err(|e| RendererError::Encode(format!("PNG finish: {e}")))?;
        }
        Ok(png_data)
    }
}

/// Backend that turns a render pass into pixels.
pub trait Rasterizer: Send {
    fn rasterize(&mut self, ctx: &RenderContext) -> RenderResult<RasterImage>;
}

/// Snapshot parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotOptions {
    /// Canvas size in logical pixels.
    pub canvas_size: Size,
    /// Export resolution multiplier.
    pub scale: f64,
    pub background: Color,
}

impl SnapshotOptions {
    pub fn new(canvas_size: Size) -> Self {
        Self {
            canvas_size,
            scale: 1.0,
            background: Color::WHITE,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }
}

/// Render `strokes` flat (no blur or shadow) into an image.
///
/// Any failure, including a canvas with no pixels, is reported as
/// [`RendererError::RenderingUnavailable`].
pub fn snapshot(
    strokes: &[Stroke],
    rasterizer: &mut dyn Rasterizer,
    options: &SnapshotOptions,
) -> RenderResult<RasterImage> {
    let size = options.canvas_size;
    let valid = size.width.is_finite()
        && size.height.is_finite()
        && options.scale.is_finite()
        && options.scale > 0.0;
    if !valid {
        return Err(RendererError::RenderingUnavailable(format!(
            "invalid canvas {}x{} at scale {}",
            size.width, size.height, options.scale
        )));
    }

    let ctx = RenderContext::new(strokes, size)
        .with_scale_factor(options.scale)
        .with_background(options.background)
        .with_style(RenderStyle::Snapshot);

    let (width, height) = ctx.pixel_size();
    if width == 0 || height == 0 {
        return Err(RendererError::RenderingUnavailable(
            "canvas has no pixels".to_string(),
        ));
    }
    if width > MAX_SNAPSHOT_DIMENSION || height > MAX_SNAPSHOT_DIMENSION {
        return Err(RendererError::RenderingUnavailable(format!(
            "snapshot {width}x{height} exceeds {MAX_SNAPSHOT_DIMENSION}px"
        )));
    }

    let image = rasterizer.rasterize(&ctx).map_err(|e| match e {
        RendererError::RenderingUnavailable(msg) => RendererError::RenderingUnavailable(msg),
        other => RendererError::RenderingUnavailable(other.to_string()),
    })?;

    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba_data.len() != expected {
        return Err(RendererError::RenderingUnavailable(format!(
            "backend returned {} bytes for {}x{}",
            image.rgba_data.len(),
            image.width,
            image.height
        )));
    }

    log::debug!(
        "Snapshot rendered: {} strokes, {}x{}",
        strokes.len(),
        image.width,
        image.height
    );
    Ok(image)
}
