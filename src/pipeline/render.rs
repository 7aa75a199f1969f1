//! Page rasterisation for OCR.
//!
//! Pages are rendered one at a time at `ocr_scale` × 72 DPI, with both edges
//! capped at `max_rendered_pixels`, and converted to 8-bit grayscale before
//! they are handed to tesseract.

use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Effective DPI for a given OCR scale factor.
pub fn effective_dpi(scale: f32) -> f32 {
    scale * POINTS_PER_INCH
}

/// Rasterise page `idx` (0-indexed) to a grayscale image.
pub fn render_page(
    document: &PdfDocument<'_>,
    idx: usize,
    scale: f32,
    max_pixels: u32,
) -> Result<DynamicImage, PdfiumError> {
    let max_pixels = i32::try_from(max_pixels).unwrap_or(i32::MAX);
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(scale)
        .set_maximum_width(max_pixels)
        .set_maximum_height(max_pixels);

    let pages = document.pages();
    let page = pages.get(idx as u16)?;
    let bitmap = page.render_with_config(&render_config)?;

    let image = bitmap.as_image().grayscale();
    debug!(
        "Rendered page {} at {:.0} DPI → {}x{} px",
        idx + 1,
        effective_dpi(scale),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Write `image` as PNG, the format tesseract reads most reliably.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<(), image::ImageError> {
    image.save_with_format(path, image::ImageFormat::Png)
}
