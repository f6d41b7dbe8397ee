//! PDF page rasterization.
//!
//! Pages are rendered with pdfium at a fixed DPI. Pixel coordinates in the
//! rendered image relate to PDF points by [`PageRenderer::scale_factor`].

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::PdfLayoutError;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Default rendering resolution; one pixel per point.
pub const DEFAULT_DPI: f64 = 72.0;

/// Renders PDF pages to RGB images.
pub struct PageRenderer {
    pdfium: Pdfium,
    dpi: f64,
}

impl PageRenderer {
    /// Binds pdfium from the working directory, falling back to the system
    /// library.
    pub fn new(dpi: f64) -> Result<Self, PdfLayoutError> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(PdfLayoutError::InvalidInput(format!(
                "render DPI must be positive, got {dpi}"
            )));
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfLayoutError::processing("Failed to bind pdfium library", e))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            dpi,
        })
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Factor converting rendered pixels to PDF points.
    pub fn scale_factor(&self) -> f64 {
        scale_factor(self.dpi)
    }

    /// Renders every page in order and hands each to `visit` with its
    /// zero-based index. Stops at the first error.
    pub fn for_each_page<F>(&self, path: &Path, mut visit: F) -> Result<usize, PdfLayoutError>
    where
        F: FnMut(usize, DynamicImage) -> Result<(), PdfLayoutError>,
    {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| {
                PdfLayoutError::processing(format!("Failed to load PDF {}", path.display()), e)
            })?;

        let page_count = document.pages().len() as usize;
        debug!("Rendering {} pages from {}", page_count, path.display());

        for (index, page) in document.pages().iter().enumerate() {
            let image = self.render_page(&page).map_err(|e| {
                PdfLayoutError::processing(format!("Failed to render page {}", index + 1), e)
            })?;
            visit(index, image)?;
        }

        Ok(page_count)
    }

    fn render_page(&self, page: &PdfPage) -> Result<DynamicImage, PdfiumError> {
        let zoom = self.dpi / POINTS_PER_INCH;
        let pixel_width = (f64::from(page.width().value) * zoom).round().max(1.0) as i32;
        let pixel_height = (f64::from(page.height().value) * zoom).round().max(1.0) as i32;

        let bitmap = page.render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(pixel_width)
                .set_target_height(pixel_height)
                .render_form_data(true),
        )?;

        // Detectors take 8-bit RGB; pdfium hands back RGBA.
        Ok(DynamicImage::ImageRgb8(bitmap.as_image().to_rgb8()))
    }
}

/// Pixel -> point factor for a render DPI.
pub fn scale_factor(dpi: f64) -> f64 {
    POINTS_PER_INCH / dpi
}
