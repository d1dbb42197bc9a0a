//! Page rasterization
//!
//! Export renders every source page at a fixed output scale, independent of
//! whatever scale the preview is currently showing.

use image::RgbaImage;

use crate::error::RasterError;
use crate::source::SourceDocument;

/// A rendered page: RGBA pixels, row-major, top row first
#[derive(Debug, Clone)]
pub struct RasterPage {
    pixels: RgbaImage,
}

impl RasterPage {
    pub fn new(pixels: RgbaImage) -> Result<Self, RasterError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RasterError::InvalidBuffer("empty raster".into()));
        }
        Ok(Self { pixels })
    }

    /// Wrap raw RGBA bytes; the length must be `width * height * 4`
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, RasterError> {
        let len = rgba.len();
        let pixels = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            RasterError::InvalidBuffer(format!(
                "{} bytes does not match {}x{} RGBA",
                len, width, height
            ))
        })?;
        Self::new(pixels)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// A rendering backend able to rasterize one page at a given scale
pub trait PageRasterizer {
    /// Render zero-based `page_index` at `output_scale` pixels per point
    fn rasterize(
        &self,
        source: &SourceDocument,
        page_index: u32,
        output_scale: f32,
    ) -> Result<RasterPage, RasterError>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for &R {
    fn rasterize(
        &self,
        source: &SourceDocument,
        page_index: u32,
        output_scale: f32,
    ) -> Result<RasterPage, RasterError> {
        (**self).rasterize(source, page_index, output_scale)
    }
}

/// Pixel size of a page rendered at `scale`, at least 1x1
pub fn scaled_dimensions(width_pt: f64, height_pt: f64, scale: f32) -> (u32, u32) {
    let scale = scale as f64;
    let w = (width_pt * scale).round().max(1.0) as u32;
    let h = (height_pt * scale).round().max(1.0) as u32;
    (w, h)
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use pdfium_render::prelude::*;
    use tracing::debug;

    use super::{PageRasterizer, RasterPage};
    use crate::error::RasterError;
    use crate::source::SourceDocument;

    /// Rasterizer backed by a PDFium shared library loaded at runtime
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind to PDFium next to the executable, in the working directory,
        /// or on the system library path, in that order
        pub fn new() -> Result<Self, RasterError> {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));

            if let Some(ref dir) = exe_dir {
                if let Ok(bindings) =
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                {
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
            }

            let bindings =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                    .or_else(|_| Pdfium::bind_to_system_library())
                    .map_err(|e| RasterError::Backend(e.to_string()))?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize(
            &self,
            source: &SourceDocument,
            page_index: u32,
            output_scale: f32,
        ) -> Result<RasterPage, RasterError> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(source.bytes(), None)
                .map_err(|e| RasterError::Backend(e.to_string()))?;

            let index = u16::try_from(page_index)
                .map_err(|_| RasterError::Backend(format!("page index {} too large", page_index)))?;
            let page = document
                .pages()
                .get(index)
                .map_err(|e| RasterError::Backend(e.to_string()))?;

            let config = PdfRenderConfig::new().scale_page_by_factor(output_scale);
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| RasterError::Backend(e.to_string()))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            debug!(page_index, width, height, "pdfium rendered page");

            RasterPage::from_rgba(width, height, bitmap.as_rgba_bytes())
        }
    }
}
