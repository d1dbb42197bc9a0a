//! Per-page drawing operations for export
//!
//! A `PageCanvas` collects the content stream for one output page: the
//! rasterized source page stretched over the full MediaBox, then each
//! annotation mapped from fractional coordinates to page units.

use lopdf::content::{Content, Operation};
use lopdf::Object;
use serde::Serialize;

use crate::config::{ExportConfig, Rgb};
use crate::coords::{to_page_units, to_pdf_space, FracPoint, PageSize};
use crate::error::ExportError;

/// Baseline sits this many font sizes below the placement point
const ASCENT_RATIO: f64 = 0.8;

/// Distance between text lines, in font sizes
const LEADING_RATIO: f64 = 1.2;

/// Rectangle in PDF user space (bottom-left origin, points)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where a signature lands: top-left at `at`, width a fixed fraction of the
/// page width, height following the image's own aspect ratio.
pub fn signature_rect(
    at: FracPoint,
    page: PageSize,
    width_fraction: f64,
    image_size: (u32, u32),
) -> PdfRect {
    let (x, y_from_top) = to_page_units(at, page);
    let width = page.width * width_fraction;
    let (img_w, img_h) = image_size;
    let height = if img_w > 0 && img_h > 0 {
        width * img_h as f64 / img_w as f64
    } else {
        width
    };

    PdfRect {
        x,
        y: page.height - y_from_top - height,
        width,
        height,
    }
}

/// Encode text for a simple font using WinAnsi, which matches Latin-1 for
/// printable characters. Anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

pub struct PageCanvas<'a> {
    size: PageSize,
    config: &'a ExportConfig,
    operations: Vec<Operation>,
}

impl<'a> PageCanvas<'a> {
    pub fn new(size: PageSize, config: &'a ExportConfig) -> Self {
        Self {
            size,
            config,
            operations: Vec::new(),
        }
    }

    /// Stretch the image XObject `name` over the whole page
    pub fn draw_background(&mut self, name: &str) {
        let rect = PdfRect {
            x: 0.0,
            y: 0.0,
            width: self.size.width,
            height: self.size.height,
        };
        self.draw_image(name, &rect);
    }

    pub fn draw_signature(&mut self, name: &str, at: FracPoint, image_size: (u32, u32)) {
        let rect = signature_rect(at, self.size, self.config.signature_width_fraction, image_size);
        self.draw_image(name, &rect);
    }

    /// Draw `content` with its first line's top-left near `at`.
    /// `font` is the resource name of the page font.
    pub fn draw_text(&mut self, font: &str, at: FracPoint, content: &str) {
        let lines: Vec<&str> = content.lines().collect();
        if lines.iter().all(|line| line.trim().is_empty()) {
            return;
        }

        let font_size = self.config.font_size;
        let (x, y_from_top) = to_page_units(at, self.size);
        let baseline = self.size.height - y_from_top - font_size * ASCENT_RATIO;
        let Rgb(r, g, b) = self.config.text_color;

        self.push("q", vec![]);
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(font.as_bytes().to_vec()), real(font_size)]);
        self.push("rg", vec![real32(r), real32(g), real32(b)]);
        self.push("Td", vec![real(x), real(baseline)]);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.push("Td", vec![real(0.0), real(-font_size * LEADING_RATIO)]);
            }
            self.push("Tj", vec![Object::string_literal(encode_win_ansi(line))]);
        }
        self.push("ET", vec![]);
        self.push("Q", vec![]);
    }

    /// Stroke each consecutive pair of points as a line segment
    pub fn draw_polyline(&mut self, points: &[FracPoint]) {
        if points.len() < 2 {
            return;
        }

        let Rgb(r, g, b) = self.config.stroke_color;
        self.push("q", vec![]);
        self.push("RG", vec![real32(r), real32(g), real32(b)]);
        self.push("w", vec![real(self.config.stroke_width)]);
        self.push("J", vec![Object::Integer(1)]);
        self.push("j", vec![Object::Integer(1)]);

        for pair in points.windows(2) {
            let (x1, y1) = to_pdf_space(pair[0], self.size);
            let (x2, y2) = to_pdf_space(pair[1], self.size);
            self.push("m", vec![real(x1), real(y1)]);
            self.push("l", vec![real(x2), real(y2)]);
        }
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Encode the collected operations as a content stream
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|e| ExportError::Assemble(format!("Failed to encode page content: {}", e)))
    }

    fn draw_image(&mut self, name: &str, rect: &PdfRect) {
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                real(rect.width),
                real(0.0),
                real(0.0),
                real(rect.height),
                real(rect.x),
                real(rect.y),
            ],
        );
        self.push("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.push("Q", vec![]);
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn real32(value: f32) -> Object {
    Object::Real(value)
}
