//! Coordinate transformation between display pixels, fractional page space
//! and PDF user space.
//!
//! Annotations are stored as fractions (0..1) of the page's native size, so
//! the same record renders at any preview scale and at any export scale.

use serde::Serialize;

/// Native page dimensions in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Both dimensions finite and positive
    pub(crate) fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A position on a rendered page, in pixels from the page's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position expressed as a fraction of the page's native width and height.
///
/// Both components are always within `[0, 1]`; the origin is the top-left
/// corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FracPoint {
    x: f64,
    y: f64,
}

impl FracPoint {
    /// Returns `None` unless both components are finite and within `[0, 1]`
    pub fn new(x: f64, y: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Convert a display position to fractional page coordinates.
///
/// Positions outside `[0, width*scale] × [0, height*scale]` are discarded,
/// never clamped.
pub fn to_fractional(pos: DisplayPoint, native: PageSize, render_scale: f64) -> Option<FracPoint> {
    if !native.is_usable() || !render_scale.is_finite() || render_scale <= 0.0 {
        return None;
    }

    let display_width = native.width * render_scale;
    let display_height = native.height * render_scale;

    if !(0.0..=display_width).contains(&pos.x) || !(0.0..=display_height).contains(&pos.y) {
        return None;
    }

    // Division can land a hair above 1.0 at the far edge
    let x = (pos.x / display_width).min(1.0);
    let y = (pos.y / display_height).min(1.0);
    FracPoint::new(x, y)
}

/// Convert fractional page coordinates back to a display position
pub fn to_display(frac: FracPoint, native: PageSize, render_scale: f64) -> DisplayPoint {
    DisplayPoint {
        x: frac.x * native.width * render_scale,
        y: frac.y * native.height * render_scale,
    }
}

/// Fractional coordinates to page units measured from the top-left corner
pub fn to_page_units(frac: FracPoint, physical: PageSize) -> (f64, f64) {
    (frac.x * physical.width, frac.y * physical.height)
}

/// Fractional coordinates to PDF user space (bottom-left origin, points)
pub fn to_pdf_space(frac: FracPoint, physical: PageSize) -> (f64, f64) {
    let (x, y_from_top) = to_page_units(frac, physical);
    (x, physical.height - y_from_top)
}
