//! Editor and export settings
//!
//! Both structs deserialize from JSON with every field optional, falling back
//! to the defaults below.

use serde::{Deserialize, Deserializer, Serialize};

/// Preview scale the editor renders pages at unless told otherwise
pub const DEFAULT_RENDER_SCALE: f64 = 1.5;

/// Export rasterization scale (pixels per point)
pub const DEFAULT_OUTPUT_SCALE: f32 = 2.0;

pub const DEFAULT_FILE_NAME: &str = "signed-document.pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Preview render scale used when the caller does not pass one
    pub render_scale: f64,
    /// Upper bound on retained history snapshots; `None` keeps everything.
    /// With a cap, edits older than the cap can no longer be undone.
    pub max_snapshots: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            render_scale: DEFAULT_RENDER_SCALE,
            max_snapshots: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// RGB color with components in `0.0..=1.0`.
///
/// Deserializes from either `[r, g, b]` or a hex string such as `"#0000FF"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Hex(String),
    Components(f32, f32, f32),
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RgbRepr::deserialize(deserializer)? {
            RgbRepr::Hex(hex) => Rgb::from_hex(&hex),
            RgbRepr::Components(r, g, b) => Rgb(r, g, b),
        })
    }
}

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const BLUE: Rgb = Rgb(0.0, 0.0, 1.0);

    /// Parse hex color string (e.g., "#FF0000" or "FF0000"); black if malformed
    pub fn from_hex(color: &str) -> Self {
        let hex = color.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Rgb::BLACK;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).unwrap_or(0) as f32 / 255.0
        };
        Rgb(channel(0..2), channel(2..4), channel(4..6))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pixels per point when rasterizing source pages
    pub output_scale: f32,
    /// Signature width as a fraction of the page width
    pub signature_width_fraction: f64,
    /// Text size in points
    pub font_size: f64,
    pub text_color: Rgb,
    /// Freehand stroke width in points
    pub stroke_width: f64,
    pub stroke_color: Rgb,
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_scale: DEFAULT_OUTPUT_SCALE,
            signature_width_fraction: 0.15,
            font_size: 12.0,
            text_color: Rgb::BLACK,
            stroke_width: 2.0,
            stroke_color: Rgb::BLUE,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.output_scale, 2.0);
        assert_eq!(config.signature_width_fraction, 0.15);
        assert_eq!(config.font_size, 12.0);
        assert_eq!(config.stroke_color, Rgb::BLUE);
        assert_eq!(config.file_name, "signed-document.pdf");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"output_scale":3.0,"stroke_color":[1.0,0.0,0.0]}"#;
        let config = ExportConfig::from_json(json).unwrap();
        assert_eq!(config.output_scale, 3.0);
        assert_eq!(config.stroke_color, Rgb(1.0, 0.0, 0.0));
        assert_eq!(config.font_size, 12.0);
    }

    #[test]
    fn test_editor_config_from_json() {
        let config = EditorConfig::from_json(r#"{"max_snapshots":null}"#).unwrap();
        assert_eq!(config.max_snapshots, None);
        assert_eq!(config.render_scale, DEFAULT_RENDER_SCALE);
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_colors_accept_hex_strings() {
        let json = r##"{"text_color":"#FF0000","stroke_color":"00FF00"}"##;
        let config = ExportConfig::from_json(json).unwrap();
        assert_eq!(config.text_color, Rgb(1.0, 0.0, 0.0));
        assert_eq!(config.stroke_color, Rgb(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_editor_defaults_keep_full_history() {
        assert_eq!(EditorConfig::default().max_snapshots, None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Rgb::from_hex("#0000FF"), Rgb::BLUE);
        assert_eq!(Rgb::from_hex("000000"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#FFF"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#zzzzzz"), Rgb::BLACK);
    }
}
