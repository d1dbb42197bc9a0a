//! Image XObject encoding
//!
//! Pixels go into the output as 8-bit DeviceRGB image streams compressed
//! with Flate. Transparency is carried by a DeviceGray soft mask.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::{dictionary, Document, ObjectId, Stream};

use crate::error::ExportError;

/// How transparent pixels are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alpha {
    /// Blend onto white; used for page backgrounds
    FlattenOnWhite,
    /// Keep as a soft mask when any pixel is not opaque
    SoftMask,
}

/// Add `pixels` to `doc` as an image XObject and return its id
pub fn add_image(
    doc: &mut Document,
    pixels: &RgbaImage,
    alpha: Alpha,
) -> Result<ObjectId, ExportError> {
    let (width, height) = pixels.dimensions();
    let pixel_count = (width as usize) * (height as usize);

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut mask = Vec::with_capacity(pixel_count);
    let mut translucent = false;

    for pixel in pixels.pixels() {
        let [r, g, b, a] = pixel.0;
        match alpha {
            Alpha::FlattenOnWhite => {
                rgb.push(over_white(r, a));
                rgb.push(over_white(g, a));
                rgb.push(over_white(b, a));
            }
            Alpha::SoftMask => {
                rgb.extend_from_slice(&[r, g, b]);
                mask.push(a);
                translucent |= a != u8::MAX;
            }
        }
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if translucent {
        let smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&mask)?,
        );
        let smask_id = doc.add_object(smask);
        image_dict.set("SMask", smask_id);
    }

    let image = Stream::new(image_dict, deflate(&rgb)?);
    Ok(doc.add_object(image))
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u32;
    let a = alpha as u32;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ExportError::Assemble(format!("Flate compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ExportError::Assemble(format!("Flate compression failed: {}", e)))
}
