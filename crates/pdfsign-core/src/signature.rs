//! Uploaded signature images
//!
//! A `SignatureImage` is a shared handle to the uploaded bytes. The session
//! keeps one handle for the active signature; every placed signature
//! annotation holds its own clone, so replacing the active signature never
//! invalidates earlier placements. The bytes are freed when the last handle
//! is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::InputRejection;

static NEXT_SIGNATURE_ID: AtomicU64 = AtomicU64::new(1);

/// Image formats accepted for signature uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureFormat {
    Png,
    Jpeg,
}

impl SignatureFormat {
    /// Sniff the format from magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(SignatureFormat::Png),
            image::ImageFormat::Jpeg => Some(SignatureFormat::Jpeg),
            _ => None,
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            SignatureFormat::Png => image::ImageFormat::Png,
            SignatureFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SignatureId(u64);

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig-{}", self.0)
    }
}

#[derive(Debug)]
struct SignatureBlob {
    id: SignatureId,
    format: SignatureFormat,
    bytes: Vec<u8>,
}

/// Shared, immutable handle to uploaded signature image bytes
#[derive(Debug, Clone)]
pub struct SignatureImage {
    blob: Arc<SignatureBlob>,
}

impl SignatureImage {
    /// Accept an upload if it is a PNG or JPEG image
    pub fn from_upload(bytes: Vec<u8>) -> Result<Self, InputRejection> {
        let format = SignatureFormat::detect(&bytes).ok_or(InputRejection::InvalidUpload)?;
        Ok(Self {
            blob: Arc::new(SignatureBlob {
                id: SignatureId(NEXT_SIGNATURE_ID.fetch_add(1, Ordering::Relaxed)),
                format,
                bytes,
            }),
        })
    }

    pub fn id(&self) -> SignatureId {
        self.blob.id
    }

    pub fn format(&self) -> SignatureFormat {
        self.blob.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.blob.bytes
    }

    /// Number of live handles, the session's included
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.blob)
    }

    /// Give up this handle. The bytes stay alive while any placed annotation
    /// still references them.
    pub fn release(self) {
        drop(self);
    }

    /// Decode to RGBA pixels
    pub fn decode(&self) -> Result<image::RgbaImage, image::ImageError> {
        let format = self.blob.format.image_format();
        let img = image::load_from_memory_with_format(&self.blob.bytes, format)?;
        Ok(img.to_rgba8())
    }
}

impl PartialEq for SignatureImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.blob, &other.blob)
    }
}

impl Serialize for SignatureImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.blob.id.serialize(serializer)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    /// Encode a solid-color PNG of the given size
    pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::png_bytes;
    use super::*;

    #[test]
    fn test_png_upload_is_accepted() {
        let sig = SignatureImage::from_upload(png_bytes(4, 2, [0, 0, 0, 255])).unwrap();
        assert_eq!(sig.format(), SignatureFormat::Png);
        let decoded = sig.decode().unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
    }

    #[test]
    fn test_non_image_upload_is_rejected() {
        let result = SignatureImage::from_upload(b"%PDF-1.7 not an image".to_vec());
        assert_eq!(result.unwrap_err(), InputRejection::InvalidUpload);
        assert!(SignatureImage::from_upload(Vec::new()).is_err());
    }

    #[test]
    fn test_uploads_get_distinct_ids() {
        let a = SignatureImage::from_upload(png_bytes(1, 1, [0, 0, 0, 255])).unwrap();
        let b = SignatureImage::from_upload(png_bytes(1, 1, [0, 0, 0, 255])).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_release_keeps_other_holders_valid() {
        let active = SignatureImage::from_upload(png_bytes(2, 2, [0, 0, 0, 255])).unwrap();
        let placed = active.clone();
        assert_eq!(placed.holders(), 2);

        active.release();
        assert_eq!(placed.holders(), 1);
        assert!(placed.decode().is_ok());
    }
}
