//! Source document loading
//!
//! Parses the uploaded PDF once to learn its page count and the physical size
//! of every page. The raw bytes are kept for the rasterizer.

use std::sync::Arc;

use lopdf::{Dictionary, Document, Object};
use tracing::info;

use crate::coords::PageSize;
use crate::error::DocumentError;

/// Page trees deeper than this are treated as malformed
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Fallback when no MediaBox is found anywhere in the page tree
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Arc<[u8]>,
    page_sizes: Vec<PageSize>,
}

impl SourceDocument {
    /// Parse PDF bytes, capturing each page's displayed size in points
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, DocumentError> {
        let bytes: Vec<u8> = bytes.into();
        let doc = Document::load_mem(&bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(DocumentError::NoPages);
        }

        let mut page_sizes = Vec::with_capacity(pages.len());
        for (page_num, page_id) in &pages {
            let page_dict = doc
                .get_object(*page_id)
                .and_then(Object::as_dict)
                .map_err(|_| DocumentError::MissingPage(*page_num))?;
            page_sizes.push(displayed_size(&doc, page_dict));
        }

        info!(pages = page_sizes.len(), bytes = bytes.len(), "source document loaded");

        Ok(Self {
            bytes: bytes.into(),
            page_sizes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    /// Physical size of 1-based `page`
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        let index = page.checked_sub(1)? as usize;
        self.page_sizes.get(index).copied()
    }

    pub fn contains_page(&self, page: u32) -> bool {
        self.page_size(page).is_some()
    }
}

/// MediaBox size with width and height swapped for quarter-turn rotations
fn displayed_size(doc: &Document, page_dict: &Dictionary) -> PageSize {
    let media_box = inherited(doc, page_dict, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .and_then(|array| parse_box_array(doc, array))
        .unwrap_or(DEFAULT_MEDIA_BOX);

    let width = (media_box[2] - media_box[0]).abs();
    let height = (media_box[3] - media_box[1]).abs();

    let rotation = inherited(doc, page_dict, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .map(normalize_rotation)
        .unwrap_or(0);

    if rotation == 90 || rotation == 270 {
        PageSize::new(height, width)
    } else {
        PageSize::new(width, height)
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
fn inherited<'a>(doc: &'a Document, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut dict = page_dict;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        dict = doc.get_object(parent_id).and_then(Object::as_dict).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Parse a box array [x1, y1, x2, y2]
fn parse_box_array(doc: &Document, array: &[Object]) -> Option<[f64; 4]> {
    if array.len() != 4 {
        return None;
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match resolve(doc, obj)? {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => return None,
        };
    }

    Some(result)
}

/// Normalize rotation to 0, 90, 180, or 270
fn normalize_rotation(angle: i64) -> i64 {
    angle.rem_euclid(360)
}
