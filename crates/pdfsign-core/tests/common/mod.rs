//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Cursor;

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, ObjectId};
use pdfsign_core::raster::scaled_dimensions;
use pdfsign_core::{PageRasterizer, RasterError, RasterPage, SourceDocument};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a PDF with one page per `(width, height)` entry
pub fn pdf_with_pages(sizes: &[(f64, f64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .map(|&(width, height)| {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(width as f32),
                    Object::Real(height as f32),
                ],
            });
            Object::Reference(page_id)
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Solid-color PNG for signature uploads
pub fn png_signature(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Renders every page as a flat light-grey raster at the requested scale,
/// optionally failing on one page index
#[derive(Default)]
pub struct FlatRasterizer {
    pub fail_on: Option<u32>,
    pub rendered: RefCell<Vec<u32>>,
}

impl FlatRasterizer {
    pub fn failing_on(page_index: u32) -> Self {
        Self {
            fail_on: Some(page_index),
            ..Self::default()
        }
    }
}

impl PageRasterizer for FlatRasterizer {
    fn rasterize(
        &self,
        source: &SourceDocument,
        page_index: u32,
        output_scale: f32,
    ) -> Result<RasterPage, RasterError> {
        if self.fail_on == Some(page_index) {
            return Err(RasterError::Backend(format!("page {} is corrupt", page_index)));
        }
        let size = source
            .page_size(page_index + 1)
            .ok_or_else(|| RasterError::Backend("no such page".into()))?;
        let (width, height) = scaled_dimensions(size.width, size.height, output_scale);
        self.rendered.borrow_mut().push(page_index);
        RasterPage::new(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([240, 240, 240, 255]),
        ))
    }
}

/// Page object ids of an exported document, in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

pub fn page_content(doc: &Document, page_id: ObjectId) -> Content {
    Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap()
}

/// `[width, height]` of a page's MediaBox
pub fn media_box_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let page = doc.get_dictionary(page_id).unwrap();
    let values: Vec<f64> = page
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .unwrap()
        .iter()
        .map(|o| match o {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => *v as f64,
            other => panic!("Expected number, got {:?}", other),
        })
        .collect();
    (values[2] - values[0], values[3] - values[1])
}

/// Numeric operands of an operation
pub fn numbers(operands: &[Object]) -> Vec<f64> {
    operands
        .iter()
        .map(|o| match o {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => *v as f64,
            other => panic!("Expected number, got {:?}", other),
        })
        .collect()
}
