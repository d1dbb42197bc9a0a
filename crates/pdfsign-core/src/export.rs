//! Export pipeline
//!
//! Pages are processed strictly in order 1..N. For each page the source is
//! rasterized at the configured output scale, embedded as a full-page image,
//! and the page's annotations are drawn over it in store order. The output
//! page keeps the source page's physical size. Any failure aborts the whole
//! export; no partial document is produced.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationKind};
use crate::cancel::CancellationToken;
use crate::compositor::PageCanvas;
use crate::config::ExportConfig;
use crate::embed::{self, Alpha};
use crate::error::ExportError;
use crate::raster::PageRasterizer;
use crate::signature::{SignatureId, SignatureImage};
use crate::source::SourceDocument;
use crate::store::AnnotationStore;

const BACKGROUND_NAME: &str = "Pg";
const FONT_NAME: &str = "F1";

/// Finished export, ready to hand to the user as a download
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// A signature image already written into the output document
struct EmbeddedSignature {
    name: String,
    object_id: ObjectId,
    size: (u32, u32),
}

/// Render `source` with `annotations` composited on top
pub fn export_document<R: PageRasterizer + ?Sized>(
    source: &SourceDocument,
    annotations: &AnnotationStore,
    rasterizer: &R,
    config: &ExportConfig,
    cancel: Option<&CancellationToken>,
) -> Result<ExportedDocument, ExportError> {
    let page_count = source.page_count();

    let orphaned = annotations.iter().filter(|a| a.page == 0 || a.page > page_count).count();
    if orphaned > 0 {
        warn!(orphaned, page_count, "skipping annotations outside the document");
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut signatures: BTreeMap<SignatureId, EmbeddedSignature> = BTreeMap::new();
    let mut kids = Vec::with_capacity(page_count as usize);

    for page in 1..=page_count {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            info!(page, "export cancelled");
            return Err(ExportError::Cancelled { page });
        }

        let size = source
            .page_size(page)
            .ok_or_else(|| ExportError::Assemble(format!("Page {} has no size", page)))?;

        let page_index = page - 1;
        let background_id = {
            let raster = rasterizer
                .rasterize(source, page_index, config.output_scale)
                .map_err(|source| ExportError::RenderFailure { page_index, source })?;
            debug!(page, width = raster.width(), height = raster.height(), "page rasterized");
            embed::add_image(&mut doc, raster.pixels(), Alpha::FlattenOnWhite)?
        };

        let mut xobjects = Dictionary::new();
        xobjects.set(BACKGROUND_NAME, background_id);

        let mut canvas = PageCanvas::new(size, config);
        canvas.draw_background(BACKGROUND_NAME);

        for annotation in annotations.by_page(page) {
            match &annotation.kind {
                AnnotationKind::Signature { at, image } => {
                    let embedded = embed_signature(&mut doc, &mut signatures, annotation, image)?;
                    xobjects.set(embedded.name.clone(), embedded.object_id);
                    canvas.draw_signature(&embedded.name, *at, embedded.size);
                }
                AnnotationKind::Text { at, content } => {
                    canvas.draw_text(FONT_NAME, *at, content);
                }
                AnnotationKind::Drawing { points } => {
                    canvas.draw_polyline(points);
                }
            }
        }

        let content_id = doc.add_object(Stream::new(dictionary! {}, canvas.finish()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width as f32),
                Object::Real(size.height as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => xobjects,
                "Font" => dictionary! {
                    FONT_NAME => font_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Assemble(format!("Failed to save PDF: {}", e)))?;

    info!(
        pages = page_count,
        signatures = signatures.len(),
        bytes = bytes.len(),
        "export complete"
    );

    Ok(ExportedDocument {
        file_name: config.file_name.clone(),
        bytes,
        page_count,
    })
}

/// Decode and embed a signature image the first time it is used
fn embed_signature<'a>(
    doc: &mut Document,
    cache: &'a mut BTreeMap<SignatureId, EmbeddedSignature>,
    annotation: &Annotation,
    image: &SignatureImage,
) -> Result<&'a EmbeddedSignature, ExportError> {
    if !cache.contains_key(&image.id()) {
        let pixels = image.decode().map_err(|e| ExportError::SignatureDecode {
            annotation: annotation.id,
            reason: e.to_string(),
        })?;
        let object_id = embed::add_image(doc, &pixels, Alpha::SoftMask)?;
        let embedded = EmbeddedSignature {
            name: format!("Sig{}", cache.len() + 1),
            object_id,
            size: pixels.dimensions(),
        };
        debug!(signature = %image.id(), name = %embedded.name, "signature embedded");
        cache.insert(image.id(), embedded);
    }

    cache.get(&image.id()).ok_or_else(|| {
        ExportError::Assemble(format!("Signature {} missing from cache", image.id()))
    })
}
