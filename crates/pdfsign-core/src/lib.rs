//! PDF signing editor core
//!
//! Annotations (signature images, text labels, freehand drawings) are stored
//! in fractional page coordinates so they are independent of whatever scale
//! the preview is shown at. Export re-renders every source page at a fixed
//! scale and draws the annotations over it, producing a new PDF whose pages
//! keep the source pages' physical sizes.
//!
//! - `session::EditorSession`: the entry point for a UI
//! - `store` / `history`: persistent annotation sets with undo and redo
//! - `export::export_document`: the page-by-page export pipeline
//! - `raster::PageRasterizer`: pluggable page renderer (PDFium behind the
//!   `pdfium` feature)

pub mod annotation;
pub mod cancel;
pub mod compositor;
pub mod config;
pub mod coords;
pub mod embed;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod raster;
pub mod session;
pub mod signature;
pub mod source;
pub mod store;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationPatch, AnnotationType, NewAnnotation,
};
pub use cancel::CancellationToken;
pub use config::{EditorConfig, ExportConfig, Rgb};
pub use coords::{to_display, to_fractional, DisplayPoint, FracPoint, PageSize};
pub use error::{DocumentError, ExportError, InputRejection, RasterError};
pub use export::{export_document, ExportedDocument};
pub use history::History;
pub use raster::{PageRasterizer, RasterPage};
pub use session::{EditorSession, SessionState};
pub use signature::{SignatureFormat, SignatureId, SignatureImage};
pub use source::SourceDocument;
pub use store::AnnotationStore;

#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;
