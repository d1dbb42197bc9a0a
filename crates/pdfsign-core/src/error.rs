use thiserror::Error;

use crate::annotation::AnnotationId;

/// Input the editor refuses to act on. The session logs these and leaves its
/// state untouched; surfacing a message is the caller's business.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    #[error("Unsupported upload type")]
    InvalidUpload,

    #[error("Position lies outside the page bounds")]
    OutOfBoundsPlacement,

    #[error("Drawing has fewer than 2 points")]
    EmptyDrawing,

    #[error("Page size must be finite and positive")]
    InvalidPageSize,

    #[error("Page {0} is not available")]
    UnknownPage(u32),

    #[error("No document is loaded")]
    NoDocument,

    #[error("No signature image has been uploaded")]
    NoSignature,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF contains no pages")]
    NoPages,

    #[error("Page {0} not found")]
    MissingPage(u32),
}

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Rendering backend failed: {0}")]
    Backend(String),

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No document is loaded")]
    NoDocument,

    #[error("Failed to render page index {page_index}: {source}")]
    RenderFailure {
        page_index: u32,
        #[source]
        source: RasterError,
    },

    #[error("Failed to decode signature image for annotation {annotation}: {reason}")]
    SignatureDecode {
        annotation: AnnotationId,
        reason: String,
    },

    #[error("Export cancelled before page {page}")]
    Cancelled { page: u32 },

    #[error("Failed to assemble output PDF: {0}")]
    Assemble(String),
}
