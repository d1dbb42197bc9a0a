//! Editing session
//!
//! `EditorSession` owns everything one open document needs: the source PDF,
//! the annotation history, the page geometry reported by the preview, the
//! active signature upload and any freehand stroke in progress. The UI feeds
//! it pointer positions in display pixels and reads annotations back.
//!
//! Rejected input never changes state. Each rejection is logged at debug
//! level and reported to the caller only as `None` or `false`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationId, AnnotationPatch, AnnotationType, NewAnnotation};
use crate::cancel::CancellationToken;
use crate::config::{EditorConfig, ExportConfig};
use crate::coords::{to_display, to_fractional, DisplayPoint, FracPoint, PageSize};
use crate::error::{DocumentError, ExportError, InputRejection};
use crate::export::{export_document, ExportedDocument};
use crate::geometry::PageGeometry;
use crate::history::History;
use crate::raster::PageRasterizer;
use crate::signature::SignatureImage;
use crate::source::SourceDocument;
use crate::store::AnnotationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// No document loaded yet
    Empty,
    /// Document loaded, nothing placed since load or the last export
    DocumentLoaded,
    Annotating,
    Exporting,
}

/// A freehand stroke collected between pointer-down and pointer-up
#[derive(Debug, Clone)]
struct Stroke {
    page: u32,
    points: Vec<FracPoint>,
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    state: SessionState,
    render_scale: f64,
    source: Option<SourceDocument>,
    history: History,
    geometry: PageGeometry,
    active_signature: Option<SignatureImage>,
    stroke: Option<Stroke>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            render_scale: config.render_scale,
            state: SessionState::Empty,
            source: None,
            history: History::default().with_limit(config.max_snapshots),
            geometry: PageGeometry::new(),
            active_signature: None,
            stroke: None,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.source.as_ref().map_or(0, SourceDocument::page_count)
    }

    /// Load a new document, discarding annotations, history, geometry and
    /// any stroke in progress. On error the session is left as it was.
    /// Annotation ids keep counting across documents, so an id from the
    /// previous document never matches one in the new document.
    pub fn load_document(&mut self, bytes: impl Into<Vec<u8>>) -> Result<u32, DocumentError> {
        let source = SourceDocument::from_bytes(bytes)?;
        let pages = source.page_count();

        self.source = Some(source);
        let fresh = self.history.current().emptied();
        self.history.reset(fresh);
        self.geometry.clear();
        self.stroke = None;
        self.state = SessionState::DocumentLoaded;

        info!(pages, "document opened for editing");
        Ok(pages)
    }

    /// Store the native size the preview reported for `page`. Only the first
    /// report per page is kept.
    pub fn record_page_geometry(&mut self, page: u32, size: PageSize) -> bool {
        let valid = self.require_page(page).and_then(|_| {
            if size.is_usable() {
                Ok(())
            } else {
                Err(InputRejection::InvalidPageSize)
            }
        });
        accept("record_page_geometry", valid).is_some() && self.geometry.record(page, size)
    }

    pub fn page_geometry(&self, page: u32) -> Option<PageSize> {
        self.geometry.get(page)
    }

    /// Current preview scale used to interpret pointer positions
    pub fn render_scale(&self) -> f64 {
        self.render_scale
    }

    pub fn set_render_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            debug!(scale, "ignoring invalid render scale");
            return false;
        }
        self.render_scale = scale;
        true
    }

    /// Make `bytes` the active signature. The previous upload's session
    /// handle is released; signatures already placed keep their own.
    pub fn upload_signature(&mut self, bytes: Vec<u8>) -> bool {
        let Some(image) = accept("upload_signature", SignatureImage::from_upload(bytes)) else {
            return false;
        };

        debug!(signature = %image.id(), format = ?image.format(), "signature uploaded");
        if let Some(previous) = self.active_signature.replace(image) {
            previous.release();
        }
        true
    }

    pub fn active_signature(&self) -> Option<&SignatureImage> {
        self.active_signature.as_ref()
    }

    /// Place an empty text label in editing mode at a pointer position
    pub fn place_text(&mut self, page: u32, pos: DisplayPoint) -> Option<AnnotationId> {
        let result = self
            .locate(page, pos)
            .map(|at| self.add(NewAnnotation::text(page, at)));
        accept("place_text", result)
    }

    /// Place the active signature with its top-left corner at a pointer position
    pub fn place_signature(&mut self, page: u32, pos: DisplayPoint) -> Option<AnnotationId> {
        let result = self.locate(page, pos).and_then(|at| {
            let image = self
                .active_signature
                .clone()
                .ok_or(InputRejection::NoSignature)?;
            Ok(self.add(NewAnnotation::signature(page, at, image)))
        });
        accept("place_signature", result)
    }

    /// Start a freehand stroke. A stroke already in progress is discarded.
    pub fn begin_stroke(&mut self, page: u32, pos: DisplayPoint) -> bool {
        let result = self.locate(page, pos).map(|at| {
            if self.stroke.is_some() {
                debug!("discarding unfinished stroke");
            }
            self.stroke = Some(Stroke {
                page,
                points: vec![at],
            });
        });
        accept("begin_stroke", result).is_some()
    }

    /// Append a pointer position to the stroke in progress. Positions off the
    /// page are dropped without ending the stroke.
    pub fn extend_stroke(&mut self, pos: DisplayPoint) -> bool {
        let Some(page) = self.stroke.as_ref().map(|s| s.page) else {
            return false;
        };
        let Some(at) = accept("extend_stroke", self.locate(page, pos)) else {
            return false;
        };
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.points.push(at);
        }
        true
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Finish the stroke in progress, persisting it if it has at least two
    /// points
    pub fn end_stroke(&mut self) -> Option<AnnotationId> {
        let stroke = self.stroke.take()?;
        let result = NewAnnotation::drawing(stroke.page, stroke.points)
            .ok_or(InputRejection::EmptyDrawing)
            .map(|new| self.add(new));
        accept("end_stroke", result)
    }

    pub fn set_text(&mut self, id: AnnotationId, content: impl Into<String>) -> bool {
        self.apply_patch(id, AnnotationPatch::SetText(content.into()))
    }

    /// Leave editing mode for a text label
    pub fn finish_text_edit(&mut self, id: AnnotationId) -> bool {
        self.apply_patch(id, AnnotationPatch::FinishEditing)
    }

    /// Move a signature or text label within its page
    pub fn move_annotation(&mut self, id: AnnotationId, pos: DisplayPoint) -> bool {
        let Some(page) = self.history.current().get(id).map(|a| a.page) else {
            return false;
        };
        match accept("move_annotation", self.locate(page, pos)) {
            Some(at) => self.apply_patch(id, AnnotationPatch::MoveTo(at)),
            None => false,
        }
    }

    pub fn remove(&mut self, id: AnnotationId) -> bool {
        let next = self.history.current().remove(id);
        self.commit_if_changed(next)
    }

    /// Remove everything on `page`, or only annotations of `kind`
    pub fn clear_page(&mut self, page: u32, kind: Option<AnnotationType>) -> bool {
        let next = self.history.current().clear_page(page, kind);
        self.commit_if_changed(next)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The active annotation set
    pub fn annotations(&self) -> &AnnotationStore {
        self.history.current()
    }

    pub fn annotations_on(&self, page: u32) -> impl Iterator<Item = &Annotation> + Clone + '_ {
        self.history.current().by_page(page)
    }

    /// The active annotation set as a JSON array for the UI
    pub fn annotations_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.history.current().annotations())
    }

    /// Where a stored position lands in the preview at the current scale
    pub fn display_position(&self, page: u32, at: FracPoint) -> Option<DisplayPoint> {
        let native = self.native_size(page).ok()?;
        Some(to_display(at, native, self.render_scale))
    }

    /// Render the document with the current annotations. Annotations are
    /// unchanged whether or not the export succeeds.
    pub fn export<R: PageRasterizer + ?Sized>(
        &mut self,
        rasterizer: &R,
        config: &ExportConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExportedDocument, ExportError> {
        let Some(source) = self.source.as_ref() else {
            return Err(ExportError::NoDocument);
        };

        self.state = SessionState::Exporting;
        let result = export_document(source, self.history.current(), rasterizer, config, cancel);
        self.state = SessionState::DocumentLoaded;

        if let Err(e) = &result {
            warn!(error = %e, "export failed");
        }
        result
    }

    fn add(&mut self, new: NewAnnotation) -> AnnotationId {
        let (next, id) = self.history.current().add(new);
        self.commit(next);
        id
    }

    fn apply_patch(&mut self, id: AnnotationId, patch: AnnotationPatch) -> bool {
        let next = self.history.current().update(id, &patch);
        self.commit_if_changed(next)
    }

    fn commit_if_changed(&mut self, next: AnnotationStore) -> bool {
        if &next == self.history.current() {
            return false;
        }
        self.commit(next);
        true
    }

    fn commit(&mut self, next: AnnotationStore) {
        self.history.commit(next);
        self.state = SessionState::Annotating;
    }

    fn require_page(&self, page: u32) -> Result<&SourceDocument, InputRejection> {
        let source = self.source.as_ref().ok_or(InputRejection::NoDocument)?;
        if !source.contains_page(page) {
            return Err(InputRejection::UnknownPage(page));
        }
        Ok(source)
    }

    /// Native size as reported by the preview, else as parsed from the file
    fn native_size(&self, page: u32) -> Result<PageSize, InputRejection> {
        let source = self.require_page(page)?;
        self.geometry
            .get(page)
            .or_else(|| source.page_size(page))
            .ok_or(InputRejection::UnknownPage(page))
    }

    fn locate(&self, page: u32, pos: DisplayPoint) -> Result<FracPoint, InputRejection> {
        let native = self.native_size(page)?;
        to_fractional(pos, native, self.render_scale).ok_or(InputRejection::OutOfBoundsPlacement)
    }
}

fn accept<T>(operation: &'static str, result: Result<T, InputRejection>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(rejection) => {
            debug!(operation, %rejection, "input rejected");
            None
        }
    }
}
