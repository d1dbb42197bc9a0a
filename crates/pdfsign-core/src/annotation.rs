//! Annotation records placed on document pages

use std::fmt;

use serde::Serialize;

use crate::coords::FracPoint;
use crate::signature::SignatureImage;

/// Minimum number of points a freehand drawing needs to be kept
pub const MIN_DRAWING_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnnotationId(pub(crate) u64);

impl AnnotationId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Signature,
    Text,
    Drawing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    Signature {
        at: FracPoint,
        image: SignatureImage,
    },
    Text {
        at: FracPoint,
        content: String,
    },
    Drawing {
        points: Vec<FracPoint>,
    },
}

impl AnnotationKind {
    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            AnnotationKind::Signature { .. } => AnnotationType::Signature,
            AnnotationKind::Text { .. } => AnnotationType::Text,
            AnnotationKind::Drawing { .. } => AnnotationType::Drawing,
        }
    }

    /// Anchor point for signature and text; drawings have none
    pub fn anchor(&self) -> Option<FracPoint> {
        match self {
            AnnotationKind::Signature { at, .. } | AnnotationKind::Text { at, .. } => Some(*at),
            AnnotationKind::Drawing { .. } => None,
        }
    }
}

/// An annotation that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub page: u32,
    pub kind: AnnotationKind,
    pub editing: bool,
}

impl NewAnnotation {
    pub fn signature(page: u32, at: FracPoint, image: SignatureImage) -> Self {
        Self {
            page,
            kind: AnnotationKind::Signature { at, image },
            editing: false,
        }
    }

    /// A freshly placed text label, waiting for its first content entry
    pub fn text(page: u32, at: FracPoint) -> Self {
        Self {
            page,
            kind: AnnotationKind::Text {
                at,
                content: String::new(),
            },
            editing: true,
        }
    }

    pub fn text_with(page: u32, at: FracPoint, content: impl Into<String>) -> Self {
        Self {
            page,
            kind: AnnotationKind::Text {
                at,
                content: content.into(),
            },
            editing: false,
        }
    }

    /// Returns `None` for polylines too short to persist
    pub fn drawing(page: u32, points: Vec<FracPoint>) -> Option<Self> {
        if points.len() < MIN_DRAWING_POINTS {
            return None;
        }
        Some(Self {
            page,
            kind: AnnotationKind::Drawing { points },
            editing: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub page: u32,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    pub editing: bool,
}

impl Annotation {
    pub(crate) fn from_new(id: AnnotationId, new: NewAnnotation) -> Self {
        let editing = new.editing && matches!(new.kind, AnnotationKind::Text { .. });
        Self {
            id,
            page: new.page,
            kind: new.kind,
            editing,
        }
    }

    pub fn annotation_type(&self) -> AnnotationType {
        self.kind.annotation_type()
    }

    /// Apply a patch, producing a new record. Returns `None` when the patch
    /// does not apply to this kind of annotation.
    pub fn patched(&self, patch: &AnnotationPatch) -> Option<Self> {
        let kind = match (patch, &self.kind) {
            (AnnotationPatch::SetText(content), AnnotationKind::Text { at, .. }) => {
                AnnotationKind::Text {
                    at: *at,
                    content: content.clone(),
                }
            }
            (AnnotationPatch::MoveTo(to), AnnotationKind::Text { content, .. }) => {
                AnnotationKind::Text {
                    at: *to,
                    content: content.clone(),
                }
            }
            (AnnotationPatch::MoveTo(to), AnnotationKind::Signature { image, .. }) => {
                AnnotationKind::Signature {
                    at: *to,
                    image: image.clone(),
                }
            }
            (AnnotationPatch::FinishEditing, AnnotationKind::Text { .. }) => {
                return Some(Self {
                    editing: false,
                    ..self.clone()
                });
            }
            _ => return None,
        };

        Some(Self {
            id: self.id,
            page: self.page,
            kind,
            editing: self.editing,
        })
    }
}

/// Field-level edits accepted by [`crate::store::AnnotationStore::update`].
/// None of them can change an annotation's page, and drawings accept none.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationPatch {
    SetText(String),
    MoveTo(FracPoint),
    FinishEditing,
}
