//! Annotation store
//!
//! Store values are persistent: every mutator borrows `self` and hands back
//! a new store, leaving the original untouched so the history can keep it as
//! a snapshot. All stores derived from the same `AnnotationStore::new()`
//! share one id counter, so an id is never handed out twice in a session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::annotation::{Annotation, AnnotationId, AnnotationPatch, AnnotationType, NewAnnotation};

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    next_id: Arc<AtomicU64>,
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation with a freshly allocated id
    pub fn add(&self, new: NewAnnotation) -> (Self, AnnotationId) {
        let id = AnnotationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut annotations = self.annotations.clone();
        annotations.push(Annotation::from_new(id, new));
        (self.with(annotations), id)
    }

    /// Drop the annotation with `id`; unchanged copy if there is none
    pub fn remove(&self, id: AnnotationId) -> Self {
        let annotations = self
            .annotations
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();
        self.with(annotations)
    }

    /// Replace the annotation with `id` by a patched copy.
    ///
    /// Missing ids and patches that do not fit the annotation's kind leave
    /// the contents unchanged.
    pub fn update(&self, id: AnnotationId, patch: &AnnotationPatch) -> Self {
        let annotations = self
            .annotations
            .iter()
            .map(|a| {
                if a.id == id {
                    a.patched(patch).unwrap_or_else(|| a.clone())
                } else {
                    a.clone()
                }
            })
            .collect();
        self.with(annotations)
    }

    /// Remove every annotation on `page`, or only those of `kind`
    pub fn clear_page(&self, page: u32, kind: Option<AnnotationType>) -> Self {
        let annotations = self
            .annotations
            .iter()
            .filter(|a| {
                let on_page = a.page == page;
                let kind_matches = kind.map_or(true, |k| a.annotation_type() == k);
                !(on_page && kind_matches)
            })
            .cloned()
            .collect();
        self.with(annotations)
    }

    /// An empty store that keeps allocating from this store's id counter
    pub fn emptied(&self) -> Self {
        self.with(Vec::new())
    }

    /// Annotations on `page`, in insertion order
    pub fn by_page(&self, page: u32) -> impl Iterator<Item = &Annotation> + Clone + '_ {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + Clone + '_ {
        self.annotations.iter()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Distinct pages carrying at least one annotation, ascending
    pub fn annotated_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.annotations.iter().map(|a| a.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    fn with(&self, annotations: Vec<Annotation>) -> Self {
        Self {
            next_id: Arc::clone(&self.next_id),
            annotations,
        }
    }
}

/// Stores compare by contents; the shared id counter is not part of a
/// snapshot's identity.
impl PartialEq for AnnotationStore {
    fn eq(&self, other: &Self) -> bool {
        self.annotations == other.annotations
    }
}
