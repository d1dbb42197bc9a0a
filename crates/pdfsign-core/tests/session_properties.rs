//! Property-based tests for session editing
//!
//! Drives `EditorSession` with generated pointer input and checks the
//! history and placement rules hold for every sequence.

mod common;

use common::pdf_with_pages;
use pdfsign_core::{AnnotationType, DisplayPoint, EditorConfig, EditorSession};
use proptest::prelude::*;

const WIDTH: f64 = 612.0;
const HEIGHT: f64 = 792.0;
const SCALE: f64 = 1.5;

fn session(pages: usize) -> EditorSession {
    let mut session = EditorSession::new(EditorConfig {
        render_scale: SCALE,
        max_snapshots: None,
    });
    session.load_document(pdf_with_pages(&vec![(WIDTH, HEIGHT); pages])).unwrap();
    session
}

/// A click somewhere on the page at the preview scale
fn on_page() -> impl Strategy<Value = DisplayPoint> {
    (0.0..=WIDTH * SCALE, 0.0..=HEIGHT * SCALE).prop_map(|(x, y)| DisplayPoint::new(x, y))
}

/// A click left of, right of, or below the page
fn off_page() -> impl Strategy<Value = DisplayPoint> {
    prop_oneof![
        (-1000.0..-0.001f64, 0.0..=HEIGHT * SCALE).prop_map(|(x, y)| DisplayPoint::new(x, y)),
        (WIDTH * SCALE + 0.001..5000.0, 0.0..=HEIGHT * SCALE)
            .prop_map(|(x, y)| DisplayPoint::new(x, y)),
        (0.0..=WIDTH * SCALE, HEIGHT * SCALE + 0.001..5000.0)
            .prop_map(|(x, y)| DisplayPoint::new(x, y)),
    ]
}

#[derive(Debug, Clone)]
enum Edit {
    Text(u32, DisplayPoint),
    Stroke(u32, Vec<DisplayPoint>),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (1..=3u32, on_page()).prop_map(|(page, at)| Edit::Text(page, at)),
        (1..=3u32, prop::collection::vec(on_page(), 2..6))
            .prop_map(|(page, pts)| Edit::Stroke(page, pts)),
    ]
}

fn apply(session: &mut EditorSession, edit: &Edit) {
    match edit {
        Edit::Text(page, at) => {
            session.place_text(*page, *at).unwrap();
        }
        Edit::Stroke(page, points) => {
            assert!(session.begin_stroke(*page, points[0]));
            for p in &points[1..] {
                assert!(session.extend_stroke(*p));
            }
            session.end_stroke().unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn n_edits_then_n_undos_restore_empty(edits in prop::collection::vec(edit(), 1..12)) {
        let mut session = session(3);
        for e in &edits {
            apply(&mut session, e);
        }
        prop_assert_eq!(session.annotations().len(), edits.len());

        for _ in &edits {
            prop_assert!(session.undo());
        }
        prop_assert!(session.annotations().is_empty());
        prop_assert!(!session.undo());
    }

    #[test]
    fn undo_then_new_edit_discards_redo(
        edits in prop::collection::vec(edit(), 2..8),
        extra in edit(),
    ) {
        let mut session = session(3);
        for e in &edits {
            apply(&mut session, e);
        }
        prop_assert!(session.undo());
        apply(&mut session, &extra);
        prop_assert!(!session.can_redo());
        prop_assert!(!session.redo());
        prop_assert_eq!(session.annotations().len(), edits.len());
    }

    #[test]
    fn off_page_clicks_never_add(at in off_page(), page in 1..=2u32) {
        let mut session = session(2);
        prop_assert!(session.place_text(page, at).is_none());
        prop_assert!(!session.begin_stroke(page, at));
        prop_assert!(session.annotations().is_empty());
    }

    #[test]
    fn per_page_view_is_exact(edits in prop::collection::vec(edit(), 0..12), page in 1..=3u32) {
        let mut session = session(3);
        for e in &edits {
            apply(&mut session, e);
        }
        prop_assert!(session.annotations_on(page).all(|a| a.page == page));

        let expected = edits
            .iter()
            .filter(|e| matches!(e, Edit::Text(p, _) | Edit::Stroke(p, _) if *p == page))
            .count();
        prop_assert_eq!(session.annotations_on(page).count(), expected);
    }

    #[test]
    fn clearing_drawings_keeps_text(edits in prop::collection::vec(edit(), 0..10)) {
        let mut session = session(3);
        for e in &edits {
            apply(&mut session, e);
        }
        let texts_on_1 = session
            .annotations_on(1)
            .filter(|a| a.annotation_type() == AnnotationType::Text)
            .count();

        session.clear_page(1, Some(AnnotationType::Drawing));
        prop_assert_eq!(session.annotations_on(1).count(), texts_on_1);
    }
}
