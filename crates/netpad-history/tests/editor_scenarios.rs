#![forbid(unsafe_code)]

//! End-to-end editor scenarios for the history engine.
//!
//! Each test walks a user-level interaction through the public surface:
//! begin an edit, mutate, then navigate history and check the document's
//! observable state at every step.

use netpad_history::{
    CommandError, ConnectorController, DeletePointCmd, HistoryError, HistoryManager, SetWeightCmd,
};
use netpad_model::{Connector, ConnectorId, Document, PathPoint, Point, TokenId};

fn fixture() -> (Document, HistoryManager, ConnectorId) {
    let mut doc = Document::new();
    let id = doc.add_connector(Connector::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
    (doc, HistoryManager::default(), id)
}

fn weight(doc: &Document, id: ConnectorId, token: u32) -> String {
    doc.connector(id)
        .unwrap()
        .weight_for(TokenId::new(token))
        .to_string()
}

#[test]
fn weight_edit_round_trip() {
    // Weight of token T starts at the default "1".
    let (mut doc, mut history, arc) = fixture();
    assert_eq!(weight(&doc, arc, 0), "1");

    ConnectorController::new(&mut doc, &mut history, arc)
        .set_weight(TokenId::new(0), "2x+1")
        .unwrap();
    assert_eq!(weight(&doc, arc, 0), "2x+1");

    history.undo(&mut doc).unwrap().unwrap();
    assert_eq!(weight(&doc, arc, 0), "1");

    history.redo(&mut doc).unwrap().unwrap();
    assert_eq!(weight(&doc, arc, 0), "2x+1");
}

#[test]
fn split_segment_round_trip() {
    // Path [P0, P2]; splitting the first segment inserts P1 between them.
    let (mut doc, mut history, arc) = fixture();

    ConnectorController::new(&mut doc, &mut history, arc)
        .split_point(0)
        .unwrap();
    let positions = |doc: &Document| -> Vec<Point> {
        doc.connector(arc)
            .unwrap()
            .points()
            .iter()
            .map(|p| p.position)
            .collect()
    };
    assert_eq!(positions(&doc), vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
    ]);

    history.undo(&mut doc).unwrap().unwrap();
    assert_eq!(positions(&doc), vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);

    history.redo(&mut doc).unwrap().unwrap();
    assert_eq!(positions(&doc), vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
    ]);
}

#[test]
fn mixed_batch_reverses_both_effects_in_one_undo() {
    // One batch holding a weight change and a point deletion: a single
    // undo removes both effects, walking the batch in reverse order.
    let (mut doc, mut history, arc) = fixture();
    let extra = PathPoint::new(Point::new(5.0, 2.0), false);
    doc.connector_mut(arc).unwrap().insert_point(1, extra);

    history.begin_edit();
    history
        .add_edit(
            &mut doc,
            Box::new(SetWeightCmd::new(arc, TokenId::new(0), None, "2x+1")),
        )
        .unwrap();
    history
        .add_edit(&mut doc, Box::new(DeletePointCmd::new(arc, 1, extra)))
        .unwrap();
    assert_eq!(weight(&doc, arc, 0), "2x+1");
    assert_eq!(doc.connector(arc).unwrap().point_count(), 2);

    history.undo(&mut doc).unwrap().unwrap();
    assert_eq!(weight(&doc, arc, 0), "1");
    assert_eq!(doc.connector(arc).unwrap().point_count(), 3);
    assert_eq!(doc.connector(arc).unwrap().points()[1], extra);

    // It was the only batch.
    assert!(!history.can_undo());
}

#[test]
fn new_edit_after_undo_invalidates_redo() {
    let (mut doc, mut history, arc) = fixture();

    ConnectorController::new(&mut doc, &mut history, arc)
        .set_weight(TokenId::new(0), "2")
        .unwrap();
    history.undo(&mut doc).unwrap().unwrap();
    assert!(history.can_redo());

    // A new committed batch discards the entire forward history.
    ConnectorController::new(&mut doc, &mut history, arc)
        .set_weight(TokenId::new(0), "3")
        .unwrap();
    history.begin_edit();
    assert!(!history.can_redo());
    assert!(history.redo(&mut doc).is_none());
    assert_eq!(weight(&doc, arc, 0), "3");
}

#[test]
fn recording_without_begin_edit_is_rejected() {
    let (mut doc, mut history, arc) = fixture();

    let result = history.add_edit(
        &mut doc,
        Box::new(SetWeightCmd::new(arc, TokenId::new(0), None, "2")),
    );
    assert_eq!(result, Err(HistoryError::NoOpenBatch));
    assert_eq!(weight(&doc, arc, 0), "1");
}

#[test]
fn stale_target_fails_batch_but_not_manager() {
    let (mut doc, mut history, arc) = fixture();

    ConnectorController::new(&mut doc, &mut history, arc)
        .set_weight(TokenId::new(0), "2")
        .unwrap();
    ConnectorController::new(&mut doc, &mut history, arc)
        .set_weight(TokenId::new(0), "3")
        .unwrap();

    // The document model deletes the connector out from under history.
    doc.remove_connector(arc);

    let failure = history.undo(&mut doc).unwrap().unwrap_err();
    assert_eq!(failure.index, 0);
    assert_eq!(failure.error, CommandError::StaleTarget(arc));

    // The failing batch still moved to the redo stack; the manager keeps
    // navigating the remaining history.
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.redo_depth(), 1);
    let failure = history.undo(&mut doc).unwrap().unwrap_err();
    assert_eq!(failure.error, CommandError::StaleTarget(arc));
    assert!(!history.can_undo());
}

#[test]
fn interleaved_edits_across_two_connectors() {
    let (mut doc, mut history, first) = fixture();
    let second = doc.add_connector(Connector::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0)));

    ConnectorController::new(&mut doc, &mut history, first)
        .set_weight(TokenId::new(0), "2")
        .unwrap();
    ConnectorController::new(&mut doc, &mut history, second)
        .split_point(0)
        .unwrap();
    ConnectorController::new(&mut doc, &mut history, first)
        .toggle_point_kind(0)
        .unwrap();

    // Undo walks back through the three batches most-recent first.
    history.undo(&mut doc).unwrap().unwrap();
    assert!(!doc.connector(first).unwrap().points()[0].curved);

    history.undo(&mut doc).unwrap().unwrap();
    assert_eq!(doc.connector(second).unwrap().point_count(), 2);

    history.undo(&mut doc).unwrap().unwrap();
    assert_eq!(weight(&doc, first, 0), "1");

    // And forward again.
    history.redo(&mut doc).unwrap().unwrap();
    history.redo(&mut doc).unwrap().unwrap();
    history.redo(&mut doc).unwrap().unwrap();
    assert_eq!(weight(&doc, first, 0), "2");
    assert_eq!(doc.connector(second).unwrap().point_count(), 3);
    assert!(doc.connector(first).unwrap().points()[0].curved);
}
