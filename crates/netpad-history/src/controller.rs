#![forbid(unsafe_code)]

//! Semantic edit surface for a single connector.
//!
//! [`ConnectorController`] is the layer UI code calls: each method is one
//! complete user action that captures before-state from the document,
//! opens a batch on the [`HistoryManager`], and records the reversible
//! command. It borrows the document and the manager only for the duration
//! of the interaction.

use netpad_model::{Connector, ConnectorId, Document, PathPoint, Point, TokenId};

use crate::command::{
    AddPointCmd, CommandError, DeletePointCmd, SetWeightCmd, TogglePointKindCmd,
};
use crate::history::{HistoryError, HistoryManager};

/// Edits one connector through the history engine.
pub struct ConnectorController<'a> {
    doc: &'a mut Document,
    history: &'a mut HistoryManager,
    connector: ConnectorId,
}

impl<'a> ConnectorController<'a> {
    #[must_use]
    pub fn new(
        doc: &'a mut Document,
        history: &'a mut HistoryManager,
        connector: ConnectorId,
    ) -> Self {
        Self {
            doc,
            history,
            connector,
        }
    }

    // ========================================================================
    // Weights
    // ========================================================================

    /// Set the weight expression for one token as a single undoable edit.
    pub fn set_weight(&mut self, token: TokenId, expr: &str) -> Result<(), HistoryError> {
        self.history.begin_edit();
        self.update_weight(token, expr)
    }

    /// Set several token weights as one undoable edit.
    pub fn set_weights(&mut self, weights: &[(TokenId, &str)]) -> Result<(), HistoryError> {
        self.history.begin_edit();
        for (token, expr) in weights {
            self.update_weight(*token, expr)?;
        }
        Ok(())
    }

    /// Capture the old explicit entry (not the defaulted read, so revert
    /// restores an absent entry as absent) and record the change into the
    /// open batch.
    fn update_weight(&mut self, token: TokenId, expr: &str) -> Result<(), HistoryError> {
        let old = self.resolve()?.explicit_weight(token).map(String::from);
        let cmd = SetWeightCmd::new(self.connector, token, old, expr);
        self.history.add_edit(self.doc, Box::new(cmd))
    }

    /// Weight expression for `token`, or `None` if the connector is gone.
    #[must_use]
    pub fn weight_for(&self, token: TokenId) -> Option<&str> {
        self.doc.connector(self.connector).map(|c| c.weight_for(token))
    }

    /// Whether any weight on the connector is a functional expression.
    #[must_use]
    pub fn has_functional_weight(&self) -> bool {
        self.doc
            .connector(self.connector)
            .is_some_and(|c| c.has_functional_weight())
    }

    // ========================================================================
    // Path points
    // ========================================================================

    /// Flip the point at `index` between straight and curved.
    pub fn toggle_point_kind(&mut self, index: usize) -> Result<(), HistoryError> {
        let cmd = TogglePointKindCmd::new(self.connector, index);
        self.history.begin_edit();
        self.history.add_edit(self.doc, Box::new(cmd))
    }

    /// Split the segment from `index` to `index + 1` at its midpoint.
    ///
    /// The new point inherits the leading point's curve flag.
    pub fn split_point(&mut self, index: usize) -> Result<(), HistoryError> {
        let conn = self.resolve()?;
        let len = conn.point_count();
        let point = conn
            .midpoint(index)
            .ok_or(CommandError::PointOutOfBounds { index, len })?;
        let cmd = AddPointCmd::new(self.connector, index + 1, point);
        self.history.begin_edit();
        self.history.add_edit(self.doc, Box::new(cmd))
    }

    /// Add a straight intermediate point just before the target endpoint.
    pub fn add_point(&mut self, position: Point) -> Result<(), HistoryError> {
        // A path stripped of its endpoints has no "before the endpoint"
        // slot; report it rather than underflow.
        let index = self
            .resolve()?
            .point_count()
            .checked_sub(1)
            .ok_or(CommandError::PointOutOfBounds { index: 0, len: 0 })?;
        let cmd = AddPointCmd::new(self.connector, index, PathPoint::new(position, false));
        self.history.begin_edit();
        self.history.add_edit(self.doc, Box::new(cmd))
    }

    /// Delete the intermediate point at `index`.
    pub fn delete_point(&mut self, index: usize) -> Result<(), HistoryError> {
        let conn = self.resolve()?;
        let len = conn.point_count();
        let point = *conn
            .point(index)
            .ok_or(CommandError::PointOutOfBounds { index, len })?;
        let cmd = DeletePointCmd::new(self.connector, index, point);
        self.history.begin_edit();
        self.history.add_edit(self.doc, Box::new(cmd))
    }

    fn resolve(&self) -> Result<&Connector, CommandError> {
        self.doc
            .connector(self.connector)
            .ok_or(CommandError::StaleTarget(self.connector))
    }
}

// ============================================================================
// Tests
// ============================================================================
