#![forbid(unsafe_code)]

//! Reversible edit commands and atomic batches.
//!
//! Every user-visible mutation of a NetPad document is captured as an
//! [`EditCommand`]: a plain record of one mutation against one connector,
//! holding enough before/after state to apply and revert it without
//! recomputation. Commands group into an [`EditBatch`] so that several
//! low-level mutations undo and redo as a single logical action.
//!
//! # Invariants
//!
//! - `apply()` immediately followed by `revert()` (or vice versa) restores
//!   the target to bit-identical observable state
//! - A batch applies commands in insertion order and reverts them in
//!   reverse insertion order: later commands may depend on document state
//!   produced by earlier ones
//! - Commands hold a [`ConnectorId`] lookup handle, never a reference, so
//!   history never keeps a deleted entity alive
//!
//! # Failure Modes
//!
//! - **Stale target**: the connector was deleted independently of history.
//!   Surfaced as [`CommandError::StaleTarget`]; never silently skipped.
//! - **Partial batch failure**: a revert/apply pass stops at the first
//!   failing command and reports its position via [`BatchFailure`]. The
//!   document is left partially transitioned; nothing is retried.

use std::fmt;

use netpad_model::{Connector, ConnectorId, Document, PathPoint, TokenId};

/// Result of applying or reverting a single command.
pub type CommandResult = Result<(), CommandError>;

/// Errors a command can hit against the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The target connector no longer exists in the document.
    StaleTarget(ConnectorId),
    /// A captured path-point index no longer names a valid position.
    PointOutOfBounds { index: usize, len: usize },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleTarget(id) => write!(f, "target {id} no longer exists"),
            Self::PointOutOfBounds { index, len } => {
                write!(f, "point index {index} out of bounds (path length {len})")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// A reversible unit of mutation against one connector.
///
/// Commands capture before/after state at construction time and resolve
/// their target by id when applied, so they stay valid in history across
/// unrelated document changes and fail safely when the target is gone.
pub trait EditCommand: Send {
    /// Perform the forward mutation using the captured "new" state.
    ///
    /// Not required to be idempotent; the history engine invokes it exactly
    /// once per redo cycle.
    fn apply(&self, doc: &mut Document) -> CommandResult;

    /// Perform the inverse mutation using the captured "previous" state.
    fn revert(&self, doc: &mut Document) -> CommandResult;

    /// Human-readable label for UI display.
    fn description(&self) -> &str;

    /// The connector this command mutates.
    fn target(&self) -> ConnectorId;

    /// Concrete type name for debugging.
    fn debug_name(&self) -> &'static str {
        "EditCommand"
    }
}

impl fmt::Debug for dyn EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("target", &self.target())
            .finish()
    }
}

fn resolve(doc: &mut Document, id: ConnectorId) -> Result<&mut Connector, CommandError> {
    doc.connector_mut(id).ok_or(CommandError::StaleTarget(id))
}

// ============================================================================
// Command variants
// ============================================================================

/// Set the weight expression of one token on a connector.
#[derive(Debug, Clone, PartialEq)]
pub struct SetWeightCmd {
    connector: ConnectorId,
    token: TokenId,
    old_expr: Option<String>,
    new_expr: String,
}

impl SetWeightCmd {
    /// Capture a weight change. `old_expr` is the explicit entry before
    /// the edit, `None` when the token read as the default weight; revert
    /// must restore the absence of the entry, not materialize the
    /// default. Expression syntax is the evaluator's concern and is
    /// validated before construction.
    #[must_use]
    pub fn new(
        connector: ConnectorId,
        token: TokenId,
        old_expr: Option<String>,
        new_expr: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            token,
            old_expr,
            new_expr: new_expr.into(),
        }
    }
}

impl EditCommand for SetWeightCmd {
    fn apply(&self, doc: &mut Document) -> CommandResult {
        resolve(doc, self.connector)?.set_weight(self.token, self.new_expr.clone());
        Ok(())
    }

    fn revert(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        match &self.old_expr {
            Some(expr) => conn.set_weight(self.token, expr.clone()),
            None => {
                conn.clear_weight(self.token);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Set weight"
    }

    fn target(&self) -> ConnectorId {
        self.connector
    }

    fn debug_name(&self) -> &'static str {
        "SetWeightCmd"
    }
}

/// Flip a path point between straight and curved.
///
/// The toggle is self-inverse, so apply and revert share one
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TogglePointKindCmd {
    connector: ConnectorId,
    index: usize,
}

impl TogglePointKindCmd {
    #[must_use]
    pub fn new(connector: ConnectorId, index: usize) -> Self {
        Self { connector, index }
    }
}

impl EditCommand for TogglePointKindCmd {
    fn apply(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        let len = conn.point_count();
        conn.point_mut(self.index)
            .ok_or(CommandError::PointOutOfBounds {
                index: self.index,
                len,
            })?
            .toggle_kind();
        Ok(())
    }

    fn revert(&self, doc: &mut Document) -> CommandResult {
        self.apply(doc)
    }

    fn description(&self) -> &str {
        "Toggle point kind"
    }

    fn target(&self) -> ConnectorId {
        self.connector
    }

    fn debug_name(&self) -> &'static str {
        "TogglePointKindCmd"
    }
}

/// Insert a path point at a captured index.
///
/// The index is captured against the sequence view at construction time;
/// commands within one batch execute in program order, so later commands
/// see the state earlier ones produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddPointCmd {
    connector: ConnectorId,
    index: usize,
    point: PathPoint,
}

impl AddPointCmd {
    #[must_use]
    pub fn new(connector: ConnectorId, index: usize, point: PathPoint) -> Self {
        Self {
            connector,
            index,
            point,
        }
    }
}

impl EditCommand for AddPointCmd {
    fn apply(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        let len = conn.point_count();
        if conn.insert_point(self.index, self.point) {
            Ok(())
        } else {
            Err(CommandError::PointOutOfBounds {
                index: self.index,
                len,
            })
        }
    }

    fn revert(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        let len = conn.point_count();
        conn.remove_point(self.index)
            .map(|_| ())
            .ok_or(CommandError::PointOutOfBounds {
                index: self.index,
                len,
            })
    }

    fn description(&self) -> &str {
        "Add path point"
    }

    fn target(&self) -> ConnectorId {
        self.connector
    }

    fn debug_name(&self) -> &'static str {
        "AddPointCmd"
    }
}

/// Remove the path point at a captured index, keeping its full value so
/// revert can re-insert it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeletePointCmd {
    connector: ConnectorId,
    index: usize,
    point: PathPoint,
}

impl DeletePointCmd {
    /// `point` must be the value at `index` at the time the deletion is
    /// recorded.
    #[must_use]
    pub fn new(connector: ConnectorId, index: usize, point: PathPoint) -> Self {
        Self {
            connector,
            index,
            point,
        }
    }
}

impl EditCommand for DeletePointCmd {
    fn apply(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        let len = conn.point_count();
        conn.remove_point(self.index)
            .map(|_| ())
            .ok_or(CommandError::PointOutOfBounds {
                index: self.index,
                len,
            })
    }

    fn revert(&self, doc: &mut Document) -> CommandResult {
        let conn = resolve(doc, self.connector)?;
        let len = conn.point_count();
        if conn.insert_point(self.index, self.point) {
            Ok(())
        } else {
            Err(CommandError::PointOutOfBounds {
                index: self.index,
                len,
            })
        }
    }

    fn description(&self) -> &str {
        "Delete path point"
    }

    fn target(&self) -> ConnectorId {
        self.connector
    }

    fn debug_name(&self) -> &'static str {
        "DeletePointCmd"
    }
}

// ============================================================================
// Edit batch
// ============================================================================

/// Position and cause of a command failure inside a batch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Index of the failing command within the batch.
    pub index: usize,
    /// The underlying command error.
    pub error: CommandError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command {} failed: {}", self.index, self.error)
    }
}

impl std::error::Error for BatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// An ordered group of commands applied and reverted together.
///
/// A batch is one user-visible action: applying walks front-to-back,
/// reverting walks back-to-front. It becomes immutable once the history
/// manager commits it.
#[derive(Debug, Default)]
pub struct EditBatch {
    commands: Vec<Box<dyn EditCommand>>,
}

impl EditBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `cmd` to the document and, only on success, append it.
    ///
    /// On failure the command is discarded and the batch is unchanged.
    pub fn record(&mut self, doc: &mut Document, cmd: Box<dyn EditCommand>) -> CommandResult {
        cmd.apply(doc)?;
        self.commands.push(cmd);
        Ok(())
    }

    /// Append a command whose effect is already on the document.
    pub fn record_applied(&mut self, cmd: Box<dyn EditCommand>) {
        self.commands.push(cmd);
    }

    /// Revert every command, back-to-front.
    ///
    /// Stops at the first failure; earlier-reverted commands stay
    /// reverted.
    pub fn revert_all(&self, doc: &mut Document) -> Result<(), BatchFailure> {
        for (index, cmd) in self.commands.iter().enumerate().rev() {
            cmd.revert(doc).map_err(|error| BatchFailure { index, error })?;
        }
        Ok(())
    }

    /// Apply every command, front-to-back.
    pub fn apply_all(&self, doc: &mut Document) -> Result<(), BatchFailure> {
        for (index, cmd) in self.commands.iter().enumerate() {
            cmd.apply(doc).map_err(|error| BatchFailure { index, error })?;
        }
        Ok(())
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch holds no commands yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Label for UI display: the first command's description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.commands.first().map_or("Edit", |cmd| cmd.description())
    }
}

// ============================================================================
// Tests
// ============================================================================
