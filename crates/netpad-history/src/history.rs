#![forbid(unsafe_code)]

//! History stack for undo/redo of edit batches.
//!
//! This module provides the [`HistoryManager`], which maintains dual
//! stacks of committed [`EditBatch`]es with support for:
//!
//! - **Batch lifecycle**: `begin_edit` opens a batch, commands accumulate
//!   into it, and the next `begin_edit` (or an undo/redo) commits it
//! - **Branch handling**: committing a new batch clears the redo stack
//! - **Depth limits**: oldest batches evicted past the configured depth
//!
//! # Invariants
//!
//! 1. At most one batch is open at a time
//! 2. Recording a command with no open batch is a usage error, never a
//!    silent no-op
//! 3. Committing a non-empty batch clears the redo stack
//! 4. A command instance lives in exactly one place among the two stacks
//!    and the open batch
//! 5. `undo_stack.len() <= config.max_depth` after any operation
//!
//! # Memory Model
//!
//! Batches are stored in `VecDeque` for O(1) eviction from the front.
//!
//! ```text
//! begin_edit() + add_edit() x2, begin_edit() + add_edit()
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [batch1]      Open: batch2        │
//! │ Redo Stack: []                                 │
//! └───────────────────────────────────────────────┘
//!
//! undo()            <-- commits batch2 first
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [batch1]      Open: none          │
//! │ Redo Stack: [batch2]                           │
//! └───────────────────────────────────────────────┘
//!
//! begin_edit() + add_edit() <-- new branch on commit, clears redo
//! ```

use std::collections::VecDeque;
use std::fmt;

use netpad_model::Document;

use crate::command::{BatchFailure, CommandError, EditBatch, EditCommand};

/// Errors surfaced by the manager's recording operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A command was recorded with no open batch. This is a caller bug
    /// (a forgotten `begin_edit`), fatal to the calling code path.
    NoOpenBatch,
    /// The command failed to apply; it was discarded.
    Command(CommandError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOpenBatch => write!(f, "no open edit batch (missing begin_edit)"),
            Self::Command(err) => write!(f, "command failed to apply: {err}"),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoOpenBatch => None,
            Self::Command(err) => Some(err),
        }
    }
}

impl From<CommandError> for HistoryError {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

/// Configuration for the history manager.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of committed batches to keep in undo history.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    /// Create a new configuration with a custom depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Manager for undo/redo history of edit batches.
///
/// One manager is constructed per open document and dropped when the
/// document closes. It is single-threaded: callers guarantee exclusive
/// access to the document for the duration of any operation.
#[derive(Default)]
pub struct HistoryManager {
    /// Committed batches available for undo (newest at back).
    undo_stack: VecDeque<EditBatch>,
    /// Undone batches available for redo (newest at back).
    redo_stack: VecDeque<EditBatch>,
    /// The batch currently accepting commands, if any.
    current: Option<EditBatch>,
    /// Configuration for limits.
    config: HistoryConfig,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("recording", &self.current.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl HistoryManager {
    /// Create a new history manager with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            current: None,
            config,
        }
    }

    // ========================================================================
    // Batch lifecycle
    // ========================================================================

    /// Start a new logical, undoable user action.
    ///
    /// Any open batch is committed first: pushed to the undo stack if
    /// non-empty (clearing the redo stack), silently discarded if empty.
    /// Returns whether a prior non-empty batch was committed.
    pub fn begin_edit(&mut self) -> bool {
        let committed = self.commit_current();
        self.current = Some(EditBatch::new());
        committed
    }

    /// Apply `cmd` to the document and record it into the open batch.
    ///
    /// The caller sees the effect at once. If `cmd` fails to apply it is
    /// discarded, the batch is unchanged, and the error propagates.
    pub fn add_edit(
        &mut self,
        doc: &mut Document,
        cmd: Box<dyn EditCommand>,
    ) -> Result<(), HistoryError> {
        let batch = self.current.as_mut().ok_or(HistoryError::NoOpenBatch)?;
        tracing::trace!(
            command = cmd.debug_name(),
            connector = cmd.target().raw(),
            "recording command"
        );
        batch.record(doc, cmd)?;
        Ok(())
    }

    /// Record a command whose effect is already on the document.
    pub fn record_applied(&mut self, cmd: Box<dyn EditCommand>) -> Result<(), HistoryError> {
        let batch = self.current.as_mut().ok_or(HistoryError::NoOpenBatch)?;
        tracing::trace!(
            command = cmd.debug_name(),
            connector = cmd.target().raw(),
            "recording pre-applied command"
        );
        batch.record_applied(cmd);
        Ok(())
    }

    /// Whether a batch is currently open.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Undo the most recent batch.
    ///
    /// An open batch is committed first, as if a new edit had begun. The
    /// batch is reverted back-to-front and moved to the redo stack.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(()))` if the batch fully reverted
    /// - `Some(Err(failure))` if a command failed mid-revert; the document
    ///   is left partially reverted and the batch still moves to the redo
    ///   stack, so the manager's bookkeeping stays consistent
    /// - `None` if there is nothing to undo
    pub fn undo(&mut self, doc: &mut Document) -> Option<Result<(), BatchFailure>> {
        self.commit_current();
        let batch = self.undo_stack.pop_back()?;
        let result = batch.revert_all(doc);
        match &result {
            Ok(()) => tracing::debug!(
                description = batch.description(),
                undo_depth = self.undo_stack.len(),
                "batch undone"
            ),
            Err(failure) => tracing::warn!(
                description = batch.description(),
                index = failure.index,
                error = %failure.error,
                "partial undo failure"
            ),
        }
        self.redo_stack.push_back(batch);
        Some(result)
    }

    /// Redo the most recently undone batch.
    ///
    /// An open batch is committed first, mirroring [`undo`](Self::undo);
    /// committing a non-empty batch clears the redo stack, so in that case
    /// the call reports `None`.
    pub fn redo(&mut self, doc: &mut Document) -> Option<Result<(), BatchFailure>> {
        self.commit_current();
        let batch = self.redo_stack.pop_back()?;
        let result = batch.apply_all(doc);
        match &result {
            Ok(()) => tracing::debug!(
                description = batch.description(),
                redo_depth = self.redo_stack.len(),
                "batch redone"
            ),
            Err(failure) => tracing::warn!(
                description = batch.description(),
                index = failure.index,
                error = %failure.error,
                "partial redo failure"
            ),
        }
        self.undo_stack.push_back(batch);
        Some(result)
    }

    /// Whether a call to [`undo`](Self::undo) would find a batch.
    ///
    /// Counts an open non-empty batch, since `undo` commits it first.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.current.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Whether a call to [`redo`](Self::redo) would find a batch.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty() && self.current.as_ref().is_none_or(EditBatch::is_empty)
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of committed batches available for undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of batches available for redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the batch the next undo would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(EditBatch::description)
    }

    /// Description of the batch the next redo would apply.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(EditBatch::description)
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history, including any open batch.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = None;
    }

    /// Commit the open batch if non-empty; discard it if empty.
    ///
    /// Returns whether a non-empty batch was committed.
    fn commit_current(&mut self) -> bool {
        match self.current.take() {
            Some(batch) if !batch.is_empty() => {
                tracing::debug!(
                    description = batch.description(),
                    commands = batch.len(),
                    undo_depth = self.undo_stack.len() + 1,
                    "batch committed"
                );
                // New forward action invalidates forward history.
                self.redo_stack.clear();
                self.undo_stack.push_back(batch);
                self.enforce_depth();
                true
            }
            _ => false,
        }
    }

    fn enforce_depth(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
