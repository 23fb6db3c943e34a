#![forbid(unsafe_code)]

//! Undo/redo command history for the NetPad diagram editor.
//!
//! This crate implements the Command Pattern over NetPad documents:
//!
//! - **Reversibility**: every edit is a command that can apply and revert
//! - **Batching**: commands group into atomic, user-visible edits
//! - **Ordering**: batches apply front-to-back and revert back-to-front
//! - **Safety**: deleted targets surface as errors, never silent skips
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      HistoryManager                          │
//! │  ┌─────────────────┐             ┌─────────────────┐         │
//! │  │   Undo Stack    │             │   Redo Stack    │         │
//! │  │  ┌───────────┐  │   undo()    │  ┌───────────┐  │         │
//! │  │  │ EditBatch │  │  ───────►   │  │ EditBatch │  │         │
//! │  │  ├───────────┤  │             │  ├───────────┤  │         │
//! │  │  │ EditBatch │  │  ◄───────   │  │ EditBatch │  │         │
//! │  │  └───────────┘  │   redo()    │  └───────────┘  │         │
//! │  └─────────────────┘             └─────────────────┘         │
//! │            ▲  begin_edit() / add_edit()                      │
//! └────────────┼─────────────────────────────────────────────────┘
//!              │
//!     ConnectorController (one user action per call)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use netpad_history::{ConnectorController, HistoryManager};
//! use netpad_model::{Connector, Document, Point, TokenId};
//!
//! let mut doc = Document::new();
//! let arc = doc.add_connector(Connector::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
//! let mut history = HistoryManager::default();
//!
//! ConnectorController::new(&mut doc, &mut history, arc)
//!     .set_weight(TokenId::new(0), "2x+1")
//!     .unwrap();
//!
//! history.undo(&mut doc).unwrap().unwrap();
//! assert_eq!(doc.connector(arc).unwrap().weight_for(TokenId::new(0)), "1");
//! ```
//!
//! # Design Notes
//!
//! Commands hold id handles, not references: history must never keep a
//! deleted graph element alive. Targets are resolved against the
//! `&mut Document` passed into every operation, and a handle that no
//! longer resolves fails the command with a stale-target error the
//! manager reports without corrupting its own stacks.
//!
//! The engine is single-threaded and synchronous: every operation runs
//! to completion (or to its first reported failure) before returning.

pub mod command;
pub mod controller;
pub mod history;

pub use command::{
    AddPointCmd, BatchFailure, CommandError, CommandResult, DeletePointCmd, EditBatch,
    EditCommand, SetWeightCmd, TogglePointKindCmd,
};
pub use controller::ConnectorController;
pub use history::{HistoryConfig, HistoryError, HistoryManager};
