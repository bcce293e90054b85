#![warn(missing_docs)]
//! Line History - Diff-Based Undo Engine for Line Documents
//!
//! # Overview
//!
//! `line-history` is a headless undo/redo engine for line-oriented documents that are owned
//! and mutated by a host (an editor front-end). Instead of snapshotting the document, the
//! host *touches* the boundaries of the lines it changes; after an idle delay the engine
//! reconciles the touched lines against their last committed *shadows* and records only the
//! lines that actually changed, merged into maximal contiguous *chains*. The cost of an undo
//! level is proportional to the edit, not to the document.
//!
//! # Core Features
//!
//! - **Arena document**: boundary identity by stable index, safe against external removal
//! - **Touch tracking**: coalescing idle-delay commits, no timers or threads of its own
//! - **Diff commits**: unchanged and stale lines are filtered, adjacent changes are merged
//! - **Linear history**: bounded undo stack, redo cleared on any new edit
//! - **Cursor preservation**: best-effort cursor repositioning across undo/redo
//! - **Processing seam**: commits gate on host-side per-line work (e.g. highlighting)
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  History (touch / commit / undo / redo)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Chains & Shadows (per-boundary links)      │  ← Diff State
//! ├─────────────────────────────────────────────┤
//! │  CommitTimer (idle-delay coalescing)        │  ← Scheduling
//! ├─────────────────────────────────────────────┤
//! │  LineDocument (arena node list)             │  ← Host Document
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use line_history::{History, LineDocument, NoProcessing};
//!
//! let mut doc = LineDocument::new();
//! let mut history = History::new(40, Duration::from_millis(300));
//! let mut processing = NoProcessing;
//!
//! // Load initial content, then make it the origin of history.
//! history.push(&mut doc, &mut processing, None, None, &["fn main() {", "}"]);
//! history.reset();
//!
//! // The host edits a line and reports the touch.
//! let now = Instant::now();
//! let anchor = doc.line_start(0).unwrap();
//! doc.set_line_content(anchor, "fn main() { /* hi */").unwrap();
//! history.touch(anchor, now);
//!
//! // Later, the idle delay elapses and the change is committed.
//! let committed = history.poll(&mut doc, &mut processing, now + Duration::from_millis(300));
//! assert!(committed);
//!
//! history.undo(&mut doc, &mut processing);
//! assert_eq!(doc.text(), "fn main() {\n}");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - arena-backed line document (text segments and boundary markers)
//! - [`history`] - touch tracking, chain/shadow diffing, undo and redo stacks
//! - [`processing`] - host seam gating commits on pending per-line work
//! - [`schedule`] - idle-delay commit timer with reset-on-touch coalescing
//!
//! # Concurrency Model
//!
//! Single-threaded and cooperative. The engine never blocks and never spawns: the host
//! drives deferred commits through [`History::poll`] with an explicit `Instant`, and all
//! mutation happens synchronously inside `commit`, `undo`, `redo` and `push`.
//!
//! # Failure Semantics
//!
//! Inconsistent document state is expected, not exceptional: a touched boundary that has
//! left the document is skipped, and a chain that cannot resolve a shadow on both ends is
//! deferred to the next commit. Failures degrade to "no history entry recorded"; the engine
//! has no error surface of its own.

pub mod document;
pub mod history;
pub mod processing;
pub mod schedule;

pub use document::{BoundaryId, Cursor, DocumentError, LineDocument, NodeId};
pub use history::{
    Chain, History, HistoryChange, HistoryChangeCallback, HistoryChangeType, HistoryState,
    LineRecord,
};
pub use processing::{LineProcessor, NoProcessing};
pub use schedule::CommitTimer;
