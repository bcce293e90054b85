//! Host processing seam.
//!
//! A commit must only reconcile lines whose derived state (typically highlighting) is up to
//! date, and an applied undo/redo must requeue the lines it rewrote. [`LineProcessor`] is
//! the seam the host implements for that; [`NoProcessing`] is the stand-in for hosts without
//! derived state.

use crate::document::{BoundaryId, LineDocument};

/// Per-line derived-state processor driven by the history engine.
pub trait LineProcessor {
    /// Work through dirty lines. With `force`, all pending work must complete before
    /// returning; without it, implementations may stop after a budget.
    ///
    /// Returns `true` when no dirty lines remain.
    fn process_dirty(&mut self, doc: &LineDocument, force: bool) -> bool;

    /// Queue the line starting at `anchor` for re-processing.
    fn mark_dirty(&mut self, anchor: Option<BoundaryId>);

    /// Ask the host to run [`process_dirty`](Self::process_dirty) at its convenience.
    fn schedule(&mut self);
}

/// No-op processor for hosts without derived per-line state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProcessing;

impl LineProcessor for NoProcessing {
    fn process_dirty(&mut self, _doc: &LineDocument, _force: bool) -> bool {
        true
    }

    fn mark_dirty(&mut self, _anchor: Option<BoundaryId>) {}

    fn schedule(&mut self) {}
}
