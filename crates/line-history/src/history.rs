//! Diff-based undo history.
//!
//! # Overview
//!
//! The engine keeps the cost of storing and reverting an undo step proportional to the size
//! of the *edited* content, not the whole document. The host touches line boundaries as it
//! mutates the document; once no touches arrive for the commit delay, the touched lines are
//! reconciled:
//!
//! 1. Touched anchors whose boundary left the document are dropped.
//! 2. For the rest, the candidate line text is rebuilt from the live document. A candidate
//!    counts as changed only if its text or end boundary differs from its *shadow* — the
//!    line record committed for the same span last time.
//! 3. Adjacent changed lines are merged into maximal *chains*. A chain is accepted only when
//!    both of its endpoints resolve to a definite shadow; otherwise its lines are re-marked
//!    touched and retried on the next commit.
//! 4. The shadows of accepted chains become one undo level; the chains are linked in as the
//!    new committed state.
//!
//! Undoing pops a level, applies its chains back into the document and pushes the resulting
//! shadows onto the redo stack. History is linear: any new edit clears the redo stack.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use line_history::{History, LineDocument, NoProcessing};
//!
//! let mut doc = LineDocument::new();
//! let mut history = History::new(40, Duration::from_millis(300));
//! let mut processing = NoProcessing;
//!
//! // Load the initial content and make it the origin of history.
//! history.push(&mut doc, &mut processing, None, None, &["alpha", "beta"]);
//! history.reset();
//!
//! // The host edits a line, touches it, and the commit is reconciled later.
//! let anchor = doc.line_start(1).unwrap();
//! doc.set_line_content(anchor, "BETA").unwrap();
//! history.touch(anchor, Instant::now());
//! history.commit(&mut doc, &mut processing);
//!
//! history.undo(&mut doc, &mut processing);
//! assert_eq!(doc.text(), "alpha\nbeta");
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::document::{BoundaryId, Cursor, LineDocument};
use crate::processing::LineProcessor;
use crate::schedule::CommitTimer;

/// One line of committed (or about-to-be-committed) content: the text between two
/// boundaries, `None` standing in for the document start / end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Line text.
    pub text: String,
    /// Boundary in front of the line (`None`: document start).
    pub from: Option<BoundaryId>,
    /// Boundary terminating the line (`None`: document end).
    pub to: Option<BoundaryId>,
}

/// A contiguous run of line records affected by one edit. Consecutive records share a
/// boundary: `chain[i].to == chain[i + 1].from`.
pub type Chain = Vec<LineRecord>;

/// What kind of history mutation a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChangeType {
    /// Touched lines were reconciled into a new undo level.
    Committed,
    /// An undo level was applied back into the document.
    Undone,
    /// A previously undone level was re-applied.
    Redone,
    /// An edit was pushed directly (load, paste, programmatic replace).
    Pushed,
}

/// Notification payload delivered to subscribers after any committed mutation.
#[derive(Debug, Clone)]
pub struct HistoryChange {
    /// The kind of mutation.
    pub change_type: HistoryChangeType,
    /// Undo stack depth after the mutation.
    pub undo_depth: usize,
    /// Redo stack depth after the mutation.
    pub redo_depth: usize,
}

/// Subscriber callback type.
pub type HistoryChangeCallback = Box<dyn FnMut(&HistoryChange) + Send>;

/// Undo/redo stack state snapshot.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// Can undo.
    pub can_undo: bool,
    /// Can redo.
    pub can_redo: bool,
    /// Undo stack depth.
    pub undo_depth: usize,
    /// Redo stack depth.
    pub redo_depth: usize,
    /// Whether a deferred commit is scheduled.
    pub commit_pending: bool,
}

enum UpdateMode {
    /// Push chain content into the document, then link it.
    Apply,
    /// The chains already describe the live document; only update the links.
    Link,
}

/// Diff-based undo history over a [`LineDocument`].
///
/// The history exclusively owns the undo/redo stacks and the per-boundary shadow links;
/// the document itself may be mutated by the host at any time between commits. Stale
/// boundary references degrade to "no history entry recorded", never to an error.
pub struct History {
    max_depth: usize,
    timer: CommitTimer,
    undo_stack: Vec<Vec<Chain>>,
    redo_stack: Vec<Vec<Chain>>,
    /// Touched anchors in arrival order, deduplicated via `touched_set`.
    touched: Vec<Option<BoundaryId>>,
    touched_set: HashSet<Option<BoundaryId>>,
    /// Committed line record after each boundary. The `None` key is the first line.
    after_links: HashMap<Option<BoundaryId>, LineRecord>,
    /// Committed line record before each boundary. The `None` key is the last line.
    before_links: HashMap<Option<BoundaryId>, LineRecord>,
    callbacks: Vec<HistoryChangeCallback>,
}

impl History {
    /// Create a history with the given maximum undo depth and idle commit delay.
    pub fn new(max_depth: usize, commit_delay: Duration) -> Self {
        // The initial record represents the empty document: one line spanning
        // start to end with no text.
        let initial = LineRecord {
            text: String::new(),
            from: None,
            to: None,
        };
        let mut after_links = HashMap::new();
        after_links.insert(None, initial.clone());
        let mut before_links = HashMap::new();
        before_links.insert(None, initial);
        Self {
            max_depth,
            timer: CommitTimer::new(commit_delay),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            touched: Vec::new(),
            touched_set: HashSet::new(),
            after_links,
            before_links,
            callbacks: Vec::new(),
        }
    }

    /// Mark a line start as dirty and (re)schedule the deferred commit.
    ///
    /// Repeated touches within the commit delay coalesce: the timer is reset, not stacked.
    pub fn touch(&mut self, anchor: Option<BoundaryId>, now: Instant) {
        self.set_touched(anchor);
        self.timer.reset(now);
    }

    /// Drive the deferred commit. Returns `true` if a commit ran and recorded a new level.
    ///
    /// When the timer is due but the processor still reports pending work, the commit is
    /// postponed by another full delay.
    pub fn poll(
        &mut self,
        doc: &mut LineDocument,
        processing: &mut dyn LineProcessor,
        now: Instant,
    ) -> bool {
        if !self.timer.fire(now) {
            return false;
        }
        if processing.process_dirty(doc, false) {
            self.commit(doc, processing)
        } else {
            self.timer.reset(now);
            false
        }
    }

    /// Reconcile all touched lines into at most one new undo level.
    ///
    /// Returns `true` if a level was recorded. Clears the redo stack on success.
    pub fn commit(&mut self, doc: &mut LineDocument, processing: &mut dyn LineProcessor) -> bool {
        self.commit_inner(doc, processing, false)
    }

    /// Undo the most recent level. Flushes a pending commit first. Returns `false` when the
    /// undo stack is empty.
    pub fn undo(&mut self, doc: &mut LineDocument, processing: &mut dyn LineProcessor) -> bool {
        self.commit(doc, processing);
        let Some(chains) = self.undo_stack.pop() else {
            return false;
        };
        let shadows = self.update_to(doc, processing, &chains, UpdateMode::Apply);
        self.redo_stack.push(shadows);
        self.notify(HistoryChangeType::Undone);
        true
    }

    /// Redo the most recently undone level. The mirror of [`undo`](Self::undo).
    pub fn redo(&mut self, doc: &mut LineDocument, processing: &mut dyn LineProcessor) -> bool {
        self.commit(doc, processing);
        let Some(chains) = self.redo_stack.pop() else {
            return false;
        };
        let shadows = self.update_to(doc, processing, &chains, UpdateMode::Apply);
        self.add_undo_level(shadows);
        self.notify(HistoryChangeType::Redone);
        true
    }

    /// Replace the span between `from` and `to` with `lines`, as a single undoable edit.
    ///
    /// Interior boundaries are allocated in the document arena. Pushing with both ends
    /// `None` replaces the whole document (the load path: `push` then [`reset`](Self::reset)
    /// makes the new content the origin of history).
    pub fn push(
        &mut self,
        doc: &mut LineDocument,
        processing: &mut dyn LineProcessor,
        from: Option<BoundaryId>,
        to: Option<BoundaryId>,
        lines: &[&str],
    ) {
        if lines.is_empty() {
            return;
        }
        let whole_document = from.is_none() && to.is_none();
        let mut chain = Vec::with_capacity(lines.len());
        let mut from = from;
        for (i, text) in lines.iter().enumerate() {
            let end = if i == lines.len() - 1 {
                to
            } else {
                Some(doc.create_boundary())
            };
            chain.push(LineRecord {
                text: (*text).to_string(),
                from,
                to: end,
            });
            from = end;
        }
        self.push_chains(doc, processing, vec![chain], whole_document);
    }

    /// Push a pre-built set of chains into the document as one undoable edit.
    ///
    /// `skip_processing` suppresses the pre-commit processing flush; the whole-document
    /// load path uses it because there is no committed state to reconcile against yet.
    pub fn push_chains(
        &mut self,
        doc: &mut LineDocument,
        processing: &mut dyn LineProcessor,
        chains: Vec<Chain>,
        skip_processing: bool,
    ) {
        self.commit_inner(doc, processing, skip_processing);
        let shadows = self.update_to(doc, processing, &chains, UpdateMode::Apply);
        self.add_undo_level(shadows);
        self.redo_stack.clear();
        self.notify(HistoryChangeType::Pushed);
    }

    /// Clear both stacks, making the current document the start position.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Committed text of the line after `anchor`, if a shadow is linked there.
    pub fn text_after(&self, anchor: Option<BoundaryId>) -> Option<&str> {
        self.after(anchor).map(|line| line.text.as_str())
    }

    /// End boundary of the committed line after `anchor`.
    pub fn node_after(&self, anchor: Option<BoundaryId>) -> Option<Option<BoundaryId>> {
        self.after(anchor).map(|line| line.to)
    }

    /// Start boundary of the committed line before `anchor`.
    pub fn node_before(&self, anchor: Option<BoundaryId>) -> Option<Option<BoundaryId>> {
        self.before(anchor).map(|line| line.from)
    }

    /// Whether an undo level is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo level is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether a deferred commit is currently scheduled.
    pub fn commit_pending(&self) -> bool {
        self.timer.is_armed()
    }

    /// Snapshot of the stack state.
    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_depth: self.undo_depth(),
            redo_depth: self.redo_depth(),
            commit_pending: self.commit_pending(),
        }
    }

    /// Subscribe to history mutations. Callbacks run synchronously after each committed
    /// mutation, in subscription order.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&HistoryChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    // [ end of public interface ]

    fn commit_inner(
        &mut self,
        doc: &mut LineDocument,
        processing: &mut dyn LineProcessor,
        skip_processing: bool,
    ) -> bool {
        self.timer.clear();
        if !skip_processing {
            // Commits must observe fully processed lines.
            processing.process_dirty(doc, true);
        }
        let chains = self.touched_chains(doc);
        if chains.is_empty() {
            return false;
        }
        let shadows = self.update_to(doc, processing, &chains, UpdateMode::Link);
        self.add_undo_level(shadows);
        self.redo_stack.clear();
        self.notify(HistoryChangeType::Committed);
        true
    }

    fn set_touched(&mut self, anchor: Option<BoundaryId>) {
        if self.touched_set.insert(anchor) {
            self.touched.push(anchor);
        }
    }

    fn after(&self, anchor: Option<BoundaryId>) -> Option<&LineRecord> {
        self.after_links.get(&anchor)
    }

    fn before(&self, anchor: Option<BoundaryId>) -> Option<&LineRecord> {
        self.before_links.get(&anchor)
    }

    fn add_undo_level(&mut self, level: Vec<Chain>) {
        self.undo_stack.push(level);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    fn notify(&mut self, change_type: HistoryChangeType) {
        if self.callbacks.is_empty() {
            return;
        }
        let change = HistoryChange {
            change_type,
            undo_depth: self.undo_stack.len(),
            redo_depth: self.redo_stack.len(),
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }

    /// Update the document (or just the links) with a set of chains, returning their
    /// shadows — the levels that go onto a stack.
    fn update_to(
        &mut self,
        doc: &mut LineDocument,
        processing: &mut dyn LineProcessor,
        chains: &[Chain],
        mode: UpdateMode,
    ) -> Vec<Chain> {
        let mut shadows = Vec::with_capacity(chains.len());
        let mut dirty = Vec::new();
        for chain in chains {
            // The shadow must be captured before the chain is linked in.
            shadows.push(self.shadow_chain(chain));
            match mode {
                UpdateMode::Apply => dirty.push(self.apply_chain(doc, chain)),
                UpdateMode::Link => self.link_chain(chain),
            }
        }
        if matches!(mode, UpdateMode::Apply) {
            for anchor in dirty {
                processing.mark_dirty(anchor);
            }
            processing.schedule();
        }
        shadows
    }

    /// Record `chain` as the committed state of its span.
    fn link_chain(&mut self, chain: &Chain) {
        for line in chain {
            self.after_links.insert(line.from, line.clone());
            self.before_links.insert(line.to, line.clone());
        }
    }

    /// The previously committed chain covering the same span as `chain`, found by walking
    /// the after-links from its start to its end boundary.
    fn shadow_chain(&self, chain: &Chain) -> Chain {
        let mut shadows = Chain::new();
        let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
            return shadows;
        };
        let end = last.to;
        let Some(mut next) = self.after(first.from).cloned() else {
            return shadows;
        };
        loop {
            let to = next.to;
            shadows.push(next);
            if to.is_none() || to == end {
                break;
            }
            match self.after(to) {
                Some(line) => next = line.clone(),
                // A hole in the links; stop rather than walk into unrelated spans.
                None => break,
            }
        }
        shadows
    }

    /// Build maximal chains out of the touched set, dropping stale and unchanged lines and
    /// deferring chains that cannot resolve a shadow on both ends.
    fn touched_chains(&mut self, doc: &LineDocument) -> Vec<Chain> {
        let touched = std::mem::take(&mut self.touched);
        self.touched_set.clear();

        // Candidate records for anchors whose live text or end boundary differs from the
        // committed shadow.
        let mut candidates: HashMap<Option<BoundaryId>, LineRecord> = HashMap::new();
        let mut order: Vec<Option<BoundaryId>> = Vec::new();
        for anchor in touched {
            if let Some(b) = anchor
                && !doc.contains(b.node())
            {
                // The boundary left the document since it was touched.
                continue;
            }
            let Some((text, to)) = doc.scan_line(anchor) else {
                continue;
            };
            let changed = match self.after(anchor) {
                None => true,
                Some(shadow) => !same_text(&shadow.text, &text) || shadow.to != to,
            };
            if changed {
                order.push(anchor);
                candidates.insert(
                    anchor,
                    LineRecord {
                        text,
                        from: anchor,
                        to,
                    },
                );
            }
        }

        let mut chains = Vec::new();
        for anchor in order {
            // Anchors already pulled into an earlier chain are gone from the map.
            if !candidates.contains_key(&anchor) {
                continue;
            }
            let mut chain: VecDeque<LineRecord> = VecDeque::new();

            // Extend backward over adjacent candidates, through to the document start.
            let mut cur = anchor;
            loop {
                let Some(line) = candidates.remove(&cur) else {
                    break;
                };
                chain.push_front(line);
                let Some(b) = cur else {
                    break;
                };
                cur = doc.prev_boundary(b);
            }

            // Extend forward; the document end stops the walk.
            let Some(seed) = chain.back() else {
                continue;
            };
            let mut cur = seed.to;
            while let Some(b) = cur {
                let Some(line) = candidates.remove(&Some(b)) else {
                    break;
                };
                cur = line.to;
                chain.push_back(line);
            }

            let chain: Chain = chain.into();
            let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
                continue;
            };
            if self.after(first.from).is_some() && self.before(last.to).is_some() {
                chains.push(chain);
            } else {
                // No definite shadow on both ends yet (the surrounding structure has not
                // been committed); retry these lines on the next commit.
                for line in &chain {
                    self.set_touched(line.from);
                }
            }
        }
        chains
    }

    /// Replace the document content between the chain's endpoints with its stored lines,
    /// re-link the boundaries, and keep the cursor in place as well as possible.
    ///
    /// Returns the chain's start anchor, to be marked dirty for re-processing.
    fn apply_chain(&mut self, doc: &mut LineDocument, chain: &Chain) -> Option<BoundaryId> {
        let cursor = doc.cursor();
        let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
            return None;
        };
        let start = first.from;
        let end = last.to;

        doc.remove_between(start, end);
        let end_node = end.map(BoundaryId::node);

        let line_count = chain.len();
        for (i, line) in chain.iter().enumerate() {
            // The span's outer boundaries are already in place; interior ones have to be
            // put back.
            if i > 0
                && let Some(b) = line.from
            {
                doc.splice_before(b.node(), end_node);
            }
            let text_node = doc.create_text(&line.text);
            doc.splice_before(text_node, end_node);

            let Some(cur) = cursor else {
                continue;
            };
            if cur.line_start == line.from {
                // The cursor line is being rewritten. Shift the offset by the length
                // difference when it sits past the common prefix of old and new text.
                let mut diff: isize = 0;
                if i == line_count - 1
                    && let Some(prev) = self.after(line.from)
                {
                    let matched = line
                        .text
                        .chars()
                        .zip(prev.text.chars())
                        .take(cur.offset)
                        .take_while(|(a, b)| a == b)
                        .count();
                    if cur.offset > matched {
                        diff = line.text.chars().count() as isize
                            - prev.text.chars().count() as isize;
                    }
                }
                let offset = (cur.offset as isize + diff).max(0) as usize;
                doc.set_cursor(Cursor {
                    line_start: line.from,
                    offset,
                });
            } else if i == line_count - 1
                && let Some(b) = cur.line_start
                && !doc.contains(b.node())
            {
                // The cursor's line was removed entirely; park it at the end of the last
                // restored line.
                doc.set_cursor(Cursor {
                    line_start: line.from,
                    offset: line.text.chars().count(),
                });
            }
        }

        self.link_chain(chain);
        start
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("max_depth", &self.max_depth)
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("touched", &self.touched.len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Text comparison treating non-breaking spaces as plain spaces, since hosts commonly
/// substitute NBSP for rendering.
fn same_text(a: &str, b: &str) -> bool {
    a.chars()
        .map(nbsp_to_space)
        .eq(b.chars().map(nbsp_to_space))
}

fn nbsp_to_space(c: char) -> char {
    if c == '\u{00a0}' { ' ' } else { c }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::NoProcessing;

    fn load(lines: &[&str]) -> (LineDocument, History) {
        let mut doc = LineDocument::new();
        let mut history = History::new(40, Duration::from_millis(300));
        history.push(&mut doc, &mut NoProcessing, None, None, lines);
        history.reset();
        (doc, history)
    }

    #[test]
    fn test_push_builds_document() {
        let (doc, history) = load(&["alpha", "beta", "gamma"]);
        assert_eq!(doc.text(), "alpha\nbeta\ngamma");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_shadow_accessors_after_load() {
        let (doc, history) = load(&["alpha", "beta"]);
        let b1 = doc.boundaries()[0];
        assert_eq!(history.text_after(None), Some("alpha"));
        assert_eq!(history.text_after(Some(b1)), Some("beta"));
        assert_eq!(history.node_after(None), Some(Some(b1)));
        assert_eq!(history.node_before(None), Some(Some(b1)));
    }

    #[test]
    fn test_commit_records_changed_line_only() {
        let (mut doc, mut history) = load(&["alpha", "beta"]);
        let anchor = doc.line_start(1).unwrap();
        doc.set_line_content(anchor, "BETA").unwrap();
        history.touch(anchor, Instant::now());
        // An untouched-but-unchanged line must not produce a level on its own.
        history.touch(None, Instant::now());

        assert!(history.commit(&mut doc, &mut NoProcessing));
        assert_eq!(history.undo_depth(), 1);

        assert!(history.undo(&mut doc, &mut NoProcessing));
        assert_eq!(doc.text(), "alpha\nbeta");
    }

    #[test]
    fn test_commit_without_changes_is_a_noop() {
        let (mut doc, mut history) = load(&["alpha"]);
        history.touch(None, Instant::now());
        assert!(!history.commit(&mut doc, &mut NoProcessing));
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_touched_detached_boundary_is_dropped() {
        let (mut doc, mut history) = load(&["alpha", "beta"]);
        let b1 = doc.boundaries()[0];
        doc.detach(b1.node());
        history.touch(Some(b1), Instant::now());
        assert!(!history.commit(&mut doc, &mut NoProcessing));
    }

    #[test]
    fn test_adjacent_changes_merge_into_one_chain() {
        let (mut doc, mut history) = load(&["a", "b", "c"]);
        let now = Instant::now();
        for index in [1, 2] {
            let anchor = doc.line_start(index).unwrap();
            let upper = doc.line_content(anchor).unwrap().to_uppercase();
            doc.set_line_content(anchor, &upper).unwrap();
            history.touch(anchor, now);
        }
        history.commit(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "a\nB\nC");
        assert_eq!(history.undo_depth(), 1, "adjacent lines commit as one level");

        history.undo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "a\nb\nc");
    }

    #[test]
    fn test_unresolved_chain_is_deferred_not_dropped() {
        let (mut doc, mut history) = load(&["hello world"]);
        let now = Instant::now();
        let b = doc.split_line(None, 5).unwrap();

        // Only the freshly created boundary is touched: its start has no shadow yet, so
        // the chain cannot be resolved and must be retried.
        history.touch(Some(b), now);
        assert!(!history.commit(&mut doc, &mut NoProcessing));
        assert_eq!(history.undo_depth(), 0);

        // Once the line in front is touched as well, the merged chain resolves.
        history.touch(None, now);
        assert!(history.commit(&mut doc, &mut NoProcessing));
        assert_eq!(history.undo_depth(), 1);

        history.undo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "hello world");
    }

    #[test]
    fn test_undo_restores_line_split() {
        let (mut doc, mut history) = load(&["hello world", "tail"]);
        let now = Instant::now();
        let b = doc.split_line(None, 5).unwrap();
        history.touch(None, now);
        history.touch(Some(b), now);
        history.commit(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "hello\n world\ntail");

        history.undo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "hello world\ntail");

        history.redo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "hello\n world\ntail");
    }

    #[test]
    fn test_nbsp_compares_equal_to_space() {
        let (mut doc, mut history) = load(&["a b"]);
        doc.set_line_content(None, "a\u{00a0}b").unwrap();
        history.touch(None, Instant::now());
        assert!(
            !history.commit(&mut doc, &mut NoProcessing),
            "NBSP-for-space substitution is not a change"
        );
    }

    #[test]
    fn test_subscription_reports_depths() {
        use std::sync::{Arc, Mutex};

        let (mut doc, mut history) = load(&["alpha"]);
        let seen: Arc<Mutex<Vec<(HistoryChangeType, usize, usize)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        history.subscribe(move |change| {
            sink.lock().unwrap().push((
                change.change_type,
                change.undo_depth,
                change.redo_depth,
            ));
        });

        doc.set_line_content(None, "ALPHA").unwrap();
        history.touch(None, Instant::now());
        history.commit(&mut doc, &mut NoProcessing);
        history.undo(&mut doc, &mut NoProcessing);
        history.redo(&mut doc, &mut NoProcessing);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (HistoryChangeType::Committed, 1, 0),
                (HistoryChangeType::Undone, 0, 1),
                (HistoryChangeType::Redone, 1, 0),
            ]
        );
    }

    #[test]
    fn test_cursor_follows_undo_on_edited_line() {
        let (mut doc, mut history) = load(&["beta"]);
        doc.set_line_content(None, "betaXX").unwrap();
        doc.set_cursor(Cursor {
            line_start: None,
            offset: 6,
        });
        history.touch(None, Instant::now());
        history.commit(&mut doc, &mut NoProcessing);

        history.undo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.text(), "beta");
        // Cursor sat after the removed suffix; it shifts back by the length difference.
        assert_eq!(doc.cursor().unwrap().offset, 4);
    }

    #[test]
    fn test_cursor_before_edit_point_is_untouched() {
        let (mut doc, mut history) = load(&["beta"]);
        doc.set_line_content(None, "betaXX").unwrap();
        doc.set_cursor(Cursor {
            line_start: None,
            offset: 2,
        });
        history.touch(None, Instant::now());
        history.commit(&mut doc, &mut NoProcessing);

        history.undo(&mut doc, &mut NoProcessing);
        assert_eq!(doc.cursor().unwrap().offset, 2);
    }

    #[test]
    fn test_cursor_in_removed_line_parks_on_last_restored_line() {
        let (mut doc, mut history) = load(&["hello world"]);
        let now = Instant::now();
        let b = doc.split_line(None, 5).unwrap();
        history.touch(None, now);
        history.touch(Some(b), now);
        history.commit(&mut doc, &mut NoProcessing);

        doc.set_cursor(Cursor {
            line_start: Some(b),
            offset: 3,
        });
        // Undo removes boundary `b`; the cursor line disappears with it.
        history.undo(&mut doc, &mut NoProcessing);
        let cursor = doc.cursor().unwrap();
        assert_eq!(cursor.line_start, None);
        assert_eq!(cursor.offset, "hello world".chars().count());
    }
}
