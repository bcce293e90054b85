//! Arena-backed line document.
//!
//! The document is a doubly linked list of nodes threaded through a `Vec` arena. Nodes are
//! either text segments or *boundaries* (the markers delimiting one line from the next).
//! Arena slots are allocated monotonically and never reused, so a [`BoundaryId`] held by the
//! history stays valid for inspection even after the host detaches the node — a detached
//! boundary simply answers `false` to [`LineDocument::contains`].
//!
//! The start of the first line and the end of the last line have no boundary node; callers
//! address them with `None` (a "null anchor").

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Stable handle to a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Stable handle to a boundary node.
///
/// Line starts are addressed as `Option<BoundaryId>`: `None` means the document start
/// (first line) or, in end position, the document end (last line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryId(NodeId);

impl BoundaryId {
    /// The underlying arena node.
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// Cursor position: the boundary starting the cursor's line plus a character offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Boundary in front of the cursor's line; `None` for the first line.
    pub line_start: Option<BoundaryId>,
    /// Character offset within the line.
    pub offset: usize,
}

/// Structural errors from document mutation.
///
/// These only surface through the host-facing mutation API. The history engine itself never
/// raises them; stale references encountered during commit or apply are skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The referenced node is not currently linked into the document.
    #[error("node is not attached to the document")]
    DetachedNode,
    /// A character offset fell outside the addressed line.
    #[error("offset {0} is out of range for the line")]
    OffsetOutOfRange(usize),
}

#[derive(Debug, Clone)]
enum NodeKind {
    Text(String),
    Boundary,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    attached: bool,
}

/// A line-oriented document: text segments separated by boundary nodes.
///
/// The document is deliberately dumb storage. It carries no history state of its own; the
/// [`History`](crate::History) engine keeps its shadow links in maps keyed by [`BoundaryId`]
/// so that an external mutator can add and remove nodes without corrupting history.
///
/// # Example
///
/// ```rust
/// use line_history::LineDocument;
///
/// let mut doc = LineDocument::new();
/// let text = doc.create_text("hello");
/// doc.attach_before(text, None).unwrap();
/// let boundary = doc.create_boundary();
/// doc.attach_before(boundary.node(), None).unwrap();
/// let text = doc.create_text("world");
/// doc.attach_before(text, None).unwrap();
///
/// assert_eq!(doc.text(), "hello\nworld");
/// assert_eq!(doc.line_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LineDocument {
    nodes: Vec<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    cursor: Option<Cursor>,
}

impl LineDocument {
    /// Create an empty document (a single empty line).
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            prev: None,
            next: None,
            attached: false,
        });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Allocate a detached boundary node.
    pub fn create_boundary(&mut self) -> BoundaryId {
        BoundaryId(self.alloc(NodeKind::Boundary))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// Whether the node is currently linked into the document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).attached
    }

    /// First node of the document, if any.
    pub fn first_node(&self) -> Option<NodeId> {
        self.head
    }

    /// Node following `id` in document order. Meaningless for detached nodes.
    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    /// Node preceding `id` in document order. Meaningless for detached nodes.
    pub fn prev_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev
    }

    /// Link a node into the document in front of `before` (`None` appends at the end).
    ///
    /// An already-attached node is moved, matching the usual tree-insertion semantics.
    pub fn attach_before(&mut self, id: NodeId, before: Option<NodeId>) -> Result<(), DocumentError> {
        if let Some(b) = before
            && !self.node(b).attached
        {
            return Err(DocumentError::DetachedNode);
        }
        if self.node(id).attached {
            self.detach(id);
        }

        let prev = match before {
            Some(b) => self.node(b).prev,
            None => self.tail,
        };
        self.node_mut(id).prev = prev;
        self.node_mut(id).next = before;
        self.node_mut(id).attached = true;
        match prev {
            Some(p) => self.node_mut(p).next = Some(id),
            None => self.head = Some(id),
        }
        match before {
            Some(b) => self.node_mut(b).prev = Some(id),
            None => self.tail = Some(id),
        }
        Ok(())
    }

    /// Like [`attach_before`](Self::attach_before), but appends when the reference node has
    /// gone missing instead of failing. Used on the apply path, which must not error out.
    pub(crate) fn splice_before(&mut self, id: NodeId, before: Option<NodeId>) {
        let before = before.filter(|b| self.node(*b).attached);
        // With a live (or absent) reference node this cannot fail.
        let _ = self.attach_before(id, before);
    }

    /// Unlink a node from the document. The arena slot is retained, so handles stay valid.
    pub fn detach(&mut self, id: NodeId) {
        if !self.node(id).attached {
            return;
        }
        let (prev, next) = {
            let n = self.node(id);
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let n = self.node_mut(id);
        n.prev = None;
        n.next = None;
        n.attached = false;
    }

    /// Detach every node strictly between `start` and `end` (`None` meaning the document
    /// start / end). Tolerates a missing `end`: the walk stops at the document end.
    pub fn remove_between(&mut self, start: Option<BoundaryId>, end: Option<BoundaryId>) {
        let mut pos = match start {
            Some(b) => {
                if !self.contains(b.node()) {
                    return;
                }
                self.next_node(b.node())
            }
            None => self.head,
        };
        let end_node = end.map(BoundaryId::node);
        while pos != end_node {
            let Some(p) = pos else {
                break;
            };
            let next = self.next_node(p);
            self.detach(p);
            pos = next;
        }
    }

    /// Text content and terminating boundary of the line starting after `anchor`.
    ///
    /// Returns `None` when `anchor` refers to a detached boundary. The terminator is `None`
    /// for the last line.
    pub fn scan_line(&self, anchor: Option<BoundaryId>) -> Option<(String, Option<BoundaryId>)> {
        let mut cur = match anchor {
            Some(b) => {
                if !self.contains(b.node()) {
                    return None;
                }
                self.next_node(b.node())
            }
            None => self.head,
        };
        let mut text = String::new();
        while let Some(id) = cur {
            match &self.node(id).kind {
                NodeKind::Boundary => return Some((text, Some(BoundaryId(id)))),
                NodeKind::Text(s) => text.push_str(s),
            }
            cur = self.node(id).next;
        }
        Some((text, None))
    }

    /// The nearest boundary before `from` in document order, or `None` for the document start.
    pub fn prev_boundary(&self, from: BoundaryId) -> Option<BoundaryId> {
        let mut cur = self.node(from.node()).prev;
        while let Some(id) = cur {
            if matches!(self.node(id).kind, NodeKind::Boundary) {
                return Some(BoundaryId(id));
            }
            cur = self.node(id).prev;
        }
        None
    }

    /// The nearest boundary after `from` in document order, or `None` for the document end.
    pub fn next_boundary(&self, from: BoundaryId) -> Option<BoundaryId> {
        let mut cur = self.node(from.node()).next;
        while let Some(id) = cur {
            if matches!(self.node(id).kind, NodeKind::Boundary) {
                return Some(BoundaryId(id));
            }
            cur = self.node(id).next;
        }
        None
    }

    /// All attached boundaries in document order.
    pub fn boundaries(&self) -> Vec<BoundaryId> {
        let mut out = Vec::new();
        let mut cur = self.head;
        while let Some(id) = cur {
            if matches!(self.node(id).kind, NodeKind::Boundary) {
                out.push(BoundaryId(id));
            }
            cur = self.node(id).next;
        }
        out
    }

    /// Total line count. An empty document has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.boundaries().len() + 1
    }

    /// Anchor of the `index`-th line: `Some(None)` for line 0, otherwise the boundary in
    /// front of the line. `None` when the index is out of range.
    pub fn line_start(&self, index: usize) -> Option<Option<BoundaryId>> {
        if index == 0 {
            return Some(None);
        }
        self.boundaries().get(index - 1).copied().map(Some)
    }

    /// Live text of the line starting at `anchor`.
    pub fn line_content(&self, anchor: Option<BoundaryId>) -> Option<String> {
        self.scan_line(anchor).map(|(text, _)| text)
    }

    /// Replace the text of the line starting at `anchor` with a single text node.
    ///
    /// This is the host's "typing" primitive: it edits content without moving boundaries,
    /// leaving touch tracking to the caller.
    pub fn set_line_content(
        &mut self,
        anchor: Option<BoundaryId>,
        text: &str,
    ) -> Result<(), DocumentError> {
        let Some((_, terminator)) = self.scan_line(anchor) else {
            return Err(DocumentError::DetachedNode);
        };
        self.remove_between(anchor, terminator);
        let node = self.create_text(text);
        self.splice_before(node, terminator.map(BoundaryId::node));
        Ok(())
    }

    /// Split the line starting at `anchor` at `offset` characters, inserting a new boundary.
    ///
    /// Returns the new boundary. The caller is expected to touch both the original anchor
    /// and the returned boundary so the edit gets committed.
    pub fn split_line(
        &mut self,
        anchor: Option<BoundaryId>,
        offset: usize,
    ) -> Result<BoundaryId, DocumentError> {
        let Some((text, terminator)) = self.scan_line(anchor) else {
            return Err(DocumentError::DetachedNode);
        };
        let byte = char_to_byte(&text, offset).ok_or(DocumentError::OffsetOutOfRange(offset))?;
        let (left, right) = text.split_at(byte);
        let (left, right) = (left.to_string(), right.to_string());

        self.remove_between(anchor, terminator);
        let end = terminator.map(BoundaryId::node);
        let left_node = self.create_text(&left);
        self.splice_before(left_node, end);
        let boundary = self.create_boundary();
        self.splice_before(boundary.node(), end);
        let right_node = self.create_text(&right);
        self.splice_before(right_node, end);
        Ok(boundary)
    }

    /// Whole-document text, with `\n` at each boundary.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut cur = self.head;
        while let Some(id) = cur {
            match &self.node(id).kind {
                NodeKind::Text(s) => out.push_str(s),
                NodeKind::Boundary => out.push('\n'),
            }
            cur = self.node(id).next;
        }
        out
    }

    /// Current cursor position, if one has been set.
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Set the cursor, clamping the offset to the line length and to a grapheme-cluster
    /// boundary (a cursor inside an emoji or combining sequence is not representable).
    pub fn set_cursor(&mut self, cursor: Cursor) {
        let Some((text, _)) = self.scan_line(cursor.line_start) else {
            self.cursor = None;
            return;
        };
        let offset = clamp_to_grapheme(&text, cursor.offset);
        self.cursor = Some(Cursor {
            line_start: cursor.line_start,
            offset,
        });
    }

    /// Clear the cursor.
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }
}

/// Byte index of the `offset`-th character, or `None` when out of range.
fn char_to_byte(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}

/// Largest grapheme-aligned character offset not exceeding `offset`.
fn clamp_to_grapheme(text: &str, offset: usize) -> usize {
    let total = text.chars().count();
    let target = offset.min(total);
    let mut pos = 0;
    let mut best = 0;
    for g in text.graphemes(true) {
        if pos >= target {
            break;
        }
        pos += g.chars().count();
        if pos <= target {
            best = pos;
        }
    }
    best
}
