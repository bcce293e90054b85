//! `line-history-highlight-simple` - Simple (regex-based) highlighting for `line-history`.
//!
//! Provides a budgeted [`LineProcessor`] that keeps per-line style spans up to date as the
//! history engine reports lines dirty. Intended for lightweight formats (JSON/INI/etc.)
//! where full parsing is unnecessary; it also gives commits something real to gate on: a
//! non-forced pass only works through a bounded number of dirty lines per call.

use std::collections::{HashMap, HashSet, VecDeque};

use line_history::{BoundaryId, LineDocument, LineProcessor};
use regex::Regex;

/// Style identifier. Mapping ids to colors is the UI layer's concern.
pub type StyleId = u32;

/// A styled span within one line, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    /// Start character offset within the line.
    pub start: usize,
    /// Exclusive end character offset within the line.
    pub end: usize,
    /// The style to apply.
    pub style_id: StyleId,
}

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    style_id: StyleId,
    capture_group: Option<usize>,
}

impl RegexRule {
    /// Compile a rule that styles every match of `pattern`.
    pub fn new(pattern: &str, style_id: StyleId) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            style_id,
            capture_group: None,
        })
    }

    /// Style only a capture group of each match (e.g. the key of `key = value`).
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    /// The style this rule emits.
    pub fn style_id(&self) -> StyleId {
        self.style_id
    }
}

/// A simple regex-based per-line highlighter.
///
/// Not a parser: rules are applied line by line, so multi-line constructs are out of scope.
#[derive(Debug, Clone)]
pub struct RegexHighlighter {
    rules: Vec<RegexRule>,
}

impl RegexHighlighter {
    /// Build a highlighter from a rule set.
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    /// The rule set.
    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Run all rules over one line and return its style spans (character offsets).
    pub fn highlight_line(&self, line: &str) -> Vec<StyleSpan> {
        let mut spans = Vec::new();
        for rule in &self.rules {
            if let Some(group) = rule.capture_group {
                for caps in rule.regex.captures_iter(line) {
                    let Some(m) = caps.get(group) else {
                        continue;
                    };
                    if let Some(span) = span_from_match(line, m.start(), m.end(), rule.style_id) {
                        spans.push(span);
                    }
                }
            } else {
                for m in rule.regex.find_iter(line) {
                    if let Some(span) = span_from_match(line, m.start(), m.end(), rule.style_id) {
                        spans.push(span);
                    }
                }
            }
        }
        spans
    }

    /// A small default JSON grammar (strings, numbers, booleans, null).
    pub fn json_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, STYLE_STRING)?,
            RegexRule::new(r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#, STYLE_NUMBER)?,
            RegexRule::new(r#"\b(?:true|false|null)\b"#, STYLE_KEYWORD)?,
        ]))
    }
}

/// Default `StyleId` constants for the built-in grammars.
pub const STYLE_STRING: StyleId = 0x0100_0001;
/// Numeric literal style.
pub const STYLE_NUMBER: StyleId = 0x0100_0002;
/// Keyword / constant style.
pub const STYLE_KEYWORD: StyleId = 0x0100_0003;

fn span_from_match(
    line: &str,
    start_byte: usize,
    end_byte: usize,
    style_id: StyleId,
) -> Option<StyleSpan> {
    if start_byte >= end_byte || end_byte > line.len() {
        return None;
    }
    let start = line[..start_byte].chars().count();
    let end = line[..end_byte].chars().count();
    if start >= end {
        return None;
    }
    Some(StyleSpan {
        start,
        end,
        style_id,
    })
}

/// A budgeted [`LineProcessor`] maintaining a span cache keyed by line anchor.
///
/// Lines reported dirty go into a queue; a non-forced [`process_dirty`] pass works through
/// at most `budget` of them, so a burst of edits keeps the history's deferred commit
/// waiting until highlighting has caught up. Anchors whose boundary has left the document
/// are evicted from the cache.
///
/// [`process_dirty`]: LineProcessor::process_dirty
#[derive(Debug)]
pub struct RegexLineProcessor {
    highlighter: RegexHighlighter,
    dirty: VecDeque<Option<BoundaryId>>,
    queued: HashSet<Option<BoundaryId>>,
    spans: HashMap<Option<BoundaryId>, Vec<StyleSpan>>,
    budget: usize,
    scheduled: bool,
}

impl RegexLineProcessor {
    /// Create a processor with the given per-pass line budget.
    pub fn new(highlighter: RegexHighlighter, budget: usize) -> Self {
        Self {
            highlighter,
            dirty: VecDeque::new(),
            queued: HashSet::new(),
            spans: HashMap::new(),
            budget: budget.max(1),
            scheduled: false,
        }
    }

    /// Cached spans for the line starting at `anchor`, if it has been processed.
    pub fn spans(&self, anchor: Option<BoundaryId>) -> Option<&[StyleSpan]> {
        self.spans.get(&anchor).map(Vec::as_slice)
    }

    /// Number of lines still waiting to be processed.
    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    /// Whether the history asked for a processing pass that has not happened yet.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

impl LineProcessor for RegexLineProcessor {
    fn process_dirty(&mut self, doc: &LineDocument, force: bool) -> bool {
        let limit = if force { usize::MAX } else { self.budget };
        let mut processed = 0;
        while processed < limit {
            let Some(anchor) = self.dirty.pop_front() else {
                break;
            };
            self.queued.remove(&anchor);
            match doc.line_content(anchor) {
                Some(text) => {
                    self.spans
                        .insert(anchor, self.highlighter.highlight_line(&text));
                }
                // The line's boundary left the document; drop its cache entry.
                None => {
                    self.spans.remove(&anchor);
                }
            }
            processed += 1;
        }
        self.scheduled = !self.dirty.is_empty();
        self.dirty.is_empty()
    }

    fn mark_dirty(&mut self, anchor: Option<BoundaryId>) {
        if self.queued.insert(anchor) {
            self.dirty.push_back(anchor);
        }
    }

    fn schedule(&mut self) {
        self.scheduled = true;
    }
}
