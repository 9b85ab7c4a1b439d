//! Incremental token scanner for inline micro-syntax.
//!
//! `scan` re-examines only the minimal region around an edit, extended to
//! the nearest whitespace boundaries, and yields candidate spans for the
//! registry to reconcile. A candidate is *open* until its closing delimiter
//! is typed (`]` for properties, trailing whitespace for tags); open
//! candidates are never promoted to annotations, so nothing flickers while
//! the user is still composing the syntax.

mod cursor;
mod kinds;

pub use cursor::Cursor;
pub use kinds::{Property, Tag};

use log::debug;

use crate::annotations::{AnnotationKind, Operator};
use crate::span::Span;

/// State of a candidate span: whether its closing delimiter has been typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Open,
    Closed,
}

/// A span the scanner recognized as inline syntax, or the beginning of it.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// Incomplete pattern (`#tag` without trailing whitespace, `[...` with
    /// no `]` yet). Tracked so the registry can retire a previously closed
    /// annotation whose delimiter was deleted, but never promoted itself.
    Open { span: Span },
    /// Completed pattern ready for promotion to an annotation.
    Closed { span: Span, kind: AnnotationKind },
}

impl Candidate {
    pub fn span(&self) -> Span {
        match self {
            Candidate::Open { span } | Candidate::Closed { span, .. } => *span,
        }
    }

    pub fn state(&self) -> CandidateState {
        match self {
            Candidate::Open { .. } => CandidateState::Open,
            Candidate::Closed { .. } => CandidateState::Closed,
        }
    }
}

/// Result of one incremental scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// The region that was actually examined, in absolute buffer offsets.
    /// Annotations outside it are untouched by reconciliation.
    pub region: Span,
    pub candidates: Vec<Candidate>,
}

/// Scans `text` (a slice of the buffer starting at absolute offset `base`)
/// around `changed`, an absolute byte range touched by the latest edit.
///
/// The examined region is `changed` extended to the nearest whitespace or
/// slice boundary on both sides, then widened further when it sits inside
/// an unmatched `[` pair, since property values may contain spaces.
pub fn scan(text: &str, base: usize, changed: std::ops::Range<usize>) -> Scan {
    let bytes = text.as_bytes();
    let local_start = changed.start.saturating_sub(base).min(bytes.len());
    let local_end = changed.end.saturating_sub(base).min(bytes.len());

    let mut start = local_start;
    while start > 0 && !bytes[start - 1].is_ascii_whitespace() {
        start -= 1;
    }
    let mut end = local_end;
    while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    // Include the terminating whitespace byte so a tag edited inside its
    // label can still see the closing delimiter.
    if end < bytes.len() {
        end += 1;
    }

    // A property value may contain spaces, so whitespace extension can land
    // inside a bracket pair. Pull back to the most recent unmatched `[`,
    // and forward to its `]` (or the end of the slice).
    if let Some(open) = unmatched_open_before(bytes, start) {
        start = open;
    }
    if has_unmatched_open(&bytes[start..end]) {
        end = close_after(bytes, end);
    }

    let mut candidates = Vec::new();
    let mut cur = Cursor::new(&text[start..end], base + start);
    while !cur.eof() {
        if let Some(c) = try_parse_property(&mut cur) {
            candidates.push(c);
            continue;
        }
        if let Some(c) = try_parse_tag(&mut cur) {
            candidates.push(c);
            continue;
        }
        cur.bump();
    }

    Scan {
        region: Span::new(base + start, base + end),
        candidates,
    }
}

/// Position of the most recent `[` before `at` that has no matching `]`.
fn unmatched_open_before(bytes: &[u8], at: usize) -> Option<usize> {
    let mut stack = Vec::new();
    for (i, &b) in bytes[..at].iter().enumerate() {
        match b {
            b'\n' => stack.clear(),
            _ if b == Property::OPEN => stack.push(i),
            _ if b == Property::CLOSE => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.last().copied()
}

fn has_unmatched_open(bytes: &[u8]) -> bool {
    let mut depth = 0usize;
    for &b in bytes {
        if b == Property::OPEN {
            depth += 1;
        } else if b == Property::CLOSE {
            depth = depth.saturating_sub(1);
        } else if b == b'\n' {
            depth = 0;
        }
    }
    depth > 0
}

/// First position past a `]` at or after `from`, stopping at end of line.
fn close_after(bytes: &[u8], from: usize) -> usize {
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        if b == Property::CLOSE {
            return i + 1;
        }
        if b == b'\n' {
            return i;
        }
    }
    bytes.len()
}

/// Attempts to parse a property starting at `[`.
///
/// The innermost well-formed pair wins: a second `[` before the first `]`
/// restarts the candidate there, leaving the outer `[` as literal text.
/// Empty key or value (after trimming) makes the pattern literal text.
/// On failure the cursor is restored.
fn try_parse_property(cur: &mut Cursor<'_>) -> Option<Candidate> {
    if cur.peek() != Some(Property::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let mut start = cur.pos();
    cur.bump(); // [
    let mut key_start = cur.pos();
    let mut sep: Option<usize> = None;

    loop {
        match cur.peek() {
            None | Some(b'\n') => {
                // No closing delimiter in the region: open candidate.
                return Some(Candidate::Open {
                    span: Span::new(start, cur.pos()),
                });
            }
            Some(Property::OPEN) => {
                start = cur.pos();
                cur.bump();
                key_start = cur.pos();
                sep = None;
            }
            Some(Property::SEP) if sep.is_none() => {
                sep = Some(cur.pos());
                cur.bump();
            }
            Some(Property::CLOSE) => {
                cur.bump();
                let end = cur.pos();
                let Some(sep) = sep else {
                    debug!("bracket pair without separator treated as literal text");
                    *cur = saved;
                    return None;
                };
                let key = cur.text(key_start, sep).trim();
                let rest = cur.text(sep + 1, end - 1);
                let (operator, value) = match rest.strip_prefix(Property::QUALIFIER) {
                    Some(qualified) => (Operator::QualifiedIs, qualified.trim()),
                    None => (Operator::Is, rest.trim()),
                };
                if key.is_empty() || value.is_empty() {
                    debug!("property with empty key or value treated as literal text");
                    *cur = saved;
                    return None;
                }
                return Some(Candidate::Closed {
                    span: Span::new(start, end),
                    kind: AnnotationKind::Property {
                        key: key.to_string(),
                        operator,
                        value: value.to_string(),
                    },
                });
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
}

/// Attempts to parse a tag starting at `#`.
///
/// The sigil must sit at a word boundary. The label runs to the next
/// whitespace, `[`, or `#`; the candidate is closed only when the
/// terminator is whitespace, so a tag running to end-of-input stays open.
/// On failure the cursor is restored.
fn try_parse_tag(cur: &mut Cursor<'_>) -> Option<Candidate> {
    if cur.peek() != Some(Tag::SIGIL) {
        return None;
    }
    if let Some(prev) = cur.prev()
        && !prev.is_ascii_whitespace()
    {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump(); // #
    let label_start = cur.pos();
    while let Some(b) = cur.peek() {
        if b.is_ascii_whitespace() || b == Property::OPEN || b == Tag::SIGIL {
            break;
        }
        cur.bump();
    }

    if cur.pos() == label_start {
        // Bare sigil, literal text.
        *cur = saved;
        return None;
    }

    let span = Span::new(start, cur.pos());
    match cur.peek() {
        Some(b) if b.is_ascii_whitespace() => Some(Candidate::Closed {
            span,
            kind: AnnotationKind::Tag {
                label: cur.text(label_start, span.end).to_string(),
            },
        }),
        _ => Some(Candidate::Open { span }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn closed_kinds(scan: &Scan) -> Vec<&AnnotationKind> {
        scan.candidates
            .iter()
            .filter_map(|c| match c {
                Candidate::Closed { kind, .. } => Some(kind),
                Candidate::Open { .. } => None,
            })
            .collect()
    }

    #[test]
    fn tag_with_trailing_space_is_closed() {
        let text = "#testing ";
        let scan = scan(text, 0, 8..9);
        assert_eq!(scan.region, Span::new(0, 9));
        assert_eq!(
            scan.candidates,
            vec![Candidate::Closed {
                span: Span::new(0, 8),
                kind: AnnotationKind::Tag {
                    label: "testing".into()
                },
            }]
        );
    }

    #[test]
    fn tag_at_end_of_input_stays_open() {
        let scan = scan("#testing", 0, 7..8);
        assert_eq!(
            scan.candidates,
            vec![Candidate::Open {
                span: Span::new(0, 8)
            }]
        );
    }

    #[test]
    fn simple_property_closes_at_bracket() {
        let text = "[status:in-progress]";
        let scan = scan(text, 0, 19..20);
        assert_eq!(
            scan.candidates,
            vec![Candidate::Closed {
                span: Span::new(0, 20),
                kind: AnnotationKind::Property {
                    key: "status".into(),
                    operator: Operator::Is,
                    value: "in-progress".into(),
                },
            }]
        );
    }

    #[test]
    fn qualified_property_parses_is_operator() {
        let text = "[status:is:in-progress]";
        let scan = scan(text, 0, 22..23);
        assert_eq!(
            closed_kinds(&scan),
            vec![&AnnotationKind::Property {
                key: "status".into(),
                operator: Operator::QualifiedIs,
                value: "in-progress".into(),
            }]
        );
    }

    #[test]
    fn unclosed_property_is_open() {
        let scan = scan("[status:in", 0, 9..10);
        assert_eq!(
            scan.candidates,
            vec![Candidate::Open {
                span: Span::new(0, 10)
            }]
        );
    }

    #[test]
    fn innermost_bracket_pair_wins() {
        // The second `[` restarts the candidate; the outer `[` is literal.
        let text = "[outer [key:value]";
        let scan = scan(text, 0, 17..18);
        assert_eq!(
            scan.candidates,
            vec![Candidate::Closed {
                span: Span::new(7, 18),
                kind: AnnotationKind::Property {
                    key: "key".into(),
                    operator: Operator::Is,
                    value: "value".into(),
                },
            }]
        );
    }

    #[rstest]
    #[case::empty_key("[:value] ")]
    #[case::empty_value("[key:] ")]
    #[case::empty_qualified_value("[key:is:] ")]
    #[case::no_separator("[literal] ")]
    fn malformed_property_is_literal_text(#[case] text: &str) {
        let scan = scan(text, 0, 0..text.len());
        assert_eq!(closed_kinds(&scan), Vec::<&AnnotationKind>::new());
    }

    #[test]
    fn bare_sigil_is_literal_text() {
        let scan = scan("# heading", 0, 0..1);
        assert!(scan.candidates.is_empty());
    }

    #[test]
    fn sigil_mid_word_is_literal_text() {
        let scan = scan("c#sharp ", 0, 0..7);
        assert!(scan.candidates.is_empty());
    }

    #[test]
    fn property_value_may_contain_spaces() {
        let text = "[service:Web Design]";
        // Edit lands on the `]`; whitespace extension alone would start the
        // region at "Design]", bracket widening pulls it back to the `[`.
        let scan = scan(text, 0, 19..20);
        assert_eq!(scan.region, Span::new(0, 20));
        assert_eq!(
            closed_kinds(&scan),
            vec![&AnnotationKind::Property {
                key: "service".into(),
                operator: Operator::Is,
                value: "Web Design".into(),
            }]
        );
    }

    #[test]
    fn region_is_minimal_for_word_edit() {
        let text = "untouched #tag here";
        let scan = scan(text, 0, 11..12);
        // Only the word containing the edit (plus its terminator) is examined.
        assert_eq!(scan.region, Span::new(10, 15));
        assert_eq!(
            scan.candidates,
            vec![Candidate::Closed {
                span: Span::new(10, 14),
                kind: AnnotationKind::Tag {
                    label: "tag".into()
                },
            }]
        );
    }

    #[test]
    fn key_case_is_preserved() {
        let scan = scan("[Status:Open] ", 0, 12..13);
        match &closed_kinds(&scan)[..] {
            [AnnotationKind::Property { key, value, .. }] => {
                assert_eq!(key, "Status");
                assert_eq!(value, "Open");
            }
            other => panic!("expected one property, got {other:?}"),
        }
    }

    #[test]
    fn base_offset_shifts_spans() {
        let scan = scan("#tag ", 100, 103..104);
        assert_eq!(
            scan.candidates,
            vec![Candidate::Closed {
                span: Span::new(100, 104),
                kind: AnnotationKind::Tag {
                    label: "tag".into()
                },
            }]
        );
    }

    #[test]
    fn property_beats_tag_in_same_range() {
        let text = "#x[key:value] ";
        let scan = scan(text, 0, 0..13);
        // The tag label stops at `[`, the property parses on its own.
        assert_eq!(scan.candidates.len(), 2);
        assert_eq!(scan.candidates[0].span(), Span::new(0, 2));
        assert_eq!(scan.candidates[0].state(), CandidateState::Open);
        assert_eq!(
            scan.candidates[1],
            Candidate::Closed {
                span: Span::new(2, 13),
                kind: AnnotationKind::Property {
                    key: "key".into(),
                    operator: Operator::Is,
                    value: "value".into(),
                },
            }
        );
    }
}
