//! PatchApplier — deterministic application of an edit plan to document text.
//!
//! Operations run strictly in plan order against a progressively mutated
//! working copy, so a later operation's `current_text` is expected to match
//! post-earlier-edit state. The applier never reorders operations and never
//! re-validates plan internal consistency — that is the planner's contract.
//!
//! Matching is layered: exact substring first, then whitespace-normalized
//! line equality (with and without the bullet marker stripped). An operation
//! that matches neither way is reported unresolved, never guessed.

use crate::refinement::document::{
    heading_line, join_lines, normalize_ws, parse_add_target, parse_bullet, starts_with_marker,
};
use crate::refinement::models::{ApplyMethod, ApplyResult, EditKind, EditOperation, EditPlan};

/// The mutated document plus one result per plan operation, in plan order.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub document: String,
    pub results: Vec<ApplyResult>,
}

const REASON_TEXT_NOT_FOUND: &str = "current_text not found";
const REASON_INSERTION_NOT_FOUND: &str = "insertion point not found";

/// Applies every operation of `plan` to `document`, in order.
/// Pure: no I/O, no collaborator calls — fully unit-testable.
pub fn apply_plan(document: &str, plan: &EditPlan) -> PatchOutcome {
    let mut doc = document.to_string();
    let mut results = Vec::with_capacity(plan.operations.len());

    for op in &plan.operations {
        let result = match op.kind {
            EditKind::Replace => apply_replace(&mut doc, op),
            EditKind::Add => apply_add(&mut doc, op),
            EditKind::Remove => apply_remove(&mut doc, op),
        };
        results.push(result);
    }

    PatchOutcome {
        document: doc,
        results,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Replace
// ────────────────────────────────────────────────────────────────────────────

fn apply_replace(doc: &mut String, op: &EditOperation) -> ApplyResult {
    if op.current_text.trim().is_empty() {
        return ApplyResult::unresolved(op, REASON_TEXT_NOT_FOUND);
    }

    // Exact: an unambiguous verbatim occurrence is replaced in place.
    // Multiple exact occurrences are ambiguous and fall through to the
    // line-scoped fuzzy pass rather than guessing.
    if doc.matches(op.current_text.as_str()).count() == 1 {
        *doc = doc.replacen(&op.current_text, &op.proposed_text, 1);
        return ApplyResult::applied(op, ApplyMethod::Exact);
    }

    if let Some(patched) = replace_fuzzy_line(doc, &op.current_text, &op.proposed_text) {
        *doc = patched;
        return ApplyResult::applied(op, ApplyMethod::Fuzzy);
    }

    ApplyResult::unresolved(op, REASON_TEXT_NOT_FOUND)
}

/// Replaces the first line whose whitespace-normalized content equals
/// `current` (checked both with and without its bullet marker), preserving
/// the line's original indentation and marker.
fn replace_fuzzy_line(doc: &str, current: &str, proposed: &str) -> Option<String> {
    let idx = find_fuzzy_line(doc, current)?;
    let trailing_newline = doc.ends_with('\n');
    let mut lines: Vec<String> = doc.lines().map(str::to_string).collect();
    let rewritten = parse_bullet(&lines[idx]).rewrite(proposed);
    lines[idx] = rewritten;
    Some(join_lines(lines, trailing_newline))
}

/// Index of the first line matching `wanted` after whitespace normalization,
/// with or without a leading bullet marker.
fn find_fuzzy_line(doc: &str, wanted: &str) -> Option<usize> {
    let want = normalize_ws(wanted);
    if want.is_empty() {
        return None;
    }
    doc.lines().position(|line| {
        normalize_ws(line) == want || normalize_ws(parse_bullet(line).content) == want
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Add
// ────────────────────────────────────────────────────────────────────────────

fn apply_add(doc: &mut String, op: &EditOperation) -> ApplyResult {
    let Some((section, ordinal)) = parse_add_target(&op.target) else {
        return ApplyResult::unresolved(op, REASON_INSERTION_NOT_FOUND);
    };

    match insert_bullet(doc, &section, ordinal, &op.proposed_text) {
        Some(patched) => {
            *doc = patched;
            ApplyResult::applied(op, ApplyMethod::Exact)
        }
        None => ApplyResult::unresolved(op, REASON_INSERTION_NOT_FOUND),
    }
}

/// Inserts `proposed` as a new bullet after the `ordinal`-th bullet of the
/// section whose heading contains `section` (case-insensitive). Ordinal 0
/// inserts directly under the heading. The new bullet inherits the
/// indentation and marker of the bullet it follows, defaulting to "- ".
fn insert_bullet(doc: &str, section: &str, ordinal: usize, proposed: &str) -> Option<String> {
    let want = section.to_lowercase();
    let trailing_newline = doc.ends_with('\n');
    let mut lines: Vec<String> = doc.lines().map(str::to_string).collect();

    let mut section_level: Option<u8> = None;
    let mut bullet_count = 0usize;
    let mut style: Option<(String, String)> = None; // (indent, marker)
    let mut insert_at: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some((level, text)) = heading_line(line) {
            if let Some(entered) = section_level {
                // Next heading of equal-or-higher level closes the section.
                if level <= entered {
                    break;
                }
            } else if text.to_lowercase().contains(&want) {
                section_level = Some(level);
                bullet_count = 0;
                if ordinal == 0 {
                    insert_at = Some(i + 1);
                    break;
                }
            }
            continue;
        }

        if section_level.is_some() {
            let parsed = parse_bullet(line);
            if let Some(marker) = parsed.marker {
                bullet_count += 1;
                if bullet_count == ordinal {
                    style = Some((parsed.indent.to_string(), marker.to_string()));
                    insert_at = Some(i + 1);
                    break;
                }
            }
        }
    }

    let at = insert_at?;
    let (indent, marker) = style.unwrap_or_else(|| (String::new(), "- ".to_string()));
    let proposed = proposed.trim();
    let new_line = if starts_with_marker(proposed) {
        format!("{indent}{proposed}")
    } else {
        format!("{indent}{marker}{proposed}")
    };

    lines.insert(at, new_line);
    Some(join_lines(lines, trailing_newline))
}

// ────────────────────────────────────────────────────────────────────────────
// Remove
// ────────────────────────────────────────────────────────────────────────────

fn apply_remove(doc: &mut String, op: &EditOperation) -> ApplyResult {
    if op.current_text.trim().is_empty() {
        return ApplyResult::unresolved(op, REASON_TEXT_NOT_FOUND);
    }

    if let Some(patched) = remove_exact(doc, &op.current_text) {
        *doc = collapse_blank_runs(&patched);
        return ApplyResult::applied(op, ApplyMethod::Exact);
    }

    if let Some(idx) = find_fuzzy_line(doc, &op.current_text) {
        let trailing_newline = doc.ends_with('\n');
        let mut lines: Vec<String> = doc.lines().map(str::to_string).collect();
        lines.remove(idx);
        *doc = collapse_blank_runs(&join_lines(lines, trailing_newline));
        return ApplyResult::applied(op, ApplyMethod::Fuzzy);
    }

    ApplyResult::unresolved(op, REASON_TEXT_NOT_FOUND)
}

/// Splices out the first exact occurrence of `needle`. If the splice leaves
/// its line whitespace-only, the whole line goes with it.
fn remove_exact(doc: &str, needle: &str) -> Option<String> {
    let pos = doc.find(needle)?;
    let mut out = String::with_capacity(doc.len() - needle.len());
    out.push_str(&doc[..pos]);
    out.push_str(&doc[pos + needle.len()..]);

    // If the splice left its line whitespace-only (the needle was a whole
    // bullet or the meaningful part of one), drop the line entirely.
    let line_start = out[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line_end = out[line_start..]
        .find('\n')
        .map_or(out.len(), |i| line_start + i);
    if out[line_start..line_end].trim().is_empty() {
        let end = if line_end < out.len() { line_end + 1 } else { line_end };
        out.replace_range(line_start..end, "");
    }
    Some(out)
}

/// Collapses any run of 3+ consecutive blank lines down to a single blank
/// line. Shorter runs — including pre-existing double blanks elsewhere in
/// the document — are left byte-identical.
fn collapse_blank_runs(doc: &str) -> String {
    let trailing_newline = doc.ends_with('\n');
    let lines: Vec<&str> = doc.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim().is_empty() {
            let mut j = i;
            while j < lines.len() && lines[j].trim().is_empty() {
                j += 1;
            }
            let run = j - i;
            if run >= 3 {
                out.push(String::new());
            } else {
                for line in &lines[i..j] {
                    out.push(line.to_string());
                }
            }
            i = j;
        } else {
            out.push(lines[i].to_string());
            i += 1;
        }
    }

    join_lines(out, trailing_newline)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn replace_op(target: &str, current: &str, proposed: &str) -> EditOperation {
        EditOperation {
            kind: EditKind::Replace,
            target: target.to_string(),
            current_text: current.to_string(),
            proposed_text: proposed.to_string(),
            rationale: String::new(),
            source_evidence: String::new(),
        }
    }

    fn add_op(target: &str, proposed: &str) -> EditOperation {
        EditOperation {
            kind: EditKind::Add,
            target: target.to_string(),
            current_text: String::new(),
            proposed_text: proposed.to_string(),
            rationale: String::new(),
            source_evidence: String::new(),
        }
    }

    fn remove_op(target: &str, current: &str) -> EditOperation {
        EditOperation {
            kind: EditKind::Remove,
            target: target.to_string(),
            current_text: current.to_string(),
            proposed_text: String::new(),
            rationale: String::new(),
            source_evidence: String::new(),
        }
    }

    fn plan(ops: Vec<EditOperation>) -> EditPlan {
        EditPlan {
            operations: ops,
            remaining_gaps: String::new(),
            unchanged_rationale: String::new(),
        }
    }

    const DOC: &str = "## Experience\n### Acme\n- Built X\n- Led Y\n";

    #[test]
    fn test_exact_replace_round_trip() {
        let outcome = apply_plan(
            DOC,
            &plan(vec![replace_op("Acme bullet 1", "Built X", "Architected X")]),
        );
        assert_eq!(
            outcome.document,
            "## Experience\n### Acme\n- Architected X\n- Led Y\n"
        );
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.results[0].applied);
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Exact));
    }

    #[test]
    fn test_fuzzy_replace_preserves_marker_and_indentation() {
        let doc = "### Acme\n  - Did X thing\n";
        let outcome = apply_plan(
            doc,
            &plan(vec![replace_op(
                "Acme bullet 1",
                "Did  X   thing", // whitespace differs from the document
                "Rebuilt X pipeline",
            )]),
        );
        assert_eq!(outcome.document, "### Acme\n  - Rebuilt X pipeline\n");
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Fuzzy));
    }

    #[test]
    fn test_fuzzy_replace_matches_marker_stripped_content() {
        // current_text carries no marker; the document line does.
        let doc = "### Acme\n  - Did X thing\n";
        let outcome = apply_plan(
            doc,
            &plan(vec![replace_op("Acme bullet 1", "Did X thing ", "New text")]),
        );
        assert_eq!(outcome.document, "### Acme\n  - New text\n");
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Fuzzy));
    }

    #[test]
    fn test_replace_missing_text_is_unresolved() {
        let outcome = apply_plan(
            DOC,
            &plan(vec![replace_op("Acme bullet 9", "Never existed", "X")]),
        );
        assert_eq!(outcome.document, DOC, "document must be untouched");
        assert!(!outcome.results[0].applied);
        assert_eq!(
            outcome.results[0].reason.as_deref(),
            Some("current_text not found")
        );
    }

    #[test]
    fn test_ambiguous_exact_match_falls_back_to_first_fuzzy_line() {
        let doc = "### Acme\n- Shipped API\n### Globex\n- Shipped API\n";
        let outcome = apply_plan(
            doc,
            &plan(vec![replace_op("Acme bullet 1", "Shipped API", "Shipped v2 API")]),
        );
        // Two exact occurrences: fall through to line match, first line wins.
        assert_eq!(
            outcome.document,
            "### Acme\n- Shipped v2 API\n### Globex\n- Shipped API\n"
        );
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Fuzzy));
    }

    #[test]
    fn test_add_after_last_bullet() {
        let outcome = apply_plan(
            DOC,
            &plan(vec![add_op("Acme, after bullet 2", "Shipped Z")]),
        );
        assert_eq!(
            outcome.document,
            "## Experience\n### Acme\n- Built X\n- Led Y\n- Shipped Z\n"
        );
        assert!(outcome.results[0].applied);
    }

    #[test]
    fn test_add_between_bullets_inherits_style() {
        let doc = "### Acme\n  * Built X\n  * Led Y\n";
        let outcome = apply_plan(doc, &plan(vec![add_op("Acme, after bullet 1", "Shipped Z")]));
        assert_eq!(outcome.document, "### Acme\n  * Built X\n  * Shipped Z\n  * Led Y\n");
    }

    #[test]
    fn test_add_ordinal_zero_inserts_under_heading() {
        let outcome = apply_plan(DOC, &plan(vec![add_op("Acme, after bullet 0", "Shipped Z")]));
        assert_eq!(
            outcome.document,
            "## Experience\n### Acme\n- Shipped Z\n- Built X\n- Led Y\n"
        );
    }

    #[test]
    fn test_add_does_not_count_bullets_of_other_sections() {
        let doc = "### Acme\n- Built X\n### Globex\n- Ran Q\n- Ran R\n";
        let outcome = apply_plan(doc, &plan(vec![add_op("Globex, after bullet 2", "Ran S")]));
        assert_eq!(
            outcome.document,
            "### Acme\n- Built X\n### Globex\n- Ran Q\n- Ran R\n- Ran S\n"
        );
    }

    #[test]
    fn test_add_unreachable_ordinal_is_unresolved() {
        let outcome = apply_plan(DOC, &plan(vec![add_op("Acme, after bullet 7", "Shipped Z")]));
        assert_eq!(outcome.document, DOC);
        assert_eq!(
            outcome.results[0].reason.as_deref(),
            Some("insertion point not found")
        );
    }

    #[test]
    fn test_add_unknown_section_is_unresolved() {
        let outcome = apply_plan(
            DOC,
            &plan(vec![add_op("Initech, after bullet 1", "Shipped Z")]),
        );
        assert!(!outcome.results[0].applied);
    }

    #[test]
    fn test_add_section_match_is_case_insensitive() {
        let outcome = apply_plan(DOC, &plan(vec![add_op("acme, after bullet 1", "Shipped Z")]));
        assert!(outcome.results[0].applied);
        assert!(outcome.document.contains("- Built X\n- Shipped Z\n- Led Y"));
    }

    #[test]
    fn test_remove_exact_drops_emptied_line() {
        let outcome = apply_plan(DOC, &plan(vec![remove_op("Acme bullet 2", "- Led Y")]));
        assert_eq!(outcome.document, "## Experience\n### Acme\n- Built X\n");
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Exact));
    }

    #[test]
    fn test_remove_fuzzy_line_match() {
        let outcome = apply_plan(DOC, &plan(vec![remove_op("Acme bullet 2", "Led   Y")]));
        assert_eq!(outcome.document, "## Experience\n### Acme\n- Built X\n");
        assert_eq!(outcome.results[0].method, Some(ApplyMethod::Fuzzy));
    }

    #[test]
    fn test_remove_collapses_blank_runs() {
        let doc = "### Acme\n\n\n- Led Y\n\n### Globex\n";
        let outcome = apply_plan(doc, &plan(vec![remove_op("Acme bullet 1", "- Led Y")]));
        // Removing the bullet leaves a 3-blank run, collapsed to one.
        assert_eq!(outcome.document, "### Acme\n\n### Globex\n");
        assert!(outcome.document.len() < doc.len());
    }

    #[test]
    fn test_remove_missing_text_is_unresolved() {
        let outcome = apply_plan(DOC, &plan(vec![remove_op("Acme bullet 5", "Never there")]));
        assert_eq!(outcome.document, DOC);
        assert_eq!(
            outcome.results[0].reason.as_deref(),
            Some("current_text not found")
        );
    }

    #[test]
    fn test_operations_apply_in_order_against_mutated_document() {
        // The second operation's current_text only exists after the first ran.
        let outcome = apply_plan(
            DOC,
            &plan(vec![
                replace_op("Acme bullet 1", "Built X", "Architected X"),
                replace_op("Acme bullet 1", "Architected X", "Architected X end-to-end"),
            ]),
        );
        assert!(outcome.document.contains("- Architected X end-to-end\n"));
        assert!(outcome.results.iter().all(|r| r.applied));
    }

    #[test]
    fn test_result_list_matches_plan_length_and_order() {
        let outcome = apply_plan(
            DOC,
            &plan(vec![
                replace_op("Acme bullet 1", "Built X", "Architected X"),
                remove_op("Acme bullet 9", "Not in the document"),
                add_op("Acme, after bullet 1", "Shipped Z"),
            ]),
        );
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].target, "Acme bullet 1");
        assert!(outcome.results[0].applied);
        assert!(!outcome.results[1].applied);
        assert!(outcome.results[2].applied);
    }

    #[test]
    fn test_unrelated_content_is_byte_identical() {
        let doc = "# Resume\n\n## Experience\n### Acme\n- Built X\n- Led Y\n\n## Skills\n- Rust\n";
        let outcome = apply_plan(
            doc,
            &plan(vec![replace_op("Acme bullet 1", "Built X", "Architected X")]),
        );
        assert_eq!(
            outcome.document,
            "# Resume\n\n## Experience\n### Acme\n- Architected X\n- Led Y\n\n## Skills\n- Rust\n"
        );
    }
}
