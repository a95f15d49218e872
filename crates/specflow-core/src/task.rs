use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// One checklist item parsed from a tasks document.
///
/// Produced by [`parse_tasks`] and consumed read-only by the command
/// generator. Order of appearance in the source document is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Hierarchical identifier as written in the document (e.g. "1", "2.3").
    pub id: String,
    /// Summary from the task line itself.
    pub description: String,
    /// Checkbox state; false when the marker is missing or unparseable.
    pub completed: bool,
    /// Free-text sub-bullets that are not annotations or sub-tasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Payload of a `_Leverage: …_` annotation, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<String>,
    /// Tokens of a `_Requirements: …_` annotation, if present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
}

// ---------------------------------------------------------------------------
// Line patterns
// ---------------------------------------------------------------------------

static TASK_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn task_line_re() -> &'static Regex {
    // "- [x] 2.3. Description" with optional checkbox and optional "."/")"
    // after the id. IDs are dotted/hyphenated numeric chains.
    TASK_LINE_RE.get_or_init(|| {
        Regex::new(r"^\s*-\s*(?:\[([ xX])\]\s*)?(\d+(?:[.\-]\d+)*)[.)]?\s+(\S.*)$").unwrap()
    })
}

/// Structured field an annotation payload is routed into.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AnnotationKind {
    Leverage,
    Requirements,
}

static ANNOTATION_RES: OnceLock<Vec<(AnnotationKind, Regex)>> = OnceLock::new();

/// The closed set of recognized annotation markers. Adding a kind means
/// adding a row here and a field on [`Task`]; the scan loop is untouched.
fn annotation_res() -> &'static [(AnnotationKind, Regex)] {
    ANNOTATION_RES.get_or_init(|| {
        vec![
            (
                AnnotationKind::Leverage,
                Regex::new(r"^_?Leverage:\s*(.*?)_?$").unwrap(),
            ),
            (
                AnnotationKind::Requirements,
                Regex::new(r"^_?Requirements:\s*(.*?)_?$").unwrap(),
            ),
        ]
    })
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a tasks document into an ordered list of [`Task`] records.
///
/// Single forward pass over lines, never fails. Lines that match the task
/// pattern open a new record; annotation lines fill the open record's
/// `leverage`/`requirements`; every other non-blank line following an open
/// record is kept as a detail line. Lines before the first task line and
/// blank lines are dropped. Fenced code blocks get no special treatment:
/// a task-shaped line inside a fence is parsed like any other.
///
/// Duplicate ids are kept in document order; each repeat logs a warning.
pub fn parse_tasks(content: &str) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for line in content.lines() {
        if let Some(caps) = task_line_re().captures(line) {
            let id = caps[2].to_string();
            if !seen_ids.insert(id.clone()) {
                tracing::warn!("duplicate task id '{id}' in tasks document");
            }
            tasks.push(Task {
                id,
                description: caps[3].trim().to_string(),
                completed: matches!(caps.get(1).map(|m| m.as_str()), Some("x") | Some("X")),
                details: Vec::new(),
                leverage: None,
                requirements: Vec::new(),
            });
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Non-task text belongs to the task it appears under, if any.
        let Some(current) = tasks.last_mut() else {
            continue;
        };

        if let Some((kind, payload)) = match_annotation(trimmed) {
            match kind {
                AnnotationKind::Leverage => {
                    if !payload.is_empty() {
                        current.leverage = Some(payload.to_string());
                    }
                }
                AnnotationKind::Requirements => {
                    current.requirements = payload
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect();
                }
            }
            continue;
        }

        let detail = trimmed.strip_prefix("- ").unwrap_or(trimmed);
        current.details.push(detail.to_string());
    }

    tasks
}

fn match_annotation(trimmed: &str) -> Option<(AnnotationKind, &str)> {
    for (kind, re) in annotation_res() {
        if let Some(caps) = re.captures(trimmed) {
            let payload = caps.get(1).map_or("", |m| m.as_str()).trim();
            return Some((*kind, payload));
        }
    }
    None
}

/// Human-readable summary: "2/5 completed"
pub fn summarize(tasks: &[Task]) -> String {
    let done = tasks.iter().filter(|t| t.completed).count();
    format!("{done}/{} completed", tasks.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_task_scenario() {
        let input = "- [x] 1. Implement login\n  _Leverage: src/auth.ts_\n- [ ] 2. Add tests\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks.len(), 2);

        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[0].description, "Implement login");
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].leverage.as_deref(), Some("src/auth.ts"));
        assert!(tasks[0].details.is_empty());

        assert_eq!(tasks[1].id, "2");
        assert_eq!(tasks[1].description, "Add tests");
        assert!(!tasks[1].completed);
        assert!(tasks[1].leverage.is_none());
    }

    #[test]
    fn empty_input_parses_to_empty_list() {
        assert!(parse_tasks("").is_empty());
        assert!(parse_tasks("\n\n  \n").is_empty());
    }

    #[test]
    fn document_order_is_preserved() {
        let input = "- [ ] 3. Third\n- [ ] 1. First\n- [ ] 2. Second\n";
        let ids: Vec<String> = parse_tasks(input).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn checkbox_states() {
        let tasks = parse_tasks("- [x] 1. Done\n- [X] 2. Also done\n- [ ] 3. Open\n- 4. No box\n");
        assert_eq!(tasks.len(), 4);
        assert!(tasks[0].completed);
        assert!(tasks[1].completed);
        assert!(!tasks[2].completed);
        assert!(!tasks[3].completed);
    }

    #[test]
    fn hierarchical_ids_accepted_without_parent() {
        let tasks = parse_tasks("- [ ] 2.1 Child without a parent\n");
        assert_eq!(tasks[0].id, "2.1");
        assert_eq!(tasks[0].description, "Child without a parent");
    }

    #[test]
    fn id_trailing_punctuation_is_separator_not_id() {
        let tasks = parse_tasks("- [ ] 2.3. Dotted id\n- [ ] 4) Paren id\n");
        assert_eq!(tasks[0].id, "2.3");
        assert_eq!(tasks[0].description, "Dotted id");
        assert_eq!(tasks[1].id, "4");
        assert_eq!(tasks[1].description, "Paren id");
    }

    #[test]
    fn leverage_line_excluded_from_details() {
        let input = "- [ ] 1. Task\n  _Leverage: src/utils/retry.rs_\n  - extra context\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks[0].leverage.as_deref(), Some("src/utils/retry.rs"));
        assert_eq!(tasks[0].details, ["extra context"]);
    }

    #[test]
    fn requirements_tokens_trimmed_and_nonempty() {
        let input = "- [ ] 1. Task\n  _Requirements: 1.1,  2.2 , , 3_\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks[0].requirements, ["1.1", "2.2", "3"]);
    }

    #[test]
    fn empty_annotation_payload_is_dropped() {
        let input = "- [ ] 1. Task\n  _Leverage:_\n  _Requirements:_\n";
        let tasks = parse_tasks(input);
        assert!(tasks[0].leverage.is_none());
        assert!(tasks[0].requirements.is_empty());
        assert!(tasks[0].details.is_empty());
    }

    #[test]
    fn detail_lines_accumulate_until_next_task() {
        let input = "- [ ] 1. First\n  uses the session cache\n  - touches login and logout\n- [ ] 2. Second\n";
        let tasks = parse_tasks(input);
        assert_eq!(
            tasks[0].details,
            ["uses the session cache", "touches login and logout"]
        );
        assert!(tasks[1].details.is_empty());
    }

    #[test]
    fn text_before_first_task_is_skipped() {
        let input = "# Tasks\n\nSome intro prose.\n\n- [ ] 1. Only task\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].details.is_empty());
    }

    #[test]
    fn duplicate_ids_are_kept_in_order() {
        let tasks = parse_tasks("- [ ] 1. First\n- [x] 1. Repeat\n");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[1].id, "1");
        assert!(tasks[1].completed);
    }

    #[test]
    fn fenced_code_blocks_are_scanned() {
        // Fence-blind by decision: a task-shaped line inside a code block
        // still produces a record.
        let input = "```\n- [ ] 9. Inside a fence\n```\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "9");
    }

    #[test]
    fn parse_is_idempotent() {
        let input = "- [x] 1. A\n  _Requirements: 1.1_\n- [ ] 2. B\n  detail\n";
        assert_eq!(parse_tasks(input), parse_tasks(input));
    }

    #[test]
    fn non_numeric_bullets_are_details_not_tasks() {
        let input = "- [ ] 1. Real task\n- [ ] fix the thing\n- just a note\n";
        let tasks = parse_tasks(input);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].details.len(), 2);
    }

    #[test]
    fn summarize_counts_completed() {
        let tasks = parse_tasks("- [x] 1. A\n- [ ] 2. B\n- [x] 3. C\n");
        assert_eq!(summarize(&tasks), "2/3 completed");
    }
}
