//! Prompt assembly and goal slugging.

use std::path::PathBuf;

use crate::constants::{ANCESTORS_HEADER, PARENT_MARKER, SKILL_DIRECTIVE};
use crate::file_ops::FileOps;

/// Slug a goal into a session label.
///
/// Lowercases, strips characters outside `[a-z0-9 -]`, trims, collapses
/// whitespace runs to single `-`, truncates to 50 characters. Empty and
/// all-special-character goals yield `""`.
#[must_use]
pub fn slugify(goal: &str) -> String {
    let filtered: String = goal
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    slug.truncate(50);
    slug
}

/// Compose the editor-ready handoff prompt.
///
/// The body is the summary, followed by the collapsed file markers when
/// present. With a parent chain, a header block is prepended: the skill
/// directive, the parent marker, and (for deeper chains) the ancestor list.
/// Without a parent the body is returned unchanged.
#[must_use]
pub fn assemble_prompt(
    summary: &str,
    file_ops: Option<&FileOps>,
    ancestry: &[PathBuf],
) -> String {
    let mut body = summary.to_string();
    if let Some(ops) = file_ops {
        body.push_str("\n\n");
        body.push_str(&ops.markers_text);
    }

    let Some(parent) = ancestry.first() else {
        return body;
    };

    let mut prompt = String::new();
    prompt.push_str(SKILL_DIRECTIVE);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("{PARENT_MARKER} `{}`\n", parent.display()));
    if ancestry.len() > 1 {
        prompt.push('\n');
        prompt.push_str(ANCESTORS_HEADER);
        prompt.push('\n');
        for ancestor in &ancestry[1..] {
            prompt.push_str(&format!("- `{}`\n", ancestor.display()));
        }
    }
    prompt.push('\n');
    prompt.push_str(&body);
    prompt
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // -- slugify --

    #[test]
    fn slug_lowercases_and_joins_with_hyphens() {
        assert_eq!(slugify("Implement OAuth"), "implement-oauth");
    }

    #[test]
    fn slug_strips_special_characters() {
        assert_eq!(slugify("Fix bug #42 (auth!)"), "fix-bug-42-auth");
    }

    #[test]
    fn slug_collapses_whitespace_runs() {
        assert_eq!(slugify("  a   lot \t of   space  "), "a-lot-of-space");
    }

    #[test]
    fn slug_keeps_existing_hyphens() {
        assert_eq!(slugify("auth-flow rework"), "auth-flow-rework");
    }

    #[test]
    fn slug_truncates_to_fifty_characters() {
        let long = "a".repeat(80);
        assert_eq!(slugify(&long).len(), 50);
    }

    #[test]
    fn slug_of_empty_and_special_only_is_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!@#$%^&*()"), "");
    }

    // -- assemble_prompt --

    fn ops(markers: &str) -> FileOps {
        FileOps {
            markers_text: markers.to_string(),
            expansions: HashMap::new(),
        }
    }

    #[test]
    fn no_parent_returns_body_unchanged() {
        let prompt = assemble_prompt("## Goal\nShip", None, &[]);
        assert_eq!(prompt, "## Goal\nShip");
        assert!(!prompt.contains(SKILL_DIRECTIVE));
        assert!(!prompt.contains(PARENT_MARKER));
    }

    #[test]
    fn markers_follow_summary_after_blank_line() {
        let prompt = assemble_prompt("summary", Some(&ops("[+1 read filename]")), &[]);
        assert_eq!(prompt, "summary\n\n[+1 read filename]");
    }

    #[test]
    fn parent_block_starts_with_skill_directive() {
        let prompt = assemble_prompt(
            "summary",
            None,
            &[PathBuf::from("/s/a.jsonl")],
        );
        assert!(prompt.starts_with("/skill:pi-session-query\n\n"));
        assert!(prompt.contains("**Parent session:** `/s/a.jsonl`"));
        assert!(prompt.ends_with("\n\nsummary"));
    }

    #[test]
    fn deeper_chains_list_ancestors() {
        let prompt = assemble_prompt(
            "summary",
            None,
            &[
                PathBuf::from("/s/c.jsonl"),
                PathBuf::from("/s/b.jsonl"),
                PathBuf::from("/s/a.jsonl"),
            ],
        );
        assert!(prompt.contains("**Parent session:** `/s/c.jsonl`"));
        assert!(prompt.contains("**Ancestor sessions:**\n- `/s/b.jsonl`\n- `/s/a.jsonl`"));
    }

    #[test]
    fn single_parent_omits_ancestor_block() {
        let prompt = assemble_prompt("summary", None, &[PathBuf::from("/s/a.jsonl")]);
        assert!(!prompt.contains(ANCESTORS_HEADER));
    }
}
