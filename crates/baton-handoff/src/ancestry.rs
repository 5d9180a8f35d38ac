//! Parent-chain walker.
//!
//! Session files can be large; the walk reads only each file's header line,
//! keeping it O(depth) in bytes. Safe against cycles and malformed headers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use baton_sessions::read_header;

/// Follow the `parentSession` chain starting at `start`.
///
/// Returns the chain beginning with `start` itself. The walk stops on a
/// missing file, an unparseable header, an absent parent, or a path already
/// visited (cycle guard).
#[must_use]
pub fn collect_ancestry(start: &Path) -> Vec<PathBuf> {
    let mut chain = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut cursor = Some(start.to_path_buf());

    while let Some(path) = cursor {
        if !visited.insert(path.clone()) {
            break;
        }
        chain.push(path.clone());
        cursor = read_header(&path).and_then(|header| header.parent_session);
    }
    chain
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use baton_sessions::SessionHeader;

    fn write_session(dir: &Path, name: &str, parent: Option<&Path>) -> PathBuf {
        let path = dir.join(name);
        let header = SessionHeader::new(parent.map(Path::to_path_buf), None);
        let line = serde_json::to_string(&header).unwrap();
        std::fs::write(&path, format!("{line}\n")).unwrap();
        path
    }

    #[test]
    fn single_session_without_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let a = write_session(tmp.path(), "a.jsonl", None);
        assert_eq!(collect_ancestry(&a), vec![a]);
    }

    #[test]
    fn chain_of_three_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write_session(tmp.path(), "root.jsonl", None);
        let mid = write_session(tmp.path(), "mid.jsonl", Some(&root));
        let leaf = write_session(tmp.path(), "leaf.jsonl", Some(&mid));
        assert_eq!(collect_ancestry(&leaf), vec![leaf, mid, root]);
    }

    #[test]
    fn missing_parent_file_ends_the_walk() {
        let tmp = tempfile::tempdir().unwrap();
        let ghost = tmp.path().join("ghost.jsonl");
        let a = write_session(tmp.path(), "a.jsonl", Some(&ghost));
        // The ghost is recorded (it is named by a header) but not followed.
        assert_eq!(collect_ancestry(&a), vec![a, ghost]);
    }

    #[test]
    fn malformed_header_ends_the_walk() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("bad.jsonl");
        std::fs::write(&bad, "garbage\n").unwrap();
        let a = write_session(tmp.path(), "a.jsonl", Some(&bad));
        assert_eq!(collect_ancestry(&a), vec![a, bad]);
    }

    #[test]
    fn cycle_terminates_with_finite_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let a_path = tmp.path().join("a.jsonl");
        let b_path = tmp.path().join("b.jsonl");
        let _ = write_session(tmp.path(), "a.jsonl", Some(&b_path));
        let _ = write_session(tmp.path(), "b.jsonl", Some(&a_path));
        assert_eq!(collect_ancestry(&a_path), vec![a_path, b_path]);
    }

    #[test]
    fn self_parent_terminates() {
        let tmp = tempfile::tempdir().unwrap();
        let a_path = tmp.path().join("a.jsonl");
        let _ = write_session(tmp.path(), "a.jsonl", Some(&a_path));
        assert_eq!(collect_ancestry(&a_path), vec![a_path]);
    }
}
