//! Unified-diff text to per-file, per-hunk changed-line lists.
//!
//! Only changed lines are needed downstream, so context lines are dropped
//! and hunk headers carry no line numbers. Malformed input never fails:
//! unrecognized lines are ignored.

use riskgate_core::Hunk;

/// Parse raw unified-diff text into an ordered list of [`Hunk`]s.
///
/// A `diff --git a/<old> b/<new>` header closes any open hunk and sets the
/// current file to `<new>`. A line starting with `@@` closes any open hunk
/// and opens a new one attributed to the current file. Within a hunk,
/// `-` lines (excluding the `---` marker) land in `removed` and `+` lines
/// (excluding `+++`) land in `added`, markers stripped. A hunk seen before
/// any file header gets `file = None`; scorers treat those as
/// unattributable.
///
/// # Examples
///
/// ```
/// use riskgate_collect::parse_hunks;
///
/// let diff = "diff --git a/f.ts b/f.ts\n\
///             --- a/f.ts\n\
///             +++ b/f.ts\n\
///             @@ -1,2 +1,2 @@\n\
///             -old line\n\
///             +new line\n";
/// let hunks = parse_hunks(diff);
/// assert_eq!(hunks.len(), 1);
/// assert_eq!(hunks[0].file.as_deref(), Some("f.ts"));
/// assert_eq!(hunks[0].removed, vec!["old line"]);
/// assert_eq!(hunks[0].added, vec!["new line"]);
/// ```
pub fn parse_hunks(diff_text: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current_file: Option<String> = None;
    let mut current: Option<Hunk> = None;

    for line in diff_text.lines() {
        if let Some(new_path) = parse_file_header(line) {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            current_file = Some(new_path.to_string());
            continue;
        }
        if line.starts_with("@@") {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            current = Some(Hunk {
                file: current_file.clone(),
                removed: Vec::new(),
                added: Vec::new(),
            });
            continue;
        }
        let Some(hunk) = current.as_mut() else {
            continue;
        };
        if line.starts_with('-') && !line.starts_with("---") {
            hunk.removed.push(line[1..].to_string());
        } else if line.starts_with('+') && !line.starts_with("+++") {
            hunk.added.push(line[1..].to_string());
        }
    }

    if let Some(hunk) = current.take() {
        hunks.push(hunk);
    }
    hunks
}

/// Extract the new-side path from a `diff --git a/<old> b/<new>` line.
fn parse_file_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("diff --git a/")?;
    let idx = rest.find(" b/")?;
    Some(&rest[idx + 3..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_hunks() {
        assert!(parse_hunks("").is_empty());
    }

    #[test]
    fn single_file_single_hunk() {
        let diff = "\
diff --git a/src/app.ts b/src/app.ts
index abc1234..def5678 100644
--- a/src/app.ts
+++ b/src/app.ts
@@ -1,3 +1,3 @@
 context line
-removed line
+added line
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file.as_deref(), Some("src/app.ts"));
        assert_eq!(hunks[0].removed, vec!["removed line"]);
        assert_eq!(hunks[0].added, vec!["added line"]);
    }

    #[test]
    fn context_lines_are_dropped() {
        let diff = "\
diff --git a/a.ts b/a.ts
@@ -1,3 +1,3 @@
 untouched
-gone
 also untouched
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks[0].removed, vec!["gone"]);
        assert!(hunks[0].added.is_empty());
    }

    #[test]
    fn file_markers_are_not_content() {
        let diff = "\
diff --git a/a.ts b/a.ts
@@ -1 +1 @@
--- a/a.ts
+++ b/a.ts
-real removal
";
        let hunks = parse_hunks(diff);
        // The ---/+++ lines inside the hunk are markers, not changes
        assert_eq!(hunks[0].removed, vec!["real removal"]);
        assert!(hunks[0].added.is_empty());
    }

    #[test]
    fn multiple_hunks_per_file() {
        let diff = "\
diff --git a/lib.ts b/lib.ts
@@ -1,2 +1,2 @@
-first
+FIRST
@@ -10,2 +10,2 @@
-second
+SECOND
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].file.as_deref(), Some("lib.ts"));
        assert_eq!(hunks[1].file.as_deref(), Some("lib.ts"));
        assert_eq!(hunks[1].removed, vec!["second"]);
    }

    #[test]
    fn file_header_closes_open_hunk() {
        let diff = "\
diff --git a/a.ts b/a.ts
@@ -1 +1 @@
-one
diff --git a/b.ts b/b.ts
@@ -1 +1 @@
+two
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].file.as_deref(), Some("a.ts"));
        assert_eq!(hunks[1].file.as_deref(), Some("b.ts"));
        assert_eq!(hunks[1].added, vec!["two"]);
    }

    #[test]
    fn hunk_without_file_header_is_unattributed() {
        let diff = "\
@@ -1 +1 @@
-orphan removal
+orphan addition
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].file.is_none());
        assert_eq!(hunks[0].removed, vec!["orphan removal"]);
    }

    #[test]
    fn final_hunk_is_flushed_at_eof() {
        let diff = "\
diff --git a/tail.ts b/tail.ts
@@ -1 +1,2 @@
+last line of input";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].added, vec!["last line of input"]);
    }

    #[test]
    fn rename_header_uses_new_path() {
        let diff = "\
diff --git a/old/name.ts b/new/name.ts
@@ -1 +1 @@
-x
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks[0].file.as_deref(), Some("new/name.ts"));
    }

    #[test]
    fn markers_are_stripped_but_whitespace_kept() {
        let diff = "\
diff --git a/a.ts b/a.ts
@@ -1 +1 @@
-  indented removal
+\tindented addition
";
        let hunks = parse_hunks(diff);
        assert_eq!(hunks[0].removed, vec!["  indented removal"]);
        assert_eq!(hunks[0].added, vec!["\tindented addition"]);
    }
}
