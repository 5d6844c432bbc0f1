//! Working-tree diff collection via git2.
//!
//! Produces one immutable [`DiffSnapshot`] per invocation: unified diff text
//! against a base revision (3 lines of context), per-file line counts, file
//! statuses with rename detection, and untracked files expanded into
//! individual entries.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use git2::{Delta, DiffFindOptions, DiffFormat, DiffOptions, Repository, Status, StatusOptions};
use riskgate_core::{
    ClassifyConfig, DiffSnapshot, FileChange, FileStat, FileStatus, Rename, RiskgateError,
};

use crate::hunks::parse_hunks;

/// Maximum untracked file size to line-count (1 MB).
const MAX_UNTRACKED_SIZE: u64 = 1_048_576;

/// Collect a [`DiffSnapshot`] of the working tree against `base`.
///
/// The base reference is validated first; an unresolvable name is fatal and
/// reported as [`RiskgateError::InvalidBaseRef`] before any other work.
/// Untracked files are treated as wholly added, with their line counts
/// attributed as additions (files over 1 MB are skipped for counting).
/// Untracked directories are expanded recursively, honoring the configured
/// ignore prefixes. A path present in both the tracked diff and the
/// untracked listing is recorded once; tracked status wins.
///
/// # Errors
///
/// Returns [`RiskgateError::InvalidBaseRef`] for an unresolvable base, or
/// [`RiskgateError::Git`] if the repository cannot be opened or diffed.
/// Per-file read failures during untracked expansion are skipped, not
/// surfaced.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use riskgate_core::ClassifyConfig;
/// use riskgate_collect::collect_snapshot;
///
/// let classify = ClassifyConfig::default();
/// let snapshot = collect_snapshot(Path::new("."), "HEAD", &classify).unwrap();
/// println!("{} changed files", snapshot.files.len());
/// ```
pub fn collect_snapshot(
    root: &Path,
    base: &str,
    classify: &ClassifyConfig,
) -> Result<DiffSnapshot, RiskgateError> {
    let repo = Repository::open(root)
        .map_err(|e| RiskgateError::Git(format!("failed to open repository: {e}")))?;

    let base_tree = repo
        .revparse_single(base)
        .and_then(|obj| obj.peel_to_tree())
        .map_err(|_| RiskgateError::InvalidBaseRef(base.to_string()))?;

    let mut opts = DiffOptions::new();
    opts.context_lines(3);
    let mut diff = repo
        .diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))
        .map_err(|e| RiskgateError::Git(format!("failed to diff against '{base}': {e}")))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| RiskgateError::Git(format!("failed to detect renames: {e}")))?;

    let diff_text = render_patch(&diff)?;
    let (mut files, renames) = extract_changes(&diff);
    let line_counts = count_lines(&diff)?;

    let mut stats: Vec<FileStat> = files
        .iter()
        .map(|f| {
            let (added, deleted) = line_counts.get(&f.path).copied().unwrap_or((0, 0));
            FileStat {
                path: f.path.clone(),
                added,
                deleted,
            }
        })
        .collect();

    let mut seen: HashSet<String> = files.iter().map(|f| f.path.clone()).collect();
    collect_untracked(&repo, root, classify, &mut files, &mut stats, &mut seen)?;

    let hunks = parse_hunks(&diff_text);

    Ok(DiffSnapshot {
        hunks,
        stats,
        files,
        renames,
        diff_text,
    })
}

fn render_patch(diff: &git2::Diff) -> Result<String, RiskgateError> {
    let mut buf: Vec<u8> = Vec::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => buf.push(line.origin() as u8),
            _ => {}
        }
        buf.extend_from_slice(line.content());
        true
    })
    .map_err(|e| RiskgateError::Git(format!("failed to render diff: {e}")))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn extract_changes(diff: &git2::Diff) -> (Vec<FileChange>, Vec<Rename>) {
    let mut files = Vec::new();
    let mut renames = Vec::new();

    for delta in diff.deltas() {
        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());

        match delta.status() {
            Delta::Added | Delta::Untracked => {
                if let Some(path) = new_path {
                    files.push(FileChange {
                        status: FileStatus::Added,
                        path,
                        old_path: None,
                    });
                }
            }
            Delta::Deleted => {
                if let Some(path) = old_path {
                    files.push(FileChange {
                        status: FileStatus::Deleted,
                        path,
                        old_path: None,
                    });
                }
            }
            Delta::Renamed | Delta::Copied => {
                if let (Some(path), Some(from)) = (new_path, old_path) {
                    renames.push(Rename {
                        from: from.clone(),
                        to: path.clone(),
                    });
                    files.push(FileChange {
                        status: FileStatus::Renamed,
                        path,
                        old_path: Some(from),
                    });
                }
            }
            Delta::Modified | Delta::Typechange => {
                if let Some(path) = new_path {
                    files.push(FileChange {
                        status: FileStatus::Modified,
                        path,
                        old_path: None,
                    });
                }
            }
            _ => {}
        }
    }

    (files, renames)
}

fn count_lines(diff: &git2::Diff) -> Result<HashMap<String, (u64, u64)>, RiskgateError> {
    let mut counts: HashMap<String, (u64, u64)> = HashMap::new();

    diff.foreach(
        &mut |_delta, _progress| true,
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .unwrap_or(Path::new(""))
                .to_string_lossy()
                .into_owned();

            let entry = counts.entry(path).or_insert((0, 0));
            match line.origin() {
                '+' => entry.0 += 1,
                '-' => entry.1 += 1,
                _ => {}
            }
            true
        }),
    )
    .map_err(|e| RiskgateError::Git(format!("failed to iterate diff lines: {e}")))?;

    Ok(counts)
}

fn collect_untracked(
    repo: &Repository,
    root: &Path,
    classify: &ClassifyConfig,
    files: &mut Vec<FileChange>,
    stats: &mut Vec<FileStat>,
    seen: &mut HashSet<String>,
) -> Result<(), RiskgateError> {
    let mut status_opts = StatusOptions::new();
    status_opts.include_untracked(true);
    status_opts.exclude_submodules(true);

    let statuses = repo
        .statuses(Some(&mut status_opts))
        .map_err(|e| RiskgateError::Git(format!("failed to read status: {e}")))?;

    for entry in statuses.iter() {
        if !entry.status().contains(Status::WT_NEW) {
            continue;
        }
        let Some(path) = entry.path() else {
            continue;
        };
        let path = path.to_string();
        if path.ends_with('/') {
            expand_untracked_dir(root, &path, classify, files, stats, seen);
        } else if !seen.contains(&path) {
            seen.insert(path.clone());
            push_untracked_file(root, path, files, stats);
        }
    }
    Ok(())
}

/// Recursively expand an untracked directory (reported with a trailing `/`)
/// into its leaf files, honoring the ignore-prefix list.
fn expand_untracked_dir(
    root: &Path,
    dir_path: &str,
    classify: &ClassifyConfig,
    files: &mut Vec<FileChange>,
    stats: &mut Vec<FileStat>,
    seen: &mut HashSet<String>,
) {
    let Ok(entries) = std::fs::read_dir(root.join(dir_path)) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = format!("{dir_path}{name}");
        if classify.is_ignored(&rel) {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            expand_untracked_dir(root, &format!("{rel}/"), classify, files, stats, seen);
        } else if !seen.contains(&rel) {
            seen.insert(rel.clone());
            push_untracked_file(root, rel, files, stats);
        }
    }
}

fn push_untracked_file(
    root: &Path,
    path: String,
    files: &mut Vec<FileChange>,
    stats: &mut Vec<FileStat>,
) {
    // Skip large/binary files for line counting; the change is still recorded
    if let Ok(meta) = std::fs::metadata(root.join(&path)) {
        if meta.len() < MAX_UNTRACKED_SIZE {
            if let Ok(content) = std::fs::read_to_string(root.join(&path)) {
                stats.push(FileStat {
                    path: path.clone(),
                    added: content.split('\n').count() as u64,
                    deleted: 0,
                });
            }
        }
    }
    files.push(FileChange {
        status: FileStatus::Added,
        path,
        old_path: None,
    });
}

/// Identifying context for the repository being assessed.
#[derive(Debug, Clone)]
pub struct RepoContext {
    /// Repository directory name.
    pub repo: String,
    /// Current branch short name, or `"detached"`.
    pub branch: String,
    /// Short HEAD commit id, or `"unknown"` before the first commit.
    pub head: String,
}

/// Read the repository name, current branch, and short HEAD.
///
/// # Errors
///
/// Returns [`RiskgateError::Git`] if `root` is not a git repository.
pub fn repo_context(root: &Path) -> Result<RepoContext, RiskgateError> {
    let repo = Repository::open(root)
        .map_err(|e| RiskgateError::Git(format!("failed to open repository: {e}")))?;

    let name = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "repo".to_string());

    let (branch, head) = match repo.head() {
        Ok(head_ref) => {
            let branch = if head_ref.is_branch() {
                head_ref.shorthand().unwrap_or("detached").to_string()
            } else {
                "detached".to_string()
            };
            let head = head_ref
                .peel_to_commit()
                .map(|c| c.id().to_string()[..7].to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            (branch, head)
        }
        Err(_) => ("detached".to_string(), "unknown".to_string()),
    };

    Ok(RepoContext {
        repo: name,
        branch,
        head,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Init a repo with one commit containing the given files.
    fn scratch_repo(files: &[(&str, &str)]) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            for (path, content) in files {
                let full = dir.path().join(path);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(full, content).unwrap();
            }
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn invalid_base_ref_is_its_own_error() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        let err = collect_snapshot(dir.path(), "no-such-ref", &ClassifyConfig::default())
            .unwrap_err();
        assert!(matches!(err, RiskgateError::InvalidBaseRef(_)));
    }

    #[test]
    fn clean_tree_yields_empty_snapshot() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        assert!(snapshot.files.is_empty());
        assert!(snapshot.hunks.is_empty());
        assert!(snapshot.renames.is_empty());
    }

    #[test]
    fn modified_file_is_reported_with_stats() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "line one\nline two\n")]);
        fs::write(dir.path().join("a.ts"), "line one\nline two changed\n").unwrap();

        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].status, FileStatus::Modified);
        assert_eq!(snapshot.files[0].path, "a.ts");

        let stat = &snapshot.stats[0];
        assert_eq!(stat.added, 1);
        assert_eq!(stat.deleted, 1);

        assert_eq!(snapshot.hunks.len(), 1);
        assert_eq!(snapshot.hunks[0].file.as_deref(), Some("a.ts"));
        assert_eq!(snapshot.hunks[0].removed, vec!["line two"]);
        assert_eq!(snapshot.hunks[0].added, vec!["line two changed"]);
    }

    #[test]
    fn deleted_file_is_reported() {
        let (dir, _repo) = scratch_repo(&[("gone.ts", "export const x = 1;\n")]);
        fs::remove_file(dir.path().join("gone.ts")).unwrap();

        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].status, FileStatus::Deleted);
        assert_eq!(snapshot.files[0].path, "gone.ts");
    }

    #[test]
    fn untracked_file_counts_as_added() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        fs::write(dir.path().join("fresh.ts"), "one\ntwo\nthree\n").unwrap();

        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        let fresh = snapshot
            .files
            .iter()
            .find(|f| f.path == "fresh.ts")
            .expect("untracked file recorded");
        assert_eq!(fresh.status, FileStatus::Added);

        let stat = snapshot
            .stats
            .iter()
            .find(|s| s.path == "fresh.ts")
            .expect("untracked file stat");
        // split('\n') over "one\ntwo\nthree\n" yields 4 segments
        assert_eq!(stat.added, 4);
        assert_eq!(stat.deleted, 0);
    }

    #[test]
    fn untracked_directory_is_expanded_recursively() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        fs::create_dir_all(dir.path().join("newdir/sub")).unwrap();
        fs::write(dir.path().join("newdir/top.ts"), "t\n").unwrap();
        fs::write(dir.path().join("newdir/sub/leaf.ts"), "l\n").unwrap();

        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"newdir/top.ts"));
        assert!(paths.contains(&"newdir/sub/leaf.ts"));
        assert!(!paths.iter().any(|p| p.ends_with('/')));
    }

    #[test]
    fn untracked_expansion_honors_ignore_prefixes() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        fs::create_dir_all(dir.path().join("newdir/dist")).unwrap();
        fs::write(dir.path().join("newdir/keep.ts"), "k\n").unwrap();
        fs::write(dir.path().join("newdir/dist/out.js"), "o\n").unwrap();

        let mut classify = ClassifyConfig::default();
        classify.ignore_prefixes.push("newdir/dist/".into());

        let snapshot = collect_snapshot(dir.path(), "HEAD", &classify).unwrap();
        let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"newdir/keep.ts"));
        assert!(!paths.contains(&"newdir/dist/out.js"));
    }

    #[test]
    fn large_untracked_file_skipped_for_counting_but_recorded() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        let big = "x".repeat(1_048_577);
        fs::write(dir.path().join("big.ts"), big).unwrap();

        let snapshot = collect_snapshot(dir.path(), "HEAD", &ClassifyConfig::default()).unwrap();
        assert!(snapshot.files.iter().any(|f| f.path == "big.ts"));
        assert!(!snapshot.stats.iter().any(|s| s.path == "big.ts"));
    }

    #[test]
    fn repo_context_reads_branch_and_head() {
        let (dir, _repo) = scratch_repo(&[("a.ts", "export const a = 1;\n")]);
        let ctx = repo_context(dir.path()).unwrap();
        // Default branch name depends on git config; it must not be empty
        assert!(!ctx.branch.is_empty());
        assert_eq!(ctx.head.len(), 7);
    }
}
