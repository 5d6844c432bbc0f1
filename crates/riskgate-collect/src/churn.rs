//! Per-file commit churn over a recent window, for deep-mode analysis.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use git2::{DiffOptions, Repository, Sort};
use riskgate_core::RiskgateError;

/// Count commits touching each of `paths` within the last `since_days` days.
///
/// Walks history from HEAD, newest first, stopping at the cutoff. Each
/// commit is diffed against its first parent with the requested paths as
/// pathspecs; a commit increments the count of every requested path it
/// touches. Paths with no recent commits map to zero.
///
/// # Errors
///
/// Returns [`RiskgateError::Git`] if the repository cannot be opened or
/// walked. An unborn HEAD yields all-zero counts instead of an error.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use riskgate_collect::file_churn;
///
/// let counts = file_churn(Path::new("."), &["src/main.rs".into()], 90).unwrap();
/// println!("{} commits", counts["src/main.rs"]);
/// ```
pub fn file_churn(
    root: &Path,
    paths: &[String],
    since_days: u64,
) -> Result<BTreeMap<String, u32>, RiskgateError> {
    let repo = Repository::open(root)
        .map_err(|e| RiskgateError::Git(format!("failed to open repository: {e}")))?;

    let mut counts: BTreeMap<String, u32> = paths.iter().map(|p| (p.clone(), 0)).collect();
    let wanted: HashSet<&str> = paths.iter().map(|p| p.as_str()).collect();

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| RiskgateError::Git(format!("failed to create revwalk: {e}")))?;
    revwalk.set_sorting(Sort::TIME).ok();
    if revwalk.push_head().is_err() {
        return Ok(counts);
    }

    let cutoff = epoch_cutoff(since_days);

    for oid in revwalk {
        let oid = oid.map_err(|e| RiskgateError::Git(format!("revwalk error: {e}")))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| RiskgateError::Git(format!("failed to find commit: {e}")))?;
        if commit.time().seconds() < cutoff {
            break;
        }

        let commit_tree = commit
            .tree()
            .map_err(|e| RiskgateError::Git(format!("failed to get commit tree: {e}")))?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(
                parent
                    .tree()
                    .map_err(|e| RiskgateError::Git(format!("failed to get parent tree: {e}")))?,
            ),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        for path in paths {
            opts.pathspec(path);
        }
        let diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), Some(&mut opts))
            .map_err(|e| RiskgateError::Git(format!("failed to compute diff: {e}")))?;

        let mut touched: HashSet<String> = HashSet::new();
        for delta in diff.deltas() {
            for file in [delta.new_file().path(), delta.old_file().path()]
                .into_iter()
                .flatten()
            {
                let path = file.to_string_lossy().into_owned();
                if wanted.contains(path.as_str()) {
                    touched.insert(path);
                }
            }
        }
        for path in touched {
            if let Some(count) = counts.get_mut(&path) {
                *count += 1;
            }
        }
    }

    Ok(counts)
}

fn epoch_cutoff(since_days: u64) -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    now - (since_days as i64 * 86400)
}
