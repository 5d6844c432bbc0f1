//! Advisory flags: findings that surface in the report without feeding the
//! numeric score.

use std::sync::LazyLock;

use regex::Regex;
use riskgate_core::FileChange;
use serde::Serialize;

static MIGRATION_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)migration|schema|\.sql$|migrate").expect("migration path pattern")
});

static ROLLBACK_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(down|rollback|revert)").expect("rollback path pattern"));

/// Migration-safety advisory: fires when the change touches schema or
/// migration files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSafety {
    /// Whether any migration-like path changed.
    pub triggered: bool,
    /// Whether any of those paths also looks like a rollback script.
    pub has_rollback: bool,
    /// The matching paths.
    pub files: Vec<String>,
}

impl MigrationSafety {
    /// An untriggered flag for the zero-change short circuit.
    pub fn empty() -> Self {
        Self {
            triggered: false,
            has_rollback: false,
            files: Vec::new(),
        }
    }
}

/// Check changed paths for migration and rollback markers.
///
/// Path-based only; file contents are never inspected.
pub fn check_migration_safety(files: &[FileChange]) -> MigrationSafety {
    let matching: Vec<String> = files
        .iter()
        .filter(|f| MIGRATION_PATH.is_match(&f.path))
        .map(|f| f.path.clone())
        .collect();

    let has_rollback = matching.iter().any(|p| ROLLBACK_PATH.is_match(p));

    MigrationSafety {
        triggered: !matching.is_empty(),
        has_rollback,
        files: matching,
    }
}

/// Placeholder for a future test-coverage cross-check; always untriggered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionHint {
    /// Always false until the check is implemented.
    pub triggered: bool,
    /// Explanation of the placeholder status.
    pub message: String,
}

impl Default for RegressionHint {
    fn default() -> Self {
        Self {
            triggered: false,
            message: "regression analysis requires test coverage data (not yet wired)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskgate_core::FileStatus;

    fn file(path: &str) -> FileChange {
        FileChange {
            status: FileStatus::Modified,
            path: path.into(),
            old_path: None,
        }
    }

    #[test]
    fn sql_and_migration_paths_trigger() {
        let flag = check_migration_safety(&[
            file("db/migrations/0042_add_users.sql"),
            file("src/app.ts"),
        ]);
        assert!(flag.triggered);
        assert_eq!(flag.files, vec!["db/migrations/0042_add_users.sql"]);
    }

    #[test]
    fn schema_paths_trigger_case_insensitively() {
        let flag = check_migration_safety(&[file("prisma/Schema.prisma")]);
        assert!(flag.triggered);
    }

    #[test]
    fn rollback_detected_among_matching_files() {
        let flag = check_migration_safety(&[
            file("db/migrations/0042_add_users.up.sql"),
            file("db/migrations/0042_add_users.down.sql"),
        ]);
        assert!(flag.triggered);
        assert!(flag.has_rollback);
    }

    #[test]
    fn forward_only_migration_has_no_rollback() {
        let flag = check_migration_safety(&[file("db/migrate/add_column.sql")]);
        assert!(flag.triggered);
        assert!(!flag.has_rollback);
    }

    #[test]
    fn unrelated_changes_leave_flag_untriggered() {
        let flag = check_migration_safety(&[file("src/app.ts"), file("README.md")]);
        assert!(!flag.triggered);
        assert!(flag.files.is_empty());
    }

    #[test]
    fn regression_hint_stays_untriggered() {
        let hint = RegressionHint::default();
        assert!(!hint.triggered);
        assert!(!hint.message.is_empty());
    }
}
