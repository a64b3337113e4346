//! Writes the resolved manifest into a target repository's file and commit
//! history, for customers whose remote is converged via PR rather than a
//! direct push. Pushing the branch and opening the PR stay outside this
//! crate.

use crate::error::Result;
use crate::manifest::Manifest;
use git2::Repository;
use std::path::Path;

/// File name of the enablement manifest inside a customer rules repo.
pub const MANIFEST_FILE: &str = "enablement.yaml";

#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Committed { commit: String },
    /// The committed manifest already matches; no commit was created.
    Unchanged,
}

/// Write `manifest` to `enablement.yaml` at the root of the repository at
/// `repo_path`, stage it, and commit. Skips the commit when the resulting
/// tree is identical to HEAD's.
pub fn export(manifest: &Manifest, repo_path: &Path, message: &str) -> Result<SyncOutcome> {
    let repo = Repository::open(repo_path)?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| git2::Error::from_str("target repository is bare"))?;

    manifest.save(&workdir.join(MANIFEST_FILE))?;

    let mut index = repo.index()?;
    index.add_path(Path::new(MANIFEST_FILE))?;
    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    // Unborn HEAD (fresh repo) means no parent.
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    if let Some(parent) = &parent {
        if parent.tree_id() == tree_id {
            tracing::debug!("manifest unchanged, skipping commit");
            return Ok(SyncOutcome::Unchanged);
        }
    }

    let signature = repo
        .signature()
        .or_else(|_| git2::Signature::now("dac", "dac@localhost"))?;
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )?;
    tracing::info!(commit = %oid, "committed manifest");
    Ok(SyncOutcome::Committed {
        commit: oid.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo(dir: &TempDir) -> Repository {
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        repo
    }

    fn manifest(enabled: &[&str]) -> Manifest {
        Manifest {
            enabled: enabled.iter().map(|s| s.to_string()).collect(),
            disabled: Vec::new(),
        }
    }

    #[test]
    fn export_commits_manifest_file() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(&dir);

        let outcome = export(&manifest(&["rule-a"]), dir.path(), "add enablement").unwrap();
        assert!(matches!(outcome, SyncOutcome::Committed { .. }));

        let written = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(written.contains("rule-a"));

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap(), "add enablement");
        assert_eq!(head.parent_count(), 0);
    }

    #[test]
    fn unchanged_manifest_skips_commit() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(&dir);
        let m = manifest(&["rule-a"]);

        export(&m, dir.path(), "first").unwrap();
        let outcome = export(&m, dir.path(), "second").unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap(), "first");
    }

    #[test]
    fn changed_manifest_creates_child_commit() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(&dir);

        export(&manifest(&["rule-a"]), dir.path(), "first").unwrap();
        let outcome = export(&manifest(&["rule-a", "rule-b"]), dir.path(), "second").unwrap();
        assert!(matches!(outcome, SyncOutcome::Committed { .. }));

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap(), "second");
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn export_into_non_repo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(export(&manifest(&["rule-a"]), dir.path(), "msg").is_err());
    }
}
