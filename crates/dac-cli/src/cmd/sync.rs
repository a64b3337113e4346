use crate::output::print_json;
use anyhow::Context;
use dac_core::manifest::Manifest;
use dac_core::sync::{self, SyncOutcome};
use std::path::Path;

pub fn run(manifest_path: &Path, repo: &Path, message: &str, json: bool) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    let outcome = sync::export(&manifest, repo, message)
        .with_context(|| format!("failed to sync manifest into {}", repo.display()))?;

    match outcome {
        SyncOutcome::Committed { commit } => {
            if json {
                print_json(&serde_json::json!({"committed": true, "commit": commit}))?;
            } else {
                println!("Committed {commit}.");
            }
        }
        SyncOutcome::Unchanged => {
            if json {
                print_json(&serde_json::json!({"committed": false}))?;
            } else {
                println!("Manifest unchanged; nothing to commit.");
            }
        }
    }
    Ok(())
}
