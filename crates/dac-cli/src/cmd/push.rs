use crate::output::{print_actions, print_json, summarize};
use anyhow::Context;
use dac_core::client::ElasticClient;
use dac_core::config::Settings;
use dac_core::diff::compute_actions;
use dac_core::manifest::Manifest;
use dac_core::reconcile;
use std::path::Path;

pub fn run(
    settings: &Settings,
    manifest_path: &Path,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    let client = ElasticClient::new(settings)?;
    let remote = client
        .get_all_rules()
        .context("failed to fetch remote rules")?;
    let actions = compute_actions(&manifest, &remote);
    let result = reconcile::apply(&client, actions, dry_run);

    if json {
        print_json(&result)?;
    } else {
        print_actions(&result.actions);
        println!("\n{}", summarize(&result.actions));
        if dry_run {
            println!("Dry run — no changes were made.");
        }
        for failure in &result.errors {
            eprintln!(
                "failed to {} {} rule(s): {}",
                failure.action,
                failure.rule_ids.len(),
                failure.message
            );
        }
    }

    // Non-zero exit both for failed bulk calls and for declared rules the
    // remote doesn't know, so CI surfaces either discrepancy.
    let unknown = result.unknown_rule_ids();
    if !unknown.is_empty() {
        anyhow::bail!(
            "{} declared rule(s) not found in the remote catalog: {}",
            unknown.len(),
            unknown.join(", ")
        );
    }
    if !result.converged() {
        anyhow::bail!("{} bulk action(s) failed", result.errors.len());
    }
    Ok(())
}
