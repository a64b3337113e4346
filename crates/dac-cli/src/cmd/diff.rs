use crate::output::{print_actions, print_json, summarize};
use anyhow::Context;
use dac_core::client::ElasticClient;
use dac_core::config::Settings;
use dac_core::diff::compute_actions;
use dac_core::manifest::Manifest;
use std::path::Path;

pub fn run(settings: &Settings, manifest_path: &Path, json: bool) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    let client = ElasticClient::new(settings)?;
    let remote = client
        .get_all_rules()
        .context("failed to fetch remote rules")?;
    let actions = compute_actions(&manifest, &remote);

    if json {
        print_json(&actions)?;
    } else {
        print_actions(&actions);
        println!("\n{}", summarize(&actions));
    }
    Ok(())
}
