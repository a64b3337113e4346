use crate::output::print_json;
use anyhow::Context;
use dac_core::client::ElasticClient;
use dac_core::config::Settings;
use dac_core::manifest::Manifest;
use std::collections::BTreeMap;
use std::path::Path;

/// Export the remote catalog's current enablement state as a manifest,
/// sorted by identifier for stable diffs.
pub fn run(settings: &Settings, out: &Path, json: bool) -> anyhow::Result<()> {
    let client = ElasticClient::new(settings)?;
    let remote = client
        .get_all_rules()
        .context("failed to fetch remote rules")?;

    // BTreeMap both sorts and collapses duplicate identifiers (later wins).
    let mut state: BTreeMap<String, bool> = BTreeMap::new();
    for rule in remote {
        state.insert(rule.rule_id, rule.enabled);
    }

    let mut manifest = Manifest::default();
    for (rule_id, enabled) in state {
        if enabled {
            manifest.enabled.push(rule_id);
        } else {
            manifest.disabled.push(rule_id);
        }
    }
    manifest
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;

    if json {
        print_json(&serde_json::json!({
            "path": out.display().to_string(),
            "enabled": manifest.enabled.len(),
            "disabled": manifest.disabled.len(),
        }))?;
    } else {
        println!(
            "Wrote {} ({} enabled, {} disabled).",
            out.display(),
            manifest.enabled.len(),
            manifest.disabled.len()
        );
    }
    Ok(())
}
