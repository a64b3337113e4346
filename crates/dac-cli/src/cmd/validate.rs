use crate::output::print_json;
use anyhow::Context;
use dac_core::manifest::Manifest;
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "valid": true,
            "enabled": manifest.enabled.len(),
            "disabled": manifest.disabled.len(),
        }))?;
    } else {
        println!(
            "Manifest is valid: {} enabled, {} disabled.",
            manifest.enabled.len(),
            manifest.disabled.len()
        );
    }
    Ok(())
}
