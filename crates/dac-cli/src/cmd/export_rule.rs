use anyhow::Context;
use dac_core::client::ElasticClient;
use dac_core::config::Settings;

pub fn run(settings: &Settings, rule_id: &str) -> anyhow::Result<()> {
    let client = ElasticClient::new(settings)?;
    let rule = client
        .get_rule(rule_id)
        .with_context(|| format!("failed to fetch rule {rule_id}"))?;
    print!("{}", serde_yaml::to_string(&rule)?);
    Ok(())
}
