use dac_core::rule::Action;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render an action list as aligned `ACTION  RULE_ID  DETAIL` rows.
pub fn print_actions(actions: &[Action]) {
    if actions.is_empty() {
        println!("Manifest declares no rules; nothing to compare.");
        return;
    }
    let width = actions
        .iter()
        .map(|a| a.rule_id().len())
        .max()
        .unwrap_or(0)
        .max("RULE_ID".len());

    println!("{:<8}  {:<width$}  DETAIL", "ACTION", "RULE_ID");
    for action in actions {
        println!(
            "{:<8}  {:<width$}  {}",
            action.verb(),
            action.rule_id(),
            action.detail(),
        );
    }
}

/// One-line tally for the end of diff/push output.
pub fn summarize(actions: &[Action]) -> String {
    let mut enable = 0;
    let mut disable = 0;
    let mut skip = 0;
    let mut unknown = 0;
    for action in actions {
        match action {
            Action::Enable { .. } => enable += 1,
            Action::Disable { .. } => disable += 1,
            Action::Skip { .. } => skip += 1,
            Action::Unknown { .. } => unknown += 1,
        }
    }
    format!("{enable} to enable, {disable} to disable, {skip} in sync, {unknown} unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_tallies_by_kind() {
        let actions = vec![
            Action::Enable {
                rule_id: "R1".to_string(),
                id: "i1".to_string(),
            },
            Action::Skip {
                rule_id: "R2".to_string(),
                reason: "already enabled".to_string(),
            },
            Action::Unknown {
                rule_id: "R9".to_string(),
            },
        ];
        assert_eq!(summarize(&actions), "1 to enable, 0 to disable, 1 in sync, 1 unknown");
    }
}
