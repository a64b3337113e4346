//! Pure comparison of declared manifest state against a remote snapshot.

use crate::manifest::Manifest;
use crate::rule::{Action, RemoteRule};
use std::collections::HashMap;

/// Compute the actions required to converge remote state to the manifest.
///
/// Deterministic for a given input pair: enabled-list actions first in
/// manifest order, then disabled-list actions in manifest order. Rules
/// present remotely but mentioned in neither list are left untouched;
/// the manifest governs only the rules it names.
pub fn compute_actions(manifest: &Manifest, remote: &[RemoteRule]) -> Vec<Action> {
    // Index by identifier; a duplicated identifier in the catalog is a
    // remote data-integrity anomaly, and the later occurrence wins.
    let index: HashMap<&str, &RemoteRule> =
        remote.iter().map(|r| (r.rule_id.as_str(), r)).collect();

    let mut actions = Vec::with_capacity(manifest.len());
    for rule_id in &manifest.enabled {
        actions.push(action_for(&index, rule_id, true));
    }
    for rule_id in &manifest.disabled {
        actions.push(action_for(&index, rule_id, false));
    }
    actions
}

fn action_for(index: &HashMap<&str, &RemoteRule>, rule_id: &str, want_enabled: bool) -> Action {
    let Some(rule) = index.get(rule_id) else {
        return Action::Unknown {
            rule_id: rule_id.to_string(),
        };
    };
    if rule.enabled == want_enabled {
        let reason = if want_enabled {
            "already enabled"
        } else {
            "already disabled"
        };
        return Action::Skip {
            rule_id: rule_id.to_string(),
            reason: reason.to_string(),
        };
    }
    if want_enabled {
        Action::Enable {
            rule_id: rule_id.to_string(),
            id: rule.id.clone(),
        }
    } else {
        Action::Disable {
            rule_id: rule_id.to_string(),
            id: rule.id.clone(),
        }
    }
}
