//! Applies a computed action list against the remote system.

use crate::client::ElasticClient;
use crate::error::{DacError, Result};
use crate::rule::{Action, ApplyFailure, ReconciliationResult};

/// The mutation seam between the reconciler and the remote system, so the
/// reconciler can be exercised against fakes.
pub trait RuleBackend {
    /// Enable or disable a batch of rules by internal id, in one bulk call.
    fn bulk_set_enabled(&self, ids: &[String], enabled: bool) -> Result<()>;
}

impl RuleBackend for ElasticClient {
    fn bulk_set_enabled(&self, ids: &[String], enabled: bool) -> Result<()> {
        ElasticClient::bulk_set_enabled(self, ids, enabled)
    }
}

/// Apply `actions` through `backend`, one bulk call per non-empty polarity.
///
/// Dry-run returns the actions unchanged with `applied = false` and issues
/// no remote calls. The two polarity batches are independent: a failed
/// enable call never blocks the disable call. Failures are collected into
/// the result rather than propagated, so the caller can report exactly
/// which identifiers converged.
pub fn apply(backend: &dyn RuleBackend, actions: Vec<Action>, dry_run: bool) -> ReconciliationResult {
    if dry_run {
        return ReconciliationResult {
            actions,
            applied: false,
            errors: Vec::new(),
        };
    }

    let mut errors = Vec::new();
    for (verb, want_enabled) in [("enable", true), ("disable", false)] {
        // (stable identifier, internal id) pairs for this polarity.
        let batch: Vec<(&str, &str)> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Enable { rule_id, id } if want_enabled => {
                    Some((rule_id.as_str(), id.as_str()))
                }
                Action::Disable { rule_id, id } if !want_enabled => {
                    Some((rule_id.as_str(), id.as_str()))
                }
                _ => None,
            })
            .collect();
        if batch.is_empty() {
            continue;
        }

        let ids: Vec<String> = batch.iter().map(|(_, id)| id.to_string()).collect();
        if let Err(e) = backend.bulk_set_enabled(&ids, want_enabled) {
            errors.push(failure_for(verb, &batch, e));
        }
    }

    ReconciliationResult {
        actions,
        applied: true,
        errors,
    }
}

/// Map a bulk-call error back to the stable identifiers that did not
/// converge. When the error names a failing subset of internal ids, only
/// those are reported; otherwise the whole batch is.
fn failure_for(verb: &str, batch: &[(&str, &str)], error: DacError) -> ApplyFailure {
    let message = error.to_string();
    let rule_ids = match &error {
        DacError::RemoteAction { ids, .. } if !ids.is_empty() => batch
            .iter()
            .filter(|(_, id)| ids.iter().any(|failed| failed == id))
            .map(|(rule_id, _)| rule_id.to_string())
            .collect(),
        _ => batch.iter().map(|(rule_id, _)| rule_id.to_string()).collect(),
    };
    ApplyFailure {
        action: verb.to_string(),
        rule_ids,
        message,
    }
}
