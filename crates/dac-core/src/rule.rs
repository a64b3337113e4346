use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RemoteRule
// ---------------------------------------------------------------------------

/// One rule as reported by the remote catalog.
///
/// `rule_id` is the stable identifier used in manifests; `id` is the remote
/// system's own primary key, which the bulk-action API operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRule {
    pub rule_id: String,
    pub id: String,
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A single step required to converge remote state to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Rule is declared enabled but currently disabled remotely.
    Enable { rule_id: String, id: String },
    /// Rule is declared disabled but currently enabled remotely.
    Disable { rule_id: String, id: String },
    /// Remote state already matches the declaration.
    Skip { rule_id: String, reason: String },
    /// Declared identifier absent from the remote catalog.
    Unknown { rule_id: String },
}

impl Action {
    pub fn rule_id(&self) -> &str {
        match self {
            Action::Enable { rule_id, .. }
            | Action::Disable { rule_id, .. }
            | Action::Skip { rule_id, .. }
            | Action::Unknown { rule_id } => rule_id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Enable { .. } => "enable",
            Action::Disable { .. } => "disable",
            Action::Skip { .. } => "skip",
            Action::Unknown { .. } => "unknown",
        }
    }

    /// Extra column for human-readable output.
    pub fn detail(&self) -> &str {
        match self {
            Action::Skip { reason, .. } => reason,
            Action::Unknown { .. } => "not in remote catalog",
            _ => "",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(self, Action::Enable { .. } | Action::Disable { .. })
    }
}

// ---------------------------------------------------------------------------
// ReconciliationResult
// ---------------------------------------------------------------------------

/// One failed polarity batch: the bulk call that failed and the identifiers
/// that did not converge because of it.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyFailure {
    /// "enable" or "disable".
    pub action: String,
    /// Stable identifiers of the rules that failed to converge.
    pub rule_ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReconciliationResult {
    pub actions: Vec<Action>,
    /// False when the run was a dry-run and nothing was sent.
    pub applied: bool,
    pub errors: Vec<ApplyFailure>,
}

impl ReconciliationResult {
    pub fn converged(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn unknown_rule_ids(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Unknown { .. }))
            .map(|a| a.rule_id())
            .collect()
    }
}
