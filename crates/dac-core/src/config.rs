use crate::error::{DacError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Connection settings for the remote rule-management system, read from the
/// environment: `KIBANA_URL`, `ELASTIC_API_KEY`, `ELASTIC_SPACE` (optional,
/// defaults to `"default"`).
#[derive(Clone)]
pub struct Settings {
    pub kibana_url: String,
    pub elastic_api_key: String,
    pub elastic_space: String,
}

// The API key must never leak through debug output or logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("kibana_url", &self.kibana_url)
            .field("elastic_api_key", &"<redacted>")
            .field("elastic_space", &self.elastic_space)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let kibana_url = lookup("KIBANA_URL").ok_or(DacError::MissingEnv("KIBANA_URL"))?;
        let elastic_api_key =
            lookup("ELASTIC_API_KEY").ok_or(DacError::MissingEnv("ELASTIC_API_KEY"))?;
        let elastic_space =
            lookup("ELASTIC_SPACE").unwrap_or_else(|| "default".to_string());
        Ok(Self {
            kibana_url,
            elastic_api_key,
            elastic_space,
        })
    }

    /// Base API URL for the configured space: `<kibana_url>/api` for the
    /// default space, `<kibana_url>/s/<space>/api` otherwise.
    pub fn api_url(&self) -> String {
        let base = self.kibana_url.trim_end_matches('/');
        if self.elastic_space == "default" {
            format!("{base}/api")
        } else {
            format!("{base}/s/{}/api", self.elastic_space)
        }
    }

    /// Apply a customer's URL and space overrides.
    pub fn with_customer(mut self, customer: &CustomerConfig) -> Self {
        if let Some(url) = &customer.kibana_url {
            self.kibana_url = url.clone();
        }
        self.elastic_space = customer.elastic_space.clone();
        self
    }
}

// ---------------------------------------------------------------------------
// CustomerConfig
// ---------------------------------------------------------------------------

/// Per-customer configuration (`customers/<name>/config.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerConfig {
    /// Customer display name.
    pub name: String,
    /// GitHub repo holding the customer's enablement manifest
    /// (e.g. `"owner/acme-enabled-rules"`).
    pub enabled_rules_repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authored_rules_repo: Option<String>,
    /// Overrides `KIBANA_URL` for this customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibana_url: Option<String>,
    #[serde(default = "default_space")]
    pub elastic_space: String,
}

fn default_space() -> String {
    "default".to_string()
}

impl CustomerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            kibana_url: "https://acme.kb.example.io".to_string(),
            elastic_api_key: "super-secret".to_string(),
            elastic_space: "default".to_string(),
        }
    }

    #[test]
    fn api_url_default_space() {
        assert_eq!(settings().api_url(), "https://acme.kb.example.io/api");
    }

    #[test]
    fn api_url_named_space() {
        let mut s = settings();
        s.elastic_space = "security".to_string();
        assert_eq!(s.api_url(), "https://acme.kb.example.io/s/security/api");
    }

    #[test]
    fn api_url_trims_trailing_slash() {
        let mut s = settings();
        s.kibana_url = "https://acme.kb.example.io/".to_string();
        assert_eq!(s.api_url(), "https://acme.kb.example.io/api");
    }

    #[test]
    fn from_lookup_missing_url_fails() {
        let err = Settings::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, DacError::MissingEnv("KIBANA_URL")));
    }

    #[test]
    fn from_lookup_space_defaults() {
        let s = Settings::from_lookup(|name| match name {
            "KIBANA_URL" => Some("https://kb.example.io".to_string()),
            "ELASTIC_API_KEY" => Some("key".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(s.elastic_space, "default");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn customer_overrides_url_and_space() {
        let customer = CustomerConfig {
            name: "ACME Corp".to_string(),
            enabled_rules_repo: "acme-org/acme-enabled-rules".to_string(),
            authored_rules_repo: None,
            kibana_url: Some("https://other.kb.example.io".to_string()),
            elastic_space: "acme".to_string(),
        };
        let s = settings().with_customer(&customer);
        assert_eq!(s.api_url(), "https://other.kb.example.io/s/acme/api");
    }

    #[test]
    fn minimal_customer_config_deserializes() {
        let yaml = "name: ACME Corp\nenabled_rules_repo: acme-org/acme-enabled-rules\n";
        let cfg: CustomerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.name, "ACME Corp");
        assert_eq!(cfg.elastic_space, "default");
        assert!(cfg.kibana_url.is_none());
        assert!(cfg.authored_rules_repo.is_none());
    }

    #[test]
    fn customer_config_missing_repo_fails() {
        let yaml = "name: ACME Corp\n";
        assert!(serde_yaml::from_str::<CustomerConfig>(yaml).is_err());
    }
}
