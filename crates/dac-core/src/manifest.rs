//! The enablement manifest: which prebuilt rules should be active.
//!
//! Shape on disk (both keys required, empty sequences valid):
//!
//! ```yaml
//! enabled:
//!   - "28d39238-0c01-420a-b77a-24e5a7378663"
//! disabled:
//!   - "ff10d4d8-fea7-422d-afb1-e5a2702369a9"
//! ```

use crate::error::{DacError, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
}

/// Parsing: malformed YAML is a `ManifestParse` error; a well-formed document
/// with the wrong shape (missing keys, non-string items, duplicate
/// identifiers, identifiers in both lists) is a `ManifestSchema` error.
impl std::str::FromStr for Manifest {
    type Err = DacError;

    fn from_str(content: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(content)
            .map_err(|e| DacError::ManifestParse(e.to_string()))?;

        let mapping = doc.as_mapping().ok_or_else(|| {
            DacError::ManifestSchema("top level must be a mapping".to_string())
        })?;

        let enabled = string_list(mapping, "enabled")?;
        let disabled = string_list(mapping, "disabled")?;

        let manifest = Manifest { enabled, disabled };
        manifest.check_uniqueness()?;
        Ok(manifest)
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        std::fs::read_to_string(path)?.parse()
    }

    /// Serialize and atomically write the manifest to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.enabled.len() + self.disabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_empty()
    }

    // Identifiers must be unique within each list and disjoint across lists.
    fn check_uniqueness(&self) -> Result<()> {
        let mut enabled_seen = HashSet::new();
        for rule_id in &self.enabled {
            if !enabled_seen.insert(rule_id.as_str()) {
                return Err(DacError::ManifestSchema(format!(
                    "'{rule_id}' appears more than once in 'enabled'"
                )));
            }
        }
        let mut disabled_seen = HashSet::new();
        for rule_id in &self.disabled {
            if !disabled_seen.insert(rule_id.as_str()) {
                return Err(DacError::ManifestSchema(format!(
                    "'{rule_id}' appears more than once in 'disabled'"
                )));
            }
            if enabled_seen.contains(rule_id.as_str()) {
                return Err(DacError::ManifestSchema(format!(
                    "'{rule_id}' is declared both enabled and disabled"
                )));
            }
        }
        Ok(())
    }
}

fn string_list(mapping: &serde_yaml::Mapping, key: &str) -> Result<Vec<String>> {
    let value = mapping.get(key).ok_or_else(|| {
        DacError::ManifestSchema(format!("missing required key '{key}'"))
    })?;
    let seq = value.as_sequence().ok_or_else(|| {
        DacError::ManifestSchema(format!("'{key}' must be a sequence of strings"))
    })?;
    seq.iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                DacError::ManifestSchema(format!(
                    "'{key}' must contain only strings, got: {item:?}"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_lists_are_valid() {
        let m: Manifest = "enabled: []\ndisabled: []\n".parse().unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn parses_rule_ids_in_order() {
        let m: Manifest = "enabled:\n  - rule-b\n  - rule-a\ndisabled:\n  - rule-c\n"
            .parse()
            .unwrap();
        assert_eq!(m.enabled, vec!["rule-b", "rule-a"]);
        assert_eq!(m.disabled, vec!["rule-c"]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = "enabled: [unclosed".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, DacError::ManifestParse(_)));
    }

    #[test]
    fn missing_key_is_schema_error() {
        let err = "enabled: []\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn non_sequence_value_is_schema_error() {
        let err = "enabled: yes\ndisabled: []\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
    }

    #[test]
    fn non_string_item_is_schema_error() {
        let err = "enabled:\n  - 42\ndisabled: []\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
    }

    #[test]
    fn scalar_document_is_schema_error() {
        let err = "just a string\n".parse::<Manifest>().unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
    }

    #[test]
    fn identifier_in_both_lists_is_schema_error() {
        let err = "enabled:\n  - rule-a\ndisabled:\n  - rule-a\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
        assert!(err.to_string().contains("rule-a"));
    }

    #[test]
    fn duplicate_within_list_is_schema_error() {
        let err = "enabled:\n  - rule-a\n  - rule-a\ndisabled: []\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(matches!(err, DacError::ManifestSchema(_)));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn disjoint_lists_parse() {
        let m: Manifest = "enabled:\n  - rule-a\n  - rule-b\ndisabled:\n  - rule-c\n"
            .parse()
            .unwrap();
        assert_eq!(m.enabled.len(), 2);
        assert_eq!(m.disabled.len(), 1);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enablement.yaml");
        let m = Manifest {
            enabled: vec!["rule-a".to_string(), "rule-b".to_string()],
            disabled: vec!["rule-c".to_string()],
        };
        m.save(&path).unwrap();
        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, DacError::Io(_)));
    }
}
