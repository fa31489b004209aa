//! Data exchanged with the QuickVerse service.

use serde::{Deserialize, Serialize};

/// A key and its translated text for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationEntry {
    pub key: String,
    #[serde(rename = "target_text")]
    pub text: String,
}

impl LocalizationEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// How many times a key resolved since the last accepted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilisedKeyCount {
    pub key: String,
    #[serde(rename = "usage_count")]
    pub count: u32,
}

/// A key that failed to resolve, with the default the caller fell back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingKeyRecord {
    pub key: String,
    pub default_value: String,
}

/// Body of a usage report. Each key appears at most once per list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBatch {
    pub missing_keys: Vec<MissingKeyRecord>,
    pub utilised_keys: Vec<UtilisedKeyCount>,
}

impl ReportBatch {
    pub fn is_empty(&self) -> bool {
        self.missing_keys.is_empty() && self.utilised_keys.is_empty()
    }

    /// Usage count recorded for `key`, if any.
    pub fn usage_of(&self, key: &str) -> Option<u32> {
        self.utilised_keys.iter().find(|u| u.key == key).map(|u| u.count)
    }

    /// Default value recorded for missing `key`, if any.
    pub fn missing_default_of(&self, key: &str) -> Option<&str> {
        self.missing_keys
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.default_value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_wire_names() {
        let entry: LocalizationEntry =
            serde_json::from_value(json!({"key": "Onboarding.Title", "target_text": "Bienvenue"})).unwrap();
        assert_eq!(entry, LocalizationEntry::new("Onboarding.Title", "Bienvenue"));
    }

    #[test]
    fn test_report_body_shape() {
        let batch = ReportBatch {
            missing_keys: vec![MissingKeyRecord {
                key: "C".to_string(),
                default_value: "fallback".to_string(),
            }],
            utilised_keys: vec![UtilisedKeyCount {
                key: "A".to_string(),
                count: 2,
            }],
        };

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "missing_keys": [{"key": "C", "default_value": "fallback"}],
                "utilised_keys": [{"key": "A", "usage_count": 2}]
            })
        );
        assert_eq!(batch.usage_of("A"), Some(2));
        assert_eq!(batch.missing_default_of("C"), Some("fallback"));
        assert_eq!(batch.usage_of("C"), None);
    }
}
