use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;
use crate::identity::ResourceKey;

/// Self-describing type header carried by every serialized object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// `group/version`, e.g. `cloud.jsonblob.dev/v1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

/// Per-object metadata.
///
/// `uid` and `creation_timestamp` are assigned by the registry on create and
/// carried forward unchanged by every later update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Metadata for a cluster-scoped object.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Metadata for a namespaced object.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Builder-style label setter.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The key this metadata addresses.
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Returns `true` if every `selector` entry is present with the same value.
    ///
    /// An empty selector matches every object.
    pub fn matches_labels(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|actual| actual == v))
    }
}

/// Parse an equality-based label selector such as `tier=web,zone=a`.
///
/// Whitespace around keys and values is trimmed. An empty string yields an
/// empty selector, which matches everything.
pub fn parse_label_selector(selector: &str) -> Result<BTreeMap<String, String>, TypeError> {
    let mut labels = BTreeMap::new();
    for term in selector.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = term.split_once('=').ok_or_else(|| TypeError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("term {term:?} is not of the form key=value"),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(TypeError::InvalidSelector {
                selector: selector.to_string(),
                reason: format!("term {term:?} has an empty key"),
            });
        }
        labels.insert(key.to_string(), value.trim().to_string());
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selector_terms() {
        let sel = parse_label_selector("tier=web, zone = a").unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel["tier"], "web");
        assert_eq!(sel["zone"], "a");
        assert!(parse_label_selector("").unwrap().is_empty());
    }

    #[test]
    fn parse_selector_rejects_malformed_terms() {
        assert!(parse_label_selector("tier").is_err());
        assert!(parse_label_selector("=web").is_err());
    }

    #[test]
    fn key_from_metadata() {
        let meta = ObjectMeta::namespaced("prod", "node-1");
        assert_eq!(meta.key(), ResourceKey::namespaced("prod", "node-1"));
        assert_eq!(ObjectMeta::named("m").key(), ResourceKey::cluster("m"));
    }

    #[test]
    fn label_matching() {
        let meta = ObjectMeta::named("m")
            .with_label("tier", "web")
            .with_label("zone", "a");

        let mut selector = BTreeMap::new();
        assert!(meta.matches_labels(&selector));

        selector.insert("tier".to_string(), "web".to_string());
        assert!(meta.matches_labels(&selector));

        selector.insert("zone".to_string(), "b".to_string());
        assert!(!meta.matches_labels(&selector));
    }

    #[test]
    fn missing_label_does_not_match() {
        let meta = ObjectMeta::named("m");
        let selector = BTreeMap::from([("tier".to_string(), "web".to_string())]);
        assert!(!meta.matches_labels(&selector));
    }

    #[test]
    fn serializes_camel_case_and_skips_empty() {
        let meta = ObjectMeta {
            creation_timestamp: Some(DateTime::<Utc>::from_timestamp(0, 0).unwrap()),
            ..ObjectMeta::named("m")
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "m");
        assert!(json.get("creationTimestamp").is_some());
        assert!(json.get("namespace").is_none());
        assert!(json.get("labels").is_none());
    }
}
