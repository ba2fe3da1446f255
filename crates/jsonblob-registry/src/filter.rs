use std::collections::BTreeMap;
use std::fmt;

use jsonblob_types::{parse_label_selector, ObjectMeta};

use crate::error::RegistryResult;

/// Equality label selector applied by list, watch and delete-collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub label_selector: BTreeMap<String, String>,
}

impl ListFilter {
    /// Accepts every object.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Parse a selector of the form `k1=v1,k2=v2`.
    pub fn parse(selector: &str) -> RegistryResult<Self> {
        Ok(Self {
            label_selector: parse_label_selector(selector)?,
        })
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.label_selector.insert(key.into(), value.into());
        self
    }

    pub fn is_everything(&self) -> bool {
        self.label_selector.is_empty()
    }

    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        meta.matches_labels(&self.label_selector)
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.label_selector {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}
