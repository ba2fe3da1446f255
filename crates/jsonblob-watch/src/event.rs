use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        };
        f.write_str(s)
    }
}

/// One entry in a watch stream.
///
/// Serializes as `{"type": "Added", "object": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent<T> {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub object: T,
}

impl<T> ChangeEvent<T> {
    pub fn new(kind: EventKind, object: T) -> Self {
        Self { kind, object }
    }

    pub fn added(object: T) -> Self {
        Self::new(EventKind::Added, object)
    }

    pub fn modified(object: T) -> Self {
        Self::new(EventKind::Modified, object)
    }

    pub fn deleted(object: T) -> Self {
        Self::new(EventKind::Deleted, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape() {
        let event = ChangeEvent::modified(serde_json::json!({"name": "m1"}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Modified");
        assert_eq!(json["object"]["name"], "m1");
    }

    #[test]
    fn kind_display() {
        assert_eq!(EventKind::Added.to_string(), "Added");
        assert_eq!(EventKind::Deleted.to_string(), "Deleted");
    }
}
