use serde::{Deserialize, Serialize};

use crate::identity::ResourceIdentity;
use crate::meta::{ObjectMeta, TypeMeta};
use crate::resource::{Resource, ResourceList};

/// API group serving the built-in kinds.
pub const CLOUD_GROUP: &str = "cloud.jsonblob.dev";

/// API version of the built-in kinds.
pub const CLOUD_VERSION: &str = "v1";

/// A physical or virtual machine registered with the cloud API.
///
/// Cluster-scoped: machines are addressed by name alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MachineSpec,
    #[serde(default)]
    pub status: MachineStatus,
}

/// Desired state of a [`Machine`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Provider-specific identifier, e.g. `hcloud://1234`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Boot image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub cpus: u32,
    #[serde(default)]
    pub memory_mib: u64,
}

/// Lifecycle phase reported in [`MachineStatus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachinePhase {
    Pending,
    Provisioning,
    Running,
    Failed,
}

/// Observed state of a [`Machine`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<MachinePhase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
}

impl Machine {
    /// A machine with the given name and an empty spec.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::new(format!("{CLOUD_GROUP}/{CLOUD_VERSION}"), "Machine"),
            metadata: ObjectMeta::named(name),
            spec: MachineSpec::default(),
            status: MachineStatus::default(),
        }
    }

    /// Builder-style spec setter.
    pub fn with_spec(mut self, spec: MachineSpec) -> Self {
        self.spec = spec;
        self
    }
}

impl Resource for Machine {
    type List = MachineList;

    fn identity() -> ResourceIdentity {
        ResourceIdentity::cluster_scoped(CLOUD_GROUP, "Machine")
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// List form of [`Machine`], as returned by list and delete-collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub items: Vec<Machine>,
}

impl Default for MachineList {
    fn default() -> Self {
        Self {
            type_meta: TypeMeta::new(format!("{CLOUD_GROUP}/{CLOUD_VERSION}"), "MachineList"),
            items: Vec::new(),
        }
    }
}

impl ResourceList<Machine> for MachineList {
    fn push(&mut self, item: Machine) {
        self.items.push(item);
    }

    fn items(&self) -> &[Machine] {
        &self.items
    }

    fn into_items(self) -> Vec<Machine> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_identity_is_cluster_scoped() {
        let id = Machine::identity();
        assert_eq!(id.group, CLOUD_GROUP);
        assert_eq!(id.kind, "Machine");
        assert!(!id.namespaced);
        assert_eq!(id.plural(), "machines");
    }

    #[test]
    fn machine_serializes_with_type_header() {
        let m = Machine::new("m1").with_spec(MachineSpec {
            cpus: 4,
            ..Default::default()
        });
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["apiVersion"], "cloud.jsonblob.dev/v1");
        assert_eq!(json["kind"], "Machine");
        assert_eq!(json["metadata"]["name"], "m1");
        assert_eq!(json["spec"]["cpus"], 4);
    }

    #[test]
    fn machine_deserializes_with_missing_sections() {
        let m: Machine = serde_json::from_str(r#"{"metadata":{"name":"bare"}}"#).unwrap();
        assert_eq!(m.metadata.name, "bare");
        assert_eq!(m.spec, MachineSpec::default());
        assert!(m.status.phase.is_none());
    }

    #[test]
    fn new_list_has_list_kind() {
        let list = Machine::new_list();
        assert_eq!(list.type_meta.kind, "MachineList");
        assert!(list.is_empty());
    }

    #[test]
    fn list_push_preserves_order() {
        let mut list = MachineList::default();
        list.push(Machine::new("a"));
        list.push(Machine::new("b"));
        let names: Vec<_> = list.items().iter().map(|m| m.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
