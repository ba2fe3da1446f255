//! Resource type system for jsonblob.
//!
//! This crate provides the identity, key, and metadata types shared by every
//! other jsonblob crate, together with the [`Resource`] trait through which a
//! concrete kind tells the registry who it is and how its list form is built.
//!
//! # Key Types
//!
//! - [`ResourceIdentity`] -- group, kind, and scope of a resource type
//! - [`ResourceKey`] -- namespace (when namespaced) and name of one instance
//! - [`ObjectMeta`] -- per-object metadata: name, namespace, uid, labels
//! - [`Resource`] / [`ResourceList`] -- type-system interface used by the registry
//! - [`Machine`] -- the built-in cluster-scoped machine kind

pub mod error;
pub mod identity;
pub mod machine;
pub mod meta;
pub mod names;
pub mod resource;

pub use error::TypeError;
pub use identity::{ResourceIdentity, ResourceKey};
pub use machine::{
    Machine, MachineList, MachinePhase, MachineSpec, MachineStatus, CLOUD_GROUP, CLOUD_VERSION,
};
pub use meta::{parse_label_selector, ObjectMeta, TypeMeta};
pub use names::validate_name;
pub use resource::{Resource, ResourceList};
