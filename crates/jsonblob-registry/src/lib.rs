//! Resource registry for jsonblob.
//!
//! Persists typed resources as one JSON blob each in an object bucket and
//! layers registry semantics on top: get, list, create, update with optional
//! upsert, delete, bulk delete, and a snapshot-then-tail watch feed.
//!
//! # Components
//!
//! - [`paths`] -- deterministic blob paths from identity, namespace and name
//! - [`Codec`] / [`JsonCodec`] -- typed resource to bytes and back
//! - [`Repository`] -- the CRUD engine, emitting change events to a
//!   [`WatchHub`](jsonblob_watch::WatchHub)
//! - [`Validators`] -- optional admission hooks run before each write
//!
//! # Consistency
//!
//! The bucket offers no transactions and no conditional put. Create checks
//! for an existing blob and then writes it; mutations of the same path are
//! serialized inside one repository, but two processes sharing a bucket can
//! both pass the check and the later write wins. Change events are local to
//! the repository that performed the mutation.

pub mod codec;
pub mod error;
pub mod filter;
pub mod paths;
pub mod repository;
pub mod validation;

pub use codec::{Codec, CodecError, JsonCodec};
pub use error::{RegistryError, RegistryResult};
pub use filter::ListFilter;
pub use paths::{directory_for, file_for, JSON_SUFFIX};
pub use repository::{Repository, UpdateOutcome};
pub use validation::Validators;
