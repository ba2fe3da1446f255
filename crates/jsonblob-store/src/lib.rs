//! Object blob gateway for jsonblob.
//!
//! A thin, policy-free adapter over a flat object bucket. Objects are opaque
//! byte blobs addressed by `/`-separated string keys; there are no
//! transactions and no change feed. Retries and caching, when wanted, belong
//! to the backing client, not to this layer.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- a bucket rooted at a local directory
//!
//! # Design Rules
//!
//! 1. A missing key is always reported as [`StoreError::NotFound`], never as
//!    a generic I/O failure.
//! 2. Iteration is non-recursive: it visits objects directly inside one
//!    directory, in whatever order the backend yields them.
//! 3. Keys must be relative and must not contain `..` segments.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
