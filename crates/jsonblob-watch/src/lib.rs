//! Watch hub for jsonblob.
//!
//! Turns point mutations into an ordered event stream per subscriber. The
//! hub runs no thread of its own: [`WatchHub::broadcast`] fans an event out
//! synchronously inside the caller, pushing it onto each matching
//! subscriber's private bounded queue.
//!
//! # Delivery Rules
//!
//! 1. A new subscription first receives one [`EventKind::Added`] per object
//!    in its snapshot, then live events. Snapshot and registration happen
//!    under the registry's exclusive lock, so no broadcast can slip between
//!    them.
//! 2. Fan-out holds the shared lock and never blocks: a full queue drops its
//!    oldest events and the reader is told how many it missed.
//! 3. Removing a subscriber and closing its queue is a single step under the
//!    exclusive lock. A reader blocked on a cancelled watch wakes up and sees
//!    the end of the stream.

pub mod error;
pub mod event;
pub mod hub;

pub use error::{WatchError, WatchResult};
pub use event::{ChangeEvent, EventKind};
pub use hub::{Watch, WatchCanceller, WatchConfig, WatchHub};
