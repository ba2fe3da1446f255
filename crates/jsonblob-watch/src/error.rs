/// Errors surfaced to the reader of a watch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchError {
    /// The watch was stopped or the hub went away.
    #[error("watch closed")]
    Closed,

    /// The subscriber's queue overflowed and its oldest events were dropped.
    /// The stream continues after the gap.
    #[error("watch {subscription} fell behind, {skipped} events dropped")]
    Overflow { subscription: u64, skipped: u64 },
}

/// Convenience alias used throughout the watch crate.
pub type WatchResult<T> = std::result::Result<T, WatchError>;
