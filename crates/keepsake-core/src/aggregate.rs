//! Aggregate root abstraction.

use uuid::Uuid;

/// Trait for aggregate roots persisted as state snapshots with an
/// optimistic-concurrency version.
pub trait AggregateRoot: Send + Sync {
    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the version the aggregate was loaded at (number of commits).
    fn version(&self) -> i64;

    /// Records that the current state has been persisted, advancing the
    /// version to match the store.
    fn mark_committed(&mut self);
}
