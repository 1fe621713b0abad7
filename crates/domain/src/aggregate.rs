use crate::DomainEvent;

/// An aggregate persisted with optimistic concurrency.
///
/// `version` is 0 until the first successful save. Stores compare it with the
/// persisted version, and on success call [`Aggregate::committed`] which bumps
/// the version and hands back the buffered events for publication.
pub trait Aggregate: Send + Sync {
    /// Identifier used in logs and conflict errors
    fn aggregate_id(&self) -> &str;

    fn version(&self) -> u64;

    /// Events buffered since the last successful save
    fn pending_events(&self) -> &[DomainEvent];

    /// Marks the aggregate as persisted at `version` and drains the event buffer.
    fn committed(&mut self, version: u64) -> Vec<DomainEvent>;

    fn is_new(&self) -> bool {
        self.version() == 0
    }
}
