//! Injectable cache of the tag column's legal options.
//!
//! The controller owns one [`TagCache`] for its whole lifetime. Replace the
//! default [`InMemoryTagCache`] to observe or pre-seed the cache in tests.

mod memory;

pub use memory::InMemoryTagCache;

/// Snapshot of the tag options known to the controller.
///
/// An empty snapshot means "not fetched yet": the controller fetches the
/// schema before validating against it.
pub trait TagCache: core::fmt::Debug {
    /// Returns the cached tag names in remote order.
    fn get(&self) -> &[String];

    /// Replaces the cached tag names.
    fn set(&mut self, tags: Vec<String>);

    /// Empties the cache.
    fn clear(&mut self);

    /// Returns `true` if nothing is cached.
    #[inline]
    fn is_empty(&self) -> bool {
        self.get().is_empty()
    }

    /// Returns `true` if `tag` is a cached option.
    #[inline]
    fn contains(&self, tag: &str) -> bool {
        self.get().iter().any(|known| known == tag)
    }
}
