//! In-memory tag cache.

use super::TagCache;

/// Tag cache backed by a plain vector.
///
/// # Example
///
/// ```rust
/// use nbudget_rs::cache::{InMemoryTagCache, TagCache};
///
/// let mut cache = InMemoryTagCache::new();
/// assert!(cache.is_empty());
/// cache.set(vec!["Food".to_owned()]);
/// assert!(cache.contains("Food"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTagCache {
    /// Cached tag names.
    tags: Vec<String>,
}

impl InMemoryTagCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-seeded with `tags`.
    #[inline]
    #[must_use]
    pub fn with_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl TagCache for InMemoryTagCache {
    #[inline]
    fn get(&self) -> &[String] {
        &self.tags
    }

    #[inline]
    fn set(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    #[inline]
    fn clear(&mut self) {
        self.tags.clear();
    }
}
