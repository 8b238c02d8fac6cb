//! URL-keyed store of decoded images.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::{debug, trace};

use super::ImageHandle;

/// Map from image URL to decoded image.
///
/// Unbounded by default: entries stay until [`ImageCache::clear`]. With a
/// capacity, the least recently used entry is dropped to make room.
///
/// Not synchronized; the preloader keeps it behind the same lock as its
/// pending set.
pub struct ImageCache {
    entries: LruCache<String, ImageHandle>,
    hits: u64,
    misses: u64,
}

impl ImageCache {
    /// Creates a cache that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            entries: LruCache::unbounded(),
            hits: 0,
            misses: 0,
        }
    }

    /// Creates a cache holding at most `capacity` images (minimum 1).
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }

    /// Creates a bounded cache when `max_entries` is set, otherwise an unbounded one.
    #[must_use]
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        max_entries.map_or_else(Self::unbounded, Self::bounded)
    }

    /// Looks up `url`, counting a hit or a miss.
    pub fn get(&mut self, url: &str) -> Option<ImageHandle> {
        if let Some(image) = self.entries.get(url) {
            self.hits += 1;
            trace!(url, "Image cache hit");
            Some(image.clone())
        } else {
            self.misses += 1;
            trace!(url, "Image cache miss");
            None
        }
    }

    /// Membership check that neither counts nor promotes.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url)
    }

    /// Stores `image` under `url`, replacing any previous entry.
    pub fn put(&mut self, url: String, image: ImageHandle) {
        if let Some((evicted, _)) = self.entries.push(url.clone(), image)
            && evicted != url
        {
            debug!(url = %evicted, "Evicted least recently used image");
        }
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached image. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of the counters, with the caller's pending count attached.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self, pending: usize) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            size: self.len(),
            pending,
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.entries.len())
            .field("cap", &self.entries.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Loads currently in flight.
    pub pending: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {} pending, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.pending, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn img() -> ImageHandle {
        Arc::new(image::DynamicImage::new_rgb8(10, 10))
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = ImageCache::unbounded();
        cache.put("a.png".to_string(), img());

        let retrieved = cache.get("a.png");
        assert_eq!(retrieved.map(|i| i.width()), Some(10));
        assert!(cache.get("missing.png").is_none());
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut cache = ImageCache::unbounded();
        for i in 0..500 {
            cache.put(format!("{i}.png"), img());
        }
        assert_eq!(cache.len(), 500);
        assert!(cache.contains("0.png"));
    }

    #[test]
    fn test_bounded_evicts_least_recent() {
        let mut cache = ImageCache::bounded(2);
        cache.put("a.png".to_string(), img());
        cache.put("b.png".to_string(), img());
        // Touch a so b becomes the eviction candidate.
        let _ = cache.get("a.png");
        cache.put("c.png".to_string(), img());

        assert!(cache.contains("a.png"));
        assert!(!cache.contains("b.png"));
        assert!(cache.contains("c.png"));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = ImageCache::bounded(2);
        cache.put("a.png".to_string(), img());
        cache.put("b.png".to_string(), img());

        assert!(cache.contains("a.png"));
        cache.put("c.png".to_string(), img());

        assert!(!cache.contains("a.png"));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = ImageCache::with_max_entries(Some(0));
        cache.put("a.png".to_string(), img());
        cache.put("b.png".to_string(), img());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_replacing_keeps_single_entry() {
        let mut cache = ImageCache::bounded(2);
        cache.put("a.png".to_string(), img());
        cache.put("a.png".to_string(), img());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut cache = ImageCache::unbounded();
        cache.put("a.png".to_string(), img());

        let _ = cache.get("a.png");
        let _ = cache.get("missing.png");

        let stats = cache.stats(3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.pending, 3);
        assert!((stats.hit_rate - 50.0).abs() < f64::EPSILON);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(0).hits, 1);
    }
}
