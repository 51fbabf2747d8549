// =============================================================================
// dedup.rs — THE UPSERT DEDUPLICATION FORTRESS
// =============================================================================
//
// The one-hop expansion has a dirty secret: its queries overlap like
// crazy. A carrier that shares a seed's phone number usually shares its
// address too, and often its officer, which means the same census row
// comes back from two or three different expansion queries — and the
// seeds themselves come back from all of them. Upserts are idempotent, so
// re-writing the row is CORRECT. It's just wasteful, and we are the kind
// of people who find waste personally offensive.
//
// So: a hybrid Bloom filter + LRU cache keyed by DOT number.
//
// 1. The Bloom filter answers "definitely never upserted" in O(1).
//    Bloom filters never have false negatives, so a "no" is a real no.
// 2. When the Bloom filter says "maybe", the LRU cache gives a
//    definitive answer for everything still warm.
// 3. A Bloom false positive that also misses the LRU gets upserted
//    again. That costs one redundant idempotent write. We can live
//    with ourselves.
//
// No rotation logic here, unlike a long-running daemon's dedup: an
// ingestion run is finite and the filter is sized for the whole run.
//
// Is this overkill for trimming duplicate upserts out of a batch job?
// YES. Could we just use a HashSet? YES. Are we going to use a HashSet?
// ABSOLUTELY NOT.
// =============================================================================

use bloomfilter::Bloom;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;

/// Tracks which DOT numbers have already been upserted this run.
pub struct UpsertDedup {
    bloom: RwLock<Bloom<i64>>,
    lru: RwLock<LruCache<i64, ()>>,
    pub stats: DedupStats,
}

/// Counters for the end-of-run summary. Atomic because we're allergic
/// to wrapping a couple of u64s in a mutex.
pub struct DedupStats {
    pub checks: portable_atomic::AtomicU64,
    pub fresh: portable_atomic::AtomicU64,
    pub duplicates: portable_atomic::AtomicU64,
    pub bloom_maybe_hits: portable_atomic::AtomicU64,
}

impl UpsertDedup {
    pub fn new(expected_items: u64, fp_rate: f64, lru_capacity: usize) -> Self {
        let bloom = Bloom::new_for_fp_rate(expected_items as usize, fp_rate);
        let lru_size =
            NonZeroUsize::new(lru_capacity).unwrap_or(NonZeroUsize::new(1000).unwrap());
        Self {
            bloom: RwLock::new(bloom),
            lru: RwLock::new(LruCache::new(lru_size)),
            stats: DedupStats {
                checks: portable_atomic::AtomicU64::new(0),
                fresh: portable_atomic::AtomicU64::new(0),
                duplicates: portable_atomic::AtomicU64::new(0),
                bloom_maybe_hits: portable_atomic::AtomicU64::new(0),
            },
        }
    }

    /// Returns `true` if this DOT has not been seen this run (caller
    /// should upsert it), `false` if it's a known repeat (caller may
    /// skip). Marks the DOT as seen either way.
    pub fn check_and_insert(&self, dot: i64) -> bool {
        use portable_atomic::Ordering;

        self.stats.checks.fetch_add(1, Ordering::Relaxed);

        let bloom_maybe = self.bloom.read().check(&dot);
        if bloom_maybe {
            self.stats.bloom_maybe_hits.fetch_add(1, Ordering::Relaxed);
            let mut lru = self.lru.write();
            if lru.get(&dot).is_some() {
                self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            // Bloom said "maybe", LRU said "nope": either a false positive
            // or an entry the LRU evicted. Upsert again to be safe.
        }

        self.bloom.write().set(&dot);
        self.lru.write().put(dot, ());
        self.stats.fresh.fetch_add(1, Ordering::Relaxed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_dots_are_accepted() {
        let dedup = UpsertDedup::new(1000, 0.01, 100);
        assert!(dedup.check_and_insert(123456));
    }

    #[test]
    fn repeat_dots_are_rejected() {
        let dedup = UpsertDedup::new(1000, 0.01, 100);
        assert!(dedup.check_and_insert(123456));
        assert!(!dedup.check_and_insert(123456));
        let caught = dedup.stats.duplicates.load(portable_atomic::Ordering::Relaxed);
        assert_eq!(caught, 1);
    }

    #[test]
    fn distinct_dots_do_not_collide() {
        let dedup = UpsertDedup::new(10_000, 0.001, 1000);
        for dot in 1..=500i64 {
            assert!(dedup.check_and_insert(dot), "dot {dot} wrongly deduped");
        }
        for dot in 1..=500i64 {
            assert!(!dedup.check_and_insert(dot));
        }
    }
}
