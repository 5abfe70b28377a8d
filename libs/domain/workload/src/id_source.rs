//! Per-scenario mechanism for picking read keys.
//!
//! An integer-family primary key gets a numeric range; anything else
//! (uuid, text, composite fallback) gets a bounded cache of observed
//! keys. The cache's capacity eviction is a random-slot replacement, not
//! a true reservoir sample — that is deliberate: it approximates a
//! bounded-random-sample of recently seen ids over time, and the
//! behavior should be preserved rather than "fixed".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::Rng;

pub const CACHE_CAPACITY: usize = 10_000;

pub enum IdSource {
    IntegerRange { max: AtomicU64 },
    SampledCache { ids: Mutex<Vec<String>> },
}

impl IdSource {
    pub fn integer_range(max: i64) -> Self {
        IdSource::IntegerRange {
            max: AtomicU64::new(max.max(1) as u64),
        }
    }

    pub fn sampled_cache(seed: Vec<String>) -> Self {
        let mut seed = seed;
        seed.truncate(CACHE_CAPACITY);
        IdSource::SampledCache {
            ids: Mutex::new(seed),
        }
    }

    /// Picks a read key. Returns `None` only for an empty sampled cache
    /// (empty table, or a seed query that found nothing) — callers treat
    /// that as a deliberate no-op read, not an error.
    pub fn pick_read_id(&self) -> Option<String> {
        match self {
            IdSource::IntegerRange { max } => {
                let upper = max.load(Ordering::Relaxed).max(1);
                let picked = rand::thread_rng().gen_range(1..=upper);
                Some(picked.to_string())
            }
            IdSource::SampledCache { ids } => {
                let ids = ids.lock().expect("id cache mutex poisoned");
                if ids.is_empty() {
                    None
                } else {
                    let index = rand::thread_rng().gen_range(0..ids.len());
                    Some(ids[index].clone())
                }
            }
        }
    }

    /// Records a successful insert's returned id. For an integer range
    /// this only ever grows the upper bound (covers an unseeded range
    /// meeting its first real key); for a sampled cache this appends
    /// until capacity, then replaces a uniformly random slot.
    pub fn record_insert(&self, id: &str) {
        match self {
            IdSource::IntegerRange { max } => {
                if let Ok(parsed) = id.parse::<u64>() {
                    max.fetch_max(parsed, Ordering::Relaxed);
                }
            }
            IdSource::SampledCache { ids } => {
                let mut ids = ids.lock().expect("id cache mutex poisoned");
                if ids.len() < CACHE_CAPACITY {
                    ids.push(id.to_string());
                } else {
                    let slot = rand::thread_rng().gen_range(0..CACHE_CAPACITY);
                    ids[slot] = id.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_cache_returns_none() {
        let source = IdSource::sampled_cache(Vec::new());
        assert_eq!(source.pick_read_id(), None);
    }

    #[test]
    fn cache_grows_until_capacity_then_replaces() {
        let source = IdSource::sampled_cache(Vec::new());
        for i in 0..CACHE_CAPACITY {
            source.record_insert(&i.to_string());
        }
        if let IdSource::SampledCache { ids } = &source {
            assert_eq!(ids.lock().unwrap().len(), CACHE_CAPACITY);
        }
        source.record_insert("overflow");
        if let IdSource::SampledCache { ids } = &source {
            assert_eq!(ids.lock().unwrap().len(), CACHE_CAPACITY);
            assert!(ids.lock().unwrap().contains(&"overflow".to_string()));
        }
    }

    #[test]
    fn integer_range_never_shrinks() {
        let source = IdSource::integer_range(10);
        source.record_insert("3");
        if let IdSource::IntegerRange { max } = &source {
            assert_eq!(max.load(Ordering::Relaxed), 10);
        }
        source.record_insert("42");
        if let IdSource::IntegerRange { max } = &source {
            assert_eq!(max.load(Ordering::Relaxed), 42);
        }
    }

    #[test]
    fn integer_range_clamps_to_at_least_one() {
        let source = IdSource::integer_range(0);
        if let IdSource::IntegerRange { max } = &source {
            assert_eq!(max.load(Ordering::Relaxed), 1);
        }
    }

    proptest::proptest! {
        #[test]
        fn sampled_cache_never_exceeds_capacity_for_any_insert_count(insert_count in 0usize..(CACHE_CAPACITY * 2)) {
            let source = IdSource::sampled_cache(Vec::new());
            for i in 0..insert_count {
                source.record_insert(&i.to_string());
            }
            if let IdSource::SampledCache { ids } = &source {
                let ids = ids.lock().unwrap();
                prop_assert!(ids.len() <= CACHE_CAPACITY);
                prop_assert_eq!(ids.len(), insert_count.min(CACHE_CAPACITY));
            }
        }
    }
}
