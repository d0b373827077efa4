//! Read-through cache in front of any [`PriceDataPort`].

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Key: (symbol, start, end)
type CacheKey = (String, NaiveDate, NaiveDate);

#[derive(Clone, Debug)]
struct CacheEntry {
    bars: Vec<OhlcvBar>,
    cached_at: Instant,
}

pub struct CachedDataPort<P> {
    inner: P,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl<P: PriceDataPort> CachedDataPort<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Vec<OhlcvBar>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        (entry.cached_at.elapsed() < self.ttl).then(|| entry.bars.clone())
    }
}

impl<P: PriceDataPort> PriceDataPort for CachedDataPort<P> {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocksimError> {
        let key = (symbol.to_string(), start, end);
        if let Some(bars) = self.lookup(&key) {
            tracing::debug!(%symbol, %start, %end, "cache hit");
            return Ok(bars);
        }

        tracing::debug!(%symbol, %start, %end, "cache miss");
        let bars = self.inner.fetch_bars(symbol, start, end)?;
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
            entries.insert(
                key,
                CacheEntry {
                    bars: bars.clone(),
                    cached_at: Instant::now(),
                },
            );
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
        self.inner.list_symbols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPort {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPort {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PriceDataPort for CountingPort {
        fn fetch_bars(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, StocksimError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StocksimError::DataSource {
                    reason: "offline".into(),
                });
            }
            Ok(vec![OhlcvBar {
                symbol: symbol.to_string(),
                date: start,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: None,
            }])
        }

        fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
            Ok(vec!["A".into()])
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(3600));

        let first = cache.fetch_bars("A", d(1), d(10)).unwrap();
        let second = cache.fetch_bars("A", d(1), d(10)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_range_is_a_different_key() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(3600));

        cache.fetch_bars("A", d(1), d(10)).unwrap();
        cache.fetch_bars("A", d(2), d(10)).unwrap();
        cache.fetch_bars("B", d(1), d(10)).unwrap();

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn stale_entries_are_refetched() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::ZERO);

        cache.fetch_bars("A", d(1), d(10)).unwrap();
        cache.fetch_bars("A", d(1), d(10)).unwrap();

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stale_entries_are_pruned_on_insert() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::ZERO);

        cache.fetch_bars("A", d(1), d(10)).unwrap();
        cache.fetch_bars("B", d(1), d(10)).unwrap();
        cache.fetch_bars("C", d(1), d(10)).unwrap();

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = CachedDataPort::new(CountingPort::new(true), Duration::from_secs(3600));

        assert!(cache.fetch_bars("A", d(1), d(10)).is_err());
        assert!(cache.fetch_bars("A", d(1), d(10)).is_err());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_entries() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(3600));
        cache.fetch_bars("A", d(1), d(10)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.list_symbols().unwrap(), vec!["A"]);
    }
}
