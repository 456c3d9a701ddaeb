use crate::domain::model::{CacheEntry, EntryOrigin};
use crate::domain::ports::{Storage, TimingsSource};
use crate::utils::error::Result;
use chrono::{Datelike, NaiveDate};

/// File name of the cache entry for `date`, e.g. `timings-2024-06-01.json`.
pub fn cache_key(date: NaiveDate) -> String {
    format!("timings-{}.json", date.format("%Y-%m-%d"))
}

/// Date-keyed, never-expiring cache of provider payloads.
pub struct TimingsCache<S: Storage, F: TimingsSource> {
    storage: S,
    source: F,
}

impl<S: Storage, F: TimingsSource> TimingsCache<S, F> {
    pub fn new(storage: S, source: F) -> Self {
        Self { storage, source }
    }

    pub async fn get(&self, date: NaiveDate) -> Result<CacheEntry> {
        let key = cache_key(date);

        if let Some(payload) = self.storage.read_file(&key).await? {
            tracing::debug!("Cache hit for {} ({} bytes)", key, payload.len());
            return Ok(CacheEntry::new(date, payload, EntryOrigin::Cache));
        }

        tracing::info!("⬇️  Downloading timings for {}-{:02}", date.year(), date.month());
        let payload = self.source.fetch_month(date.year(), date.month()).await?;

        self.storage.write_file(&key, &payload).await?;
        tracing::debug!("Stored {} ({} bytes)", key, payload.len());

        Ok(CacheEntry::new(date, payload, EntryOrigin::Remote))
    }

    /// Drops the entry for `date` so the next `get` downloads it again.
    pub async fn invalidate(&self, date: NaiveDate) -> Result<()> {
        let key = cache_key(date);
        tracing::warn!("Discarding cached timings {}", key);
        self.storage.remove_file(&key).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::error::PrayerError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub(crate) struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_writes: bool,
    }

    impl MockStorage {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        pub(crate) async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
            let files = self.files.lock().await;
            Ok(files.get(path).cloned())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(PrayerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("read-only: {}", path),
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn remove_file(&self, path: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            files.remove(path);
            Ok(())
        }
    }

    /// Serves canned month payloads and counts requests.
    #[derive(Clone, Default)]
    pub(crate) struct StaticSource {
        months: Arc<std::sync::Mutex<HashMap<(i32, u32), Vec<u8>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl StaticSource {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_month(self, year: i32, month: u32, payload: Vec<u8>) -> Self {
            self.set_month(year, month, payload);
            self
        }

        pub(crate) fn set_month(&self, year: i32, month: u32, payload: Vec<u8>) {
            self.months.lock().unwrap().insert((year, month), payload);
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TimingsSource for StaticSource {
        async fn fetch_month(&self, year: i32, month: u32) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let months = self.months.lock().unwrap();
            months
                .get(&(year, month))
                .cloned()
                .ok_or_else(|| PrayerError::FetchStatusError {
                    status: 503,
                    url: format!("static://{}/{}", year, month),
                })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_cache_key_is_date_only() {
        assert_eq!(cache_key(date()), "timings-2024-06-01.json");
    }

    #[tokio::test]
    async fn test_miss_fetches_and_persists_verbatim() {
        let storage = MockStorage::new();
        let source = StaticSource::new().with_month(2024, 6, b"{\"data\":[]}".to_vec());
        let cache = TimingsCache::new(storage.clone(), source.clone());

        let entry = cache.get(date()).await.unwrap();

        assert_eq!(entry.origin(), EntryOrigin::Remote);
        assert_eq!(entry.payload(), b"{\"data\":[]}");
        assert_eq!(entry.date(), date());
        assert_eq!(source.calls(), 1);
        assert_eq!(
            storage.get_file("timings-2024-06-01.json").await.unwrap(),
            b"{\"data\":[]}".to_vec()
        );
    }

    #[tokio::test]
    async fn test_hit_skips_source() {
        let storage = MockStorage::new();
        storage.put_file("timings-2024-06-01.json", b"cached").await;
        let source = StaticSource::new();
        let cache = TimingsCache::new(storage, source.clone());

        let entry = cache.get(date()).await.unwrap();

        assert_eq!(entry.origin(), EntryOrigin::Cache);
        assert_eq!(entry.payload(), b"cached");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_each_date_gets_its_own_entry() {
        let storage = MockStorage::new();
        let source = StaticSource::new().with_month(2024, 6, b"june".to_vec());
        let cache = TimingsCache::new(storage.clone(), source.clone());

        cache.get(date()).await.unwrap();
        cache.get(date().succ_opt().unwrap()).await.unwrap();
        cache.get(date()).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert!(storage.get_file("timings-2024-06-02.json").await.is_some());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_writing() {
        let storage = MockStorage::new();
        let cache = TimingsCache::new(storage.clone(), StaticSource::new());

        let err = cache.get(date()).await.unwrap_err();

        assert!(matches!(err, PrayerError::FetchStatusError { status: 503, .. }));
        assert!(storage.get_file("timings-2024-06-01.json").await.is_none());
    }

    #[tokio::test]
    async fn test_write_error_is_storage_error() {
        let source = StaticSource::new().with_month(2024, 6, b"june".to_vec());
        let cache = TimingsCache::new(MockStorage::failing_writes(), source);

        let err = cache.get(date()).await.unwrap_err();
        assert!(matches!(err, PrayerError::IoError(_)));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let storage = MockStorage::new();
        let source = StaticSource::new().with_month(2024, 6, b"june".to_vec());
        let cache = TimingsCache::new(storage, source.clone());

        cache.get(date()).await.unwrap();
        cache.invalidate(date()).await.unwrap();
        let entry = cache.get(date()).await.unwrap();

        assert_eq!(entry.origin(), EntryOrigin::Remote);
        assert_eq!(source.calls(), 2);
    }
}
