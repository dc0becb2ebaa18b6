//! Storage test utilities

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use ddragon_sync::sync::assets::DiskAssetCache;
use ddragon_sync::sync::client::StaticDataClient;
use ddragon_sync::sync::error::StorageError;
use ddragon_sync::sync::image_cache::ImageCacheManager;
use ddragon_sync::sync::notifier::BroadcastNotifier;
use ddragon_sync::sync::orchestrator::SyncOrchestrator;
use ddragon_sync::sync::storage::{StorageGateway, Table};
use ddragon_sync::sync::store::SqliteStore;
use ddragon_sync::sync::types::{Champion, ChampionSkin, Realm, SkinId};

use super::API_KEY;

/// SqliteStore that counts every write it receives
pub struct CountingStore {
    inner: SqliteStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &SqliteStore {
        &self.inner
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl StorageGateway for CountingStore {
    fn local_realm_version(&self) -> Result<Option<String>, StorageError> {
        self.inner.local_realm_version()
    }

    fn delete_all(&self, table: Table) -> Result<usize, StorageError> {
        self.record_write();
        self.inner.delete_all(table)
    }

    fn insert_realm(&self, realm: &Realm) -> Result<String, StorageError> {
        self.record_write();
        self.inner.insert_realm(realm)
    }

    fn insert_champion(&self, champion: &Champion) -> Result<i64, StorageError> {
        self.record_write();
        self.inner.insert_champion(champion)
    }

    fn insert_skin(&self, skin: &ChampionSkin) -> Result<SkinId, StorageError> {
        self.record_write();
        self.inner.insert_skin(skin)
    }

    fn count(&self, table: Table) -> Result<usize, StorageError> {
        self.inner.count(table)
    }
}

/// A file-backed store and image directory under one temp dir
pub struct TestMirror {
    pub temp_dir: TempDir,
    pub store: Arc<CountingStore>,
}

impl TestMirror {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("ddragon.db")).unwrap();
        Self {
            temp_dir,
            store: Arc::new(CountingStore::new(store)),
        }
    }

    pub fn image_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("images")
    }

    pub fn cached_images(&self) -> usize {
        std::fs::read_dir(self.image_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Orchestrator wired to the real HTTP client and disk cache
    pub fn orchestrator(&self, base_url: &str) -> SyncOrchestrator<CountingStore> {
        let assets = DiskAssetCache::new(&self.image_dir(), Duration::from_secs(5));
        SyncOrchestrator::new(
            Arc::new(StaticDataClient::new(base_url, API_KEY)),
            self.store.clone(),
            Arc::new(BroadcastNotifier::default()),
            ImageCacheManager::with_batch_size(Arc::new(assets), 4),
        )
    }
}
