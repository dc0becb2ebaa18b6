//! End-to-end sync pipeline
//!
//! ```text
//! FetchingVersions ──▶ UpToDate
//!        │
//!        ▼
//!   Refreshing ──▶ Reset ──▶ FetchedChampions ──▶ Repopulated ──▶ Notified ──▶ CachingImages ──▶ Done
//! ```
//!
//! Any non-terminal state can move to `Failed`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::config::VERSION_TIMEOUT_MS;
use crate::sync::error::{StorageError, SyncError};
use crate::sync::image_cache::{CacheReport, ImageCacheManager};
use crate::sync::notifier::{ChangeEvent, ChangeNotifier, ChangeOperation, Collection};
use crate::sync::remote::{CHAMP_DATA, RemoteDataSource};
use crate::sync::storage::{StorageGateway, Table};
use crate::sync::types::{
    AssetUrls, Champion, ChampionDocument, ChampionSkin, ImageUrls, Realm, RealmDocument,
};
use crate::sync::version;

/// Progress of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    FetchingVersions,
    UpToDate,
    Refreshing,
    Reset,
    FetchedChampions,
    Repopulated,
    Notified,
    CachingImages,
    Done,
    Failed,
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncState::UpToDate | SyncState::Done | SyncState::Failed
        )
    }
}

/// What a full refresh wrote and cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub realm_version: String,
    pub champions: usize,
    pub skins: usize,
    pub square_images: CacheReport,
    pub skin_images: CacheReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local major.minor already matches the remote; nothing was written
    UpToDate { realm_version: String },
    Refreshed(SyncSummary),
}

/// Rows written by one repopulation
struct Populated {
    champions: usize,
    skins: usize,
    images: ImageUrls,
}

/// Drives a sync between a remote data source and the local mirror
pub struct SyncOrchestrator<S: StorageGateway> {
    remote: Arc<dyn RemoteDataSource>,
    storage: Arc<S>,
    notifier: Arc<dyn ChangeNotifier>,
    images: ImageCacheManager,
    version_timeout: Duration,
    state: watch::Sender<SyncState>,
    run_lock: Mutex<()>,
}

impl<S: StorageGateway> SyncOrchestrator<S> {
    pub fn new(
        remote: Arc<dyn RemoteDataSource>,
        storage: Arc<S>,
        notifier: Arc<dyn ChangeNotifier>,
        images: ImageCacheManager,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            remote,
            storage,
            notifier,
            images,
            version_timeout: Duration::from_millis(VERSION_TIMEOUT_MS),
            state,
            run_lock: Mutex::new(()),
        }
    }

    /// Bound the wait for the remote and local realm versions
    pub fn with_version_timeout(mut self, timeout: Duration) -> Self {
        self.version_timeout = timeout;
        self
    }

    /// Current state of the most recent run
    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Run one sync to a terminal state.
    ///
    /// Calls on the same orchestrator are serialized.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();

        let result = self.run().await;
        match &result {
            Ok(SyncOutcome::UpToDate { .. }) => {}
            Ok(SyncOutcome::Refreshed(summary)) => {
                self.transition(SyncState::Done);
                info!(
                    "Synced realm {} ({} champions, {} skins) in {:?}",
                    summary.realm_version,
                    summary.champions,
                    summary.skins,
                    started.elapsed()
                );
            }
            Err(e) => {
                self.transition(SyncState::Failed);
                error!("Sync failed: {}", e);
            }
        }
        result
    }

    async fn run(&self) -> Result<SyncOutcome, SyncError> {
        self.transition(SyncState::FetchingVersions);
        let (remote_realm, local_version) = self.fetch_versions().await?;
        info!("Found remote realm version {}", remote_realm.v);

        let remote = version::parse(Some(remote_realm.v.as_str()))?;
        let local = local_version.as_deref().and_then(|v| {
            version::parse(Some(v))
                .inspect_err(|e| warn!("Ignoring malformed local realm version: {}", e))
                .ok()
        });

        if !version::needs_sync(local.as_ref(), &remote) {
            info!(
                "Local realm {} matches remote {}, nothing to sync",
                local_version.as_deref().unwrap_or_default(),
                remote_realm.v
            );
            self.transition(SyncState::UpToDate);
            return Ok(SyncOutcome::UpToDate {
                realm_version: local_version.unwrap_or_else(|| remote_realm.v.clone()),
            });
        }

        info!(
            "Refreshing local mirror from {} to {}",
            local_version.as_deref().unwrap_or("nothing"),
            remote_realm.v
        );
        // Validate the CDN before anything is deleted
        let asset_urls = AssetUrls::new(&remote_realm.cdn, &remote_realm.n.champion)?;

        self.transition(SyncState::Refreshing);
        self.reset().await?;
        self.transition(SyncState::Reset);

        let champions = self.remote.get_champions(CHAMP_DATA).await?;
        self.transition(SyncState::FetchedChampions);

        let realm_version = remote_realm.v.clone();
        let populated = self
            .repopulate(Realm::from(&remote_realm), champions, asset_urls)
            .await?;
        self.transition(SyncState::Repopulated);

        self.notifier.notify_change(ChangeEvent::new(
            Collection::Champions,
            ChangeOperation::Insert,
        ));
        self.transition(SyncState::Notified);

        self.transition(SyncState::CachingImages);
        debug!(
            "Caching images in batches of {}",
            self.images.batch_size()
        );
        let square_images = self.images.cache(&populated.images.square).await;
        let skin_images = self.images.cache(&populated.images.skin_art()).await;

        Ok(SyncOutcome::Refreshed(SyncSummary {
            realm_version,
            champions: populated.champions,
            skins: populated.skins,
            square_images,
            skin_images,
        }))
    }

    /// Fetch the remote realm and read the local version concurrently.
    ///
    /// Fails on the first error; a storage read already running finishes on
    /// the blocking pool and its result is dropped.
    async fn fetch_versions(&self) -> Result<(RealmDocument, Option<String>), SyncError> {
        let remote = async { self.remote.get_realm().await.map_err(SyncError::from) };
        let local = self.on_storage(|storage| storage.local_realm_version());

        tokio::time::timeout(self.version_timeout, async {
            tokio::try_join!(remote, local)
        })
        .await
        .map_err(|_| SyncError::Timeout(self.version_timeout))?
    }

    async fn reset(&self) -> Result<(), SyncError> {
        self.on_storage(clear_tables::<S>).await?;

        let cache = Arc::clone(self.images.asset_cache());
        match tokio::task::spawn_blocking(move || cache.clear()).await {
            Ok(Ok(removed)) => debug!("Discarded {} cached image(s)", removed),
            Ok(Err(e)) => warn!("Failed to clear image cache: {}", e),
            Err(e) => warn!("Image cache clear task failed: {}", e),
        }
        Ok(())
    }

    async fn repopulate(
        &self,
        realm: Realm,
        champions: ChampionDocument,
        urls: AssetUrls,
    ) -> Result<Populated, SyncError> {
        let result = self
            .on_storage(move |storage| populate(storage, &realm, &champions, &urls))
            .await;

        match result {
            Ok(populated) => Ok(populated),
            Err(e) => {
                // Leave no realm row behind so the next sync rebuilds from scratch
                warn!("Repopulation failed, discarding partially written rows");
                if let Err(discard) = self.on_storage(clear_tables::<S>).await {
                    error!("Failed to discard partially written rows: {}", discard);
                }
                Err(match e {
                    SyncError::Storage(source) => SyncError::Repopulate { source },
                    other => other,
                })
            }
        }
    }

    /// Run a storage call on the blocking pool
    async fn on_storage<T, F>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&S) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let result = tokio::task::spawn_blocking(move || f(&*storage)).await?;
        Ok(result?)
    }

    fn transition(&self, next: SyncState) {
        let previous = self.state.send_replace(next);
        debug!("Sync state {:?} -> {:?}", previous, next);
    }
}

fn clear_tables<S: StorageGateway + ?Sized>(storage: &S) -> Result<(), StorageError> {
    for table in Table::RESET_ORDER {
        storage.delete_all(table)?;
    }
    Ok(())
}

/// Insert the realm, then every champion and its skins, collecting image URLs
fn populate<S: StorageGateway + ?Sized>(
    storage: &S,
    realm: &Realm,
    champions: &ChampionDocument,
    urls: &AssetUrls,
) -> Result<Populated, StorageError> {
    storage.insert_realm(realm)?;

    let mut images = ImageUrls::default();
    let mut skins = 0;

    for entry in champions.data.values() {
        let image_url = urls.square(&entry.key);
        storage.insert_champion(&Champion {
            id: entry.id,
            key: entry.key.clone(),
            name: entry.name.clone(),
            title: entry.title.clone(),
            blurb: entry.blurb.clone(),
            image_url: image_url.clone(),
        })?;
        images.square.push(image_url);

        for skin in &entry.skins {
            let portrait = urls.portrait(&entry.key, skin.num);
            let landscape = urls.landscape(&entry.key, skin.num);
            storage.insert_skin(&ChampionSkin {
                skin_id: skin.id,
                champion_id: entry.id,
                skin_number: skin.num,
                name: skin.name.clone(),
                portrait_image_url: portrait.clone(),
                landscape_image_url: landscape.clone(),
            })?;
            images.portrait.push(portrait);
            images.landscape.push(landscape);
            skins += 1;
        }
    }

    info!(
        "Inserted {} champions and {} skins",
        champions.data.len(),
        skins
    );

    Ok(Populated {
        champions: champions.data.len(),
        skins,
        images,
    })
}
