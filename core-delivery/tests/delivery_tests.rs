//! Integration tests for the batched delivery engine
//!
//! Exercises partial-failure reconciliation, exponential backoff timing
//! (under a paused clock), retry exhaustion, replace semantics, and the
//! concrete playlist/queue/file targets.

use async_trait::async_trait;
use core_catalog::{
    CatalogClient, CatalogError, Cursor, Device, Page, RawItem, Record, StandardRecord,
};
use core_delivery::{
    DeliveryConfig, DeliveryEngine, DeliveryError, DeliveryTarget, FileTarget, PlaylistTarget,
    QueueTarget,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

// ============================================================================
// Scripted target
// ============================================================================

/// Per-write behavior for [`ScriptedTarget`]; once the script runs out every
/// write is accepted.
enum WriteScript {
    Accept,
    /// Accept the first `n` items of the batch, then report failure.
    AcceptThenFail(usize),
    Fail,
}

struct ScriptedTarget {
    max_batch: usize,
    removable: bool,
    items: Mutex<Vec<String>>,
    script: Mutex<VecDeque<WriteScript>>,
    writes: Mutex<usize>,
}

impl ScriptedTarget {
    fn new(max_batch: usize, script: Vec<WriteScript>) -> Self {
        Self {
            max_batch,
            removable: true,
            items: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
            writes: Mutex::new(0),
        }
    }

    fn without_removal(mut self) -> Self {
        self.removable = false;
        self
    }

    async fn preload(&self, ids: &[&str]) {
        let mut items = self.items.lock().await;
        items.extend(ids.iter().map(|id| id.to_string()));
    }

    async fn stored(&self) -> Vec<String> {
        self.items.lock().await.clone()
    }

    async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }

    fn transient_failure() -> DeliveryError {
        DeliveryError::Catalog(CatalogError::Network("connection reset".to_string()))
    }
}

#[async_trait]
impl DeliveryTarget for ScriptedTarget {
    fn max_batch(&self) -> usize {
        self.max_batch
    }

    fn supports_removal(&self) -> bool {
        self.removable
    }

    async fn write(&self, batch: &[StandardRecord]) -> core_delivery::Result<()> {
        *self.writes.lock().await += 1;
        let step = self.script.lock().await.pop_front();
        let mut items = self.items.lock().await;
        match step {
            None | Some(WriteScript::Accept) => {
                items.extend(batch.iter().map(|r| r.record().delivery_id()));
                Ok(())
            }
            Some(WriteScript::AcceptThenFail(n)) => {
                items.extend(batch.iter().take(n).map(|r| r.record().delivery_id()));
                Err(Self::transient_failure())
            }
            Some(WriteScript::Fail) => Err(Self::transient_failure()),
        }
    }

    async fn clear(&self) -> core_delivery::Result<()> {
        if !self.removable {
            return Err(DeliveryError::RemovalUnsupported);
        }
        self.items.lock().await.clear();
        Ok(())
    }

    async fn current_ids(&self) -> core_delivery::Result<Vec<String>> {
        Ok(self.items.lock().await.clone())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn record(id: &str) -> StandardRecord {
    StandardRecord::Plain(Record {
        id: Some(id.to_string()),
        uri: format!("catalog:track:{id}"),
        name: format!("Track {id}"),
        artists: vec!["Artist".to_string()],
        album: None,
        duration_ms: 180_000,
        popularity: 10,
        is_local: false,
    })
}

fn records(ids: &[&str]) -> Vec<StandardRecord> {
    ids.iter().map(|id| record(id)).collect()
}

// ============================================================================
// Append and reconciliation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_append_recovers_from_partial_batch_failure() {
    // Batches of 2 over [1..5]: [1,2] accepted, [3,4] half-lands, the
    // remainder [4,5] is requeued and everything arrives exactly once.
    let target = Arc::new(ScriptedTarget::new(
        2,
        vec![WriteScript::Accept, WriteScript::AcceptThenFail(1)],
    ));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine
        .append(&records(&["1", "2", "3", "4", "5"]), Some(2))
        .await
        .unwrap();

    assert_eq!(target.stored().await, vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test(start_paused = true)]
async fn test_append_with_no_progress_replays_whole_batch() {
    let target = Arc::new(ScriptedTarget::new(3, vec![WriteScript::Fail]));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&records(&["1", "2", "3"]), None).await.unwrap();

    assert_eq!(target.stored().await, vec!["1", "2", "3"]);
    assert_eq!(target.write_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_append_uses_target_max_batch_by_default() {
    let target = Arc::new(ScriptedTarget::new(2, vec![]));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&records(&["1", "2", "3", "4", "5"]), None).await.unwrap();

    // Five items in batches of two takes three writes.
    assert_eq!(target.write_count().await, 3);
    assert_eq!(target.stored().await.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_requested_batch_size_is_clamped_to_target_maximum() {
    let target = Arc::new(ScriptedTarget::new(2, vec![]));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&records(&["1", "2", "3", "4"]), Some(100)).await.unwrap();

    assert_eq!(target.write_count().await, 2);
}

#[tokio::test]
async fn test_append_empty_input_is_a_no_op() {
    let target = Arc::new(ScriptedTarget::new(2, vec![]));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&[], None).await.unwrap();

    assert_eq!(target.write_count().await, 0);
}

// ============================================================================
// Backoff and exhaustion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_double_between_retries() {
    let target = Arc::new(ScriptedTarget::new(
        2,
        vec![WriteScript::Fail, WriteScript::Fail, WriteScript::Fail],
    ));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    let start = tokio::time::Instant::now();
    engine.append(&records(&["1", "2"]), None).await.unwrap();

    // Three failed attempts: 1000 + 2000 + 4000 ms of backoff.
    assert_eq!(start.elapsed(), Duration::from_millis(7000));
    assert_eq!(target.stored().await, vec!["1", "2"]);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_keeps_partial_progress() {
    let target = Arc::new(ScriptedTarget::new(
        2,
        vec![
            WriteScript::Accept,
            WriteScript::Fail,
            WriteScript::Fail,
            WriteScript::Fail,
        ],
    ));
    let config = DeliveryConfig::default().with_max_retries(2);
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, config);

    let err = engine
        .append(&records(&["1", "2", "3", "4"]), Some(2))
        .await
        .unwrap_err();

    match err {
        DeliveryError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("unexpected error {other:?}"),
    }
    // The first batch landed before retries ran out.
    assert_eq!(target.stored().await, vec!["1", "2"]);
}

// ============================================================================
// Replace
// ============================================================================

#[tokio::test]
async fn test_replace_on_non_removable_target_writes_nothing() {
    let target = Arc::new(ScriptedTarget::new(2, vec![]).without_removal());
    target.preload(&["old"]).await;
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    let err = engine.replace(&records(&["1"]), None).await.unwrap_err();

    assert!(matches!(err, DeliveryError::RemovalUnsupported));
    assert_eq!(target.write_count().await, 0);
    assert_eq!(target.stored().await, vec!["old"]);
}

#[tokio::test]
async fn test_replace_clears_existing_contents_first() {
    let target = Arc::new(ScriptedTarget::new(10, vec![]));
    target.preload(&["old-1", "old-2"]).await;
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.replace(&records(&["1", "2"]), None).await.unwrap();

    assert_eq!(target.stored().await, vec!["1", "2"]);
}

// ============================================================================
// Concrete targets
// ============================================================================

struct FakeDeliveryCatalog {
    playlist: Mutex<Vec<String>>,
    queue: Mutex<Vec<String>>,
    devices: Vec<Device>,
}

impl FakeDeliveryCatalog {
    fn new(devices: Vec<Device>) -> Self {
        Self {
            playlist: Mutex::new(Vec::new()),
            queue: Mutex::new(Vec::new()),
            devices,
        }
    }
}

#[async_trait]
impl CatalogClient for FakeDeliveryCatalog {
    async fn playlist_items(
        &self,
        _playlist_id: &str,
        _limit: u32,
        _cursor: Option<Cursor>,
    ) -> core_catalog::Result<Page<RawItem>> {
        Err(CatalogError::NotAvailable("playlist_items".to_string()))
    }

    async fn album_tracks(
        &self,
        _album_id: &str,
        _limit: u32,
        _cursor: Option<Cursor>,
    ) -> core_catalog::Result<Page<RawItem>> {
        Err(CatalogError::NotAvailable("album_tracks".to_string()))
    }

    async fn saved_tracks(
        &self,
        _limit: u32,
        _cursor: Option<Cursor>,
    ) -> core_catalog::Result<Page<RawItem>> {
        Err(CatalogError::NotAvailable("saved_tracks".to_string()))
    }

    async fn recently_played(
        &self,
        _limit: u32,
        _before: Option<String>,
    ) -> core_catalog::Result<Page<RawItem>> {
        Err(CatalogError::NotAvailable("recently_played".to_string()))
    }

    async fn search_tracks(&self, _query: &str, _limit: u32) -> core_catalog::Result<Vec<Record>> {
        Err(CatalogError::NotAvailable("search_tracks".to_string()))
    }

    async fn add_playlist_items(
        &self,
        _playlist_id: &str,
        uris: &[String],
    ) -> core_catalog::Result<()> {
        self.playlist.lock().await.extend(uris.iter().cloned());
        Ok(())
    }

    async fn remove_playlist_range(
        &self,
        _playlist_id: &str,
        start: u32,
        len: u32,
    ) -> core_catalog::Result<()> {
        let mut playlist = self.playlist.lock().await;
        playlist.drain(start as usize..(start + len) as usize);
        Ok(())
    }

    async fn playlist_item_ids(&self, _playlist_id: &str) -> core_catalog::Result<Vec<String>> {
        Ok(self.playlist.lock().await.clone())
    }

    async fn enqueue(&self, uri: &str, _device_id: Option<&str>) -> core_catalog::Result<()> {
        self.queue.lock().await.push(uri.to_string());
        Ok(())
    }

    async fn queue_item_ids(&self) -> core_catalog::Result<Vec<String>> {
        Ok(self.queue.lock().await.clone())
    }

    async fn list_devices(&self) -> core_catalog::Result<Vec<Device>> {
        Ok(self.devices.clone())
    }
}

#[tokio::test]
async fn test_playlist_target_appends_and_replaces() {
    let catalog = Arc::new(FakeDeliveryCatalog::new(vec![]));
    let target = Arc::new(PlaylistTarget::new(
        Arc::clone(&catalog) as Arc<dyn CatalogClient>,
        "playlist-1",
    ));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&records(&["1", "2"]), None).await.unwrap();
    assert_eq!(
        *catalog.playlist.lock().await,
        vec!["catalog:track:1", "catalog:track:2"]
    );

    engine.replace(&records(&["3"]), None).await.unwrap();
    assert_eq!(*catalog.playlist.lock().await, vec!["catalog:track:3"]);
}

#[tokio::test]
async fn test_queue_target_enqueues_one_item_per_write() {
    let catalog = Arc::new(FakeDeliveryCatalog::new(vec![]));
    let target = Arc::new(QueueTarget::new(
        Arc::clone(&catalog) as Arc<dyn CatalogClient>,
        None,
    ));
    assert_eq!(target.max_batch(), 1);
    assert!(!target.supports_removal());

    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());
    engine.append(&records(&["1", "2"]), None).await.unwrap();
    assert_eq!(
        *catalog.queue.lock().await,
        vec!["catalog:track:1", "catalog:track:2"]
    );

    let err = engine.replace(&records(&["3"]), None).await.unwrap_err();
    assert!(matches!(err, DeliveryError::RemovalUnsupported));
}

#[tokio::test]
async fn test_queue_target_resolves_active_device() {
    let catalog = Arc::new(FakeDeliveryCatalog::new(vec![
        Device {
            id: "idle".to_string(),
            name: "Idle speaker".to_string(),
            is_active: false,
        },
        Device {
            id: "active".to_string(),
            name: "Living room".to_string(),
            is_active: true,
        },
    ]));
    QueueTarget::for_active_device(Arc::clone(&catalog) as Arc<dyn CatalogClient>)
        .await
        .unwrap();

    let none_active = Arc::new(FakeDeliveryCatalog::new(vec![]));
    let result = QueueTarget::for_active_device(none_active as Arc<dyn CatalogClient>).await;
    assert!(matches!(result.err(), Some(DeliveryError::NoActiveDevice)));
}

#[tokio::test(start_paused = true)]
async fn test_file_target_failed_persist_leaves_state_unchanged() {
    // Unwritable path: the write must fail, and current_ids must not claim
    // the batch was accepted, so the engine retries instead of dropping it.
    let path = std::path::Path::new("/nonexistent-medley-dir").join("out.json");
    let target = Arc::new(FileTarget::new(&path));

    let err = target.write(&records(&["1"])).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Io(_)));
    assert!(target.current_ids().await.unwrap().is_empty());

    let engine = DeliveryEngine::new(
        Arc::clone(&target) as Arc<dyn DeliveryTarget>,
        DeliveryConfig::default().with_max_retries(1),
    );
    let err = engine.append(&records(&["1", "2"]), None).await.unwrap_err();
    assert!(matches!(err, DeliveryError::RetriesExhausted { .. }));
    assert!(tokio::fs::metadata(&path).await.is_err());
}

#[tokio::test]
async fn test_file_target_persists_delivered_records() {
    let path = std::env::temp_dir().join(format!(
        "medley-delivery-test-{}.json",
        std::process::id()
    ));
    let target = Arc::new(FileTarget::new(&path));
    let engine = DeliveryEngine::new(Arc::clone(&target) as Arc<dyn DeliveryTarget>, DeliveryConfig::default());

    engine.append(&records(&["1", "2"]), None).await.unwrap();

    let written = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed: Vec<Record> = serde_json::from_str(&written).unwrap();
    let ids: Vec<_> = parsed.iter().map(Record::delivery_id).collect();
    assert_eq!(ids, vec!["1", "2"]);

    engine.replace(&records(&["3"]), None).await.unwrap();
    assert_eq!(target.current_ids().await.unwrap(), vec!["3"]);

    tokio::fs::remove_file(&path).await.unwrap();
}
