//! Dashboard snapshot cache.
//!
//! Snapshots are tagged with the cache generation read when their refresh
//! started. Any change event bumps the generation, so a refresh that started
//! before a mutation can never overwrite the newer state.

use crate::{
    core::{
        changes::{ChangeFeed, Table},
        dashboard::{self, EvolutionPoint, PeriodSummary},
        period::DateRange,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info, trace};

/// Tables whose mutations make a dashboard snapshot stale
pub const WATCHED_TABLES: [Table; 6] = [
    Table::Membres,
    Table::Cotisations,
    Table::Epargnes,
    Table::Prets,
    Table::Sanctions,
    Table::Tontine,
];

/// Parameters a snapshot was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotKey {
    /// Period of the summary and rankings
    pub range: DateRange,
    /// Last month of the evolution chart
    pub reference: NaiveDate,
    /// Size of the top contributors list
    pub top: usize,
}

/// Everything the dashboard screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Twelve-month evolution
    pub evolution: Vec<EvolutionPoint>,
    /// Headline figures
    pub summary: PeriodSummary,
    /// Best contributors `(membre_id, total)`
    pub top_contributors: Vec<(i64, f64)>,
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    key: SnapshotKey,
    snapshot: Arc<DashboardSnapshot>,
}

/// Cache of the latest dashboard snapshot
#[derive(Debug, Default)]
pub struct DashboardCache {
    generation: AtomicU64,
    entry: RwLock<Option<Entry>>,
}

impl DashboardCache {
    /// Creates an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drops the snapshot and makes in-flight refreshes stale.
    pub async fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.entry.write().await = None;
        debug!("Dashboard cache invalidated, generation {generation}");
    }

    /// Snapshot for `key` if one is cached for the current generation
    pub async fn get(&self, key: SnapshotKey) -> Option<Arc<DashboardSnapshot>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.key == key && e.generation == self.generation())
            .map(|e| Arc::clone(&e.snapshot))
    }

    /// Stores a snapshot computed from data read at `generation`.
    ///
    /// Returns `false` and discards the snapshot when the cache was
    /// invalidated since.
    pub async fn store(
        &self,
        generation: u64,
        key: SnapshotKey,
        snapshot: Arc<DashboardSnapshot>,
    ) -> bool {
        let mut entry = self.entry.write().await;
        if generation != self.generation() {
            trace!("Discarding dashboard snapshot of stale generation {generation}");
            return false;
        }
        *entry = Some(Entry {
            generation,
            key,
            snapshot,
        });
        true
    }

    /// Returns the cached snapshot or computes and caches a fresh one.
    pub async fn get_or_refresh(
        &self,
        db: &DatabaseConnection,
        key: SnapshotKey,
    ) -> Result<Arc<DashboardSnapshot>> {
        if let Some(snapshot) = self.get(key).await {
            trace!("Dashboard cache hit");
            return Ok(snapshot);
        }

        let generation = self.generation();
        info!("Refreshing dashboard snapshot...");
        let snapshot = Arc::new(DashboardSnapshot {
            evolution: dashboard::evolution_mensuelle(db, key.reference).await?,
            summary: dashboard::period_summary(db, key.range).await?,
            top_contributors: dashboard::top_contributors(db, key.range, key.top).await?,
        });
        self.store(generation, key, Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    /// Invalidates the cache on every watched change until the feed closes.
    pub fn watch(self: Arc<Self>, feed: &ChangeFeed) -> JoinHandle<()> {
        let mut subscription = feed.subscribe(&WATCHED_TABLES);
        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                trace!("Dashboard cache saw {event:?}");
                self.invalidate().await;
            }
            debug!("Change feed closed, dashboard cache watcher stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::changes::ChangeKind, test_utils::*};

    fn key() -> SnapshotKey {
        SnapshotKey {
            range: DateRange::month(2024, 6).unwrap(),
            reference: date(2024, 6, 30),
            top: 5,
        }
    }

    #[tokio::test]
    async fn test_refresh_then_hit() -> Result<()> {
        let (db, membre, cot_type) = setup_with_membre_and_type().await?;
        create_test_cotisation(&db, membre.id, cot_type.id, 5_000.0, date(2024, 6, 3)).await?;
        let cache = DashboardCache::new();

        let first = cache.get_or_refresh(&db, key()).await?;
        assert_eq!(first.summary.cotisations.total, 5_000.0);

        // Served from the cache: the new row is not seen until invalidation
        create_test_cotisation(&db, membre.id, cot_type.id, 1_000.0, date(2024, 6, 4)).await?;
        let second = cache.get_or_refresh(&db, key()).await?;
        assert!(Arc::ptr_eq(&first, &second));

        cache.invalidate().await;
        let third = cache.get_or_refresh(&db, key()).await?;
        assert_eq!(third.summary.cotisations.total, 6_000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() -> Result<()> {
        let db = setup_test_db().await?;
        let cache = DashboardCache::new();
        let snapshot = Arc::new(DashboardSnapshot {
            evolution: dashboard::evolution_mensuelle(&db, date(2024, 6, 30)).await?,
            summary: dashboard::period_summary(&db, key().range).await?,
            top_contributors: Vec::new(),
        });

        let started_at = cache.generation();
        cache.invalidate().await;
        assert!(!cache.store(started_at, key(), Arc::clone(&snapshot)).await);
        assert!(cache.get(key()).await.is_none());

        assert!(cache.store(cache.generation(), key(), snapshot).await);
        assert!(cache.get(key()).await.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_other_key_misses() -> Result<()> {
        let db = setup_test_db().await?;
        let cache = DashboardCache::new();
        cache.get_or_refresh(&db, key()).await?;
        let other = SnapshotKey { top: 3, ..key() };
        assert!(cache.get(other).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_watch_invalidates_on_change() -> Result<()> {
        let db = setup_test_db().await?;
        let cache = Arc::new(DashboardCache::new());
        let feed = ChangeFeed::default();
        let handle = Arc::clone(&cache).watch(&feed);

        cache.get_or_refresh(&db, key()).await?;
        feed.publish(Table::Cotisations, ChangeKind::Insert);
        drop(feed);
        handle.await.unwrap();

        assert_eq!(cache.generation(), 1);
        assert!(cache.get(key()).await.is_none());
        Ok(())
    }
}
