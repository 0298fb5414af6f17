use summerjob_core::event::SummerJobEvent;
use summerjob_db::{Database, DbError};
use tokio::sync::RwLock;

/// Memoised lookup of the active event.
///
/// The outer `Option` tracks whether the value has been loaded; the inner one
/// is the lookup result, so "no active event" is cached too.
#[derive(Default)]
pub struct ActiveEventCache {
    slot: RwLock<Option<Option<SummerJobEvent>>>,
}

impl ActiveEventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, db: &dyn Database) -> Result<Option<SummerJobEvent>, DbError> {
        if let Some(cached) = self.slot.read().await.as_ref() {
            return Ok(cached.clone());
        }
        let mut slot = self.slot.write().await;
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.clone());
        }
        let loaded = db.get_active_event().await?;
        *slot = Some(loaded.clone());
        Ok(loaded)
    }

    /// Replace the cached value after the active event changed.
    pub async fn set(&self, event: Option<SummerJobEvent>) {
        *self.slot.write().await = Some(event);
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use summerjob_core::event::CreateEvent;
    use summerjob_db::SqliteDatabase;

    use super::*;

    fn event(name: &str) -> CreateEvent {
        CreateEvent {
            name: name.into(),
            start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 7).unwrap(),
        }
    }

    #[tokio::test]
    async fn caches_until_invalidated() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let cache = ActiveEventCache::new();
        assert!(cache.get(&db).await.unwrap().is_none());

        let created = db.create_event(&event("2026")).await.unwrap();
        db.activate_event(&created.id).await.unwrap();
        // Still the memoised "none".
        assert!(cache.get(&db).await.unwrap().is_none());

        cache.invalidate().await;
        assert_eq!(cache.get(&db).await.unwrap().unwrap().id, created.id);
    }

    #[tokio::test]
    async fn set_overrides_cached_value() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let cache = ActiveEventCache::new();
        assert!(cache.get(&db).await.unwrap().is_none());

        let created = db.create_event(&event("2026")).await.unwrap();
        let active = db.activate_event(&created.id).await.unwrap();
        cache.set(Some(active.clone())).await;
        assert_eq!(cache.get(&db).await.unwrap(), Some(active));
    }
}
