use crate::error::AppError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use stagewise_core::config::Config;
use stagewise_core::store::Store;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    store: Arc<Mutex<Store>>,
    /// Pins "today" for every derived view; `None` means the local date.
    today: Option<NaiveDate>,
}

impl AppState {
    /// Load `.stagewise/config.yaml` (defaults when absent) and open its data
    /// file, creating and seeding it on first use.
    pub fn open(root: &Path) -> stagewise_core::Result<Self> {
        let config = Config::load_or_default(root)?;
        let store = Store::open(&config.data_path(root))?;
        tracing::debug!(path = %config.data_path(root).display(), "opened data file");
        Ok(Self::from_store(root.to_path_buf(), config, store))
    }

    pub fn from_store(root: PathBuf, config: Config, store: Store) -> Self {
        Self {
            root,
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn now(&self) -> NaiveDateTime {
        match self.today {
            Some(day) => day.and_time(NaiveTime::MIN),
            None => Local::now().naive_local(),
        }
    }

    /// Run `f` against the store on the blocking pool. Store access is
    /// serialized by the mutex, so each call is one read-modify-write.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Store) -> stagewise_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
            f(&mut guard).map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        .map_err(AppError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_today_drives_now() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let state = AppState::from_store(PathBuf::from("/tmp/test"), Config::default(), Store::in_memory())
            .with_today(day);
        assert_eq!(state.today(), day);
        assert_eq!(state.now().date(), day);
        assert_eq!(state.root, PathBuf::from("/tmp/test"));
    }

    #[test]
    fn open_seeds_data_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::open(dir.path()).unwrap();
        assert!(dir.path().join(".stagewise/data.json").exists());
        assert_eq!(state.config.server.port, 5001);
    }

    #[tokio::test]
    async fn with_store_maps_core_errors() {
        let state = AppState::from_store(PathBuf::from("."), Config::default(), Store::in_memory());
        let err = state
            .with_store(|store| store.project_view(9))
            .await
            .unwrap_err();
        assert!(err.0.to_string().contains("project not found"));
    }
}
