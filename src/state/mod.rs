use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::RwLock;

use crate::{
    dao::{game_store::GameStore, image_store::ImageStore},
    error::ServiceError,
};

/// Handle to [`AppState`] shared by every handler and task.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage and image hosting handles.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    image_store: Arc<dyn ImageStore>,
    degraded: AtomicBool,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(image_store: Arc<dyn ImageStore>) -> SharedState {
        Arc::new(Self {
            game_store: RwLock::new(None),
            image_store,
            degraded: AtomicBool::new(true),
        })
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Game store usable for a request, or [`ServiceError::Degraded`] while storage is down.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Image hosting client.
    pub fn image_store(&self) -> Arc<dyn ImageStore> {
        self.image_store.clone()
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Flip the degraded flag, returning the previous value.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.swap(value, Ordering::AcqRel)
    }
}
