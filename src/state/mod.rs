pub mod clock;
pub mod quiz;
pub mod ranking;
pub mod registry;
pub mod scoring;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::quiz_store::QuizStore, error::ServiceError};

pub use self::registry::{SubscriptionRegistry, Topic};

pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and push subscriptions.
pub struct AppState {
    quiz_store: RwLock<Option<Arc<dyn QuizStore>>>,
    registry: SubscriptionRegistry,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            quiz_store: RwLock::new(None),
            registry: SubscriptionRegistry::new(config.topic_capacity()),
            degraded: degraded_tx,
            config,
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn QuizStore>) -> SharedState {
        let state = Self::new(config);
        state.install_quiz_store(store).await;
        state
    }

    /// Obtain a handle to the current quiz store, if one is installed.
    pub async fn quiz_store(&self) -> Option<Arc<dyn QuizStore>> {
        let guard = self.quiz_store.read().await;
        guard.as_ref().cloned()
    }

    /// Quiz store handle, or [`ServiceError::Degraded`] while none is installed or
    /// the supervisor has flagged the backend as unhealthy.
    pub async fn require_quiz_store(&self) -> Result<Arc<dyn QuizStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.quiz_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new quiz store implementation and leave degraded mode.
    pub async fn install_quiz_store(&self, store: Arc<dyn QuizStore>) {
        {
            let mut guard = self.quiz_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Topic registry shared by the SSE and WebSocket transports.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
