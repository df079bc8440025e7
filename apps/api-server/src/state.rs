//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use music_store::MusicStore;

use crate::config::Config;
use crate::services::media::MediaService;

/// Shared application state.
pub struct AppState<S: MusicStore> {
    /// Server configuration.
    pub config: Config,
    /// Backing store.
    pub store: S,
    /// JWT manager.
    pub jwt_manager: JwtManager,
    /// Media file service.
    pub media: MediaService,
}

impl<S: MusicStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        let media = MediaService::new(config.media_root.clone());
        Self {
            config,
            store,
            jwt_manager,
            media,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config, store, and JWT manager.
pub fn create_shared_state<S: MusicStore>(
    config: Config,
    store: S,
    jwt_manager: JwtManager,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, jwt_manager))
}
