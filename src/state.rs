use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::users::{dto::User, repo::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<UserStore>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = UserStore::load_seed(&config.seed_path).await?;
        tracing::info!(users = store.len(), next_seq = store.next_seq(), "store ready");
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: UserStore, config: Arc<AppConfig>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config,
        }
    }

    pub fn with_users(seed: Vec<User>) -> Self {
        Self::from_parts(UserStore::init(seed), Arc::new(AppConfig::default()))
    }

    /// Empty store, default config.
    pub fn fake() -> Self {
        Self::with_users(Vec::new())
    }
}
