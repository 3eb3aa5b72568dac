use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::{CredentialStore, PgCredentialStore};
use crate::services::{AccountService, SessionManager, TokenSettings};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub sessions: SessionManager,
    pub accounts: AccountService,
}

impl AppState {
    /// Wires the services over the PostgreSQL credential store.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
        Self::with_store(pool, config, store)
    }

    /// Wires the services over an arbitrary credential store.
    pub fn with_store(pool: PgPool, config: Config, store: Arc<dyn CredentialStore>) -> Self {
        let sessions = SessionManager::new(store.clone(), TokenSettings::from(&config));
        let accounts = AccountService::new(store, sessions.clone());
        Self {
            pool,
            config,
            sessions,
            accounts,
        }
    }
}
