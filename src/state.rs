use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
    notify::{NoopNotifier, Notifier},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            notifier,
            config: Arc::new(config),
        }
    }

    /// State without a push channel; order events are dropped.
    pub fn without_notifications(pool: DbPool, config: AppConfig) -> Self {
        Self::new(pool, config, Arc::new(NoopNotifier))
    }
}
