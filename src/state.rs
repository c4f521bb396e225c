use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
    notify::{LogOtpSender, LogPushSender, OtpSender, PushSender},
    realtime::EventHub,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub events: EventHub,
    pub push: Arc<dyn PushSender>,
    pub otp: Arc<dyn OtpSender>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = orm_from_pool(pool.clone());
        let events = EventHub::new(config.event_channel_capacity);
        Self {
            pool,
            orm,
            config: Arc::new(config),
            events,
            push: Arc::new(LogPushSender),
            otp: Arc::new(LogOtpSender),
        }
    }
}
