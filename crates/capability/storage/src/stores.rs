//! 存储句柄集合，供会话、下发与轮询共享。

use crate::postgres::{PgAllowListStore, PgCommandCatalogStore, PgDeviceStore, PgMessageStore};
use crate::traits::{
    AllowListStore, CommandCatalogStore, DeviceStatusStore, HeartbeatStore, MessageStore,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct PanelStores {
    pub allow_list: Arc<dyn AllowListStore>,
    pub heartbeat: Arc<dyn HeartbeatStore>,
    pub devices: Arc<dyn DeviceStatusStore>,
    pub messages: Arc<dyn MessageStore>,
    pub commands: Arc<dyn CommandCatalogStore>,
}

impl PanelStores {
    /// 基于同一个连接池构建全部 Postgres 存储。
    pub fn postgres(pool: PgPool) -> Self {
        let allow_list = Arc::new(PgAllowListStore::new(pool.clone()));
        Self {
            allow_list: allow_list.clone(),
            heartbeat: allow_list,
            devices: Arc::new(PgDeviceStore::new(pool.clone())),
            messages: Arc::new(PgMessageStore::new(pool.clone())),
            commands: Arc::new(PgCommandCatalogStore::new(pool)),
        }
    }
}
