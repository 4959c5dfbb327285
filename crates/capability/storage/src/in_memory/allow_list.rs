//! 白名单内存实现

use crate::error::StorageError;
use crate::models::{AllowedClientRecord, HeartbeatTarget};
use crate::traits::{AllowListStore, HeartbeatStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// 白名单内存存储
pub struct InMemoryAllowListStore {
    clients: RwLock<HashMap<String, AllowedClientRecord>>,
}

impl InMemoryAllowListStore {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// 以给定条目初始化
    pub fn with_clients(records: Vec<AllowedClientRecord>) -> Self {
        let clients = records
            .into_iter()
            .map(|record| (record.client_id.clone(), record))
            .collect();
        Self {
            clients: RwLock::new(clients),
        }
    }

    pub fn insert(&self, record: AllowedClientRecord) -> Result<(), StorageError> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        clients.insert(record.client_id.clone(), record);
        Ok(())
    }
}

impl Default for InMemoryAllowListStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AllowListStore for InMemoryAllowListStore {
    async fn is_allowed(&self, client_id: &str) -> Result<bool, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(clients.contains_key(client_id))
    }

    async fn find_description(&self, client_id: &str) -> Result<Option<String>, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(clients
            .get(client_id)
            .and_then(|record| record.description.clone()))
    }
}

#[async_trait::async_trait]
impl HeartbeatStore for InMemoryAllowListStore {
    async fn expected_reply(&self, client_id: &str) -> Result<Option<String>, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(clients
            .get(client_id)
            .filter(|record| record.alive_enabled)
            .and_then(|record| record.alive_expected_response.clone()))
    }

    async fn list_probe_targets(&self) -> Result<Vec<HeartbeatTarget>, StorageError> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut targets: Vec<HeartbeatTarget> = clients
            .values()
            .filter(|record| record.alive_enabled)
            .filter_map(|record| {
                record.alive_command_id.map(|command_id| HeartbeatTarget {
                    client_id: record.client_id.clone(),
                    command_id,
                })
            })
            .collect();
        targets.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(targets)
    }
}
