//! 设备状态内存实现
//!
//! 与 Postgres 语义一致：`mark_connected` 为 upsert，
//! 其余更新只作用于已存在的记录。

use crate::error::StorageError;
use crate::models::DeviceRecord;
use crate::traits::DeviceStatusStore;
use domain::{AliveStatus, ConnectionStatus};
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备状态内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, DeviceRecord>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceStatusStore for InMemoryDeviceStore {
    async fn mark_connected(
        &self,
        client_id: &str,
        ip: &str,
        port: i32,
        ts_ms: i64,
    ) -> Result<(), StorageError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = devices
            .entry(client_id.to_string())
            .or_insert_with(|| DeviceRecord {
                client_id: client_id.to_string(),
                ip: None,
                port: None,
                status: None,
                connected_at_ms: None,
                last_seen_at_ms: None,
                alive_status: None,
            });
        record.ip = Some(ip.to_string());
        record.port = Some(port);
        record.status = Some(ConnectionStatus::Connected);
        record.connected_at_ms = Some(ts_ms);
        record.last_seen_at_ms = Some(ts_ms);
        Ok(())
    }

    async fn mark_disconnected(&self, client_id: &str, ts_ms: i64) -> Result<(), StorageError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(record) = devices.get_mut(client_id) {
            record.status = Some(ConnectionStatus::Disconnected);
            record.last_seen_at_ms = Some(ts_ms);
            record.alive_status = None;
        }
        Ok(())
    }

    async fn set_alive_status(
        &self,
        client_id: &str,
        status: AliveStatus,
    ) -> Result<(), StorageError> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(record) = devices.get_mut(client_id) {
            record.alive_status = Some(status);
        }
        Ok(())
    }

    async fn find_device(&self, client_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(devices.get(client_id).cloned())
    }

    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, StorageError> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<DeviceRecord> = devices.values().cloned().collect();
        items.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(items)
    }
}
