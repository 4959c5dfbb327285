//! Postgres 设备状态实现（`clients`）
//!
//! 设计要点：
//! - 握手成功为 upsert，最后写入者覆盖 ip/port
//! - 关闭会话为单条多列 update（status、last_seen、alive_status）
//! - 心跳状态更新只作用于已存在的设备记录

use crate::error::StorageError;
use crate::models::DeviceRecord;
use crate::postgres::parse_column;
use crate::traits::DeviceStatusStore;
use domain::{AliveStatus, ConnectionStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const DEVICE_COLUMNS: &str = "client_id, host(ip) as ip, port, status, \
     (extract(epoch from connected_at) * 1000)::bigint as connected_at_ms, \
     (extract(epoch from last_seen) * 1000)::bigint as last_seen_at_ms, \
     alive_status";

pub struct PgDeviceStore {
    pub pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn device_from_row(row: &PgRow) -> Result<DeviceRecord, StorageError> {
    Ok(DeviceRecord {
        client_id: row.try_get("client_id")?,
        ip: row.try_get("ip")?,
        port: row.try_get("port")?,
        status: parse_column::<ConnectionStatus>("status", row.try_get("status")?)?,
        connected_at_ms: row.try_get("connected_at_ms")?,
        last_seen_at_ms: row.try_get("last_seen_at_ms")?,
        alive_status: parse_column::<AliveStatus>("alive_status", row.try_get("alive_status")?)?,
    })
}

#[async_trait::async_trait]
impl DeviceStatusStore for PgDeviceStore {
    async fn mark_connected(
        &self,
        client_id: &str,
        ip: &str,
        port: i32,
        ts_ms: i64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "insert into clients (client_id, ip, port, status, connected_at, last_seen) \
             values ($1, $2::inet, $3, $4, to_timestamp($5 / 1000.0), to_timestamp($5 / 1000.0)) \
             on conflict (client_id) do update \
             set ip = excluded.ip, \
                 port = excluded.port, \
                 status = excluded.status, \
                 connected_at = excluded.connected_at, \
                 last_seen = excluded.last_seen",
        )
        .bind(client_id)
        .bind(ip)
        .bind(port)
        .bind(ConnectionStatus::Connected.as_str())
        .bind(ts_ms as f64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_disconnected(&self, client_id: &str, ts_ms: i64) -> Result<(), StorageError> {
        sqlx::query(
            "update clients \
             set status = $2, last_seen = to_timestamp($3 / 1000.0), alive_status = null \
             where client_id = $1",
        )
        .bind(client_id)
        .bind(ConnectionStatus::Disconnected.as_str())
        .bind(ts_ms as f64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_alive_status(
        &self,
        client_id: &str,
        status: AliveStatus,
    ) -> Result<(), StorageError> {
        sqlx::query("update clients set alive_status = $2 where client_id = $1")
            .bind(client_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_device(&self, client_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let sql = format!("select {} from clients where client_id = $1", DEVICE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(device_from_row).transpose()
    }

    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, StorageError> {
        let sql = format!("select {} from clients order by client_id", DEVICE_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(device_from_row).collect()
    }
}
