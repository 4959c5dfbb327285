//! Postgres 白名单与心跳配置实现（`allowed_clients`）

use crate::error::StorageError;
use crate::models::HeartbeatTarget;
use crate::traits::{AllowListStore, HeartbeatStore};
use sqlx::{PgPool, Row};

pub struct PgAllowListStore {
    pub pool: PgPool,
}

impl PgAllowListStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AllowListStore for PgAllowListStore {
    async fn is_allowed(&self, client_id: &str) -> Result<bool, StorageError> {
        let row = sqlx::query("select 1 from allowed_clients where client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn find_description(&self, client_id: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("select description from allowed_clients where client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(row.try_get("description")?)
    }
}

#[async_trait::async_trait]
impl HeartbeatStore for PgAllowListStore {
    async fn expected_reply(&self, client_id: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            "select alive_expected_response from allowed_clients \
             where client_id = $1 and alive_enabled = true",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(row.try_get("alive_expected_response")?)
    }

    async fn list_probe_targets(&self) -> Result<Vec<HeartbeatTarget>, StorageError> {
        let rows = sqlx::query(
            "select ac.client_id, ac.alive_command_id \
             from allowed_clients ac \
             join clients c on c.client_id = ac.client_id \
             where ac.alive_enabled = true and ac.alive_command_id is not null \
             order by ac.client_id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut targets = Vec::with_capacity(rows.len());
        for row in rows {
            targets.push(HeartbeatTarget {
                client_id: row.try_get("client_id")?,
                command_id: row.try_get("alive_command_id")?,
            });
        }
        Ok(targets)
    }
}
