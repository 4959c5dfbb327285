//! Postgres 消息流水实现（`messages`）

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::postgres::{parse_column, sql_limit};
use crate::traits::MessageStore;
use domain::MessageDirection;
use sqlx::{PgPool, Row};

pub struct PgMessageStore {
    pub pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageStore for PgMessageStore {
    async fn append_message(&self, record: MessageRecord) -> Result<(), StorageError> {
        sqlx::query(
            "insert into messages \
             (client_id, timestamp, direction, message, remote_ip, remote_port) \
             values ($1, to_timestamp($2 / 1000.0), $3, $4, $5::inet, $6)",
        )
        .bind(&record.client_id)
        .bind(record.ts_ms as f64)
        .bind(record.direction.as_str())
        .bind(&record.message)
        .bind(&record.remote_ip)
        .bind(record.remote_port)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_messages(
        &self,
        client_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let rows = sqlx::query(
            "select client_id, direction, message, host(remote_ip) as remote_ip, remote_port, \
             (extract(epoch from timestamp) * 1000)::bigint as ts_ms \
             from messages \
             where ($1::text is null or client_id = $1) \
             order by timestamp desc, id desc \
             limit $2",
        )
        .bind(client_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let direction = parse_column::<MessageDirection>("direction", row.try_get("direction")?)?
                .ok_or_else(|| StorageError::invalid_column("direction", "null"))?;
            items.push(MessageRecord {
                client_id: row
                    .try_get::<Option<String>, _>("client_id")?
                    .unwrap_or_default(),
                direction,
                ts_ms: row.try_get("ts_ms")?,
                message: row.try_get("message")?,
                remote_ip: row.try_get("remote_ip")?,
                remote_port: row.try_get("remote_port")?,
            });
        }
        Ok(items)
    }
}
