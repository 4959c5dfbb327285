//! Postgres 命令目录实现（`tcp_commands` / `client_commands`）

use crate::error::StorageError;
use crate::traits::CommandCatalogStore;
use domain::CommandDefinition;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgCommandCatalogStore {
    pub pool: PgPool,
}

impl PgCommandCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn command_from_row(row: &PgRow) -> Result<CommandDefinition, StorageError> {
    Ok(CommandDefinition {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        payload: row.try_get("payload")?,
        encoding: row.try_get("encoding")?,
        append_null: row.try_get("append_null")?,
        append_cr: row.try_get("append_cr")?,
        append_lf: row.try_get("append_lf")?,
        admin_only: row.try_get("admin_only")?,
        enabled: row.try_get("enabled")?,
    })
}

#[async_trait::async_trait]
impl CommandCatalogStore for PgCommandCatalogStore {
    async fn find_enabled_command(
        &self,
        command_id: i32,
    ) -> Result<Option<CommandDefinition>, StorageError> {
        let row = sqlx::query(
            "select id, name, description, payload, encoding, \
             coalesce(append_null, false) as append_null, \
             coalesce(append_cr, false) as append_cr, \
             coalesce(append_lf, false) as append_lf, \
             coalesce(admin_only, false) as admin_only, \
             coalesce(enabled, false) as enabled \
             from tcp_commands where id = $1 and enabled = true",
        )
        .bind(command_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(command_from_row).transpose()
    }

    async fn is_command_supported(
        &self,
        client_id: &str,
        command_id: i32,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query(
            "select 1 from client_commands \
             where client_id = $1 and command_id = $2 and enabled = true",
        )
        .bind(client_id)
        .bind(command_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn list_device_commands(
        &self,
        client_id: &str,
    ) -> Result<Vec<CommandDefinition>, StorageError> {
        let rows = sqlx::query(
            "select c.id, c.name, c.description, c.payload, c.encoding, \
             coalesce(c.append_null, false) as append_null, \
             coalesce(c.append_cr, false) as append_cr, \
             coalesce(c.append_lf, false) as append_lf, \
             coalesce(c.admin_only, false) as admin_only, \
             coalesce(c.enabled, false) as enabled \
             from tcp_commands c \
             join client_commands cc on cc.command_id = c.id \
             where cc.client_id = $1 and cc.enabled = true and c.enabled = true \
             order by c.name",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(command_from_row).collect()
    }
}
