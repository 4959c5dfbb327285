//! 数据库连接管理
//!
//! - connect_pool：建立 Postgres 连接池
//!
//! 连接池是会话任务、轮询任务与外部 API 之间唯一共享的资源，
//! 每次查询只做短暂借用。

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `max_connections`：最大连接数（默认配置为 8）
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    Ok(pool)
}
