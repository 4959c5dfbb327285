//! # PostgreSQL 存储实现模块
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 使用参数绑定（`$1`, `$2` 等）
//! 2. **毫秒时间戳**：模型统一使用 epoch 毫秒，写入时 `to_timestamp($n / 1000.0)`，
//!    读取时 `(extract(epoch from col) * 1000)::bigint`
//! 3. **地址列**：`ip` 为 `inet`，写入 `$n::inet`，读取 `host(ip)`
//! 4. **单语句更新**：关闭会话时的多列更新在一条语句中完成
//!
//! ## 包含的实现
//!
//! - **PgAllowListStore** (`allow_list.rs`)：白名单与心跳配置
//! - **PgDeviceStore** (`device.rs`)：设备连接/心跳状态
//! - **PgMessageStore** (`message.rs`)：消息流水
//! - **PgCommandCatalogStore** (`command.rs`)：命令目录与兼容关系

pub mod allow_list;
pub mod command;
pub mod device;
pub mod message;

pub use allow_list::*;
pub use command::*;
pub use device::*;
pub use message::*;

use crate::error::StorageError;
use std::str::FromStr;

/// 将可空文本列解析为领域枚举。
pub(crate) fn parse_column<T>(column: &str, value: Option<String>) -> Result<Option<T>, StorageError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|err| StorageError::invalid_column(column, err)),
        None => Ok(None),
    }
}

/// `limit <= 0` 映射为 SQL `limit null`（不限制）。
pub(crate) fn sql_limit(limit: i64) -> Option<i64> {
    if limit > 0 { Some(limit) } else { None }
}
