//! 存储接口 Trait 定义
//!
//! - AllowListStore：白名单查询
//! - HeartbeatStore：心跳配置查询
//! - DeviceStatusStore：设备连接/心跳状态读写
//! - MessageStore：消息追加与查询
//! - CommandCatalogStore：命令目录与设备兼容关系查询
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{DeviceRecord, HeartbeatTarget, MessageRecord};
use async_trait::async_trait;
use domain::{AliveStatus, CommandDefinition};

/// 白名单接口
#[async_trait]
pub trait AllowListStore: Send + Sync {
    /// 标识是否在白名单中
    async fn is_allowed(&self, client_id: &str) -> Result<bool, StorageError>;

    /// 白名单中的设备描述
    async fn find_description(&self, client_id: &str) -> Result<Option<String>, StorageError>;
}

/// 心跳配置接口
#[async_trait]
pub trait HeartbeatStore: Send + Sync {
    /// 期望的心跳回复；设备未启用心跳检查时返回 `None`
    async fn expected_reply(&self, client_id: &str) -> Result<Option<String>, StorageError>;

    /// 启用心跳且配置了探测命令的设备
    async fn list_probe_targets(&self) -> Result<Vec<HeartbeatTarget>, StorageError>;
}

/// 设备状态接口
#[async_trait]
pub trait DeviceStatusStore: Send + Sync {
    /// 握手成功：upsert 为 connected，刷新 connected_at/last_seen，覆盖 ip/port
    async fn mark_connected(
        &self,
        client_id: &str,
        ip: &str,
        port: i32,
        ts_ms: i64,
    ) -> Result<(), StorageError>;

    /// 会话关闭：disconnected，刷新 last_seen，心跳状态清空
    async fn mark_disconnected(&self, client_id: &str, ts_ms: i64) -> Result<(), StorageError>;

    /// 更新心跳状态（设备记录不存在时不做任何事）
    async fn set_alive_status(
        &self,
        client_id: &str,
        status: AliveStatus,
    ) -> Result<(), StorageError>;

    async fn find_device(&self, client_id: &str) -> Result<Option<DeviceRecord>, StorageError>;

    /// 全部已知设备（按标识排序）
    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, StorageError>;
}

/// 消息接口
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, record: MessageRecord) -> Result<(), StorageError>;

    /// 按时间倒序列出消息；`limit <= 0` 表示不限制
    async fn list_messages(
        &self,
        client_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError>;
}

/// 命令目录接口
#[async_trait]
pub trait CommandCatalogStore: Send + Sync {
    /// 查找已启用的命令
    async fn find_enabled_command(
        &self,
        command_id: i32,
    ) -> Result<Option<CommandDefinition>, StorageError>;

    /// 设备与命令的兼容关系是否存在且启用
    async fn is_command_supported(
        &self,
        client_id: &str,
        command_id: i32,
    ) -> Result<bool, StorageError>;

    /// 设备可用的命令（命令与兼容关系均启用，按名称排序）
    async fn list_device_commands(
        &self,
        client_id: &str,
    ) -> Result<Vec<CommandDefinition>, StorageError>;
}
