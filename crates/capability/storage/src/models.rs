//! 数据模型
//!
//! - 白名单条目：AllowedClientRecord（含心跳配置）
//! - 心跳探测目标：HeartbeatTarget
//! - 设备记录：DeviceRecord（`clients` 表）
//! - 消息记录：MessageRecord（`messages` 表，只追加）

use domain::{AliveStatus, ConnectionStatus, MessageDirection};
use serde::Serialize;

/// 白名单条目（`allowed_clients`，外部维护）。
#[derive(Debug, Clone)]
pub struct AllowedClientRecord {
    pub client_id: String,
    pub description: Option<String>,
    pub alive_enabled: bool,
    pub alive_command_id: Option<i32>,
    pub alive_expected_response: Option<String>,
}

impl AllowedClientRecord {
    /// 未启用心跳检查的白名单条目。
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            description: None,
            alive_enabled: false,
            alive_command_id: None,
            alive_expected_response: None,
        }
    }

    /// 启用心跳检查：探测命令与期望回复。
    pub fn with_heartbeat(mut self, command_id: i32, expected_response: impl Into<String>) -> Self {
        self.alive_enabled = true;
        self.alive_command_id = Some(command_id);
        self.alive_expected_response = Some(expected_response.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// 心跳探测目标：启用心跳且配置了探测命令的设备。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatTarget {
    pub client_id: String,
    pub command_id: i32,
}

/// 持久化设备记录（`clients`）。
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRecord {
    pub client_id: String,
    pub ip: Option<String>,
    pub port: Option<i32>,
    pub status: Option<ConnectionStatus>,
    pub connected_at_ms: Option<i64>,
    pub last_seen_at_ms: Option<i64>,
    /// `None` 表示未知（数据库 NULL）
    pub alive_status: Option<AliveStatus>,
}

/// 消息记录（`messages`）。
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub client_id: String,
    pub direction: MessageDirection,
    pub ts_ms: i64,
    pub message: String,
    pub remote_ip: Option<String>,
    pub remote_port: Option<i32>,
}

impl MessageRecord {
    pub fn incoming(client_id: impl Into<String>, message: impl Into<String>, ts_ms: i64) -> Self {
        Self::without_peer(client_id, MessageDirection::Incoming, message, ts_ms)
    }

    pub fn outgoing(client_id: impl Into<String>, message: impl Into<String>, ts_ms: i64) -> Self {
        Self::without_peer(client_id, MessageDirection::Outgoing, message, ts_ms)
    }

    /// 系统消息，附带触发方的对端地址。
    pub fn system(
        client_id: impl Into<String>,
        message: impl Into<String>,
        remote_ip: impl Into<String>,
        remote_port: i32,
        ts_ms: i64,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            direction: MessageDirection::System,
            ts_ms,
            message: message.into(),
            remote_ip: Some(remote_ip.into()),
            remote_port: Some(remote_port),
        }
    }

    fn without_peer(
        client_id: impl Into<String>,
        direction: MessageDirection,
        message: impl Into<String>,
        ts_ms: i64,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            direction,
            ts_ms,
            message: message.into(),
            remote_ip: None,
            remote_port: None,
        }
    }
}
