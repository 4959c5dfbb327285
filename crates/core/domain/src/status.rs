//! 设备状态与消息方向。
//!
//! 连接状态（TCP 层）与心跳状态（最近一次探测结果）是两个独立的维度：
//! 设备可以在 TCP 层已断开，但在下一次轮询之前仍保留旧的心跳状态。

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 持久化的连接状态（`clients.status`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            other => Err(format!("unknown connection status: {}", other)),
        }
    }
}

/// 心跳状态（`clients.alive_status`）。
///
/// 未知状态以 `Option<AliveStatus>::None` 表示（数据库中为 NULL）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AliveStatus {
    /// 已发送探测，等待设备回复
    Pending,
    /// 收到期望的心跳回复
    Connected,
    /// 探测发送失败
    Disconnected,
}

impl AliveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl FromStr for AliveStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            other => Err(format!("unknown alive status: {}", other)),
        }
    }
}

/// 消息方向（`messages.direction`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
    System,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::System => "system",
        }
    }
}

impl FromStr for MessageDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            "system" => Ok(Self::System),
            other => Err(format!("unknown message direction: {}", other)),
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作员角色（由外部认证层提供）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorRole {
    Admin,
    Operator,
}

impl OperatorRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}
