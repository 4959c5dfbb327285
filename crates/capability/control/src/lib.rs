//! # 控制能力模块
//!
//! - `dispatch`：向在线设备写入字节的唯一出口，并记录出站消息
//! - `service`：操作员命令（文本 / 命令目录），含管理员权限与兼容性检查
//! - `poller`：周期性心跳探测
//!
//! 三者都通过 [`DeviceDispatcher`] 写设备，测试可替换为假实现。

mod dispatch;
mod error;
mod poller;
mod service;

pub use dispatch::{DeviceDispatcher, RegistryDispatcher};
pub use error::{ControlError, DispatchError, PollerError};
pub use poller::{HeartbeatPoller, HeartbeatPollerConfig, PollSummary, ProbeOutcome};
pub use service::{CommandService, TextAction, classify_text};
