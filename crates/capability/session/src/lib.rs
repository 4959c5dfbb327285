//! # 设备会话能力模块
//!
//! ## 架构设计
//!
//! ```text
//! PanelServer (TcpListener)
//!       │ accept
//!       ▼
//! SessionHandler（每个连接一个任务）
//!       │  Connecting ─握手─▶ Identified ─注册─▶ Active ─EOF/错误─▶ Closed
//!       │
//!       ├──▶ ConnectionRegistry（设备 ID → 写句柄，按 generation 比较删除）
//!       └──▶ PanelStores（白名单、设备状态、消息、心跳配置）
//! ```
//!
//! 同一设备重连时，最新完成握手的会话覆盖注册表条目；
//! 旧会话关闭时只删除仍属于自己的条目，也不会把设备记录改为断开。

mod error;
mod handler;
mod registry;
mod server;

pub use error::SessionError;
pub use handler::{
    SessionConfig, SessionEnd, SessionHandler, SessionPhase, SessionSummary, StatusWrite,
    UNAUTHORIZED_MESSAGE,
};
pub use registry::{ConnectionRegistry, DeviceWriter, OnlineDevice, SessionHandle};
pub use server::PanelServer;
