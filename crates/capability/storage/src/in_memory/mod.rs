//! 内存存储实现模块
//!
//! 用于测试与本地演示，行为与 Postgres 实现保持一致，
//! 唯一差异：探测目标不与 `clients` 表关联（内存存储之间不做联表）。
//!
//! - AllowListStore / HeartbeatStore: InMemoryAllowListStore
//! - DeviceStatusStore: InMemoryDeviceStore
//! - MessageStore: InMemoryMessageStore
//! - CommandCatalogStore: InMemoryCommandCatalogStore

pub mod allow_list;
pub mod command;
pub mod device;
pub mod message;

pub use allow_list::*;
pub use command::*;
pub use device::*;
pub use message::*;
