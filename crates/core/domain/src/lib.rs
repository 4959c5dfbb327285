pub mod command;
pub mod status;

pub use command::{CommandDefinition, CommandEncoding, UnknownEncoding};
pub use status::{AliveStatus, ConnectionStatus, MessageDirection, OperatorRole};

/// 设备标识：设备首帧上报的文本（已去除首尾空白）。
pub type DeviceId = String;

/// 获取当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
