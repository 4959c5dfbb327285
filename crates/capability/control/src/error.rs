use panel_protocol::EncodingError;
use panel_storage::StorageError;

/// 下发错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("client not connected: {0}")]
    NotConnected(String),
    #[error("delivery to {device_id} failed: {reason}")]
    DeliveryFailed { device_id: String, reason: String },
}

/// 操作员命令错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("command not found or disabled: {0}")]
    CommandNotFound(i32),
    #[error("payload error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for ControlError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// 单个设备的探测失败原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollerError {
    #[error("payload error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}
