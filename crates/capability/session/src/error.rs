//! 会话错误类型定义

use panel_storage::StorageError;

/// 单个连接的终止原因（握手阶段）。
///
/// 只在监听器中记录日志，不会继续向上传播。
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// 未收到标识即断开
    #[error("connection closed before identifier was received")]
    ClosedBeforeIdentifier,

    /// 首帧去除空白后为空
    #[error("empty client identifier")]
    EmptyIdentifier,

    /// 标识不在白名单中
    #[error("unauthorized client identifier: {0}")]
    HandshakeRejected(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 存储错误
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
