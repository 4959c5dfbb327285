//! 协议错误类型定义

/// 命令定义无法编码为字节。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// ascii 载荷包含非 7 位字符
    #[error("non-ascii character {character:?} at byte {position}")]
    NonAscii { position: usize, character: char },

    /// hex 载荷长度为奇数或包含非十六进制字符
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),

    /// base64 载荷字母表或填充错误
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// 不支持的编码名称
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}
