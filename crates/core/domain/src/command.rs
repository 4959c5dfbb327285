//! 命令目录定义（外部维护，核心只读）。

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 命令载荷的存储编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandEncoding {
    /// 原始 7 位 ASCII 文本
    Ascii,
    /// 十六进制字符对，允许空格分隔
    Hex,
    /// 标准字母表 base64
    Base64,
}

/// 无法识别的编码名称。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEncoding(pub String);

impl fmt::Display for UnknownEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported encoding: {}", self.0)
    }
}

impl std::error::Error for UnknownEncoding {}

impl CommandEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        }
    }
}

impl FromStr for CommandEncoding {
    type Err = UnknownEncoding;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ascii" => Ok(Self::Ascii),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => Err(UnknownEncoding(other.to_string())),
        }
    }
}

/// 命令定义（`tcp_commands` 表的一行）。
///
/// `encoding` 保留数据库中的原始文本，由编码器负责解析，
/// 这样不受支持的编码值可以作为编码错误返回给调用方。
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub payload: String,
    pub encoding: String,
    pub append_null: bool,
    pub append_cr: bool,
    pub append_lf: bool,
    pub admin_only: bool,
    pub enabled: bool,
}

impl CommandDefinition {
    /// 构造一个启用状态、无终止符的命令定义（便于测试与种子数据）。
    pub fn new(
        id: i32,
        name: impl Into<String>,
        payload: impl Into<String>,
        encoding: CommandEncoding,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            payload: payload.into(),
            encoding: encoding.as_str().to_string(),
            append_null: false,
            append_cr: false,
            append_lf: false,
            admin_only: false,
            enabled: true,
        }
    }
}
