//! 存储层错误类型
//!
//! 封装底层错误：
//! - SQL 执行错误
//! - 连接错误
//! - 列值无法解析为领域枚举

#[derive(Debug)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// 列值不合法（例如 `clients.status` 出现未知文本）。
    pub fn invalid_column(column: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(format!("invalid value in column {}: {}", column, detail))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}
