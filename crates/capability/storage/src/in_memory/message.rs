//! 消息内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::traits::MessageStore;
use std::sync::RwLock;

/// 消息内存存储
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<MessageRecord>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append_message(&self, record: MessageRecord) -> Result<(), StorageError> {
        let mut messages = self
            .messages
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        messages.push(record);
        Ok(())
    }

    async fn list_messages(
        &self,
        client_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let limit = limit.max(0) as usize;
        let messages = self
            .messages
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        // 倒序遍历，时间戳相同时后写入的排在前面
        let mut items: Vec<MessageRecord> = messages
            .iter()
            .rev()
            .filter(|item| client_id.is_none_or(|id| item.client_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms));
        if limit > 0 && items.len() > limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}
