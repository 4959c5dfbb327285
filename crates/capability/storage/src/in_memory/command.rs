//! 命令目录内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::traits::CommandCatalogStore;
use domain::CommandDefinition;
use std::collections::HashMap;
use std::sync::RwLock;

/// 命令目录内存存储
pub struct InMemoryCommandCatalogStore {
    commands: RwLock<HashMap<i32, CommandDefinition>>,
    /// (client_id, command_id) -> enabled
    compatibility: RwLock<HashMap<(String, i32), bool>>,
}

impl InMemoryCommandCatalogStore {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
            compatibility: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert_command(&self, command: CommandDefinition) -> Result<(), StorageError> {
        let mut commands = self
            .commands
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        commands.insert(command.id, command);
        Ok(())
    }

    /// 登记设备与命令的兼容关系
    pub fn link_command(
        &self,
        client_id: &str,
        command_id: i32,
        enabled: bool,
    ) -> Result<(), StorageError> {
        let mut compatibility = self
            .compatibility
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        compatibility.insert((client_id.to_string(), command_id), enabled);
        Ok(())
    }
}

impl Default for InMemoryCommandCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandCatalogStore for InMemoryCommandCatalogStore {
    async fn find_enabled_command(
        &self,
        command_id: i32,
    ) -> Result<Option<CommandDefinition>, StorageError> {
        let commands = self
            .commands
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(commands
            .get(&command_id)
            .filter(|command| command.enabled)
            .cloned())
    }

    async fn is_command_supported(
        &self,
        client_id: &str,
        command_id: i32,
    ) -> Result<bool, StorageError> {
        let compatibility = self
            .compatibility
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(compatibility
            .get(&(client_id.to_string(), command_id))
            .copied()
            .unwrap_or(false))
    }

    async fn list_device_commands(
        &self,
        client_id: &str,
    ) -> Result<Vec<CommandDefinition>, StorageError> {
        let compatibility = self
            .compatibility
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let commands = self
            .commands
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<CommandDefinition> = compatibility
            .iter()
            .filter(|((id, _), enabled)| id == client_id && **enabled)
            .filter_map(|((_, command_id), _)| commands.get(command_id))
            .filter(|command| command.enabled)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}
