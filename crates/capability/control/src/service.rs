//! 操作员命令服务
//!
//! 外部 API 包装的请求逻辑：发送自由文本，或按命令目录发送预定义命令。

use crate::dispatch::DeviceDispatcher;
use crate::error::ControlError;
use domain::{CommandDefinition, OperatorRole};
use panel_protocol::encode;
use panel_session::{ConnectionRegistry, OnlineDevice};
use panel_storage::CommandCatalogStore;
use std::sync::Arc;
use tracing::{info, warn};

const RESET_TEXT: &str = "~N";
const ACK_TEXT: &str = "~L";

/// 自由文本的动作分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAction {
    Send,
    /// 面板复位，仅管理员可用
    Reset,
    /// 确认告警
    Ack,
}

impl TextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::Reset => "RESET",
            Self::Ack => "ACK",
        }
    }
}

pub fn classify_text(text: &str) -> TextAction {
    match text {
        RESET_TEXT => TextAction::Reset,
        ACK_TEXT => TextAction::Ack,
        _ => TextAction::Send,
    }
}

pub struct CommandService {
    dispatcher: Arc<dyn DeviceDispatcher>,
    commands: Arc<dyn CommandCatalogStore>,
    registry: Arc<ConnectionRegistry>,
}

impl CommandService {
    pub fn new(
        dispatcher: Arc<dyn DeviceDispatcher>,
        commands: Arc<dyn CommandCatalogStore>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            dispatcher,
            commands,
            registry,
        }
    }

    /// 发送自由文本（原样写入 UTF-8 字节）。
    pub async fn send_text(
        &self,
        role: OperatorRole,
        device_id: &str,
        text: &str,
    ) -> Result<TextAction, ControlError> {
        let action = classify_text(text);
        if action == TextAction::Reset && !role.is_admin() {
            warn!(
                target: "panel.control",
                client_id = %device_id,
                action = action.as_str(),
                "text_command_forbidden"
            );
            return Err(ControlError::Forbidden(
                "reset requires administrator".to_string(),
            ));
        }

        self.dispatcher.deliver(device_id, text.as_bytes()).await?;
        info!(
            target: "panel.control",
            client_id = %device_id,
            action = action.as_str(),
            "text_command_sent"
        );
        Ok(action)
    }

    /// 发送命令目录中的命令。
    pub async fn send_catalog_command(
        &self,
        role: OperatorRole,
        device_id: &str,
        command_id: i32,
    ) -> Result<CommandDefinition, ControlError> {
        let command = self
            .commands
            .find_enabled_command(command_id)
            .await?
            .ok_or(ControlError::CommandNotFound(command_id))?;

        if command.admin_only && !role.is_admin() {
            warn!(
                target: "panel.control",
                client_id = %device_id,
                command_id,
                "catalog_command_forbidden"
            );
            return Err(ControlError::Forbidden(format!(
                "command {} requires administrator",
                command.name
            )));
        }

        if !self
            .commands
            .is_command_supported(device_id, command_id)
            .await?
        {
            warn!(
                target: "panel.control",
                client_id = %device_id,
                command_id,
                "catalog_command_unsupported"
            );
            return Err(ControlError::Forbidden(format!(
                "command {} is not enabled for {}",
                command.name, device_id
            )));
        }

        let payload = encode(&command)?;
        self.dispatcher.deliver(device_id, &payload).await?;
        info!(
            target: "panel.control",
            client_id = %device_id,
            command_id,
            command_name = %command.name,
            encoding = %command.encoding,
            payload_size = payload.len(),
            "catalog_command_sent"
        );
        Ok(command)
    }

    /// 设备可用的命令。
    pub async fn device_commands(
        &self,
        device_id: &str,
    ) -> Result<Vec<CommandDefinition>, ControlError> {
        Ok(self.commands.list_device_commands(device_id).await?)
    }

    pub fn online_devices(&self) -> Vec<OnlineDevice> {
        self.registry.online_devices()
    }
}
