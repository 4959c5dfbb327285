//! 下发边界
//!
//! 查找注册表中的当前会话并写入完整字节序列；
//! 写入成功后追加一条出站消息（入库失败只记录日志，不影响已完成的下发）。

use crate::error::DispatchError;
use async_trait::async_trait;
use domain::now_epoch_ms;
use panel_protocol::lossy_text;
use panel_session::ConnectionRegistry;
use panel_storage::{MessageRecord, MessageStore};
use panel_telemetry::{record_delivery_failure, record_delivery_success};
use std::sync::Arc;
use tracing::{info, warn};

/// 设备下发器抽象。
#[async_trait]
pub trait DeviceDispatcher: Send + Sync {
    async fn deliver(&self, device_id: &str, payload: &[u8]) -> Result<(), DispatchError>;
}

/// 基于连接注册表的下发器。
pub struct RegistryDispatcher {
    registry: Arc<ConnectionRegistry>,
    messages: Arc<dyn MessageStore>,
}

impl RegistryDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, messages: Arc<dyn MessageStore>) -> Self {
        Self { registry, messages }
    }
}

#[async_trait]
impl DeviceDispatcher for RegistryDispatcher {
    async fn deliver(&self, device_id: &str, payload: &[u8]) -> Result<(), DispatchError> {
        let Some(handle) = self.registry.get(device_id) else {
            record_delivery_failure();
            return Err(DispatchError::NotConnected(device_id.to_string()));
        };

        // 同一会话的并发写入在句柄内串行，字节不会交错
        if let Err(err) = handle.write_all(payload).await {
            record_delivery_failure();
            warn!(
                target: "panel.control",
                client_id = %device_id,
                generation = handle.generation,
                error = %err,
                "delivery_failed"
            );
            return Err(DispatchError::DeliveryFailed {
                device_id: device_id.to_string(),
                reason: err.to_string(),
            });
        }
        record_delivery_success();

        let record = MessageRecord::outgoing(device_id, lossy_text(payload), now_epoch_ms());
        if let Err(err) = self.messages.append_message(record).await {
            warn!(
                target: "panel.control",
                client_id = %device_id,
                error = %err,
                "outgoing_record_failed"
            );
        }
        info!(
            target: "panel.control",
            client_id = %device_id,
            generation = handle.generation,
            payload_size = payload.len(),
            "message_delivered"
        );
        Ok(())
    }
}
