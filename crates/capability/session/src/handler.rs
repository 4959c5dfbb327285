//! 单个设备连接的会话处理
//!
//! 生命周期：`Connecting → Identified → Active → Closed`，
//! 握手失败时 `Connecting/Identified → Closed`。
//! 设备记录的写入只由阶段迁移决定（见 [`SessionPhase::transition`]）。

use crate::error::SessionError;
use crate::registry::{ConnectionRegistry, DeviceWriter, SessionHandle};
use domain::{AliveStatus, now_epoch_ms};
use panel_protocol::{InboundFrame, classify_frame, parse_identifier, sanitize_frame};
use panel_storage::{MessageRecord, PanelStores};
use panel_telemetry::{
    record_handshake_rejected, record_heartbeat_reply, record_message_received,
    record_session_closed, record_session_registered,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// 拒绝握手时写入的系统消息。
pub const UNAUTHORIZED_MESSAGE: &str = "UNAUTHORIZED_CLIENT_ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Identified,
    Active,
    Closed,
}

/// 阶段迁移对应的设备记录写入。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    MarkConnected,
    MarkDisconnected,
}

impl SessionPhase {
    /// 校验迁移并返回需要执行的写入；非法迁移返回 `Err(self)`。
    ///
    /// `Closed` 为终态。被覆盖的旧会话在 `Active → Closed` 时
    /// 由调用方跳过 `MarkDisconnected`。
    pub fn transition(self, next: SessionPhase) -> Result<Option<StatusWrite>, SessionPhase> {
        use SessionPhase::*;
        match (self, next) {
            (Connecting, Identified) => Ok(None),
            (Identified, Active) => Ok(Some(StatusWrite::MarkConnected)),
            (Active, Closed) => Ok(Some(StatusWrite::MarkDisconnected)),
            (Connecting, Closed) | (Identified, Closed) => Ok(None),
            _ => Err(self),
        }
    }
}

/// 会话结束方式（已进入 Active 之后）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    PeerClosed,
    ReadFailed(String),
}

/// 会话处理结果。
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub device_id: String,
    pub generation: u64,
    pub end: SessionEnd,
    /// 关闭时注册表条目是否仍属于本会话
    pub was_current: bool,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 单次读取缓冲区大小
    pub read_buffer_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_buffer_bytes: 1024,
        }
    }
}

pub struct SessionHandler {
    registry: Arc<ConnectionRegistry>,
    stores: PanelStores,
    config: SessionConfig,
}

impl SessionHandler {
    pub fn new(registry: Arc<ConnectionRegistry>, stores: PanelStores, config: SessionConfig) -> Self {
        Self {
            registry,
            stores,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// 处理一个连接直到关闭。
    ///
    /// 握手失败返回 `Err`；进入 Active 后的读错误视为会话结束，返回 `Ok`。
    pub async fn handle<R>(
        &self,
        mut reader: R,
        mut writer: DeviceWriter,
        peer: SocketAddr,
    ) -> Result<SessionSummary, SessionError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buf = vec![0u8; self.config.read_buffer_bytes.max(1)];
        let mut phase = SessionPhase::Connecting;

        let device_id = match self.handshake(&mut reader, &mut buf, peer).await {
            Ok(device_id) => device_id,
            Err(err) => {
                self.advance(&mut phase, SessionPhase::Closed);
                let _ = writer.shutdown().await;
                return Err(err);
            }
        };
        self.advance(&mut phase, SessionPhase::Identified);

        let handle = self.activate(&device_id, peer, writer, &mut phase).await;
        let end = self.message_loop(&mut reader, &mut buf, &handle).await;
        let was_current = self.close(&handle, &end, &mut phase).await;

        Ok(SessionSummary {
            device_id,
            generation: handle.generation,
            end,
            was_current,
        })
    }

    fn advance(&self, phase: &mut SessionPhase, next: SessionPhase) -> Option<StatusWrite> {
        match phase.transition(next) {
            Ok(write) => {
                *phase = next;
                write
            }
            Err(current) => {
                warn!(
                    target: "panel.session",
                    from = ?current,
                    to = ?next,
                    "invalid_session_transition"
                );
                None
            }
        }
    }

    async fn handshake<R>(
        &self,
        reader: &mut R,
        buf: &mut [u8],
        peer: SocketAddr,
    ) -> Result<String, SessionError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let n = reader.read(buf).await?;
        if n == 0 {
            debug!(target: "panel.session", peer = %peer, "closed_before_identifier");
            return Err(SessionError::ClosedBeforeIdentifier);
        }
        let Some(device_id) = parse_identifier(&buf[..n]) else {
            debug!(target: "panel.session", peer = %peer, "empty_identifier");
            return Err(SessionError::EmptyIdentifier);
        };

        if !self.stores.allow_list.is_allowed(&device_id).await? {
            record_handshake_rejected();
            warn!(
                target: "panel.session",
                client_id = %device_id,
                peer = %peer,
                "handshake_rejected"
            );
            let record = MessageRecord::system(
                device_id.as_str(),
                UNAUTHORIZED_MESSAGE,
                peer.ip().to_string(),
                i32::from(peer.port()),
                now_epoch_ms(),
            );
            if let Err(err) = self.stores.messages.append_message(record).await {
                warn!(
                    target: "panel.session",
                    client_id = %device_id,
                    error = %err,
                    "rejection_record_failed"
                );
            }
            return Err(SessionError::HandshakeRejected(device_id));
        }

        Ok(device_id)
    }

    async fn activate(
        &self,
        device_id: &str,
        peer: SocketAddr,
        writer: DeviceWriter,
        phase: &mut SessionPhase,
    ) -> SessionHandle {
        let description = match self.stores.allow_list.find_description(device_id).await {
            Ok(description) => description,
            Err(err) => {
                warn!(
                    target: "panel.session",
                    client_id = %device_id,
                    error = %err,
                    "description_lookup_failed"
                );
                None
            }
        };

        let _guard = self.registry.lock_device(device_id).await;
        let handle = self.registry.register(device_id, peer, writer);
        record_session_registered();

        if let Some(StatusWrite::MarkConnected) = self.advance(phase, SessionPhase::Active) {
            if let Err(err) = self
                .stores
                .devices
                .mark_connected(
                    device_id,
                    &peer.ip().to_string(),
                    i32::from(peer.port()),
                    handle.connected_at_ms,
                )
                .await
            {
                warn!(
                    target: "panel.session",
                    client_id = %device_id,
                    error = %err,
                    "mark_connected_failed"
                );
            }
        }

        info!(
            target: "panel.session",
            client_id = %device_id,
            description = description.as_deref().unwrap_or(""),
            peer = %peer,
            generation = handle.generation,
            "session_registered"
        );
        handle
    }

    async fn message_loop<R>(
        &self,
        reader: &mut R,
        buf: &mut [u8],
        handle: &SessionHandle,
    ) -> SessionEnd
    where
        R: AsyncRead + Unpin + Send,
    {
        let device_id = handle.device_id.as_str();
        loop {
            let n = match reader.read(buf).await {
                Ok(0) => return SessionEnd::PeerClosed,
                Ok(n) => n,
                Err(err) => return SessionEnd::ReadFailed(err.to_string()),
            };
            let text = sanitize_frame(&buf[..n]);
            if text.is_empty() {
                continue;
            }

            // 每帧重新读取，配置变更无需重连
            let expected = match self.stores.heartbeat.expected_reply(device_id).await {
                Ok(expected) => expected,
                Err(err) => {
                    warn!(
                        target: "panel.session",
                        client_id = %device_id,
                        error = %err,
                        "heartbeat_config_unavailable"
                    );
                    None
                }
            };

            match classify_frame(text, expected.as_deref()) {
                InboundFrame::Empty => {}
                InboundFrame::HeartbeatReply => {
                    record_heartbeat_reply();
                    debug!(target: "panel.session", client_id = %device_id, "heartbeat_reply");
                    if let Err(err) = self
                        .stores
                        .devices
                        .set_alive_status(device_id, AliveStatus::Connected)
                        .await
                    {
                        warn!(
                            target: "panel.session",
                            client_id = %device_id,
                            error = %err,
                            "alive_status_update_failed"
                        );
                    }
                }
                InboundFrame::Message(text) => {
                    record_message_received();
                    debug!(
                        target: "panel.session",
                        client_id = %device_id,
                        bytes = n,
                        "message_received"
                    );
                    let record = MessageRecord::incoming(device_id, text, now_epoch_ms());
                    if let Err(err) = self.stores.messages.append_message(record).await {
                        warn!(
                            target: "panel.session",
                            client_id = %device_id,
                            error = %err,
                            "message_record_failed"
                        );
                    }
                }
            }
        }
    }

    async fn close(&self, handle: &SessionHandle, end: &SessionEnd, phase: &mut SessionPhase) -> bool {
        let device_id = handle.device_id.as_str();
        // 取消挂起的写入，关闭流程不等待被背压卡住的下发
        handle.cancel_writes();

        let was_current = {
            let _guard = self.registry.lock_device(device_id).await;
            let was_current = self.registry.remove_if_current(device_id, handle.generation);
            let write = self.advance(phase, SessionPhase::Closed);
            if was_current {
                if let Some(StatusWrite::MarkDisconnected) = write {
                    if let Err(err) = self
                        .stores
                        .devices
                        .mark_disconnected(device_id, now_epoch_ms())
                        .await
                    {
                        warn!(
                            target: "panel.session",
                            client_id = %device_id,
                            error = %err,
                            "mark_disconnected_failed"
                        );
                    }
                }
            }
            was_current
        };
        record_session_closed();

        if let Err(err) = handle.shutdown().await {
            debug!(
                target: "panel.session",
                client_id = %device_id,
                error = %err,
                "writer_shutdown_failed"
            );
        }

        match end {
            SessionEnd::PeerClosed => info!(
                target: "panel.session",
                client_id = %device_id,
                generation = handle.generation,
                was_current,
                "session_closed"
            ),
            SessionEnd::ReadFailed(reason) => warn!(
                target: "panel.session",
                client_id = %device_id,
                generation = handle.generation,
                was_current,
                error = %reason,
                "session_closed"
            ),
        }
        was_current
    }
}
