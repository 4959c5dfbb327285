//! 心跳轮询器
//!
//! 首次延迟后按固定间隔探测所有启用心跳的设备。
//! 探测已发出记为 `pending`，回复由会话处理器改为 `connected`；
//! `pending` 没有超时降级，下一轮探测或迟到的回复决定最终状态。

use crate::dispatch::DeviceDispatcher;
use crate::error::PollerError;
use domain::AliveStatus;
use panel_protocol::encode;
use panel_storage::{
    CommandCatalogStore, DeviceStatusStore, HeartbeatStore, HeartbeatTarget, StorageError,
};
use panel_telemetry::{record_poll_tick, record_probe_failed, record_probe_sent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct HeartbeatPollerConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for HeartbeatPollerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(3),
            interval: Duration::from_secs(30),
        }
    }
}

/// 单轮探测统计。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub probed: usize,
    pub pending: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// 单个设备的探测结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Pending,
    Failed(PollerError),
    /// 探测命令不存在或已停用
    Skipped,
}

pub struct HeartbeatPoller {
    heartbeat: Arc<dyn HeartbeatStore>,
    commands: Arc<dyn CommandCatalogStore>,
    devices: Arc<dyn DeviceStatusStore>,
    dispatcher: Arc<dyn DeviceDispatcher>,
    config: HeartbeatPollerConfig,
}

impl HeartbeatPoller {
    pub fn new(
        heartbeat: Arc<dyn HeartbeatStore>,
        commands: Arc<dyn CommandCatalogStore>,
        devices: Arc<dyn DeviceStatusStore>,
        dispatcher: Arc<dyn DeviceDispatcher>,
        config: HeartbeatPollerConfig,
    ) -> Self {
        Self {
            heartbeat,
            commands,
            devices,
            dispatcher,
            config,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// 常驻循环：本轮结束后再等待一个间隔。
    pub async fn run(&self) {
        info!(
            target: "panel.poller",
            initial_delay_ms = self.config.initial_delay.as_millis() as u64,
            interval_ms = self.config.interval.as_millis() as u64,
            "heartbeat_poller_started"
        );
        tokio::time::sleep(self.config.initial_delay).await;
        loop {
            match self.run_tick().await {
                Ok(summary) => debug!(
                    target: "panel.poller",
                    probed = summary.probed,
                    pending = summary.pending,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "heartbeat_tick_completed"
                ),
                Err(err) => warn!(
                    target: "panel.poller",
                    error = %err,
                    "heartbeat_targets_unavailable"
                ),
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// 执行一轮探测；单个设备失败不影响其他设备。
    pub async fn run_tick(&self) -> Result<PollSummary, StorageError> {
        record_poll_tick();
        let targets = self.heartbeat.list_probe_targets().await?;
        let mut summary = PollSummary::default();
        for target in &targets {
            match self.probe(target).await {
                ProbeOutcome::Pending => {
                    summary.probed += 1;
                    summary.pending += 1;
                }
                ProbeOutcome::Failed(_) => {
                    summary.probed += 1;
                    summary.failed += 1;
                }
                ProbeOutcome::Skipped => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    /// 探测单个设备并写入心跳状态。
    pub async fn probe(&self, target: &HeartbeatTarget) -> ProbeOutcome {
        let command = match self.commands.find_enabled_command(target.command_id).await {
            Ok(Some(command)) => command,
            Ok(None) => {
                debug!(
                    target: "panel.poller",
                    client_id = %target.client_id,
                    command_id = target.command_id,
                    "heartbeat_command_unavailable"
                );
                return ProbeOutcome::Skipped;
            }
            Err(err) => {
                warn!(
                    target: "panel.poller",
                    client_id = %target.client_id,
                    command_id = target.command_id,
                    error = %err,
                    "heartbeat_command_lookup_failed"
                );
                return ProbeOutcome::Skipped;
            }
        };

        let result = match encode(&command) {
            Ok(payload) => self
                .dispatcher
                .deliver(&target.client_id, &payload)
                .await
                .map_err(PollerError::from),
            Err(err) => Err(PollerError::from(err)),
        };

        let (status, outcome) = match result {
            Ok(()) => {
                record_probe_sent();
                (AliveStatus::Pending, ProbeOutcome::Pending)
            }
            Err(err) => {
                record_probe_failed();
                debug!(
                    target: "panel.poller",
                    client_id = %target.client_id,
                    error = %err,
                    "heartbeat_probe_failed"
                );
                (AliveStatus::Disconnected, ProbeOutcome::Failed(err))
            }
        };

        if let Err(err) = self.devices.set_alive_status(&target.client_id, status).await {
            warn!(
                target: "panel.poller",
                client_id = %target.client_id,
                status = status.as_str(),
                error = %err,
                "alive_status_update_failed"
            );
        }
        outcome
    }
}
