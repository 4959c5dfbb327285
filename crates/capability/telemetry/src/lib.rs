//! 追踪初始化、连接 ID 与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub handshakes_rejected: u64,
    pub sessions_registered: u64,
    pub sessions_superseded: u64,
    pub sessions_closed: u64,
    pub messages_received: u64,
    pub heartbeat_replies: u64,
    pub delivery_success: u64,
    pub delivery_failure: u64,
    pub probes_sent: u64,
    pub probes_failed: u64,
    pub poll_ticks: u64,
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    connections_accepted: AtomicU64,
    handshakes_rejected: AtomicU64,
    sessions_registered: AtomicU64,
    sessions_superseded: AtomicU64,
    sessions_closed: AtomicU64,
    messages_received: AtomicU64,
    heartbeat_replies: AtomicU64,
    delivery_success: AtomicU64,
    delivery_failure: AtomicU64,
    probes_sent: AtomicU64,
    probes_failed: AtomicU64,
    poll_ticks: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            connections_accepted: AtomicU64::new(0),
            handshakes_rejected: AtomicU64::new(0),
            sessions_registered: AtomicU64::new(0),
            sessions_superseded: AtomicU64::new(0),
            sessions_closed: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            heartbeat_replies: AtomicU64::new(0),
            delivery_success: AtomicU64::new(0),
            delivery_failure: AtomicU64::new(0),
            probes_sent: AtomicU64::new(0),
            probes_failed: AtomicU64::new(0),
            poll_ticks: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            handshakes_rejected: self.handshakes_rejected.load(Ordering::Relaxed),
            sessions_registered: self.sessions_registered.load(Ordering::Relaxed),
            sessions_superseded: self.sessions_superseded.load(Ordering::Relaxed),
            sessions_closed: self.sessions_closed.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            heartbeat_replies: self.heartbeat_replies.load(Ordering::Relaxed),
            delivery_success: self.delivery_success.load(Ordering::Relaxed),
            delivery_failure: self.delivery_failure.load(Ordering::Relaxed),
            probes_sent: self.probes_sent.load(Ordering::Relaxed),
            probes_failed: self.probes_failed.load(Ordering::Relaxed),
            poll_ticks: self.poll_ticks.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的连接追踪 ID（设备身份确认前用于关联日志）。
pub fn new_connection_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录接受的 TCP 连接数。
pub fn record_connection_accepted() {
    metrics().connections_accepted.fetch_add(1, Ordering::Relaxed);
}

/// 记录握手被拒（未授权标识）次数。
pub fn record_handshake_rejected() {
    metrics().handshakes_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录会话注册次数。
pub fn record_session_registered() {
    metrics().sessions_registered.fetch_add(1, Ordering::Relaxed);
}

/// 记录同一设备新会话覆盖旧会话的次数。
pub fn record_session_superseded() {
    metrics().sessions_superseded.fetch_add(1, Ordering::Relaxed);
}

/// 记录会话关闭次数。
pub fn record_session_closed() {
    metrics().sessions_closed.fetch_add(1, Ordering::Relaxed);
}

/// 记录入库的设备消息数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录心跳回复次数。
pub fn record_heartbeat_reply() {
    metrics().heartbeat_replies.fetch_add(1, Ordering::Relaxed);
}

/// 记录下发成功次数。
pub fn record_delivery_success() {
    metrics().delivery_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录下发失败次数（未连接或写失败）。
pub fn record_delivery_failure() {
    metrics().delivery_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录心跳探测发送成功次数。
pub fn record_probe_sent() {
    metrics().probes_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录心跳探测失败次数。
pub fn record_probe_failed() {
    metrics().probes_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询周期次数。
pub fn record_poll_tick() {
    metrics().poll_ticks.fetch_add(1, Ordering::Relaxed);
}
