//! 连接注册表
//!
//! 进程内唯一的"设备当前是否可达"事实来源。
//!
//! - 映射锁为同步短临界区，不跨 `.await` 持有
//! - 每次注册分配递增的 generation，删除时按 generation 比较
//! - 设备级异步锁用于串行化同一设备的"注册 + 写库"与"删除 + 写库"

use domain::now_epoch_ms;
use panel_telemetry::record_session_superseded;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{OwnedMutexGuard, watch};
use tracing::info;

/// 设备连接的写半部。
pub type DeviceWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// 关闭写端的最长等待时间，超时后放弃并交由 drop 释放连接。
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// 注册表中的会话句柄（可廉价克隆，写端共享）。
#[derive(Clone)]
pub struct SessionHandle {
    pub device_id: String,
    pub generation: u64,
    pub peer: SocketAddr,
    pub connected_at_ms: i64,
    writer: Arc<tokio::sync::Mutex<DeviceWriter>>,
    closed: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// 写入并等待 flush 完成；慢设备的背压体现为调用方挂起。
    ///
    /// 会话关闭时挂起中的写入（含等待写锁）立即以 `BrokenPipe` 返回。
    pub async fn write_all(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(session_closed());
        }
        tokio::select! {
            result = async {
                let mut writer = self.writer.lock().await;
                writer.write_all(bytes).await?;
                writer.flush().await
            } => result,
            _ = closed.wait_for(|closed| *closed) => Err(session_closed()),
        }
    }

    /// 标记会话已关闭，取消所有挂起和后续的写入。
    pub fn cancel_writes(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// 关闭写端，最多等待 [`SHUTDOWN_GRACE`]。
    pub async fn shutdown(&self) -> std::io::Result<()> {
        let shutdown = async {
            let mut writer = self.writer.lock().await;
            writer.shutdown().await
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, shutdown).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "writer shutdown timed out",
            )),
        }
    }
}

fn session_closed() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "session closed")
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("device_id", &self.device_id)
            .field("generation", &self.generation)
            .field("peer", &self.peer)
            .field("connected_at_ms", &self.connected_at_ms)
            .finish_non_exhaustive()
    }
}

/// 在线设备快照（供外部 API 展示）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineDevice {
    pub client_id: String,
    pub ip: String,
    pub port: u16,
    pub connected_at_ms: i64,
}

pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    device_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    next_generation: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            device_locks: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// 注册会话；同一设备已有条目时直接覆盖（最新握手优先）。
    pub fn register(&self, device_id: &str, peer: SocketAddr, writer: DeviceWriter) -> SessionHandle {
        let handle = SessionHandle {
            device_id: device_id.to_string(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            peer,
            connected_at_ms: now_epoch_ms(),
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            closed: Arc::new(watch::channel(false).0),
        };
        let previous = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device_id.to_string(), handle.clone());
        if let Some(previous) = previous {
            record_session_superseded();
            info!(
                target: "panel.session",
                client_id = %device_id,
                previous_generation = previous.generation,
                previous_peer = %previous.peer,
                generation = handle.generation,
                peer = %peer,
                "session_superseded"
            );
        }
        handle
    }

    /// 仅当条目仍属于该 generation 时删除，返回是否删除。
    pub fn remove_if_current(&self, device_id: &str, generation: u64) -> bool {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match sessions.get(device_id) {
            Some(current) if current.generation == generation => {
                sessions.remove(device_id);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, device_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device_id)
            .cloned()
    }

    pub fn is_connected(&self, device_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(device_id)
    }

    /// 当前在线设备（按标识排序）。
    pub fn online_devices(&self) -> Vec<OnlineDevice> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let mut items: Vec<OnlineDevice> = sessions
            .values()
            .map(|handle| OnlineDevice {
                client_id: handle.device_id.clone(),
                ip: handle.peer.ip().to_string(),
                port: handle.peer.port(),
                connected_at_ms: handle.connected_at_ms,
            })
            .collect();
        items.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        items
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取设备级锁。条目不回收，数量受白名单大小约束。
    pub async fn lock_device(&self, device_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .device_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(device_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
