//! TCP 监听器
//!
//! 接受设备连接，每个连接一个任务，连接之间互不阻塞。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let server = PanelServer::new("0.0.0.0:12345", handler);
//! server.run().await?;
//! ```

use crate::error::SessionError;
use crate::handler::SessionHandler;
use panel_telemetry::{new_connection_id, record_connection_accepted};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, error, info, info_span, warn};

pub struct PanelServer {
    addr: String,
    handler: Arc<SessionHandler>,
}

impl PanelServer {
    pub fn new(addr: impl Into<String>, handler: Arc<SessionHandler>) -> Self {
        Self {
            addr: addr.into(),
            handler,
        }
    }

    /// 绑定地址并持续接受连接
    pub async fn run(&self) -> Result<(), SessionError> {
        let listener = TcpListener::bind(&self.addr).await?;
        info!(target: "panel.session", addr = %self.addr, "tcp_server_listening");
        self.serve(listener).await
    }

    /// 在已绑定的监听器上接受连接（accept 错误只记录，不退出）
    pub async fn serve(&self, listener: TcpListener) -> Result<(), SessionError> {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    record_connection_accepted();
                    let connection_id = new_connection_id();
                    let span = info_span!("connection", connection_id = %connection_id, peer = %peer);
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(
                        async move {
                            info!(target: "panel.session", "connection_accepted");
                            Self::handle_connection(handler, stream).await;
                        }
                        .instrument(span),
                    );
                }
                Err(err) => {
                    error!(target: "panel.session", error = %err, "accept_failed");
                }
            }
        }
    }

    async fn handle_connection(handler: Arc<SessionHandler>, stream: TcpStream) {
        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(err) => {
                warn!(target: "panel.session", error = %err, "peer_addr_unavailable");
                return;
            }
        };
        let _ = stream.set_nodelay(true);
        let (reader, writer) = stream.into_split();
        match handler.handle(reader, Box::new(writer), peer).await {
            Ok(_) => {}
            Err(SessionError::HandshakeRejected(_)) => {}
            Err(err) => {
                info!(target: "panel.session", error = %err, "connection_ended_before_session");
            }
        }
    }
}
