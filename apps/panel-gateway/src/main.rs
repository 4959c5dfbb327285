//! 安防面板网关：设备 TCP 监听 + 心跳轮询。

use panel_config::AppConfig;
use panel_control::{HeartbeatPoller, HeartbeatPollerConfig, RegistryDispatcher};
use panel_session::{ConnectionRegistry, PanelServer, SessionConfig, SessionHandler};
use panel_storage::{PanelStores, connect_pool, ensure_schema};
use panel_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let pool = connect_pool(&config.database_url, config.db_max_connections).await?;
    // 外部管理面维护的表，缺失时按需创建
    ensure_schema(&pool).await?;
    let stores = PanelStores::postgres(pool);

    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(RegistryDispatcher::new(
        registry.clone(),
        stores.messages.clone(),
    ));

    if config.poller_enabled {
        HeartbeatPoller::new(
            stores.heartbeat.clone(),
            stores.commands.clone(),
            stores.devices.clone(),
            dispatcher,
            HeartbeatPollerConfig {
                initial_delay: config.poll_initial_delay(),
                interval: config.poll_interval(),
            },
        )
        .spawn();
    } else {
        info!(target: "panel.poller", "heartbeat_poller_disabled");
    }

    let handler = Arc::new(SessionHandler::new(
        registry,
        stores,
        SessionConfig {
            read_buffer_bytes: config.read_buffer_bytes,
        },
    ));
    let server = PanelServer::new(config.tcp_addr(), handler);
    server.run().await?;
    Ok(())
}
