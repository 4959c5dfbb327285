use domain::{AliveStatus, ConnectionStatus, MessageDirection};
use panel_session::{
    ConnectionRegistry, SessionConfig, SessionEnd, SessionError, SessionHandler, SessionSummary,
    UNAUTHORIZED_MESSAGE,
};
use panel_storage::{
    AllowedClientRecord, DeviceStatusStore, InMemoryAllowListStore, InMemoryCommandCatalogStore,
    InMemoryDeviceStore, InMemoryMessageStore, MessageStore, PanelStores,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

struct Fixture {
    registry: Arc<ConnectionRegistry>,
    handler: Arc<SessionHandler>,
    devices: Arc<InMemoryDeviceStore>,
    messages: Arc<InMemoryMessageStore>,
}

fn fixture(clients: Vec<AllowedClientRecord>) -> Fixture {
    let allow_list = Arc::new(InMemoryAllowListStore::with_clients(clients));
    let devices = Arc::new(InMemoryDeviceStore::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let stores = PanelStores {
        allow_list: allow_list.clone(),
        heartbeat: allow_list,
        devices: devices.clone(),
        messages: messages.clone(),
        commands: Arc::new(InMemoryCommandCatalogStore::new()),
    };
    let registry = Arc::new(ConnectionRegistry::new());
    let handler = Arc::new(SessionHandler::new(
        registry.clone(),
        stores,
        SessionConfig::default(),
    ));
    Fixture {
        registry,
        handler,
        devices,
        messages,
    }
}

fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn open_session(
    fixture: &Fixture,
    port: u16,
) -> (DuplexStream, JoinHandle<Result<SessionSummary, SessionError>>) {
    open_session_with_capacity(fixture, port, 1024)
}

fn open_session_with_capacity(
    fixture: &Fixture,
    port: u16,
    capacity: usize,
) -> (DuplexStream, JoinHandle<Result<SessionSummary, SessionError>>) {
    let (device, server) = tokio::io::duplex(capacity);
    let (reader, writer) = tokio::io::split(server);
    let handler = fixture.handler.clone();
    let task = tokio::spawn(async move { handler.handle(reader, Box::new(writer), peer(port)).await });
    (device, task)
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..400 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

async fn wait_registered(registry: &Arc<ConnectionRegistry>, device_id: &str, port: u16) {
    let registry = registry.clone();
    let device_id = device_id.to_string();
    eventually(move || {
        let matches = registry
            .get(&device_id)
            .is_some_and(|handle| handle.peer.port() == port);
        async move { matches }
    })
    .await;
}

async fn wait_message_count(messages: &Arc<InMemoryMessageStore>, device_id: &str, count: usize) {
    eventually(|| {
        let messages = messages.clone();
        let device_id = device_id.to_string();
        async move {
            messages
                .list_messages(Some(&device_id), 0)
                .await
                .expect("messages")
                .len()
                == count
        }
    })
    .await;
}

async fn wait_alive_status(
    devices: &Arc<InMemoryDeviceStore>,
    device_id: &str,
    expected: Option<AliveStatus>,
) {
    eventually(|| {
        let devices = devices.clone();
        let device_id = device_id.to_string();
        async move {
            devices
                .find_device(&device_id)
                .await
                .expect("device query")
                .is_some_and(|device| device.alive_status == expected)
        }
    })
    .await;
}

#[tokio::test]
async fn unknown_identifier_is_rejected_with_system_record() {
    let fixture = fixture(vec![AllowedClientRecord::new("PANEL-1")]);
    let (mut device, task) = open_session(&fixture, 40001);

    device.write_all(b"GHOST\r\n").await.expect("write id");
    let result = task.await.expect("join");
    match result {
        Err(SessionError::HandshakeRejected(id)) => assert_eq!(id, "GHOST"),
        other => panic!("unexpected result: {other:?}"),
    }

    let rows = fixture
        .messages
        .list_messages(Some("GHOST"), 0)
        .await
        .expect("messages");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].direction, MessageDirection::System);
    assert_eq!(rows[0].message, UNAUTHORIZED_MESSAGE);
    assert_eq!(rows[0].remote_ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(rows[0].remote_port, Some(40001));

    assert!(fixture.registry.is_empty());
    assert!(fixture.devices.find_device("GHOST").await.expect("query").is_none());

    // 连接已被关闭
    let mut buf = [0u8; 8];
    assert_eq!(device.read(&mut buf).await.expect("read"), 0);
}

#[tokio::test]
async fn empty_or_missing_identifier_ends_without_records() {
    let fixture = fixture(vec![AllowedClientRecord::new("PANEL-1")]);

    let (mut device, task) = open_session(&fixture, 40001);
    device.write_all(b"  \r\n").await.expect("write blank");
    assert!(matches!(
        task.await.expect("join"),
        Err(SessionError::EmptyIdentifier)
    ));

    let (device, task) = open_session(&fixture, 40002);
    drop(device);
    assert!(matches!(
        task.await.expect("join"),
        Err(SessionError::ClosedBeforeIdentifier)
    ));

    assert!(fixture.messages.list_messages(None, 0).await.expect("messages").is_empty());
    assert!(fixture.devices.list_devices().await.expect("devices").is_empty());
    assert!(fixture.registry.is_empty());
}

#[tokio::test]
async fn active_session_records_messages_and_heartbeats() {
    let fixture = fixture(vec![
        AllowedClientRecord::new("PANEL-1").with_heartbeat(7, "ALIVE"),
    ]);
    let (mut device, task) = open_session(&fixture, 40001);

    device.write_all(b"PANEL-1\r\n").await.expect("write id");
    wait_registered(&fixture.registry, "PANEL-1", 40001).await;

    let record = fixture
        .devices
        .find_device("PANEL-1")
        .await
        .expect("query")
        .expect("device");
    assert_eq!(record.status, Some(ConnectionStatus::Connected));
    assert_eq!(record.ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(record.port, Some(40001));

    // 模拟轮询器已发出探测
    fixture
        .devices
        .set_alive_status("PANEL-1", AliveStatus::Pending)
        .await
        .expect("pending");

    device.write_all(b"ALIVE\x00").await.expect("write reply");
    wait_alive_status(&fixture.devices, "PANEL-1", Some(AliveStatus::Connected)).await;
    assert!(
        fixture
            .messages
            .list_messages(Some("PANEL-1"), 0)
            .await
            .expect("messages")
            .is_empty()
    );

    device.write_all(b"ZONE 3 OPEN\r\n").await.expect("write message");
    wait_message_count(&fixture.messages, "PANEL-1", 1).await;

    device.write_all(b"\x07").await.expect("write bell");
    wait_message_count(&fixture.messages, "PANEL-1", 2).await;

    let rows = fixture
        .messages
        .list_messages(Some("PANEL-1"), 0)
        .await
        .expect("messages");
    let texts: Vec<&str> = rows.iter().map(|row| row.message.as_str()).collect();
    assert!(texts.contains(&"ZONE 3 OPEN"));
    assert!(texts.contains(&"SIRENAS ACTIVADAS"));
    assert!(rows.iter().all(|row| row.direction == MessageDirection::Incoming));

    drop(device);
    let summary = task.await.expect("join").expect("session");
    assert_eq!(summary.device_id, "PANEL-1");
    assert_eq!(summary.end, SessionEnd::PeerClosed);
    assert!(summary.was_current);

    let record = fixture
        .devices
        .find_device("PANEL-1")
        .await
        .expect("query")
        .expect("device");
    assert_eq!(record.status, Some(ConnectionStatus::Disconnected));
    assert!(record.alive_status.is_none());
    assert!(!fixture.registry.is_connected("PANEL-1"));
}

#[tokio::test]
async fn heartbeat_text_is_a_message_when_checks_disabled() {
    let fixture = fixture(vec![AllowedClientRecord::new("PANEL-2")]);
    let (mut device, task) = open_session(&fixture, 40002);

    device.write_all(b"PANEL-2").await.expect("write id");
    wait_registered(&fixture.registry, "PANEL-2", 40002).await;

    device.write_all(b"ALIVE").await.expect("write text");
    wait_message_count(&fixture.messages, "PANEL-2", 1).await;

    let record = fixture
        .devices
        .find_device("PANEL-2")
        .await
        .expect("query")
        .expect("device");
    assert!(record.alive_status.is_none());

    drop(device);
    task.await.expect("join").expect("session");
}

#[tokio::test]
async fn superseded_session_leaves_newer_session_in_place() {
    let fixture = fixture(vec![AllowedClientRecord::new("PANEL-1")]);

    let (mut first, first_task) = open_session(&fixture, 41001);
    first.write_all(b"PANEL-1").await.expect("first id");
    wait_registered(&fixture.registry, "PANEL-1", 41001).await;

    let (mut second, second_task) = open_session(&fixture, 41002);
    second.write_all(b"PANEL-1").await.expect("second id");
    wait_registered(&fixture.registry, "PANEL-1", 41002).await;

    drop(first);
    let summary = first_task.await.expect("join").expect("first session");
    assert!(!summary.was_current);

    let current = fixture.registry.get("PANEL-1").expect("still registered");
    assert_eq!(current.peer.port(), 41002);
    let record = fixture
        .devices
        .find_device("PANEL-1")
        .await
        .expect("query")
        .expect("device");
    assert_eq!(record.status, Some(ConnectionStatus::Connected));
    assert_eq!(record.port, Some(41002));

    drop(second);
    let summary = second_task.await.expect("join").expect("second session");
    assert!(summary.was_current);
    assert!(fixture.registry.is_empty());
    let record = fixture
        .devices
        .find_device("PANEL-1")
        .await
        .expect("query")
        .expect("device");
    assert_eq!(record.status, Some(ConnectionStatus::Disconnected));
}

#[tokio::test]
async fn stalled_write_does_not_block_session_cleanup() {
    let fixture = fixture(vec![AllowedClientRecord::new("PANEL-1")]);
    let (mut device, task) = open_session_with_capacity(&fixture, 42001, 64);

    device.write_all(b"PANEL-1").await.expect("write id");
    wait_registered(&fixture.registry, "PANEL-1", 42001).await;

    // 设备不再读取，写入卡在背压上
    let handle = fixture.registry.get("PANEL-1").expect("registered");
    let stalled = tokio::spawn(async move { handle.write_all(&[b'X'; 4096]).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!stalled.is_finished());

    device.shutdown().await.expect("half close");
    let summary = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("cleanup finished")
        .expect("join")
        .expect("session");
    assert_eq!(summary.end, SessionEnd::PeerClosed);
    assert!(summary.was_current);
    assert!(!fixture.registry.is_connected("PANEL-1"));

    let record = fixture
        .devices
        .find_device("PANEL-1")
        .await
        .expect("query")
        .expect("device");
    assert_eq!(record.status, Some(ConnectionStatus::Disconnected));
    assert!(record.alive_status.is_none());

    let write_result = tokio::time::timeout(Duration::from_secs(2), stalled)
        .await
        .expect("write released")
        .expect("join");
    assert!(write_result.is_err());
}
