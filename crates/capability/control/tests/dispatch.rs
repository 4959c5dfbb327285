use domain::MessageDirection;
use panel_control::{DeviceDispatcher, DispatchError, RegistryDispatcher};
use panel_session::ConnectionRegistry;
use panel_storage::{InMemoryMessageStore, MessageStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

fn peer() -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 5], 40001))
}

#[tokio::test]
async fn unknown_device_is_not_connected() {
    let registry = Arc::new(ConnectionRegistry::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let dispatcher = RegistryDispatcher::new(registry, messages.clone());

    let err = dispatcher
        .deliver("PANEL-1", b"~L")
        .await
        .expect_err("not connected");
    assert_eq!(err, DispatchError::NotConnected("PANEL-1".to_string()));
    assert!(messages.list_messages(None, 0).await.expect("messages").is_empty());
}

#[tokio::test]
async fn delivered_bytes_reach_device_and_are_recorded_without_nul() {
    let registry = Arc::new(ConnectionRegistry::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let dispatcher = RegistryDispatcher::new(registry.clone(), messages.clone());

    let (mut device, server) = tokio::io::duplex(256);
    registry.register("PANEL-1", peer(), Box::new(server));

    dispatcher
        .deliver("PANEL-1", b"AT\r\n\x00")
        .await
        .expect("deliver");

    let mut buf = [0u8; 16];
    let n = device.read(&mut buf).await.expect("read");
    assert_eq!(&buf[..n], b"AT\r\n\x00");

    let rows = messages
        .list_messages(Some("PANEL-1"), 0)
        .await
        .expect("messages");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].direction, MessageDirection::Outgoing);
    // 设备收到完整字节，入库文本去掉 NUL
    assert_eq!(rows[0].message, "AT\r\n");
    assert!(!rows[0].message.contains('\u{0}'));
}

#[tokio::test]
async fn outgoing_text_is_lossy_for_binary_payloads() {
    let registry = Arc::new(ConnectionRegistry::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let dispatcher = RegistryDispatcher::new(registry.clone(), messages.clone());

    let (_device, server) = tokio::io::duplex(256);
    registry.register("PANEL-1", peer(), Box::new(server));

    dispatcher
        .deliver("PANEL-1", &[0x41, 0xFF])
        .await
        .expect("deliver");
    let rows = messages
        .list_messages(Some("PANEL-1"), 0)
        .await
        .expect("messages");
    assert_eq!(rows[0].message, "A\u{FFFD}");
}

#[tokio::test]
async fn write_failure_is_reported_without_record() {
    let registry = Arc::new(ConnectionRegistry::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let dispatcher = RegistryDispatcher::new(registry.clone(), messages.clone());

    let (device, server) = tokio::io::duplex(256);
    registry.register("PANEL-1", peer(), Box::new(server));
    drop(device);

    let err = dispatcher
        .deliver("PANEL-1", b"~L")
        .await
        .expect_err("peer gone");
    assert!(matches!(err, DispatchError::DeliveryFailed { .. }));
    assert!(messages.list_messages(None, 0).await.expect("messages").is_empty());
}
