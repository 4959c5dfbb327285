use domain::{CommandDefinition, CommandEncoding};
use panel_storage::{
    AllowListStore, AllowedClientRecord, CommandCatalogStore, HeartbeatStore,
    HeartbeatTarget, InMemoryAllowListStore, InMemoryCommandCatalogStore,
};

#[tokio::test]
async fn disabled_commands_are_hidden() {
    let store = InMemoryCommandCatalogStore::new();
    let mut reset = CommandDefinition::new(1, "RESET", "~N", CommandEncoding::Ascii);
    reset.admin_only = true;
    let mut poll = CommandDefinition::new(2, "POLL", "01 03", CommandEncoding::Hex);
    poll.enabled = false;
    store.insert_command(reset).expect("insert");
    store.insert_command(poll).expect("insert");
    store.link_command("PANEL-1", 1, true).expect("link");
    store.link_command("PANEL-1", 2, true).expect("link");

    assert!(store.find_enabled_command(1).await.expect("find").is_some());
    assert!(store.find_enabled_command(2).await.expect("find").is_none());

    let commands = store.list_device_commands("PANEL-1").await.expect("list");
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].name, "RESET");
}

#[tokio::test]
async fn compatibility_requires_enabled_link() {
    let store = InMemoryCommandCatalogStore::new();
    store
        .insert_command(CommandDefinition::new(1, "ACK", "~L", CommandEncoding::Ascii))
        .expect("insert");
    store.link_command("PANEL-1", 1, false).expect("link");

    assert!(!store.is_command_supported("PANEL-1", 1).await.expect("query"));
    assert!(!store.is_command_supported("PANEL-2", 1).await.expect("query"));
    store.link_command("PANEL-1", 1, true).expect("link");
    assert!(store.is_command_supported("PANEL-1", 1).await.expect("query"));
}

#[tokio::test]
async fn expected_reply_requires_heartbeat_enabled() {
    let store = InMemoryAllowListStore::with_clients(vec![
        AllowedClientRecord::new("PANEL-1")
            .with_description("Warehouse")
            .with_heartbeat(7, "ALIVE"),
        AllowedClientRecord {
            alive_enabled: false,
            ..AllowedClientRecord::new("PANEL-2").with_heartbeat(7, "ALIVE")
        },
    ]);

    assert!(store.is_allowed("PANEL-1").await.expect("query"));
    assert!(!store.is_allowed("PANEL-3").await.expect("query"));
    assert_eq!(
        store.find_description("PANEL-1").await.expect("query").as_deref(),
        Some("Warehouse")
    );
    assert_eq!(
        store.expected_reply("PANEL-1").await.expect("query").as_deref(),
        Some("ALIVE")
    );
    assert!(store.expected_reply("PANEL-2").await.expect("query").is_none());

    let targets = store.list_probe_targets().await.expect("targets");
    assert_eq!(
        targets,
        vec![HeartbeatTarget {
            client_id: "PANEL-1".to_string(),
            command_id: 7,
        }]
    );
}
