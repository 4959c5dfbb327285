use panel_telemetry::{metrics, new_connection_id, record_heartbeat_reply, record_probe_failed};

#[test]
fn connection_ids_are_unique() {
    let first = new_connection_id();
    let second = new_connection_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn counters_are_monotonic() {
    let before = metrics().snapshot();
    record_heartbeat_reply();
    record_probe_failed();
    let after = metrics().snapshot();
    assert!(after.heartbeat_replies > before.heartbeat_replies);
    assert!(after.probes_failed > before.probes_failed);
}
