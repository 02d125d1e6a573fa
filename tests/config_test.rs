use shoal::{ClusterConfig, NodeDescriptor, TimingSettings};
use std::path::PathBuf;

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("cluster.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_sample_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cluster.toml");

    let config = ClusterConfig::sample();
    config.save(&path).unwrap();

    let loaded = ClusterConfig::load(&path).unwrap();
    assert_eq!(loaded.nodes.len(), 3);
    assert_eq!(loaded.nodes[0].id, 0);
    assert_eq!(loaded.nodes[0].port, 5000);
    assert_eq!(loaded.nodes[0].storage_port, 3307);
    assert_eq!(loaded.timing.heartbeat_interval_ms, 2_000);
    assert_eq!(loaded.timing.liveness_timeout_ms, 10_000);
}

#[test]
fn test_missing_config_is_fatal() {
    let path = PathBuf::from("/nonexistent/cluster.toml");
    assert!(ClusterConfig::load(&path).is_err());
}

#[test]
fn test_malformed_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "this is not toml {{{");
    assert!(ClusterConfig::load(&path).is_err());
}

#[test]
fn test_empty_node_list_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "data_dir = \"./data\"\nnodes = []\n");
    assert!(ClusterConfig::load(&path).is_err());
}

#[test]
fn test_duplicate_node_ids_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
data_dir = "./data"

[[nodes]]
id = 0
host = "127.0.0.1"
port = 5000
storage_port = 3307

[[nodes]]
id = 0
host = "127.0.0.1"
port = 5001
storage_port = 3308
"#,
    );
    assert!(ClusterConfig::load(&path).is_err());
}

#[test]
fn test_timing_defaults_apply_when_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
data_dir = "./data"

[[nodes]]
id = 0
host = "127.0.0.1"
port = 5000
storage_port = 3307
"#,
    );
    let config = ClusterConfig::load(&path).unwrap();
    assert_eq!(config.timing.heartbeat_interval_ms, 2_000);
    assert_eq!(config.timing.monitor_interval_ms, 5_000);
    assert_eq!(config.timing.liveness_timeout_ms, 10_000);
    assert_eq!(config.timing.election_timeout_ms, 2_000);
}

#[test]
fn test_view_for_splits_local_and_peers() {
    let config = ClusterConfig::sample();
    let view = config.view_for(1).unwrap();
    assert_eq!(view.self_id(), 1);
    assert_eq!(view.local.port, 5001);

    let peer_ids: Vec<u64> = view.peers.iter().map(|p| p.id).collect();
    assert_eq!(peer_ids, vec![0, 2]);
}

#[test]
fn test_view_for_unknown_id_fails() {
    let config = ClusterConfig::sample();
    assert!(config.view_for(42).is_err());
}

#[test]
fn test_higher_peers_follow_the_id_order() {
    let config = ClusterConfig::sample();

    let view = config.view_for(0).unwrap();
    let higher: Vec<u64> = view.higher_peers().iter().map(|p| p.id).collect();
    assert_eq!(higher, vec![1, 2]);

    let view = config.view_for(2).unwrap();
    assert!(view.higher_peers().is_empty());
}

#[test]
fn test_descriptor_addr_formatting() {
    let desc = NodeDescriptor {
        id: 0,
        host: "10.0.0.7".to_string(),
        port: 5000,
        storage_port: 3307,
    };
    assert_eq!(desc.addr(), "10.0.0.7:5000");
}

#[test]
fn test_timing_durations() {
    let timing = TimingSettings::default();
    assert_eq!(timing.heartbeat_interval().as_millis(), 2_000);
    assert_eq!(timing.election_timeout().as_millis(), 2_000);
    assert_eq!(timing.client_timeout().as_millis(), 5_000);
}
