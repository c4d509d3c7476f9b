// tests/unit_snapshot_load_test.rs

//! Startup disk-snapshot loading: `<dir>/<dbfilename>` is read once when the
//! server starts and applied to database zero, the "load" half of the
//! write-once-at-startup persistence model.

#[path = "test_server.rs"]
mod test_server;

use kvforge::config::Config;
use kvforge::core::replication::snapshot::encode_snapshot;
use kvforge::core::storage::Database;
use test_server::TestServer;

#[tokio::test]
async fn server_loads_existing_snapshot_file_at_startup() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let seed_db = Database::new();
    seed_db.strings.set(
        &seed_db.key_types,
        bytes::Bytes::from_static(b"foo"),
        bytes::Bytes::from_static(b"bar"),
        None,
    );
    let payload = encode_snapshot(&seed_db);
    std::fs::write(dir.path().join("dump.kvforge"), &payload).expect("failed to write snapshot file");

    let mut config = Config::default();
    config.dir = dir.path().to_string_lossy().to_string();
    config.dbfilename = "dump.kvforge".to_string();

    let server = TestServer::start(config).await;
    let db = server.state.databases.get(0).unwrap();
    assert_eq!(
        db.strings.get(&db.key_types, &bytes::Bytes::from_static(b"foo")),
        Some(bytes::Bytes::from_static(b"bar"))
    );
}

#[tokio::test]
async fn server_starts_empty_when_no_snapshot_file_exists() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let mut config = Config::default();
    config.dir = dir.path().to_string_lossy().to_string();
    config.dbfilename = "does-not-exist.kvforge".to_string();

    let server = TestServer::start(config).await;
    let db = server.state.databases.get(0).unwrap();
    assert!(db.strings.keys(&db.key_types, "*").is_empty());
}
