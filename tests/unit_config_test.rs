// tests/unit_config_test.rs


use kvforge::config::Config;
use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

#[test]
fn default_config_listens_on_the_standard_port() {
    assert_eq!(Config::default().port, 6379);
}

#[tokio::test]
async fn config_get_dir_returns_key_value_pair() {
    let ctx = TestContext::new().await;
    let result = ctx.run("config", &[bulk("get"), bulk("dir")]).await.unwrap();
    match result {
        RespValue::Array(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], RespValue::BulkString("dir".into()));
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[tokio::test]
async fn config_get_dbfilename_returns_key_value_pair() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("config", &[bulk("get"), bulk("dbfilename")])
        .await
        .unwrap();
    match result {
        RespValue::Array(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], RespValue::BulkString("dbfilename".into()));
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[tokio::test]
async fn config_get_unknown_key_returns_empty_array() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("config", &[bulk("get"), bulk("maxmemory")])
        .await
        .unwrap();
    assert_eq!(result, RespValue::Array(vec![]));
}

#[tokio::test]
async fn config_rejects_unsupported_subcommand() {
    let ctx = TestContext::new().await;
    let result = ctx.run("config", &[bulk("set"), bulk("dir")]).await;
    assert!(result.is_err());
}
