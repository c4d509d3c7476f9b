// tests/unit_info_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

fn as_string(value: RespValue) -> String {
    match value {
        RespValue::BulkString(b) => String::from_utf8(b.to_vec()).unwrap(),
        other => panic!("expected bulk string, got {other:?}"),
    }
}

#[tokio::test]
async fn info_with_no_section_reports_replication() {
    let ctx = TestContext::new().await;
    let body = as_string(ctx.run("info", &[]).await.unwrap());
    assert!(body.starts_with("# Replication\r\n"));
    assert!(body.contains("role:master"));
    assert!(body.contains("master_repl_offset:0"));
}

#[tokio::test]
async fn info_replication_section_explicit() {
    let ctx = TestContext::new().await;
    let body = as_string(ctx.run("info", &[bulk("replication")]).await.unwrap());
    assert!(body.contains("connected_slaves:0"));
    assert!(body.contains("master_replid:"));
}

#[tokio::test]
async fn info_unknown_section_is_empty() {
    let ctx = TestContext::new().await;
    let body = as_string(ctx.run("info", &[bulk("cpu")]).await.unwrap());
    assert_eq!(body, "");
}

#[tokio::test]
async fn info_rejects_extra_arguments() {
    let ctx = TestContext::new().await;
    let result = ctx.run("info", &[bulk("a"), bulk("b")]).await;
    assert!(result.is_err());
}
