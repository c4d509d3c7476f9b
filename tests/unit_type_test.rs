// tests/unit_type_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

#[tokio::test]
async fn type_of_missing_key_is_none() {
    let ctx = TestContext::new().await;
    let result = ctx.run("type", &[bulk("missing")]).await.unwrap();
    assert_eq!(result, RespValue::Simple("none".to_string()));
}

#[tokio::test]
async fn type_of_string_key_is_string() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v")]).await.unwrap();
    let result = ctx.run("type", &[bulk("k")]).await.unwrap();
    assert_eq!(result, RespValue::Simple("string".to_string()));
}

#[tokio::test]
async fn type_of_stream_key_is_stream() {
    let ctx = TestContext::new().await;
    ctx.run("xadd", &[bulk("s"), bulk("*"), bulk("f"), bulk("v")])
        .await
        .unwrap();
    let result = ctx.run("type", &[bulk("s")]).await.unwrap();
    assert_eq!(result, RespValue::Simple("stream".to_string()));
}
