// tests/unit_set_get_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

#[tokio::test]
async fn get_missing_key_returns_null() {
    let ctx = TestContext::new().await;
    let result = ctx.run("get", &[bulk("missing")]).await.unwrap();
    assert_eq!(result, RespValue::Null);
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let ctx = TestContext::new().await;
    let set = ctx.run("set", &[bulk("k"), bulk("v")]).await.unwrap();
    assert_eq!(set, RespValue::Simple("OK".to_string()));
    let got = ctx.run("get", &[bulk("k")]).await.unwrap();
    assert_eq!(got, RespValue::BulkString("v".into()));
}

#[tokio::test]
async fn repeated_set_overwrites_value_and_expiry() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v1"), bulk("EX"), bulk("100")])
        .await
        .unwrap();
    ctx.run("set", &[bulk("k"), bulk("v2")]).await.unwrap();
    let got = ctx.run("get", &[bulk("k")]).await.unwrap();
    assert_eq!(got, RespValue::BulkString("v2".into()));
}

#[tokio::test]
async fn set_nx_fails_when_key_exists() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v1")]).await.unwrap();
    let result = ctx
        .run("set", &[bulk("k"), bulk("v2"), bulk("NX")])
        .await
        .unwrap();
    assert_eq!(result, RespValue::Null);
    let got = ctx.run("get", &[bulk("k")]).await.unwrap();
    assert_eq!(got, RespValue::BulkString("v1".into()));
}

#[tokio::test]
async fn set_xx_fails_when_key_absent() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("set", &[bulk("missing"), bulk("v"), bulk("XX")])
        .await
        .unwrap();
    assert_eq!(result, RespValue::Null);
}

#[tokio::test]
async fn set_nx_and_xx_together_is_a_syntax_error() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("set", &[bulk("k"), bulk("v"), bulk("NX"), bulk("XX")])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn set_px_expiry_makes_key_absent_after_it_passes() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v"), bulk("PX"), bulk("10")])
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let got = ctx.run("get", &[bulk("k")]).await.unwrap();
    assert_eq!(got, RespValue::Null);
}

#[tokio::test]
async fn get_against_stream_key_returns_wrongtype() {
    let ctx = TestContext::new().await;
    ctx.run(
        "xadd",
        &[bulk("s"), bulk("*"), bulk("field"), bulk("value")],
    )
    .await
    .unwrap();
    let err = ctx.run("get", &[bulk("s")]).await.unwrap_err();
    assert!(err.to_string().starts_with("WRONGTYPE"));
}
