// tests/unit_ping_echo_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

#[tokio::test]
async fn ping_without_message_replies_pong() {
    let ctx = TestContext::new().await;
    let result = ctx.run("ping", &[]).await.unwrap();
    assert_eq!(result, RespValue::Simple("PONG".to_string()));
}

#[tokio::test]
async fn ping_with_message_echoes_it() {
    let ctx = TestContext::new().await;
    let result = ctx.run("ping", &[bulk("hello")]).await.unwrap();
    assert_eq!(result, RespValue::BulkString("hello".into()));
}

#[tokio::test]
async fn echo_requires_exactly_one_argument() {
    let ctx = TestContext::new().await;
    assert!(ctx.run("echo", &[]).await.is_err());
    assert!(
        ctx.run("echo", &[bulk("a"), bulk("b")])
            .await
            .is_err()
    );
    let result = ctx.run("echo", &[bulk("hi")]).await.unwrap();
    assert_eq!(result, RespValue::BulkString("hi".into()));
}
