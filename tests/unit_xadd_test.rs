// tests/unit_xadd_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

fn as_string(value: RespValue) -> String {
    match value {
        RespValue::BulkString(b) => String::from_utf8(b.to_vec()).unwrap(),
        other => panic!("expected bulk string, got {other:?}"),
    }
}

/// Auto-seq resolution across a mix of explicit and `*`-sequence IDs,
/// driven command-by-command.
#[tokio::test]
async fn auto_seq_resolution_scenario() {
    let ctx = TestContext::new().await;
    let add = |id: &'static str| {
        let ctx = &ctx;
        async move {
            ctx.run("xadd", &[bulk("s"), bulk(id), bulk("f"), bulk("v")])
                .await
        }
    };

    assert_eq!(as_string(add("0-*").await.unwrap()), "0-1");
    assert_eq!(as_string(add("1-*").await.unwrap()), "1-0");
    assert_eq!(as_string(add("1-*").await.unwrap()), "1-1");
    assert_eq!(as_string(add("2-1").await.unwrap()), "2-1");
    assert_eq!(as_string(add("2-*").await.unwrap()), "2-2");

    let err = add("1-2").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "ERR The ID specified in XADD is equal or smaller than the target stream top item"
    );

    let err = add("0-0").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "ERR The ID specified in XADD must be greater than 0-0"
    );
}

#[tokio::test]
async fn xadd_against_a_string_key_is_wrongtype_and_does_not_create_a_stream() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v")]).await.unwrap();
    let err = ctx
        .run("xadd", &[bulk("k"), bulk("*"), bulk("f"), bulk("v")])
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("WRONGTYPE"));
    assert_eq!(
        ctx.run("type", &[bulk("k")]).await.unwrap(),
        RespValue::Simple("string".to_string())
    );
}

#[tokio::test]
async fn xadd_requires_an_even_number_of_field_value_arguments() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("xadd", &[bulk("s"), bulk("*"), bulk("field_without_value")])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn xadd_auto_id_uses_wall_clock_milliseconds() {
    let ctx = TestContext::new().await;
    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    let id = as_string(
        ctx.run("xadd", &[bulk("s"), bulk("*"), bulk("f"), bulk("v")])
            .await
            .unwrap(),
    );
    let ms: u64 = id.split('-').next().unwrap().parse().unwrap();
    assert!(ms >= before);
}
