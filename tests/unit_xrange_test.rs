// tests/unit_xrange_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

#[tokio::test]
async fn xrange_with_wildcards_returns_every_entry_in_order() {
    let ctx = TestContext::new().await;
    ctx.run("xadd", &[bulk("s"), bulk("0-1"), bulk("f"), bulk("v")])
        .await
        .unwrap();
    ctx.run("xadd", &[bulk("s"), bulk("1-1"), bulk("f"), bulk("v")])
        .await
        .unwrap();

    let result = ctx.run("xrange", &[bulk("s"), bulk("-"), bulk("+")]).await.unwrap();
    let RespValue::Array(entries) = result else {
        panic!("expected array");
    };
    assert_eq!(entries.len(), 2);

    let RespValue::Array(first) = &entries[0] else {
        panic!("expected nested array");
    };
    assert_eq!(first[0], RespValue::BulkString("0-1".into()));
    assert_eq!(
        first[1],
        RespValue::Array(vec![
            RespValue::BulkString("f".into()),
            RespValue::BulkString("v".into()),
        ])
    );

    let RespValue::Array(second) = &entries[1] else {
        panic!("expected nested array");
    };
    assert_eq!(second[0], RespValue::BulkString("1-1".into()));
}

#[tokio::test]
async fn xrange_partial_ids_default_the_missing_sequence() {
    let ctx = TestContext::new().await;
    ctx.run("xadd", &[bulk("s"), bulk("5-0"), bulk("f"), bulk("v")])
        .await
        .unwrap();
    ctx.run("xadd", &[bulk("s"), bulk("5-1"), bulk("f"), bulk("v")])
        .await
        .unwrap();
    ctx.run("xadd", &[bulk("s"), bulk("6-0"), bulk("f"), bulk("v")])
        .await
        .unwrap();

    // "5" as a start bound means "5-0"; "5" as an end bound means "5-<max>".
    let result = ctx.run("xrange", &[bulk("s"), bulk("5"), bulk("5")]).await.unwrap();
    let RespValue::Array(entries) = result else {
        panic!("expected array");
    };
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn xrange_on_missing_stream_is_an_empty_array() {
    let ctx = TestContext::new().await;
    let result = ctx
        .run("xrange", &[bulk("missing"), bulk("-"), bulk("+")])
        .await
        .unwrap();
    assert_eq!(result, RespValue::Array(vec![]));
}

#[tokio::test]
async fn xrange_against_a_string_key_is_wrongtype() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v")]).await.unwrap();
    let err = ctx
        .run("xrange", &[bulk("k"), bulk("-"), bulk("+")])
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("WRONGTYPE"));
}
