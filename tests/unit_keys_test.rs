// tests/unit_keys_test.rs


use kvforge::core::protocol::RespValue;
use test_helpers::{TestContext, bulk};

fn as_sorted_strings(value: RespValue) -> Vec<String> {
    match value {
        RespValue::Array(items) => {
            let mut out: Vec<String> = items
                .into_iter()
                .map(|v| match v {
                    RespValue::BulkString(b) => String::from_utf8(b.to_vec()).unwrap(),
                    other => panic!("expected bulk string, got {other:?}"),
                })
                .collect();
            out.sort();
            out
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[tokio::test]
async fn keys_star_matches_every_present_key() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("foo"), bulk("1")]).await.unwrap();
    ctx.run("set", &[bulk("bar"), bulk("2")]).await.unwrap();
    let result = ctx.run("keys", &[bulk("*")]).await.unwrap();
    assert_eq!(as_sorted_strings(result), vec!["bar", "foo"]);
}

#[tokio::test]
async fn keys_glob_prefix_filters() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("user:1"), bulk("a")]).await.unwrap();
    ctx.run("set", &[bulk("user:2"), bulk("b")]).await.unwrap();
    ctx.run("set", &[bulk("session:1"), bulk("c")]).await.unwrap();
    let result = ctx.run("keys", &[bulk("user:*")]).await.unwrap();
    assert_eq!(as_sorted_strings(result), vec!["user:1", "user:2"]);
}

#[tokio::test]
async fn keys_excludes_expired_entries() {
    let ctx = TestContext::new().await;
    ctx.run("set", &[bulk("k"), bulk("v"), bulk("PX"), bulk("5")])
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let result = ctx.run("keys", &[bulk("*")]).await.unwrap();
    assert_eq!(as_sorted_strings(result), Vec::<String>::new());
}
