// tests/unit_select_test.rs

//! `SELECT` mutates connection-local session state rather than running
//! through the generic `Command` dispatch path, so these tests drive the
//! router directly instead of going through `TestContext::run`.


use kvforge::config::Config;
use kvforge::connection::SessionState;
use kvforge::core::handler::router::{RouteOutcome, dispatch_client};
use kvforge::core::protocol::{RespFrame, RespValue};
use kvforge::core::state::ServerState;
use test_helpers::bulk;

fn command_frame(name: &str, args: &[RespFrame]) -> RespFrame {
    let mut items = vec![RespFrame::bulk(name.to_string())];
    items.extend_from_slice(args);
    RespFrame::array(items)
}

/// These tests never actually write a reply to a socket, so a loopback
/// address and a writer over a throwaway local connection stand in for
/// the real per-connection values `dispatch_client` normally receives.
async fn fake_writer_and_addr() -> (
    std::net::SocketAddr,
    std::sync::Arc<tokio::sync::Mutex<tokio::net::tcp::OwnedWriteHalf>>,
) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connect = tokio::net::TcpStream::connect(addr);
    let (accept_result, connect_result) = tokio::join!(listener.accept(), connect);
    let (stream, peer_addr) = accept_result.unwrap();
    connect_result.unwrap();
    let (_, write_half) = stream.into_split();
    (peer_addr, std::sync::Arc::new(tokio::sync::Mutex::new(write_half)))
}

async fn dispatch(
    state: &std::sync::Arc<ServerState>,
    session: &mut SessionState,
    name: &str,
    args: &[RespFrame],
) -> Result<RouteOutcome, kvforge::StoreError> {
    let frame = command_frame(name, args);
    let (addr, writer) = fake_writer_and_addr().await;
    dispatch_client(state, session, addr, &writer, name, args, &frame).await
}

#[tokio::test]
async fn select_switches_the_active_database() {
    let mut config = Config::default();
    config.databases = 4;
    let state = ServerState::new(config).unwrap();
    let mut session = SessionState::new();

    let reply = dispatch(&state, &mut session, "select", &[bulk("1")])
        .await
        .unwrap();
    assert!(matches!(reply, RouteOutcome::Reply(RespValue::Simple(s)) if s == "OK"));
    assert_eq!(session.current_db_index, 1);

    // A key set while SELECTed to db 1 is invisible from db 0.
    dispatch(&state, &mut session, "set", &[bulk("k"), bulk("v")])
        .await
        .unwrap();
    session.current_db_index = 0;
    let reply = dispatch(&state, &mut session, "get", &[bulk("k")])
        .await
        .unwrap();
    assert!(matches!(reply, RouteOutcome::Reply(RespValue::Null)));
}

#[tokio::test]
async fn select_out_of_range_is_an_error() {
    let mut config = Config::default();
    config.databases = 2;
    let state = ServerState::new(config).unwrap();
    let mut session = SessionState::new();

    let result = dispatch(&state, &mut session, "select", &[bulk("99")]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn select_requires_integer_argument() {
    let mut config = Config::default();
    config.databases = 2;
    let state = ServerState::new(config).unwrap();
    let mut session = SessionState::new();

    let result = dispatch(&state, &mut session, "select", &[bulk("nope")]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unknown_command_reports_its_name() {
    let config = Config::default();
    let state = ServerState::new(config).unwrap();
    let mut session = SessionState::new();

    let err = dispatch(&state, &mut session, "frobnicate", &[bulk("x")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("frobnicate"));
}
