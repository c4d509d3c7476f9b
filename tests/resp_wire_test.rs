// tests/resp_wire_test.rs

//! Drives a real server over a loopback TCP socket with literal wire bytes,
//! covering behavior that only makes sense to assert at that level rather
//! than through command semantics.

#[path = "test_server.rs"]
mod test_server;

use kvforge::config::Config;
use test_server::TestServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn read_n(stream: &mut tokio::net::TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).await.unwrap();
    buf
}

/// `*1\r\n$4\r\nping\r\n` -> `+PONG\r\n`.
#[tokio::test]
async fn ping_scenario() {
    let server = TestServer::start(Config::default()).await;
    let mut client = server.connect().await;

    client.write_all(b"*1\r\n$4\r\nping\r\n").await.unwrap();
    let reply = read_n(&mut client, 7).await;
    assert_eq!(reply, b"+PONG\r\n");
}

/// SET k foo PX 10 -> +OK; after 20ms GET k -> $-1\r\n.
#[tokio::test]
async fn expiry_round_trip_scenario() {
    let server = TestServer::start(Config::default()).await;
    let mut client = server.connect().await;

    client
        .write_all(b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$3\r\nfoo\r\n$2\r\nPX\r\n$2\r\n10\r\n")
        .await
        .unwrap();
    let reply = read_n(&mut client, 5).await;
    assert_eq!(reply, b"+OK\r\n");

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    client.write_all(b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await.unwrap();
    let reply = read_n(&mut client, 5).await;
    assert_eq!(reply, b"$-1\r\n");
}

#[tokio::test]
async fn unknown_command_gets_an_err_but_the_connection_stays_open() {
    let server = TestServer::start(Config::default()).await;
    let mut client = server.connect().await;

    client
        .write_all(b"*1\r\n$9\r\nfrobnicat\r\n")
        .await
        .unwrap();
    let mut buf = vec![0u8; 256];
    let n = client.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"-ERR"));

    client.write_all(b"*1\r\n$4\r\nping\r\n").await.unwrap();
    let reply = read_n(&mut client, 7).await;
    assert_eq!(reply, b"+PONG\r\n");
}
