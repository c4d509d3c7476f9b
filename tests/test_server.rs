// tests/test_server.rs

//! A real in-process TCP listener wired to the connection and replication
//! machinery, for tests that need to exercise literal wire bytes or a
//! genuine master/replica pair rather than driving commands in-process
//! through `TestContext`.

use kvforge::config::Config;
use kvforge::core::replication::spawn_replica_link_if_configured;
use kvforge::core::state::ServerState;
use kvforge::server::load_snapshot_file;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
    _accept_task: tokio::task::JoinHandle<()>,
    _replica_task: Option<tokio::task::JoinHandle<()>>,
    _shutdown_tx: broadcast::Sender<()>,
}

impl TestServer {
    /// Binds an ephemeral port, patches `config.port` to match it (so a
    /// replica started against this server reports the right listening
    /// port during its handshake), then accepts connections in the
    /// background for the lifetime of the returned handle.
    pub async fn start(mut config: Config) -> Self {
        let listener = TcpListener::bind((config.host.as_str(), 0))
            .await
            .expect("failed to bind ephemeral test port");
        let addr = listener.local_addr().expect("listener has a local addr");
        config.port = addr.port();

        let state = ServerState::new(config).expect("failed to initialize server state");
        load_snapshot_file(&state);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let replica_task = spawn_replica_link_if_configured(state.clone(), shutdown_rx);

        let accept_state = state.clone();
        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, peer)) => {
                        let state = accept_state.clone();
                        tokio::spawn(async move {
                            kvforge::connection::run(socket, peer, state).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            addr,
            state,
            _accept_task: accept_task,
            _replica_task: replica_task,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub async fn connect(&self) -> tokio::net::TcpStream {
        tokio::net::TcpStream::connect(self.addr)
            .await
            .expect("failed to connect to test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self._shutdown_tx.send(());
    }
}
