// src/server/mod.rs

//! Server startup: binds the listener, spawns the replica link if this
//! process was started with `--replicaof`, then runs the accept loop until
//! a shutdown signal arrives.

use crate::config::Config;
use crate::core::replication::spawn_replica_link_if_configured;
use crate::core::replication::snapshot::apply_snapshot;
use crate::core::state::ServerState;
use anyhow::Result;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Resolves once SIGINT/SIGTERM (Unix) or Ctrl-C (other platforms) arrives.
async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl-C, shutting down");
    }
}

/// Loads `<dir>/<dbfilename>` into database zero if the file exists. This is
/// the only load this store ever performs: persistence is write-once at
/// startup, with nothing saved back out on shutdown, so a missing file just
/// means starting empty rather than an error.
pub fn load_snapshot_file(state: &ServerState) {
    let path = Path::new(&state.config.dir).join(&state.config.dbfilename);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot file found, starting empty");
            return;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read snapshot file, starting empty");
            return;
        }
    };

    let Some(db) = state.databases.get(0) else {
        return;
    };
    match apply_snapshot(&bytes, db) {
        Ok(()) => info!(path = %path.display(), "loaded snapshot from disk"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to parse snapshot file, starting empty"),
    }
}

/// Starts the server: loads any on-disk snapshot, binds the listener,
/// launches replication if configured, and accepts connections until
/// shutdown.
pub async fn run(config: Config) -> Result<()> {
    let state = ServerState::new(config)?;
    load_snapshot_file(&state);
    let (shutdown_tx, _) = broadcast::channel(1);

    let replica_link = spawn_replica_link_if_configured(state.clone(), shutdown_tx.subscribe());

    let listener = TcpListener::bind((state.config.host.as_str(), state.config.port)).await?;
    info!(
        "kvforge listening on {}:{}",
        state.config.host, state.config.port
    );

    let mut client_tasks = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = await_shutdown_signal() => {
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, addr)) => {
                        info!(%addr, "accepted connection");
                        let state = state.clone();
                        client_tasks.spawn(async move {
                            crate::connection::run(socket, addr, state).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }

    let _ = shutdown_tx.send(());
    if let Some(handle) = replica_link {
        let _ = handle.await;
    }

    // Give in-flight connections a bounded grace period to finish their
    // current request before the process exits.
    let grace = tokio::time::sleep(std::time::Duration::from_secs(5));
    tokio::pin!(grace);
    loop {
        tokio::select! {
            _ = &mut grace => break,
            res = client_tasks.join_next() => {
                if res.is_none() {
                    break;
                }
            }
        }
    }

    Ok(())
}
