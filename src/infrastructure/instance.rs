//! Single-instance rendezvous on a loopback TCP port
//!
//! The first process binds the port and becomes primary. A later process
//! fails to bind, sends `activate` to the primary and is expected to exit.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::DomainError;

pub const ACTIVATE_MESSAGE: &str = "activate";

/// How long a connected client may take to send its request line
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);

pub enum InstanceRole {
    Primary(InstanceGuard),
    /// Another instance owns the port and has been asked to come forward
    Secondary,
}

/// Held by the primary instance for as long as it runs
pub struct InstanceGuard {
    port: u16,
    activations: mpsc::Receiver<()>,
    listener_task: JoinHandle<()>,
}

impl InstanceGuard {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the next activation request from a secondary instance.
    /// Returns `None` once the listener has stopped.
    pub async fn next_activation(&mut self) -> Option<()> {
        self.activations.recv().await
    }

    /// Non-blocking variant of [`InstanceGuard::next_activation`]
    pub fn try_activation(&mut self) -> bool {
        self.activations.try_recv().is_ok()
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}

/// Become primary, or signal the running primary.
///
/// Port 0 binds an ephemeral port, which is only useful in tests.
pub async fn acquire(port: u16) -> Result<InstanceRole, DomainError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            let port = listener.local_addr()?.port();
            let (tx, rx) = mpsc::channel(8);
            let listener_task = tokio::spawn(accept_loop(listener, tx));
            tracing::debug!("Primary instance listening on 127.0.0.1:{}", port);

            Ok(InstanceRole::Primary(InstanceGuard {
                port,
                activations: rx,
                listener_task,
            }))
        }
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            signal_primary(addr).await?;
            tracing::info!("Another instance is running, asked it to activate");
            Ok(InstanceRole::Secondary)
        }
        Err(e) => Err(e.into()),
    }
}

async fn signal_primary(addr: SocketAddr) -> Result<(), DomainError> {
    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(format!("{}\n", ACTIVATE_MESSAGE).as_bytes())
        .await?;
    stream.shutdown().await?;
    Ok(())
}

async fn accept_loop(listener: TcpListener, tx: mpsc::Sender<()>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Instance listener accept failed: {}", e);
                continue;
            }
        };

        // One task per client so a silent one cannot hold up the others
        tokio::spawn(handle_client(stream, peer, tx.clone()));
    }
}

async fn handle_client(stream: TcpStream, peer: SocketAddr, tx: mpsc::Sender<()>) {
    let mut line = String::new();
    let mut reader = BufReader::new(stream);
    match tokio::time::timeout(READ_TIMEOUT, reader.read_line(&mut line)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            tracing::warn!("Could not read from {}: {}", peer, e);
            return;
        }
        Err(_) => {
            tracing::debug!("Dropped idle connection from {}", peer);
            return;
        }
    }

    if line.trim() == ACTIVATE_MESSAGE {
        tracing::debug!("Activation requested by {}", peer);
        // Fails only once the guard is gone
        let _ = tx.send(()).await;
    }
}
