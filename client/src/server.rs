//! The Client Channel's connection-handling surface (§5 "one thread per accepted connection,
//! hard cap, default 10"). Grounded on `ff_data_server::async_listener`'s accept-loop and
//! length-delimited read-loop shape, adapted to this protocol's `0x04`-terminated framing.

use crate::error::ClientChannelError;
use crate::protocol::ClientRequest;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Semaphore};

use crate::protocol::{ClientResponse, FRAME_TERMINATOR};

/// Hard cap on concurrently accepted connections (§5), unless overridden at construction.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// One parsed request, paired with a channel the handler uses to address its response back to
/// the originating socket (§5: "posts a response back addressed by socket id").
#[derive(Debug)]
pub struct PendingRequest {
    pub request: ClientRequest,
    pub peer: SocketAddr,
    pub reply: oneshot::Sender<ClientResponse>,
}

/// Accepts TCP connections and turns each into a stream of [`PendingRequest`]s posted to
/// `outbound`, writing back whatever response arrives on each request's reply channel.
#[derive(Debug)]
pub struct ClientChannel {
    listener: TcpListener,
    semaphore: Arc<Semaphore>,
    outbound: mpsc::UnboundedSender<PendingRequest>,
}

impl ClientChannel {
    pub async fn bind(
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<PendingRequest>,
    ) -> std::io::Result<Self> {
        Self::bind_with_capacity(addr, outbound, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn bind_with_capacity(
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<PendingRequest>,
        max_connections: usize,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            semaphore: Arc::new(Semaphore::new(max_connections)),
            outbound,
        })
    }

    /// Runs the accept loop until the listener errors. Each accepted connection is handled on
    /// its own task, bounded by `max_connections` permits.
    pub async fn run(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    tracing::warn!(%error, "client channel failed to accept connection");
                    continue;
                }
            };

            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let outbound = self.outbound.clone();

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(error) = handle_connection(stream, peer, outbound).await {
                    tracing::warn!(%peer, %error, "client channel connection ended with an error");
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    outbound: mpsc::UnboundedSender<PendingRequest>,
) -> Result<(), ClientChannelError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        let bytes_read = reader.read_until(FRAME_TERMINATOR, &mut frame).await?;
        if bytes_read == 0 {
            return Ok(());
        }
        if frame.last() == Some(&FRAME_TERMINATOR) {
            frame.pop();
        }
        if frame.is_empty() {
            continue;
        }

        let request: ClientRequest = serde_json::from_slice(&frame)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        if outbound
            .send(PendingRequest {
                request,
                peer,
                reply: reply_tx,
            })
            .is_err()
        {
            return Ok(());
        }

        let response = reply_rx.await.map_err(|_| ClientChannelError::ReplyDropped)?;
        write_half.write_all(&response.encode()?).await?;
    }
}
