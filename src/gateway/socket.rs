//! Websocket transport for the gateway.
//!
//! # Responsibilities
//! - Bridge an upgraded axum socket to a gateway `Connection`
//! - Reader: feed frames to the gateway strictly in arrival order
//! - Writer: drain the outbound queue, then emit the close frame
//!
//! # Design Decisions
//! - Reader and writer stop as soon as the connection is closed from any side
//! - Transport errors close with `transport-error`; a peer close is recorded
//!   as `peer-closed` and gets no close frame back from us

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::connection::Connection;
use super::handler::Gateway;
use super::protocol::CloseReason;

/// Serve one upgraded socket until it closes.
pub async fn serve(gateway: Arc<Gateway>, socket: WebSocket, peer: SocketAddr) {
    let (conn, outbound) = gateway.accept();
    tracing::info!(connection_id = %conn.id(), peer = %peer, "Connection accepted");

    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_loop(gateway.clone(), conn.clone(), sink, outbound));

    let reason = read_loop(&gateway, &conn, stream).await;

    // Give the writer a bounded chance to flush and send the close frame.
    if !finish_writer(writer, gateway.settings().send_timeout).await {
        tracing::debug!(connection_id = %conn.id(), "Socket writer did not finish in time");
    }
    tracing::debug!(connection_id = %conn.id(), reason = reason.as_str(), "Socket task finished");
}

/// Feed inbound frames to the gateway until the connection closes.
async fn read_loop<S, E>(gateway: &Gateway, conn: &Arc<Connection>, mut stream: S) -> CloseReason
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    loop {
        tokio::select! {
            reason = conn.closed() => return reason,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => gateway.handle_frame(conn, text.as_str()).await,
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => gateway.handle_frame(conn, text).await,
                    Err(_) => gateway.close(conn, CloseReason::ProtocolError),
                },
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => gateway.close(conn, CloseReason::PeerClosed),
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %conn.id(), error = %e, "Socket read failed");
                    gateway.close(conn, CloseReason::TransportError);
                }
            },
        }
    }
}

/// Wait up to `limit` for the writer, aborting it past that. True if it finished on its own.
async fn finish_writer(mut writer: JoinHandle<()>, limit: Duration) -> bool {
    if tokio::time::timeout(limit, &mut writer).await.is_ok() {
        return true;
    }
    writer.abort();
    let _ = writer.await;
    false
}

async fn write_loop(
    gateway: Arc<Gateway>,
    conn: Arc<Connection>,
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
) {
    loop {
        tokio::select! {
            biased;
            reason = conn.closed() => {
                // Flush what was queued before the close.
                while let Ok(text) = outbound.try_recv() {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                if reason.sends_close_frame() {
                    let frame = CloseFrame {
                        code: reason.code(),
                        reason: Utf8Bytes::from_static(reason.as_str()),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                }
                let _ = sink.close().await;
                return;
            }
            payload = outbound.recv() => {
                let Some(text) = payload else { return };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::debug!(connection_id = %conn.id(), error = %e, "Socket write failed");
                    gateway.close(&conn, CloseReason::TransportError);
                }
            }
        }
    }
}
