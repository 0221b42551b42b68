//! Native-messaging host
//!
//! Runs a `Guard` behind the browser's stdio channel: inbound frames are
//! `BrowserEvent`s, outbound frames are `OutboundMessage`s produced by the
//! `HostBridge` sinks.

mod bridge;
pub mod frame;

pub use bridge::{HostBridge, OutboundMessage};

use crate::error::{GuardError, Result};
use crate::guard::{Guard, Handled};
use crate::types::BrowserEvent;
use futures::FutureExt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

/// Serve one browser session until the inbound stream ends.
///
/// Each event is handled on its own task. On EOF the host waits for
/// in-flight checks, writes whatever they queued, and returns. Redirect
/// timers still pending at that point are not awaited.
pub async fn run_host<R, W>(
    guard: Arc<Guard>,
    mut reader: R,
    writer: W,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let writer_task = tokio::spawn(drain_outbound(writer, outbound, shutdown_rx));

    let mut in_flight = JoinSet::new();
    let read_result = loop {
        let event: BrowserEvent = match frame::read_message(&mut reader).await {
            Ok(Some(event)) => event,
            Ok(None) => break Ok(()),
            // The frame was consumed whole; only its JSON is bad
            Err(GuardError::Serialization(e)) => {
                tracing::warn!(error = %e, "Skipping malformed inbound message");
                continue;
            }
            Err(e) => break Err(e),
        };

        let guard = Arc::clone(&guard);
        in_flight.spawn(async move {
            let kind = event.kind();
            match guard.handle(event).await {
                Ok(Handled::Rejected(reason)) => {
                    tracing::trace!(%kind, %reason, "Event rejected");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(%kind, error = %e, "Event handling failed"),
            }
        });

        while let Some(Some(joined)) = in_flight.join_next().now_or_never() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Event task panicked");
            }
        }
    };

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Event task panicked");
        }
    }

    let _ = shutdown_tx.send(());
    match writer_task.await {
        Ok(write_result) => write_result?,
        Err(e) => tracing::error!(error = %e, "Host writer task failed"),
    }

    tracing::info!("Browser session ended");
    read_result
}

async fn drain_outbound<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            message = outbound.recv() => match message {
                Some(message) => frame::write_message(&mut writer, &message).await?,
                None => break,
            },
            _ = &mut shutdown => {
                while let Ok(message) = outbound.try_recv() {
                    frame::write_message(&mut writer, &message).await?;
                }
                break;
            }
        }
    }
    writer.flush().await?;
    Ok(())
}
