//! TCP relay for SOCKS5 CONNECT
//!
//! Copies bytes verbatim between the client and the destination. When one
//! direction finishes (EOF or error) both write halves are shut down and
//! both transports are dropped, so neither side is left half-open.

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Relay data bidirectionally between client and destination
///
/// `pending` holds client bytes that arrived before relaying started; they
/// are written to the destination first.
pub async fn relay_tcp<A, B>(client: A, target: B, pending: Bytes) -> Result<()>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut target_read, mut target_write) = tokio::io::split(target);

    if !pending.is_empty() {
        debug!("Forwarding {} buffered bytes", pending.len());
        target_write
            .write_all(&pending)
            .await
            .with_context(|| "Failed to forward buffered client data")?;
    }

    let client_to_target = tokio::io::copy(&mut client_read, &mut target_write);
    let target_to_client = tokio::io::copy(&mut target_read, &mut client_write);

    tokio::select! {
        result = client_to_target => {
            match result {
                Ok(bytes) => debug!("client->target finished: {} bytes", bytes),
                Err(e) => debug!("client->target error: {}", e),
            }
        }
        result = target_to_client => {
            match result {
                Ok(bytes) => debug!("target->client finished: {} bytes", bytes),
                Err(e) => debug!("target->client error: {}", e),
            }
        }
    }

    if let Err(e) = client_write.shutdown().await {
        debug!("client shutdown error: {}", e);
    }
    if let Err(e) = target_write.shutdown().await {
        debug!("target shutdown error: {}", e);
    }

    Ok(())
}
