//! Native-messaging framing: a 32-bit native-endian length followed by UTF-8 JSON.

use serde::Serialize;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message accepted from the browser
pub const MAX_INBOUND_BYTES: usize = 4 * 1024 * 1024;

/// Largest message the browser accepts from a host
pub const MAX_OUTBOUND_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error on native-messaging channel: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
}

/// Read one frame; `Ok(None)` means the browser closed the channel
///
/// An oversized frame is drained from the stream before the error is
/// returned, so the next read starts at a frame boundary.
///
/// # Errors
///
/// Returns an error on I/O failure, truncated frames, or oversized frames
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, HostError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = usize::try_from(u32::from_ne_bytes(len_buf)).unwrap_or(usize::MAX);
    if len > MAX_INBOUND_BYTES {
        let mut skipped = reader.take(u64::from(u32::from_ne_bytes(len_buf)));
        tokio::io::copy(&mut skipped, &mut tokio::io::sink()).await?;
        return Err(HostError::FrameTooLarge {
            len,
            max: MAX_INBOUND_BYTES,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Serialize and write one frame
///
/// # Errors
///
/// Returns an error if serialization fails, the message is too large, or the write fails
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_OUTBOUND_BYTES {
        return Err(HostError::FrameTooLarge {
            len: body.len(),
            max: MAX_OUTBOUND_BYTES,
        });
    }

    let len = u32::try_from(body.len()).map_err(|_| HostError::FrameTooLarge {
        len: body.len(),
        max: MAX_OUTBOUND_BYTES,
    })?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
