//! A single MLLP connection.
//!
//! Wraps any byte stream with the half-duplex contract the sender relies on:
//! full writes, one bounded read per response, and idempotent close.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::core::constants::DEFAULT_RECV_BUFFER_SIZE;
use crate::core::{TransportError, TransportResult};

/// An open connection to an MLLP listener.
///
/// Owns the stream exclusively. Reads go into a fixed receive buffer and
/// return only the bytes actually read.
#[derive(Debug)]
pub struct MllpConnection<S> {
    /// The underlying stream, `None` once closed.
    stream: Option<S>,
    /// Receive buffer for one response.
    recv_buffer: Vec<u8>,
    /// Deadline applied to every read, if armed.
    read_deadline: Option<Duration>,
}

impl<S> MllpConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an open stream.
    pub fn new(stream: S) -> Self {
        Self::with_recv_buffer_size(stream, DEFAULT_RECV_BUFFER_SIZE)
    }

    /// Wrap an open stream with a custom receive buffer size.
    pub fn with_recv_buffer_size(stream: S, size: usize) -> Self {
        Self {
            stream: Some(stream),
            recv_buffer: vec![0u8; size.max(1)],
            read_deadline: None,
        }
    }

    /// Check if the connection has not been closed.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Receive buffer capacity.
    pub fn recv_buffer_size(&self) -> usize {
        self.recv_buffer.len()
    }

    /// Arm a deadline for reads. A zero duration disarms it.
    pub fn set_read_deadline(&mut self, timeout: Duration) {
        self.read_deadline = (!timeout.is_zero()).then_some(timeout);
        trace!(deadline = ?self.read_deadline, "read deadline set");
    }

    /// Currently armed read deadline.
    pub fn read_deadline(&self) -> Option<Duration> {
        self.read_deadline
    }

    /// Write the whole buffer and flush it.
    ///
    /// A write that cannot complete is an error; partial frames are never
    /// left behind silently.
    pub async fn write(&mut self, data: &[u8]) -> TransportResult<usize> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.write_all(data).await?;
        stream.flush().await?;
        trace!(bytes = data.len(), "frame written");
        Ok(data.len())
    }

    /// Issue one read and return the bytes it produced.
    ///
    /// Does not loop to fill the buffer; one read is one response.
    pub async fn read(&mut self) -> TransportResult<&[u8]> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let len = match self.read_deadline {
            Some(limit) => tokio::time::timeout(limit, stream.read(&mut self.recv_buffer))
                .await
                .map_err(|_| TransportError::Timeout(limit))??,
            None => stream.read(&mut self.recv_buffer).await?,
        };

        if len == 0 {
            return Err(TransportError::ConnectionClosed);
        }

        trace!(bytes = len, "response read");
        Ok(&self.recv_buffer[..len])
    }

    /// Shut the stream down.
    ///
    /// Idempotent. Shutdown errors are logged and swallowed. Returns `true`
    /// if this call closed the stream.
    pub async fn close(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };

        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "error while closing connection");
        }
        true
    }
}
