//! Error types for MLLP sending.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced when unwrapping a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than the MLLP envelope.
    #[error("frame too short: expected at least {minimum} bytes, got {actual}")]
    TooShort {
        /// Minimum frame length.
        minimum: usize,
        /// Actual frame length.
        actual: usize,
    },
}

/// Errors in the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Address resolution or TCP connect failed.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Target `host:port`.
        address: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Dial did not complete in time.
    #[error("connecting to {address} timed out after {timeout:?}")]
    ConnectTimeout {
        /// Target `host:port`.
        address: String,
        /// Configured dial timeout.
        timeout: Duration,
    },

    /// TLS handshake failed.
    #[error("TLS handshake with {address} failed: {source}")]
    Tls {
        /// Target `host:port`.
        address: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Read deadline exceeded.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Peer closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Operation on a connection that was already closed locally.
    #[error("connection already closed")]
    NotConnected,

    /// I/O error (socket operations).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Check if this error happened while establishing the connection.
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            TransportError::Connect { .. }
                | TransportError::ConnectTimeout { .. }
                | TransportError::Tls { .. }
        )
    }

    /// Check if this error is a read deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while enumerating or reading payloads.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Payload path does not exist.
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    /// A wildcard pattern matched nothing.
    #[error("no files match {}", .0.display())]
    NoMatch(PathBuf),

    /// Reading a directory or file failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },
}

/// Phase of a send exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendPhase {
    /// Wrapping the payload.
    Framing,
    /// Writing the frame.
    Sending,
    /// Waiting for and unwrapping the ACK.
    AckWaiting,
}

impl fmt::Display for SendPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SendPhase::Framing => "framing",
            SendPhase::Sending => "sending",
            SendPhase::AckWaiting => "waiting for ACK",
        };
        f.write_str(name)
    }
}

/// Cause of a failed exchange.
#[derive(Debug, Error)]
pub enum SendErrorKind {
    /// Transport failure (I/O, timeout, closed).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response could not be unwrapped.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
}

/// A failed exchange, with the byte counts for diagnosis.
#[derive(Debug, Error)]
#[error("{phase} failed (sent {bytes_sent} bytes, received {bytes_received} bytes): {kind}")]
pub struct SendError {
    /// Phase the exchange was in.
    pub phase: SendPhase,
    /// Bytes written before the failure.
    pub bytes_sent: usize,
    /// Bytes read before the failure.
    pub bytes_received: usize,
    /// Cause.
    #[source]
    pub kind: SendErrorKind,
}

impl SendError {
    /// Create a send error.
    pub fn new(
        phase: SendPhase,
        bytes_sent: usize,
        bytes_received: usize,
        kind: impl Into<SendErrorKind>,
    ) -> Self {
        Self {
            phase,
            bytes_sent,
            bytes_received,
            kind: kind.into(),
        }
    }

    /// Check if the ACK read deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(&self.kind, SendErrorKind::Transport(e) if e.is_timeout())
    }

    /// Check if the response was too short to unwrap.
    pub fn is_invalid_frame(&self) -> bool {
        matches!(self.kind, SendErrorKind::InvalidFrame(_))
    }
}

/// Top-level errors.
#[derive(Debug, Error)]
pub enum MllpError {
    /// Transport error outside an exchange (connect, close).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Exchange failed.
    #[error("send failed for {}: {source}", path.display())]
    Send {
        /// Payload being sent.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: SendError,
    },

    /// Payload enumeration or read failed.
    #[error("payload error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MllpError {
    /// Check if this error aborted the run before any send.
    pub fn is_connect(&self) -> bool {
        matches!(self, MllpError::Transport(e) if e.is_connect())
    }

    /// Check if this error is an ACK read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MllpError::Send { source, .. } if source.is_timeout())
    }

    /// Check if this error is an unusable ACK frame.
    pub fn is_invalid_frame(&self) -> bool {
        matches!(self, MllpError::Send { source, .. } if source.is_invalid_frame())
    }
}

/// Result type for top-level operations.
pub type MllpResult<T> = Result<T, MllpError>;
