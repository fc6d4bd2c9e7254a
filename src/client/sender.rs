//! One send-and-maybe-ACK exchange.
//!
//! ```text
//! Idle -> Framing -> Sending -> [AckWaiting -> AckReceived | AckTimeout] -> Done
//! ```
//!
//! Every exchange ends in `Done`, success or not, before the next payload may
//! use the connection.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace, warn};

use crate::core::constants::DEFAULT_READ_TIMEOUT;
use crate::core::{SendError, SendPhase, printable};
use crate::transport::{Framer, MllpConnection, has_envelope};

/// Options for a single exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Wrap the payload in the MLLP envelope.
    pub framing: bool,
    /// Read an ACK after writing.
    pub wait_for_ack: bool,
    /// ACK read deadline. Zero skips the read.
    pub read_timeout: Duration,
    /// Log the raw bytes exchanged.
    pub dump: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            framing: true,
            wait_for_ack: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
            dump: false,
        }
    }
}

/// Outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    /// Bytes written, envelope included.
    pub bytes_written: usize,
    /// Bytes read for the ACK, envelope included.
    pub bytes_received: usize,
    /// Unwrapped ACK content, if one was read.
    pub ack: Option<Vec<u8>>,
}

impl SendResult {
    /// ACK content rendered for an operator.
    pub fn ack_text(&self) -> Option<String> {
        self.ack.as_deref().map(printable)
    }
}

/// Exchange state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// No exchange started yet.
    Idle,
    /// Wrapping the payload.
    Framing,
    /// Writing the frame.
    Sending,
    /// Frame written, reading the ACK.
    AckWaiting,
    /// ACK read and unwrapped.
    AckReceived,
    /// ACK deadline expired.
    AckTimeout,
    /// Exchange finished.
    Done,
}

/// Runs exchanges over a connection it does not own.
#[derive(Debug)]
pub struct Sender {
    options: SendOptions,
    framer: Framer,
    state: ExchangeState,
}

impl Sender {
    /// Create a sender.
    pub fn new(options: SendOptions) -> Self {
        Self {
            options,
            framer: Framer::new(options.framing),
            state: ExchangeState::Idle,
        }
    }

    /// Current exchange state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Send one payload and, if enabled, wait for its ACK.
    ///
    /// Never retries. On error the connection may be in an unknown state;
    /// the caller decides what to do with it.
    pub async fn send<S>(
        &mut self,
        conn: &mut MllpConnection<S>,
        payload: &[u8],
    ) -> Result<SendResult, SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.exchange(conn, payload).await;
        self.transition(ExchangeState::Done);
        result
    }

    async fn exchange<S>(
        &mut self,
        conn: &mut MllpConnection<S>,
        payload: &[u8],
    ) -> Result<SendResult, SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.transition(ExchangeState::Framing);
        let frame = self.framer.wrap(payload);
        if self.options.dump {
            info!("frame ({} bytes):\n{}", frame.len(), printable(&frame));
        }

        self.transition(ExchangeState::Sending);
        let bytes_written = conn
            .write(&frame)
            .await
            .map_err(|e| SendError::new(SendPhase::Sending, 0, 0, e))?;
        info!(bytes = bytes_written, "bytes sent");

        let done = SendResult {
            bytes_written,
            bytes_received: 0,
            ack: None,
        };

        if !self.options.wait_for_ack {
            return Ok(done);
        }
        if self.options.read_timeout.is_zero() {
            warn!("read timeout is zero, not waiting for ACK");
            return Ok(done);
        }

        self.transition(ExchangeState::AckWaiting);
        conn.set_read_deadline(self.options.read_timeout);
        debug!(timeout = ?self.options.read_timeout, "waiting for ACK");

        let response = match conn.read().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    self.transition(ExchangeState::AckTimeout);
                }
                return Err(SendError::new(SendPhase::AckWaiting, bytes_written, 0, e));
            }
        };
        let bytes_received = response.len();

        if self.options.dump {
            info!("response ({} bytes):\n{}", bytes_received, printable(response));
        }
        if self.framer.is_enabled() && !has_envelope(response) {
            warn!(bytes = bytes_received, "response is not MLLP framed");
        }

        let content = self
            .framer
            .unwrap(response)
            .map_err(|e| SendError::new(SendPhase::AckWaiting, bytes_written, bytes_received, e))?
            .to_vec();

        self.transition(ExchangeState::AckReceived);
        info!(bytes = bytes_received, "ACK received:\n{}", printable(&content));

        Ok(SendResult {
            bytes_written,
            bytes_received,
            ack: Some(content),
        })
    }

    fn transition(&mut self, next: ExchangeState) {
        trace!(from = ?self.state, to = ?next, "exchange state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{Reply, ScriptedStream};
    use crate::core::{SendErrorKind, TransportError};

    fn ack_options() -> SendOptions {
        SendOptions {
            wait_for_ack: true,
            read_timeout: Duration::from_millis(500),
            ..SendOptions::default()
        }
    }

    #[tokio::test]
    async fn test_send_without_ack() {
        let stream = ScriptedStream::new();
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(SendOptions::default());

        let result = sender.send(&mut conn, b"MSH|...").await.unwrap();

        assert_eq!(result.bytes_written, 10);
        assert_eq!(result.ack, None);
        assert_eq!(
            stream.writes(),
            vec![hex::decode("0b4d53487c2e2e2e1c0d").unwrap()]
        );
        assert_eq!(stream.read_polls(), 0);
        assert_eq!(sender.state(), ExchangeState::Done);
    }

    #[tokio::test]
    async fn test_send_with_ack() {
        let stream = ScriptedStream::new().reply(b"\x0bACK\x1c\x0d");
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(ack_options());

        let result = sender.send(&mut conn, b"MSH|...").await.unwrap();

        assert_eq!(result.bytes_written, 10);
        assert_eq!(result.bytes_received, 6);
        assert_eq!(result.ack.as_deref(), Some(&b"ACK"[..]));
        assert_eq!(result.ack_text().as_deref(), Some("ACK"));
        assert_eq!(stream.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_raw_mode_single_write() {
        let stream = ScriptedStream::new().reply(b"AA");
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(SendOptions {
            framing: false,
            ..ack_options()
        });

        let result = sender.send(&mut conn, b"MSH|raw").await.unwrap();

        assert_eq!(result.bytes_written, 7);
        assert_eq!(stream.writes(), vec![b"MSH|raw".to_vec()]);
        assert_eq!(result.ack.as_deref(), Some(&b"AA"[..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ack_timeout() {
        let stream = ScriptedStream::new();
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(ack_options());

        let start = tokio::time::Instant::now();
        let err = sender.send(&mut conn, b"MSH|...").await.unwrap_err();

        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert_eq!(err.phase, SendPhase::AckWaiting);
        assert_eq!(err.bytes_sent, 10);
        assert!(err.is_timeout());
        assert!(conn.is_open());
        assert_eq!(stream.shutdowns(), 0);
        assert_eq!(sender.state(), ExchangeState::Done);
    }

    #[tokio::test]
    async fn test_short_ack_is_invalid_frame() {
        let stream = ScriptedStream::new().reply(b"\x0b\x1c");
        let mut conn = MllpConnection::new(stream);
        let mut sender = Sender::new(ack_options());

        let err = sender.send(&mut conn, b"MSH").await.unwrap_err();

        assert!(err.is_invalid_frame());
        assert_eq!(err.phase, SendPhase::AckWaiting);
        assert_eq!(err.bytes_received, 2);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let stream = ScriptedStream::new().failing_writes();
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(ack_options());

        let err = sender.send(&mut conn, b"MSH").await.unwrap_err();

        assert_eq!(err.phase, SendPhase::Sending);
        assert!(matches!(
            err.kind,
            SendErrorKind::Transport(TransportError::Io(_))
        ));
        assert_eq!(stream.read_polls(), 0);
    }

    #[tokio::test]
    async fn test_peer_closed_before_ack() {
        let stream = ScriptedStream::new();
        stream.push(Reply::Eof);
        let mut conn = MllpConnection::new(stream);
        let mut sender = Sender::new(ack_options());

        let err = sender.send(&mut conn, b"MSH").await.unwrap_err();

        assert!(matches!(
            err.kind,
            SendErrorKind::Transport(TransportError::ConnectionClosed)
        ));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_zero_read_timeout_skips_ack() {
        let stream = ScriptedStream::new().reply(b"\x0bACK\x1c\x0d");
        let mut conn = MllpConnection::new(stream.clone());
        let mut sender = Sender::new(SendOptions {
            read_timeout: Duration::ZERO,
            ..ack_options()
        });

        let result = sender.send(&mut conn, b"MSH").await.unwrap();

        assert_eq!(result.ack, None);
        assert_eq!(stream.read_polls(), 0);
    }

    #[tokio::test]
    async fn test_ack_without_envelope_is_still_unwrapped() {
        let stream = ScriptedStream::new().reply(b"XACKYZ");
        let mut conn = MllpConnection::new(stream);
        let mut sender = Sender::new(ack_options());

        let result = sender.send(&mut conn, b"MSH").await.unwrap();
        assert_eq!(result.ack.as_deref(), Some(&b"ACK"[..]));
    }
}
