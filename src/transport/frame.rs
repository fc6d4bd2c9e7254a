//! MLLP framing.
//!
//! Wire format:
//! ```text
//! +--------+------------------+-------------+
//! | 0x0B   | payload          | 0x1C 0x0D   |
//! | 1 byte | N bytes          | 2 bytes     |
//! +--------+------------------+-------------+
//! ```

use std::borrow::Cow;

use crate::core::FrameError;
use crate::core::constants::{FRAME_HEADER, FRAME_OVERHEAD, FRAME_TRAILER, MIN_FRAME_SIZE};

/// Wraps and unwraps payloads, or passes them through in raw mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    enabled: bool,
}

impl Default for Framer {
    fn default() -> Self {
        Self::MLLP
    }
}

impl Framer {
    /// Framing enabled.
    pub const MLLP: Self = Self { enabled: true };
    /// Framing disabled; bytes pass through untouched.
    pub const RAW: Self = Self { enabled: false };

    /// Create a framer.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if framing is enabled.
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Wrap a payload.
    ///
    /// Raw mode borrows the payload instead of copying it.
    pub fn wrap(self, payload: &[u8]) -> Cow<'_, [u8]> {
        if !self.enabled {
            return Cow::Borrowed(payload);
        }

        let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
        frame.extend_from_slice(&FRAME_HEADER);
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&FRAME_TRAILER);
        Cow::Owned(frame)
    }

    /// Unwrap a frame by dropping the first byte and the last two.
    ///
    /// The envelope bytes are not checked; see [`has_envelope`].
    pub fn unwrap(self, frame: &[u8]) -> Result<&[u8], FrameError> {
        if !self.enabled {
            return Ok(frame);
        }

        if frame.len() < MIN_FRAME_SIZE {
            return Err(FrameError::TooShort {
                minimum: MIN_FRAME_SIZE,
                actual: frame.len(),
            });
        }

        Ok(&frame[FRAME_HEADER.len()..frame.len() - FRAME_TRAILER.len()])
    }
}

/// Check if bytes start with the start block and end with the end sequence.
pub fn has_envelope(frame: &[u8]) -> bool {
    frame.len() >= MIN_FRAME_SIZE
        && frame.starts_with(&FRAME_HEADER)
        && frame.ends_with(&FRAME_TRAILER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_wire_bytes() {
        let frame = Framer::MLLP.wrap(b"MSH|...");
        assert_eq!(&frame[..], &hex::decode("0b4d53487c2e2e2e1c0d").unwrap()[..]);
        assert_eq!(frame.len(), 10);
    }

    #[test]
    fn test_wrap_empty_payload() {
        let frame = Framer::MLLP.wrap(b"");
        assert_eq!(&frame[..], &[0x0B, 0x1C, 0x0D]);
        assert_eq!(Framer::MLLP.unwrap(&frame).unwrap(), b"");
    }

    #[test]
    fn test_roundtrip_and_length() {
        let long = [0xFFu8; 300];
        let payloads: [&[u8]; 4] = [
            b"MSH|^~\\&|SENDER|FAC\rPID|1||12345\r",
            &[0x0B, 0x1C, 0x0D],
            &long,
            b"x",
        ];
        for payload in payloads {
            let frame = Framer::MLLP.wrap(payload);
            assert_eq!(frame.len(), payload.len() + 3);
            assert_eq!(Framer::MLLP.unwrap(&frame).unwrap(), payload);
        }
    }

    #[test]
    fn test_raw_mode_identity() {
        let payload = b"MSH|raw";
        let frame = Framer::RAW.wrap(payload);
        assert!(matches!(frame, Cow::Borrowed(_)));
        assert_eq!(&frame[..], payload);
        assert_eq!(Framer::RAW.unwrap(payload).unwrap(), payload);
        assert_eq!(Framer::RAW.unwrap(b"").unwrap(), b"");
    }

    #[test]
    fn test_unwrap_short_frame() {
        for len in 0..3 {
            let frame = vec![0x0B; len];
            assert_eq!(
                Framer::MLLP.unwrap(&frame),
                Err(FrameError::TooShort {
                    minimum: 3,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn test_unwrap_ack() {
        let frame = hex::decode("0b41434b1c0d").unwrap();
        assert_eq!(Framer::MLLP.unwrap(&frame).unwrap(), b"ACK");
    }

    #[test]
    fn test_has_envelope() {
        assert!(has_envelope(&[0x0B, 0x1C, 0x0D]));
        assert!(has_envelope(&Framer::MLLP.wrap(b"ACK")));
        assert!(!has_envelope(b"ACK"));
        assert!(!has_envelope(&[0x0B, 0x1C]));
        assert!(!has_envelope(&[0x0B, b'A', 0x1C, 0x0A]));
    }
}
