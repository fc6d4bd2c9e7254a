//! Protocol constants for MLLP.
//!
//! The envelope bytes are fixed by the MLLP convention and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// MLLP ENVELOPE
// =============================================================================

/// Start block character (vertical tab).
pub const START_BLOCK: u8 = 0x0B;

/// File separator, first byte of the end sequence.
pub const END_BLOCK: u8 = 0x1C;

/// Carriage return, second byte of the end sequence.
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Bytes preceding the payload in a frame.
pub const FRAME_HEADER: [u8; 1] = [START_BLOCK];

/// Bytes following the payload in a frame.
pub const FRAME_TRAILER: [u8; 2] = [END_BLOCK, CARRIAGE_RETURN];

/// Envelope overhead added by framing.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER.len() + FRAME_TRAILER.len();

/// Smallest byte sequence that can be unwrapped.
pub const MIN_FRAME_SIZE: usize = FRAME_OVERHEAD;

// =============================================================================
// BUFFERS
// =============================================================================

/// Receive buffer size for a single ACK read (1 MiB).
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024 * 1024;

// =============================================================================
// TIMING DEFAULTS
// =============================================================================

/// Default deadline for reading an ACK.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default pause between loop iterations.
pub const DEFAULT_LOOP_DELAY: Duration = Duration::from_millis(1000);

/// Default dial timeout for the connection factory.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of loop iterations.
pub const DEFAULT_ITERATIONS: u32 = 1;
