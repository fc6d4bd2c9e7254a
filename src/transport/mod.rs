//! MLLP transport layer.
//!
//! - **Framing**: [`Framer`] wraps payloads in the MLLP envelope and unwraps responses
//! - **Connection**: [`MllpConnection`] owns one byte stream with write, deadline-bounded read, and close
//! - **Connection factory**: [`Connector`] and its TCP/TLS implementation [`TcpConnector`]
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Dispatcher / Sender               │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   framing, connection, connector        │
//! ├─────────────────────────────────────────┤
//! │         TLS (optional)                  │
//! ├─────────────────────────────────────────┤
//! │              TCP                        │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod connector;
mod frame;

#[cfg(feature = "tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
pub mod tls;

pub use connection::*;
pub use connector::*;
pub use frame::*;
