//! # mllp-send
//!
//! Sends HL7 payloads to a remote listener over TCP or TLS using the
//! **M**inimal **L**ower **L**ayer **P**rotocol, and optionally waits for the
//! acknowledgement.
//!
//! - **Framing**: `0x0B` + payload + `0x1C 0x0D`, or raw bytes when disabled
//! - **Half-duplex exchange**: one full write, then at most one deadline-bounded read
//! - **Persistent session**: one connection reused across every payload and loop
//! - **Fail fast**: any error aborts the run; the connection is always closed
//!
//! Payloads are opaque bytes. Nothing here parses or validates HL7.
//!
//! ## Feature Flags
//!
//! - `transport` (default): Framing, connection, TCP connector
//! - `tls` (default): TLS connector via rustls
//! - `client` (default): Sender and dispatcher
//!
//! ## Modules
//!
//! - [`core`]: Constants, error types, collaborator traits (always included)
//! - [`transport`]: Transport layer (requires `transport` feature)
//! - [`client`]: Send loop (requires `client` feature)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mllp_send::prelude::*;
//!
//! # async fn demo() -> Result<(), MllpError> {
//! let config = DispatcherConfigBuilder::new()
//!     .address("localhost:2575")
//!     .source("messages/")
//!     .wait_for_ack(true)
//!     .build()?;
//!
//! let summary = Dispatcher::from_config(&config)?.run().await?;
//! println!("sent {} messages", summary.messages_sent);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    #[cfg(feature = "transport")]
    pub use crate::transport::{
        Connector, Framer, MllpConnection, NetStream, TcpConnector, TlsOptions,
    };

    #[cfg(feature = "client")]
    pub use crate::client::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{MllpError, MllpResult, SendError, SendPhase};

#[cfg(feature = "transport")]
pub use crate::transport::{Framer, MllpConnection, TcpConnector};
