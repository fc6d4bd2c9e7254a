//! Connection factory.
//!
//! [`Connector`] is the seam between the send loop and the network. The real
//! implementation, [`TcpConnector`], resolves `host:port`, dials with a
//! timeout, and optionally runs a TLS handshake on top.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tracing::debug;

use crate::core::constants::DEFAULT_CONNECT_TIMEOUT;
use crate::core::{MllpResult, TransportError, TransportResult};

/// Something that can open a byte-stream connection.
pub trait Connector {
    /// Stream produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a connection to `address` (`host:port`).
    fn connect(&self, address: &str) -> impl Future<Output = TransportResult<Self::Stream>> + Send;
}

/// TLS client settings.
///
/// Without a CA file the bundled web PKI roots are trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// PEM bundle of trusted CA certificates.
    pub ca_file: Option<PathBuf>,
    /// PEM client certificate chain for mutual TLS.
    pub cert_file: Option<PathBuf>,
    /// PEM private key matching `cert_file`.
    pub key_file: Option<PathBuf>,
    /// Name to verify instead of the host part of the address.
    pub server_name: Option<String>,
    /// Accept any server certificate.
    pub insecure: bool,
}

/// Stream returned by [`TcpConnector`].
#[derive(Debug)]
pub enum NetStream {
    /// Plain TCP.
    Plain(TcpStream),
    /// TLS over TCP.
    #[cfg(feature = "tls")]
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl NetStream {
    /// Check if the stream is TLS protected.
    pub fn is_tls(&self) -> bool {
        match self {
            NetStream::Plain(_) => false,
            #[cfg(feature = "tls")]
            NetStream::Tls(_) => true,
        }
    }
}

impl AsyncRead for NetStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(feature = "tls")]
            NetStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NetStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            NetStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(feature = "tls")]
            NetStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Plain(s) => Pin::new(s).poll_flush(cx),
            #[cfg(feature = "tls")]
            NetStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NetStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(feature = "tls")]
            NetStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Dials TCP, optionally wrapped in TLS.
#[derive(Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
    #[cfg(feature = "tls")]
    tls: Option<TlsSettings>,
}

#[cfg(feature = "tls")]
#[derive(Clone)]
struct TlsSettings {
    connector: tokio_rustls::TlsConnector,
    server_name: Option<String>,
}

impl std::fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnector")
            .field("connect_timeout", &self.connect_timeout)
            .field("tls", &self.is_tls())
            .finish()
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl TcpConnector {
    /// Create a plain TCP connector.
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            #[cfg(feature = "tls")]
            tls: None,
        }
    }

    /// Create a connector, loading TLS settings when `tls` is given.
    pub fn from_options(connect_timeout: Duration, tls: Option<&TlsOptions>) -> MllpResult<Self> {
        let connector = Self::new(connect_timeout);
        match tls {
            None => Ok(connector),
            #[cfg(feature = "tls")]
            Some(options) => connector.with_tls(options),
            #[cfg(not(feature = "tls"))]
            Some(_) => Err(crate::core::MllpError::Config(
                "TLS requested but built without the `tls` feature".into(),
            )),
        }
    }

    /// Enable TLS using `options`.
    #[cfg(feature = "tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
    pub fn with_tls(mut self, options: &TlsOptions) -> MllpResult<Self> {
        let config = super::tls::client_config(options)?;
        self.tls = Some(TlsSettings {
            connector: tokio_rustls::TlsConnector::from(config),
            server_name: options.server_name.clone(),
        });
        Ok(self)
    }

    /// Dial timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Check if TLS is enabled.
    pub fn is_tls(&self) -> bool {
        #[cfg(feature = "tls")]
        {
            self.tls.is_some()
        }
        #[cfg(not(feature = "tls"))]
        {
            false
        }
    }

    async fn dial(&self, address: &str) -> TransportResult<TcpStream> {
        let connect_err = |source| TransportError::Connect {
            address: address.to_string(),
            source,
        };

        let mut last_err = None;
        for addr in tokio::net::lookup_host(address).await.map_err(connect_err)? {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(connect_err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to no hosts")
        })))
    }

    /// Dial and, when enabled, run the TLS handshake.
    async fn establish(&self, address: &str) -> TransportResult<NetStream> {
        let tcp = self.dial(address).await?;
        if let Err(e) = tcp.set_nodelay(true) {
            debug!(error = %e, "failed to set TCP_NODELAY");
        }

        #[cfg(feature = "tls")]
        if let Some(tls) = &self.tls {
            return self.handshake(tls, address, tcp).await;
        }

        Ok(NetStream::Plain(tcp))
    }

    #[cfg(feature = "tls")]
    async fn handshake(
        &self,
        tls: &TlsSettings,
        address: &str,
        tcp: TcpStream,
    ) -> TransportResult<NetStream> {
        use rustls::pki_types::ServerName;

        let tls_err = |source| TransportError::Tls {
            address: address.to_string(),
            source,
        };

        let name = tls
            .server_name
            .clone()
            .unwrap_or_else(|| host_of(address).to_string());
        let server_name = ServerName::try_from(name)
            .map_err(|e| tls_err(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let stream = tls
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(tls_err)?;
        debug!(address, "TLS handshake complete");
        Ok(NetStream::Tls(Box::new(stream)))
    }
}

impl Connector for TcpConnector {
    type Stream = NetStream;

    async fn connect(&self, address: &str) -> TransportResult<NetStream> {
        tokio::time::timeout(self.connect_timeout, self.establish(address))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                address: address.to_string(),
                timeout: self.connect_timeout,
            })?
    }
}

/// Host part of `host:port`, without IPv6 brackets.
pub fn host_of(address: &str) -> &str {
    let host = address.rsplit_once(':').map_or(address, |(host, _)| host);
    host.trim_start_matches('[').trim_end_matches(']')
}
