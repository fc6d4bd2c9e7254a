//! Loop orchestration.
//!
//! Opens one connection for the whole run, sends every payload in
//! enumeration order for each loop iteration, and closes the connection on
//! every exit path.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::core::{MllpError, MllpResult, PayloadSource};
use crate::transport::{Connector, MllpConnection, TcpConnector};

use super::config::{DispatcherConfig, LoopPlan};
use super::sender::{SendResult, Sender};
use super::source::FsPayloadSource;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Loop iterations completed.
    pub iterations: u32,
    /// Payloads sent.
    pub messages_sent: usize,
    /// Bytes written, envelopes included.
    pub bytes_sent: usize,
    /// ACKs read.
    pub acks_received: usize,
}

impl RunSummary {
    fn record(&mut self, result: &SendResult) {
        self.messages_sent += 1;
        self.bytes_sent += result.bytes_written;
        if result.ack.is_some() {
            self.acks_received += 1;
        }
    }
}

/// Drives a run over one connection.
///
/// Any error stops the run at once; nothing is retried.
#[derive(Debug)]
pub struct Dispatcher<C, P> {
    address: String,
    plan: LoopPlan,
    connector: C,
    source: P,
}

impl Dispatcher<TcpConnector, FsPayloadSource> {
    /// Build a dispatcher for a real listener and the filesystem.
    pub fn from_config(config: &DispatcherConfig) -> MllpResult<Self> {
        let tls = config.plan.use_tls.then_some(&config.tls);
        let connector = TcpConnector::from_options(config.connect_timeout, tls)?;
        let source = FsPayloadSource::new(&config.source, config.recursive);
        Ok(Self::new(config.address.clone(), config.plan, connector, source))
    }
}

impl<C, P> Dispatcher<C, P>
where
    C: Connector,
    P: PayloadSource,
{
    /// Create a dispatcher.
    pub fn new(address: impl Into<String>, plan: LoopPlan, connector: C, source: P) -> Self {
        Self {
            address: address.into(),
            plan,
            connector,
            source,
        }
    }

    /// Target address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Loop plan.
    pub fn plan(&self) -> &LoopPlan {
        &self.plan
    }

    /// Connect, send everything, and close.
    pub async fn run(&self) -> MllpResult<RunSummary> {
        self.plan.validate()?;

        info!(address = %self.address, tls = self.plan.use_tls, "connecting");
        let stream = self.connector.connect(&self.address).await?;
        let mut conn = MllpConnection::new(stream);

        let result = self.run_loops(&mut conn).await;

        conn.close().await;
        debug!(address = %self.address, "connection closed");
        result
    }

    async fn run_loops<S>(&self, conn: &mut MllpConnection<S>) -> MllpResult<RunSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut sender = Sender::new(self.plan.send_options());
        let mut summary = RunSummary::default();
        let looping = self.plan.iterations > 1;

        for iteration in 1..=self.plan.iterations {
            for entry in self.source.entries()? {
                if entry.is_dir {
                    continue;
                }

                if looping {
                    info!("loop #{iteration}: {}", entry.path.display());
                } else {
                    info!("send file {}", entry.path.display());
                }

                let payload = self.source.load(&entry.path)?;
                let result = sender
                    .send(conn, &payload)
                    .await
                    .map_err(|source| MllpError::Send {
                        path: entry.path.clone(),
                        source,
                    })?;
                summary.record(&result);
            }

            summary.iterations = iteration;
            if iteration < self.plan.iterations {
                tokio::time::sleep(self.plan.loop_delay).await;
            }
        }

        Ok(summary)
    }
}
