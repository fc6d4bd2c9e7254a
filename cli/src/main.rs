//! hl7send
//!
//! Sends HL7/TXT files to an MLLP listener and optionally waits for ACKs.
//!
//! Every flag can also be set through its `HL7SEND_*` environment variable.
//! Log filtering follows `RUST_LOG` when set, otherwise `--log-level`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use mllp_send::MllpError;
use mllp_send::client::{Dispatcher, DispatcherConfig, DispatcherConfigBuilder};
use mllp_send::transport::TlsOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hl7send", version, about = "Send HL7/TXT files", long_about = None)]
struct Args {
    /// <host:port> to send to
    #[arg(short = 'c', long = "connection", env = "HL7SEND_CONNECTION")]
    connection: String,

    /// File, directory, or directory/pattern (e.g. in/*.hl7) to send
    #[arg(short = 'f', long = "file", env = "HL7SEND_FILE")]
    file: PathBuf,

    /// Recursive directory scan
    #[arg(short = 'r', long, env = "HL7SEND_RECURSIVE")]
    recursive: bool,

    /// Use TLS
    #[arg(long, env = "HL7SEND_TLS")]
    tls: bool,

    /// Wait for an ACK after each message
    #[arg(long, env = "HL7SEND_ACK")]
    ack: bool,

    /// Timeout in milliseconds for reading the ACK (0 skips the read)
    #[arg(long = "rt", env = "HL7SEND_READ_TIMEOUT", default_value_t = 3000)]
    read_timeout: u64,

    /// Milliseconds to wait between loops
    #[arg(long = "lt", env = "HL7SEND_LOOP_DELAY", default_value_t = 1000)]
    loop_delay: u64,

    /// Loop count
    #[arg(
        long = "lc",
        env = "HL7SEND_LOOP_COUNT",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    loop_count: u32,

    /// Send files as-is, without MLLP framing
    #[arg(long, env = "HL7SEND_RAW")]
    raw: bool,

    /// Dial timeout in milliseconds
    #[arg(long, env = "HL7SEND_CONNECT_TIMEOUT", default_value_t = 10_000)]
    connect_timeout: u64,

    /// PEM file with trusted CA certificates (default: bundled web PKI roots)
    #[arg(long, env = "HL7SEND_TLS_CA")]
    tls_ca: Option<PathBuf>,

    /// PEM client certificate for mutual TLS
    #[arg(long, env = "HL7SEND_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert
    #[arg(long, env = "HL7SEND_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Server name to verify instead of the connection host
    #[arg(long, env = "HL7SEND_TLS_SERVER_NAME")]
    tls_server_name: Option<String>,

    /// Accept any server certificate
    #[arg(long, env = "HL7SEND_TLS_INSECURE")]
    tls_insecure: bool,

    /// Log the raw bytes sent and received
    #[arg(long, env = "HL7SEND_DUMP")]
    dump: bool,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "HL7SEND_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Result<DispatcherConfig, MllpError> {
        DispatcherConfigBuilder::new()
            .address(&self.connection)
            .source(&self.file)
            .recursive(self.recursive)
            .connect_timeout(Duration::from_millis(self.connect_timeout))
            .tls(TlsOptions {
                ca_file: self.tls_ca.clone(),
                cert_file: self.tls_cert.clone(),
                key_file: self.tls_key.clone(),
                server_name: self.tls_server_name.clone(),
                insecure: self.tls_insecure,
            })
            .use_tls(self.tls)
            .wait_for_ack(self.ack)
            .read_timeout(Duration::from_millis(self.read_timeout))
            .loop_delay(Duration::from_millis(self.loop_delay))
            .iterations(self.loop_count)
            .framing(!self.raw)
            .dump(self.dump)
            .build()
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), MllpError> {
    let config = args.config()?;
    let dispatcher = Dispatcher::from_config(&config)?;
    let summary = dispatcher.run().await?;

    info!(
        loops = summary.iterations,
        messages = summary.messages_sent,
        bytes = summary.bytes_sent,
        acks = summary.acks_received,
        "done"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_timeout() {
                error!("message sent but no ACK arrived: {e}");
            } else if e.is_connect() {
                error!("could not reach the listener: {e}");
            } else {
                error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
