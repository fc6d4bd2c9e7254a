//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_ITERATIONS, DEFAULT_LOOP_DELAY, DEFAULT_READ_TIMEOUT,
};
use crate::core::{MllpError, MllpResult};
use crate::transport::TlsOptions;

use super::sender::SendOptions;

/// Loop and exchange settings. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPlan {
    /// Full passes over the payloads (at least 1).
    pub iterations: u32,
    /// Pause between passes, never after the last one.
    pub loop_delay: Duration,
    /// Wait for an ACK after each send.
    pub wait_for_ack: bool,
    /// Connect over TLS.
    pub use_tls: bool,
    /// ACK read deadline. Zero skips the ACK read.
    pub read_timeout: Duration,
    /// Wrap payloads in the MLLP envelope.
    pub framing: bool,
    /// Log every frame sent and response received.
    pub dump: bool,
}

impl Default for LoopPlan {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            loop_delay: DEFAULT_LOOP_DELAY,
            wait_for_ack: false,
            use_tls: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
            framing: true,
            dump: false,
        }
    }
}

impl LoopPlan {
    /// Check the plan is runnable.
    pub fn validate(&self) -> MllpResult<()> {
        if self.iterations == 0 {
            return Err(MllpError::Config("loop count must be at least 1".into()));
        }
        Ok(())
    }

    /// Per-exchange options derived from this plan.
    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            framing: self.framing,
            wait_for_ack: self.wait_for_ack,
            read_timeout: self.read_timeout,
            dump: self.dump,
        }
    }
}

/// Everything needed to run against a real listener and filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Target `host:port`.
    pub address: String,
    /// File, directory, or `directory/pattern` to send.
    pub source: PathBuf,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Dial timeout.
    pub connect_timeout: Duration,
    /// TLS settings, used when `plan.use_tls` is set.
    pub tls: TlsOptions,
    /// Loop and exchange settings.
    pub plan: LoopPlan,
}

/// Builder for [`DispatcherConfig`].
#[derive(Debug)]
pub struct DispatcherConfigBuilder {
    address: String,
    source: PathBuf,
    recursive: bool,
    connect_timeout: Duration,
    tls: TlsOptions,
    plan: LoopPlan,
}

impl DispatcherConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            address: String::new(),
            source: PathBuf::new(),
            recursive: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tls: TlsOptions::default(),
            plan: LoopPlan::default(),
        }
    }

    /// Set the target address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the payload source.
    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Enable or disable recursive directory scans.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the dial timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable TLS with the given settings.
    pub fn tls(mut self, options: TlsOptions) -> Self {
        self.tls = options;
        self.plan.use_tls = true;
        self
    }

    /// Enable or disable TLS.
    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.plan.use_tls = enabled;
        self
    }

    /// Enable or disable waiting for ACKs.
    pub fn wait_for_ack(mut self, enabled: bool) -> Self {
        self.plan.wait_for_ack = enabled;
        self
    }

    /// Set the ACK read deadline.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.plan.read_timeout = timeout;
        self
    }

    /// Set the pause between loop iterations.
    pub fn loop_delay(mut self, delay: Duration) -> Self {
        self.plan.loop_delay = delay;
        self
    }

    /// Set the number of loop iterations.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.plan.iterations = iterations;
        self
    }

    /// Enable or disable MLLP framing.
    pub fn framing(mut self, enabled: bool) -> Self {
        self.plan.framing = enabled;
        self
    }

    /// Enable or disable raw byte dumps.
    pub fn dump(mut self, enabled: bool) -> Self {
        self.plan.dump = enabled;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> MllpResult<DispatcherConfig> {
        if self.address.is_empty() {
            return Err(MllpError::Config("no connection address given".into()));
        }
        if self.source.as_os_str().is_empty() {
            return Err(MllpError::Config("no file given".into()));
        }
        self.plan.validate()?;

        Ok(DispatcherConfig {
            address: self.address,
            source: self.source,
            recursive: self.recursive,
            connect_timeout: self.connect_timeout,
            tls: self.tls,
            plan: self.plan,
        })
    }
}

impl Default for DispatcherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
