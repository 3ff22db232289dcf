// src/config.rs
// Command-line configuration for the viewer binary.

use crate::error::ConfigError;
use crate::form::MAX_CHAIN_LENGTH;
use crate::viewport::MAX_CANVAS_SIDE;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// How overlapping runs are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunPolicy {
    /// Every response is installed as it arrives; the last to arrive wins.
    LastArrival,
    /// Only the response to the most recent Run is installed; older ones are dropped.
    LatestRequest,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "n-pendulum-viewer", version, about = "Playback viewer for the N-pendulum solver")]
pub struct ViewerConfig {
    /// Solver endpoint receiving simulation requests
    #[arg(long, default_value = "http://127.0.0.1:8080/simulate")]
    pub solver_url: String,

    /// Address the control surface listens on
    #[arg(long, default_value = "127.0.0.1:8090")]
    pub bind: String,

    /// Initial number of links in the form
    #[arg(long, default_value_t = 2)]
    pub chain_length: usize,

    /// Initial container width in pixels; the canvas is always square
    #[arg(long, default_value_t = 500)]
    pub width: u32,

    /// Milliseconds between animation ticks
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    #[arg(long, value_enum, default_value_t = RunPolicy::LastArrival)]
    pub run_policy: RunPolicy,

    /// Give up on a solver request after this many seconds
    #[arg(long, default_value_t = 120)]
    pub request_timeout_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            solver_url: "http://127.0.0.1:8080/simulate".to_string(),
            bind: "127.0.0.1:8090".to_string(),
            chain_length: 2,
            width: 500,
            tick_ms: 16,
            run_policy: RunPolicy::LastArrival,
            request_timeout_secs: 120,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_length == 0 {
            return Err(ConfigError::Invalid("chain length must be at least 1".into()));
        }
        if self.chain_length > MAX_CHAIN_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "chain length must be at most {MAX_CHAIN_LENGTH}"
            )));
        }
        if self.width == 0 {
            return Err(ConfigError::Invalid("width must be at least 1 pixel".into()));
        }
        if self.width > MAX_CANVAS_SIDE {
            return Err(ConfigError::Invalid(format!(
                "width must be at most {MAX_CANVAS_SIDE} pixels"
            )));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick interval must be at least 1 ms".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request timeout must be at least 1 s".into()));
        }
        if !self.solver_url.starts_with("http://") && !self.solver_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "solver url must be http(s): {}",
                self.solver_url
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
