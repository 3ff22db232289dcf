// src/error.rs
// Error taxonomy for the viewer. Every failure a run can end in is a SimulationFailure;
// the remaining enums cover the form, the drawing surface, configuration and image slots.

use thiserror::Error;

/// Terminal outcome of a failed run. None of these are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationFailure {
    /// Network failure or a non-success HTTP status; carries the raw body or cause.
    #[error("transport error: {0}")]
    Transport(String),

    /// Body not parseable as a simulation response, or animation payload out of shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Well-formed response reporting that the solver itself failed.
    #[error("simulation failed: {0}")]
    Simulation(String),
}

impl SimulationFailure {
    /// Text shown to the user. Only solver-reported failures produce an alert.
    pub fn alert_text(&self) -> Option<String> {
        match self {
            SimulationFailure::Simulation(message) => Some(format!("Simulation error: {message}")),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimulationFailure {
    fn from(err: serde_json::Error) -> Self {
        SimulationFailure::Decode(err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("chain length must be at least 1")]
    EmptyChain,

    #[error("chain of {requested} links exceeds the maximum of {max}")]
    TooLong { requested: usize, max: usize },

    #[error("requested {requested} links but only {built} were built")]
    NotBuilt { requested: usize, built: usize },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value {value} for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing backend error: {0}")]
    Backend(String),

    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("pixel buffer does not match a {0}x{1} surface")]
    BufferSize(u32, u32),
}

#[derive(Debug, Error)]
pub enum ImageRefError {
    #[error("not a base64 data URL")]
    NotDataUrl,

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Returned when the animation loop has shut down and can no longer take commands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("animation loop is no longer running")]
pub struct LoopClosed;
