// src/client.rs
// Talks to the external solver. run() builds the request from a chain configuration, posts
// it, and classifies whatever comes back as a success or one of the three failure kinds.
// The client never touches playback state; installing the result is the caller's job.

use crate::error::{ImageRefError, SimulationFailure}; // Failure taxonomy for runs and image slots
use crate::model::{AnimationData, ChainConfiguration, SimulationRequest, SimulationResponse}; // Wire and domain types
use base64::{engine::general_purpose, Engine as _}; // Base64 decoder for the trajectory data URL
use image::ImageFormat; // Format sniffed from the decoded image bytes
use log::debug; // Request tracing
use std::sync::Arc; // Shared transport across runs
use std::time::Duration; // Request timeout

/// Largest response body accepted from the solver.
const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking JSON POST. Errors carry the transport's description of what went wrong.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, body: &str) -> Result<TransportResponse, String>;
}

/// Transport over `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false) // statuses are classified in decode_response
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<TransportResponse, String> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_string()
            .map_err(|e| e.to_string())?;
        Ok(TransportResponse { status, body })
    }
}

/// Opaque reference to the solver's static trajectory plot (a base64 data URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryImage(String);

/// Raw image bytes decoded from a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl TrajectoryImage {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Decodes `data:<mime>;base64,<payload>` and checks the payload is a known image format.
    pub fn decode(&self) -> Result<DecodedImage, ImageRefError> {
        let (header, payload) = self
            .0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or(ImageRefError::NotDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(ImageRefError::NotDataUrl);
        }
        let bytes = general_purpose::STANDARD.decode(payload.trim())?;
        let format = image::guess_format(&bytes)?;
        Ok(DecodedImage { bytes, format })
    }
}

/// A successful run.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub data: AnimationData,
    pub trajectory_image: Option<TrajectoryImage>,
}

/// Classifies a completed exchange for a request of `expected_n` links.
pub fn decode_response(
    response: TransportResponse,
    expected_n: usize,
) -> Result<SimulationOutcome, SimulationFailure> {
    // Anything but 2xx is a transport failure; the body is kept as diagnostic text
    if !(200..300).contains(&response.status) {
        return Err(SimulationFailure::Transport(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }
    // Parse the JSON envelope; a body that isn't one is a decode failure
    let decoded: SimulationResponse = serde_json::from_str(&response.body)?;

    // The solver ran but gave up; its message goes to the user
    if !decoded.success {
        let message = decoded
            .error
            .unwrap_or_else(|| "solver reported failure without a message".to_string());
        return Err(SimulationFailure::Simulation(message));
    }

    // A success must carry positions
    let payload = decoded.animation_data.ok_or_else(|| {
        SimulationFailure::Decode("successful response without animation_data".into())
    })?;

    // Positions for a different chain would be drawn with the wrong link count
    if payload.n != expected_n {
        return Err(SimulationFailure::Decode(format!(
            "requested {expected_n} links but animation data has {}",
            payload.n
        )));
    }
    Ok(SimulationOutcome {
        data: AnimationData::try_from(payload)?, // Frame shape and limit validated here
        trajectory_image: decoded // Empty strings mean "no image"
            .trajectory_image
            .filter(|url| !url.is_empty())
            .map(TrajectoryImage::new),
    })
}

#[derive(Clone)]
pub struct SimulationClient {
    url: String,
    transport: Arc<dyn Transport>,
}

impl SimulationClient {
    pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs one simulation. The blocking exchange happens on tokio's blocking pool so the
    /// caller's task keeps scheduling.
    pub async fn run(
        &self,
        config: &ChainConfiguration,
    ) -> Result<SimulationOutcome, SimulationFailure> {
        let request = SimulationRequest::from(config);
        let expected_n = request.n;
        let body = serde_json::to_string(&request)
            .map_err(|e| SimulationFailure::Transport(format!("cannot encode request: {e}")))?;
        debug!("POST {} with {} links", self.url, expected_n);

        let transport = Arc::clone(&self.transport);
        let url = self.url.clone();
        let response = tokio::task::spawn_blocking(move || transport.post_json(&url, &body))
            .await
            .map_err(|e| SimulationFailure::Transport(e.to_string()))?
            .map_err(SimulationFailure::Transport)?;
        decode_response(response, expected_n)
    }
}
