// src/model.rs
// Data model shared by every component: the chain the user configures, the request the solver
// receives, and the animation data it sends back.
// AnimationData is only ever built through AnimationData::new, so a value that exists is a
// consistent snapshot (every frame holds exactly 2n coordinates).

use crate::error::SimulationFailure; // Invalid payloads surface as decode failures
use serde::{Deserialize, Serialize}; // Request out, response in

/// Total simulated time requested from the solver.
pub const T_MAX: f64 = 60.0;
/// Number of samples requested from the solver.
pub const N_POINTS: usize = 8000;

pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_LENGTH: f64 = 1.0;

/// Default initial angle in degrees for 1-based link `index`.
/// Links 1 and 2 reproduce the classic double-pendulum start; the rest hang straight down.
pub fn default_angle_deg(index: usize) -> f64 {
    match index {
        1 => 90.0,
        2 => 45.0,
        _ => 0.0,
    }
}

/// Parameters of one rigid link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkParams {
    pub mass: f64,              // Point mass at the end of the link
    pub length: f64,            // Rod length
    pub initial_angle_deg: f64, // Starting angle from the vertical, degrees
}

impl LinkParams {
    /// Positional defaults for 1-based link `index`.
    pub fn default_for(index: usize) -> Self {
        Self {
            mass: DEFAULT_MASS,
            length: DEFAULT_LENGTH,
            initial_angle_deg: default_angle_deg(index),
        }
    }
}

/// Ordered links, link 1 nearest the pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfiguration {
    links: Vec<LinkParams>,
}

impl ChainConfiguration {
    /// Returns None for an empty chain.
    pub fn new(links: Vec<LinkParams>) -> Option<Self> {
        if links.is_empty() {
            return None;
        }
        Some(Self { links })
    }

    pub fn n(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[LinkParams] {
        &self.links
    }
}

/// Comma-joins one value per link, in link order.
fn join_values(links: &[LinkParams], value: impl Fn(&LinkParams) -> f64) -> String {
    links
        .iter()
        .map(|link| value(link).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Request body sent to the solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub n: usize,               // Number of links
    pub masses: String,         // Comma-separated masses
    pub lengths: String,        // Comma-separated lengths
    pub initial_angles: String, // Comma-separated initial angles, degrees
    pub t_max: f64,             // Fixed simulated duration
    pub n_points: usize,        // Fixed sample count
}

impl From<&ChainConfiguration> for SimulationRequest {
    fn from(config: &ChainConfiguration) -> Self {
        let links = config.links();
        Self {
            n: links.len(),
            masses: join_values(links, |l| l.mass),
            lengths: join_values(links, |l| l.length),
            initial_angles: join_values(links, |l| l.initial_angle_deg),
            t_max: T_MAX,
            n_points: N_POINTS,
        }
    }
}

/// Response body as the solver sends it. Fields other than `success` are optional because a
/// failed run omits them.
#[derive(Debug, Deserialize)]
pub struct SimulationResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub trajectory_image: Option<String>,
    #[serde(default)]
    pub animation_data: Option<AnimationPayload>,
}

/// Unvalidated animation data straight off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationPayload {
    pub n: usize,                 // Number of links
    pub limit: f64,               // Coordinate bound used for scaling
    pub positions: Vec<Vec<f64>>, // Frames: [x1, y1, x2, y2, ...]
}

/// One time sample: `(x_1, y_1, ..., x_n, y_n)`.
pub type Frame = Vec<f64>;

/// Validated animation time series.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationData {
    n: usize,
    limit: f64,
    positions: Vec<Frame>,
}

impl AnimationData {
    /// Rejects payloads the renderer could not draw safely.
    pub fn new(n: usize, limit: f64, positions: Vec<Frame>) -> Result<Self, SimulationFailure> {
        if n == 0 {
            return Err(SimulationFailure::Decode("animation data has n = 0".into()));
        }
        if !limit.is_finite() || limit <= 0.0 {
            return Err(SimulationFailure::Decode(format!(
                "animation limit must be positive, got {limit}"
            )));
        }
        for (idx, frame) in positions.iter().enumerate() {
            if frame.len() != 2 * n {
                return Err(SimulationFailure::Decode(format!(
                    "frame {idx} has {} values, expected {}",
                    frame.len(),
                    2 * n
                )));
            }
            if frame.iter().any(|v| !v.is_finite()) {
                return Err(SimulationFailure::Decode(format!(
                    "frame {idx} contains a non-finite coordinate"
                )));
            }
        }
        Ok(Self { n, limit, positions })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn frames(&self) -> &[Frame] {
        &self.positions
    }

    pub fn frame_count(&self) -> usize {
        self.positions.len()
    }

    /// Position of 1-based `link` in frame `frame`; None when either index is out of range.
    pub fn link_position(&self, frame: usize, link: usize) -> Option<(f64, f64)> {
        if link == 0 || link > self.n {
            return None; // links are numbered 1..=n
        }
        let values = self.positions.get(frame)?; // every frame holds 2n values
        let x = 2 * (link - 1);
        Some((values[x], values[x + 1]))
    }

    /// Position of the terminal mass (link n) in frame `frame`.
    pub fn terminal_position(&self, frame: usize) -> Option<(f64, f64)> {
        self.link_position(frame, self.n)
    }
}

impl TryFrom<AnimationPayload> for AnimationData {
    type Error = SimulationFailure;

    fn try_from(payload: AnimationPayload) -> Result<Self, Self::Error> {
        AnimationData::new(payload.n, payload.limit, payload.positions)
    }
}
