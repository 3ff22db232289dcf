// src/lib.rs
// Client-side viewer for the N-pendulum solver: builds the chain form, requests a simulation,
// and plays the returned positions back as a 2D animation.

pub mod animation;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod playback;
pub mod render;
pub mod server;
pub mod surface;
pub mod transform;
pub mod viewport;

pub use animation::{AnimationHandle, AnimationLoop, LoopSettings, ViewState};
pub use client::{SimulationClient, SimulationOutcome, TrajectoryImage, Transport, UreqTransport};
pub use config::{RunPolicy, ViewerConfig};
pub use error::SimulationFailure;
pub use model::{AnimationData, ChainConfiguration, LinkParams, SimulationRequest};
pub use playback::{PlaybackController, PlaybackSession, PlaybackState};
pub use render::FrameRenderer;
