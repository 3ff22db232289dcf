// Shared fixtures for the integration tests: a scripted solver and polling helpers.
#![allow(dead_code)]

use n_pendulum_viewer::client::TransportResponse;
use n_pendulum_viewer::{
    AnimationHandle, AnimationLoop, FrameRenderer, LoopSettings, RunPolicy, SimulationClient,
    Transport, ViewState,
};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One scripted solver reply, delivered after `delay`.
#[derive(Clone)]
pub struct Reply {
    pub delay: Duration,
    pub result: Result<TransportResponse, String>,
}

impl Reply {
    pub fn ok(body: String) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(TransportResponse { status: 200, body }),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Hands out replies in call order; the last one repeats once the script runs out.
pub struct ScriptedSolver {
    replies: Vec<Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSolver {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedSolver {
    fn post_json(&self, _url: &str, body: &str) -> Result<TransportResponse, String> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(body.to_string());
            let idx = (calls.len() - 1).min(self.replies.len() - 1);
            self.replies[idx].clone()
        };
        thread::sleep(reply.delay);
        reply.result
    }
}

/// Successful response for `n` links with `frames` frames and the given limit.
pub fn success_body(n: usize, frames: usize, limit: f64) -> String {
    let positions: Vec<Vec<f64>> = (0..frames)
        .map(|i| {
            let t = i as f64 * 0.01;
            (1..=n)
                .flat_map(|link| [link as f64 * t.sin(), -(link as f64) * t.cos()])
                .collect()
        })
        .collect();
    serde_json::json!({
        "success": true,
        "trajectory_image": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==",
        "animation_data": { "n": n, "limit": limit, "positions": positions }
    })
    .to_string()
}

pub fn failure_body(message: &str) -> String {
    serde_json::json!({ "success": false, "error": message }).to_string()
}

/// A tick long enough that playback never advances on its own during a test.
pub const FROZEN: Duration = Duration::from_secs(3600);

pub fn spawn_loop(solver: Arc<ScriptedSolver>, tick: Duration, policy: RunPolicy) -> AnimationHandle {
    let client = SimulationClient::new("http://solver.test/simulate", solver);
    let settings = LoopSettings {
        tick,
        policy,
        chain_length: 2,
        container_width: 400,
    };
    let (handle, _task) = AnimationLoop::spawn(settings, client, FrameRenderer::default()).unwrap();
    handle
}

/// Polls the loop until `done` holds, panicking after five seconds.
pub async fn wait_for(handle: &AnimationHandle, done: impl Fn(&ViewState) -> bool) -> ViewState {
    for _ in 0..1000 {
        let state = handle.snapshot().await.unwrap();
        if done(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("animation loop never reached the expected state");
}
