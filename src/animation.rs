// src/animation.rs
// The animation loop: one tokio task that owns the whole view (form, playback session, viewport,
// bitmap) and changes it only in response to messages. Each tick it advances playback when
// playing and redraws; loads, resets and resizes redraw immediately.
// Simulation requests run on separate tasks and report back through the completion channel,
// so a new AnimationData is always installed in one step between two ticks.

use crate::client::{SimulationClient, SimulationOutcome, TrajectoryImage}; // Runs and their results
use crate::config::RunPolicy; // Overlapping-run resolution
use crate::error::{FormError, LoopClosed, SimulationFailure};
use crate::form::{ChainFormBuilder, FieldId, FieldSet};
use crate::playback::{PlaybackSession, PlaybackState, ToggleOutcome};
use crate::render::FrameRenderer;
use crate::surface::BitmapSurface;
use crate::viewport::{Viewport, ViewportManager};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot}; // Commands in, replies out
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Settings the loop starts with.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub tick: Duration,
    pub policy: RunPolicy,
    pub chain_length: usize,
    pub container_width: u32,
}

/// Everything the control surface shows, captured between two ticks.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub state: PlaybackState,
    pub frame_index: usize,
    pub frame_count: usize,
    pub n: Option<usize>,
    pub limit: Option<f64>,
    pub chain_length: usize,
    pub fields: FieldSet,
    pub loading: bool,
    pub alert: Option<String>,
    pub viewport: Viewport,
    pub has_trajectory_image: bool,
    pub runs_started: u64,
    pub frames_drawn: u64,
}

enum Command {
    SetChainLength {
        n: usize,
        reply: oneshot::Sender<Result<FieldSet, FormError>>,
    },
    SetField {
        id: FieldId,
        value: f64,
        reply: oneshot::Sender<Result<(), FormError>>,
    },
    Run {
        reply: oneshot::Sender<Result<u64, FormError>>,
    },
    TogglePlayPause {
        reply: oneshot::Sender<ToggleOutcome>,
    },
    Reset,
    Resize {
        width: u32,
    },
    Snapshot {
        reply: oneshot::Sender<ViewState>,
    },
    Frame {
        reply: oneshot::Sender<BitmapSurface>,
    },
    Trajectory {
        reply: oneshot::Sender<Option<TrajectoryImage>>,
    },
}

struct RunCompletion {
    generation: u64,
    result: Result<SimulationOutcome, SimulationFailure>,
}

/// Cloneable sender side of the loop.
#[derive(Clone)]
pub struct AnimationHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl AnimationHandle {
    fn send(&self, command: Command) -> Result<(), LoopClosed> {
        self.commands.send(command).map_err(|_| LoopClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, LoopClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(make(reply))?;
        rx.await.map_err(|_| LoopClosed)
    }

    /// Rebuilds the form for `n` links; every field returns to its default.
    pub async fn set_chain_length(&self, n: usize) -> Result<Result<FieldSet, FormError>, LoopClosed> {
        self.request(|reply| Command::SetChainLength { n, reply }).await
    }

    pub async fn set_field(&self, id: FieldId, value: f64) -> Result<Result<(), FormError>, LoopClosed> {
        self.request(|reply| Command::SetField { id, value, reply }).await
    }

    /// Starts a run with the current form values. Returns the run's generation number.
    pub async fn run(&self) -> Result<Result<u64, FormError>, LoopClosed> {
        self.request(|reply| Command::Run { reply }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<ToggleOutcome, LoopClosed> {
        self.request(|reply| Command::TogglePlayPause { reply }).await
    }

    pub fn reset(&self) -> Result<(), LoopClosed> {
        self.send(Command::Reset)
    }

    pub fn resize(&self, width: u32) -> Result<(), LoopClosed> {
        self.send(Command::Resize { width })
    }

    pub async fn snapshot(&self) -> Result<ViewState, LoopClosed> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Copy of the surface as last drawn.
    pub async fn frame(&self) -> Result<BitmapSurface, LoopClosed> {
        self.request(|reply| Command::Frame { reply }).await
    }

    pub async fn trajectory_image(&self) -> Result<Option<TrajectoryImage>, LoopClosed> {
        self.request(|reply| Command::Trajectory { reply }).await
    }
}

pub struct AnimationLoop {
    client: SimulationClient,
    renderer: FrameRenderer,
    policy: RunPolicy,
    tick: Duration,
    form: ChainFormBuilder,
    session: PlaybackSession,
    viewport: ViewportManager,
    surface: BitmapSurface,
    trajectory: Option<TrajectoryImage>,
    alert: Option<String>,
    generation: u64,
    in_flight: usize,
    frames_drawn: u64,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<RunCompletion>,
    completions: mpsc::UnboundedReceiver<RunCompletion>,
}

impl AnimationLoop {
    /// Builds the loop and its handle without starting it.
    pub fn new(
        settings: LoopSettings,
        client: SimulationClient,
        renderer: FrameRenderer,
    ) -> Result<(Self, AnimationHandle), FormError> {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let viewport = ViewportManager::new(settings.container_width);
        let animation = Self {
            client,
            renderer,
            policy: settings.policy,
            tick: settings.tick,
            form: ChainFormBuilder::new(settings.chain_length)?,
            session: PlaybackSession::new(),
            surface: BitmapSurface::new(viewport.viewport()),
            viewport,
            trajectory: None,
            alert: None,
            generation: 0,
            in_flight: 0,
            frames_drawn: 0,
            commands,
            completions_tx,
            completions,
        };
        Ok((animation, AnimationHandle { commands: commands_tx }))
    }

    /// Spawns the loop on the current tokio runtime. It stops once every handle is dropped.
    pub fn spawn(
        settings: LoopSettings,
        client: SimulationClient,
        renderer: FrameRenderer,
    ) -> Result<(AnimationHandle, JoinHandle<()>), FormError> {
        let (animation, handle) = Self::new(settings, client, renderer)?;
        Ok((handle, tokio::spawn(animation.run_loop())))
    }

    pub async fn run_loop(mut self) {
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            "animation loop started: {:?} per tick, {:?} run policy",
            self.tick, self.policy
        );
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(completion) = self.completions.recv() => self.finish_run(completion),
                _ = ticker.tick() => self.on_tick(),
            }
        }
        info!("animation loop stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetChainLength { n, reply } => {
                debug!("chain length -> {n}");
                let _ = reply.send(self.form.build(n).cloned());
            }
            Command::SetField { id, value, reply } => {
                debug!("field {id} -> {value}");
                let _ = reply.send(self.form.set(id, value));
            }
            Command::Run { reply } => {
                let _ = reply.send(self.start_run());
            }
            Command::TogglePlayPause { reply } => {
                let outcome = self.session.toggle_play_pause();
                match outcome {
                    ToggleOutcome::RunRequested => {
                        debug!("play pressed without data, starting a run");
                        if let Err(err) = self.start_run() {
                            error!("cannot start run: {err}");
                        }
                    }
                    ToggleOutcome::Switched(state) => debug!("playback -> {state:?}"),
                }
                let _ = reply.send(outcome);
            }
            Command::Reset => {
                self.session.reset();
                self.redraw();
            }
            Command::Resize { width } => {
                if self.viewport.resize(width) {
                    self.surface.resize(self.viewport.viewport());
                    debug!("viewport -> {:?}", self.viewport.viewport());
                    self.redraw();
                }
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.view_state());
            }
            Command::Frame { reply } => {
                let _ = reply.send(self.surface.clone());
            }
            Command::Trajectory { reply } => {
                let _ = reply.send(self.trajectory.clone());
            }
        }
    }

    fn start_run(&mut self) -> Result<u64, FormError> {
        let config = self.form.read(self.form.chain_length())?;
        self.generation += 1;
        self.in_flight += 1;
        let generation = self.generation;
        info!("run {generation}: requesting {} links from {}", config.n(), self.client.url());

        let client = self.client.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = client.run(&config).await;
            // The loop may already be gone; nothing left to report to.
            let _ = completions.send(RunCompletion { generation, result });
        });
        Ok(generation)
    }

    fn finish_run(&mut self, completion: RunCompletion) {
        // This request is no longer outstanding
        self.in_flight = self.in_flight.saturating_sub(1);
        let RunCompletion { generation, result } = completion;

        // Under LatestRequest only the newest run may touch the view
        if self.policy == RunPolicy::LatestRequest && generation != self.generation {
            warn!("run {generation}: superseded by run {}, discarding", self.generation);
            return;
        }
        match result {
            Ok(outcome) => {
                info!(
                    "run {generation}: installing {} frames for {} links",
                    outcome.data.frame_count(),
                    outcome.data.n()
                );
                self.session.load_data(Arc::new(outcome.data)); // Swap whole data, rewind, play
                self.trajectory = outcome.trajectory_image; // Replace the static plot slot
                self.alert = None; // A good run clears any earlier alert
                self.redraw(); // Show frame 0 without waiting for a tick
            }
            Err(failure) => {
                // Solver-side failures are expected outcomes; the rest point at plumbing
                match &failure {
                    SimulationFailure::Simulation(_) => warn!("run {generation}: {failure}"),
                    _ => error!("run {generation}: {failure}"),
                }
                // Data stays as it was; only solver messages reach the user
                if let Some(text) = failure.alert_text() {
                    self.alert = Some(text);
                }
            }
        }
    }

    fn on_tick(&mut self) {
        if self.session.tick() {
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        let Some((data, frame_index)) = self.session.drawable() else {
            return;
        };
        match self
            .renderer
            .draw(data, frame_index, self.viewport.viewport(), &mut self.surface)
        {
            Ok(()) => self.frames_drawn += 1,
            Err(err) => error!("frame {frame_index}: {err}"),
        }
    }

    fn view_state(&self) -> ViewState {
        let controller = self.session.controller();
        let data = self.session.data();
        ViewState {
            state: controller.state(),
            frame_index: controller.frame_index(),
            frame_count: controller.frame_count(),
            n: data.map(|d| d.n()),
            limit: data.map(|d| d.limit()),
            chain_length: self.form.chain_length(),
            fields: self.form.fields().clone(),
            loading: self.in_flight > 0,
            alert: self.alert.clone(),
            viewport: self.viewport.viewport(),
            has_trajectory_image: self.trajectory.is_some(),
            runs_started: self.generation,
            frames_drawn: self.frames_drawn,
        }
    }
}
