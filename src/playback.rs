// src/playback.rs
// Playback state machine and the session object that pairs it with the animation data.
//
//   Idle --load_data--> Playing <--toggle--> Paused
//
// load_data is accepted from every state and always rewinds and starts playing.
// reset only rewinds; it never changes whether playback is running.

use crate::model::AnimationData;
use serde::Serialize;
use std::sync::Arc;

/// Frames advanced per tick.
pub const TICK_STEP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Paused,
    Playing,
}

/// What a play/pause press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Playback switched to this state.
    Switched(PlaybackState),
    /// No data yet; the caller should start a run instead.
    RunRequested,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: PlaybackState,
    frame_index: usize,
    frame_count: usize,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            frame_index: 0,
            frame_count: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// New data arrived: rewind and play.
    pub fn load_data(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.frame_index = 0;
        self.state = PlaybackState::Playing;
    }

    pub fn toggle_play_pause(&mut self) -> ToggleOutcome {
        self.state = match self.state {
            PlaybackState::Idle => return ToggleOutcome::RunRequested,
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        };
        ToggleOutcome::Switched(self.state)
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
    }

    /// Advances by TICK_STEP frames, wrapping at the end. Returns whether the index moved.
    pub fn tick(&mut self) -> bool {
        if self.state != PlaybackState::Playing || self.frame_count == 0 {
            return false;
        }
        self.frame_index = (self.frame_index + TICK_STEP) % self.frame_count;
        true
    }
}

/// The animation data currently on screen together with its playback position.
/// Data is swapped as a whole `Arc`, never edited in place.
#[derive(Debug, Default, Clone)]
pub struct PlaybackSession {
    data: Option<Arc<AnimationData>>,
    controller: PlaybackController,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&Arc<AnimationData>> {
        self.data.as_ref()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn load_data(&mut self, data: Arc<AnimationData>) {
        self.controller.load_data(data.frame_count());
        self.data = Some(data);
    }

    pub fn toggle_play_pause(&mut self) -> ToggleOutcome {
        self.controller.toggle_play_pause()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Ticks only when there is data to advance through.
    pub fn tick(&mut self) -> bool {
        self.data.is_some() && self.controller.tick()
    }

    /// Data and index to draw, if there is anything drawable.
    pub fn drawable(&self) -> Option<(&AnimationData, usize)> {
        let data = self.data.as_deref()?;
        if data.frame_count() == 0 {
            return None;
        }
        Some((data, self.controller.frame_index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(frames: usize) -> Arc<AnimationData> {
        Arc::new(AnimationData::new(1, 1.5, vec![vec![0.0, -1.0]; frames]).unwrap())
    }

    #[test]
    fn test_starts_idle() {
        let controller = PlaybackController::new();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!controller.is_playing());
        assert_eq!(controller.frame_index(), 0);
    }

    #[test]
    fn test_toggle_while_idle_requests_run() {
        let mut controller = PlaybackController::new();
        assert_eq!(controller.toggle_play_pause(), ToggleOutcome::RunRequested);
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_load_data_always_plays_from_zero() {
        let mut controller = PlaybackController::new();
        controller.load_data(10);
        controller.tick();
        controller.toggle_play_pause();
        assert_eq!(controller.state(), PlaybackState::Paused);
        controller.load_data(7);
        assert!(controller.is_playing());
        assert_eq!(controller.frame_index(), 0);
        assert_eq!(controller.frame_count(), 7);
    }

    #[test]
    fn test_toggle_switches_between_paused_and_playing() {
        let mut controller = PlaybackController::new();
        controller.load_data(4);
        assert_eq!(
            controller.toggle_play_pause(),
            ToggleOutcome::Switched(PlaybackState::Paused)
        );
        assert_eq!(
            controller.toggle_play_pause(),
            ToggleOutcome::Switched(PlaybackState::Playing)
        );
    }

    #[test]
    fn test_tick_wraps_within_frame_count() {
        for frame_count in 1..=9 {
            let mut controller = PlaybackController::new();
            controller.load_data(frame_count);
            for _ in 0..50 {
                controller.tick();
                assert!(controller.frame_index() < frame_count);
            }
        }
    }

    #[test]
    fn test_tick_steps_by_two() {
        let mut controller = PlaybackController::new();
        controller.load_data(5);
        let seen: Vec<usize> = (0..4)
            .map(|_| {
                controller.tick();
                controller.frame_index()
            })
            .collect();
        assert_eq!(seen, [2, 4, 1, 3]);
    }

    #[test]
    fn test_tick_ignored_when_paused_or_empty() {
        let mut controller = PlaybackController::new();
        assert!(!controller.tick());
        controller.load_data(0);
        assert!(!controller.tick());
        controller.load_data(6);
        controller.toggle_play_pause();
        assert!(!controller.tick());
        assert_eq!(controller.frame_index(), 0);
    }

    #[test]
    fn test_reset_keeps_play_state() {
        let mut controller = PlaybackController::new();
        controller.load_data(10);
        controller.tick();
        controller.reset();
        assert_eq!(controller.frame_index(), 0);
        assert!(controller.is_playing());

        controller.tick();
        controller.toggle_play_pause();
        controller.reset();
        assert_eq!(controller.frame_index(), 0);
        assert_eq!(controller.state(), PlaybackState::Paused);

        let mut idle = PlaybackController::new();
        idle.reset();
        assert_eq!(idle.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_session_replaces_data_wholesale() {
        let mut session = PlaybackSession::new();
        assert!(session.drawable().is_none());
        session.load_data(data(10));
        session.tick();
        assert_eq!(session.controller().frame_index(), 2);
        let next = data(3);
        session.load_data(next.clone());
        assert!(Arc::ptr_eq(session.data().unwrap(), &next));
        assert_eq!(session.drawable().map(|(_, idx)| idx), Some(0));
    }

    #[test]
    fn test_session_without_frames_is_not_drawable() {
        let mut session = PlaybackSession::new();
        session.load_data(data(0));
        assert!(session.drawable().is_none());
        assert!(!session.tick());
    }
}
