//! Render-layer adapters
//!
//! The base scene and the asteroid overlay are independent layers, but they
//! must never run their own clocks. A `Director` owns the one `Timeline`,
//! advances it once per frame and only then hands every adapter the same
//! read-only `FrameInput`.

pub mod effects;
pub mod lod;
pub mod overlay;
pub mod scene;

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

pub use effects::{EffectConfig, EffectDescriptor, EffectKind, Emitter, ParticleInstance};
pub use lod::{DetailLevel, LodSwitch, LodThresholds};
pub use overlay::OverlayLayer;
pub use scene::{SceneLayer, SceneUniforms};

use crate::config::CinematicConfig;
use crate::sim::{Phase, Timeline, TimelineState};

/// Per-frame snapshot every adapter reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameInput {
    /// Normalized progress
    pub t: f32,
    /// Simulation time advanced this frame
    pub delta_time_seconds: f32,
    /// Fixed steps integrated this frame
    pub fixed_steps: u32,
    pub fixed_time_step: f32,
    pub phase: Phase,
    pub phase_progress: f32,
    pub elapsed_seconds: f64,
    pub total_duration: f32,
    pub seed: u32,
}

/// A side-effecting consumer of the timeline (mesh/material updates)
pub trait RenderAdapter {
    fn name(&self) -> &str;

    /// Timeline restarted; drop one-shot state and reseed
    fn on_restart(&mut self, seed: u32);

    /// Consume this frame's snapshot
    fn on_frame(&mut self, frame: &FrameInput);
}

/// Shared handle so the caller can keep reading an adapter it registered
pub type SharedAdapter = Rc<RefCell<dyn RenderAdapter>>;

/// Owns the timeline and drives every registered adapter from it
pub struct Director {
    timeline: Timeline,
    adapters: Vec<SharedAdapter>,
    last_frame: Option<FrameInput>,
    frame_count: u64,
}

impl Director {
    pub fn new(config: &CinematicConfig) -> Self {
        Self {
            timeline: Timeline::new(config),
            adapters: Vec::new(),
            last_frame: None,
            frame_count: 0,
        }
    }

    /// Register an adapter; frames are delivered in registration order
    pub fn add_adapter(&mut self, adapter: SharedAdapter) {
        log::info!("Registered render adapter '{}'", adapter.borrow().name());
        self.adapters.push(adapter);
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Read-only view of the clock
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn state(&self) -> TimelineState {
        self.timeline.state()
    }

    pub fn last_frame(&self) -> Option<&FrameInput> {
        self.last_frame.as_ref()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // === Control surface ===

    /// Restart immediately; adapters are reset before the next frame
    pub fn restart(&mut self, now_seconds: f64) {
        self.timeline.restart(now_seconds);
        let seed = self.timeline.seed();
        for adapter in &self.adapters {
            adapter.borrow_mut().on_restart(seed);
        }
        self.last_frame = None;
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn resume(&mut self, now_seconds: f64) {
        let was_idle = self.timeline.playback() == crate::sim::Playback::Idle;
        if was_idle {
            self.restart(now_seconds);
        } else {
            self.timeline.resume(now_seconds);
        }
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.timeline.set_seed(seed);
    }

    pub fn seek(&mut self, t: f32) {
        self.timeline.seek(t);
    }

    // === Frame loop ===

    /// Advance the clock, then deliver the frame to every adapter
    pub fn frame(&mut self, now_seconds: f64) -> FrameInput {
        let advance = self.timeline.update(now_seconds);
        let frame = FrameInput {
            t: self.timeline.t(),
            delta_time_seconds: advance.sim_delta_seconds as f32,
            fixed_steps: advance.steps,
            fixed_time_step: self.timeline.fixed_time_step() as f32,
            phase: *self.timeline.current_phase(),
            phase_progress: self.timeline.phase_progress(),
            elapsed_seconds: self.timeline.elapsed_seconds(),
            total_duration: self.timeline.total_duration() as f32,
            seed: self.timeline.seed(),
        };
        for adapter in &self.adapters {
            adapter.borrow_mut().on_frame(&frame);
        }
        self.frame_count += 1;
        self.last_frame = Some(frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PhaseKey;

    /// Records every frame it sees
    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameInput>,
        restarts: Vec<u32>,
    }

    impl RenderAdapter for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_restart(&mut self, seed: u32) {
            self.restarts.push(seed);
        }

        fn on_frame(&mut self, frame: &FrameInput) {
            self.frames.push(*frame);
        }
    }

    #[test]
    fn test_layers_see_identical_frames() {
        let mut director = Director::new(&CinematicConfig::default());
        let base = Rc::new(RefCell::new(Recorder::default()));
        let overlay = Rc::new(RefCell::new(Recorder::default()));
        director.add_adapter(base.clone());
        director.add_adapter(overlay.clone());
        director.restart(0.0);
        for i in 1..=120 {
            director.frame(i as f64 * 0.017);
        }
        assert_eq!(base.borrow().frames, overlay.borrow().frames);
        assert_eq!(base.borrow().frames.len(), 120);
    }

    #[test]
    fn test_frame_reflects_update_of_same_frame() {
        let mut director = Director::new(&CinematicConfig::default());
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        director.add_adapter(recorder.clone());
        director.restart(0.0);
        let frame = director.frame(6.0);
        assert!((frame.t - 0.5).abs() < 1e-6);
        assert_eq!(frame.phase.key, PhaseKey::MidApproach);
        assert_eq!(frame.fixed_steps, 360);
        assert_eq!(recorder.borrow().frames[0].t, director.timeline().t());
    }

    #[test]
    fn test_restart_notifies_adapters_with_staged_seed() {
        let mut director = Director::new(&CinematicConfig::default());
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        director.add_adapter(recorder.clone());
        director.restart(0.0);
        director.set_seed(99);
        director.frame(1.0);
        director.restart(1.0);
        assert_eq!(recorder.borrow().restarts, vec![crate::consts::DEFAULT_SEED, 99]);
        assert_eq!(director.state().elapsed_seconds, 0.0);
    }

    #[test]
    fn test_resume_from_idle_restarts_adapters() {
        let mut director = Director::new(&CinematicConfig::default());
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        director.add_adapter(recorder.clone());
        director.resume(3.0);
        assert!(director.state().is_playing);
        assert_eq!(recorder.borrow().restarts.len(), 1);
    }

    #[test]
    fn test_paused_frames_have_zero_delta() {
        let mut director = Director::new(&CinematicConfig::default());
        director.restart(0.0);
        director.frame(1.0);
        director.pause();
        let frame = director.frame(2.0);
        assert_eq!(frame.delta_time_seconds, 0.0);
        assert_eq!(frame.fixed_steps, 0);
        assert_eq!(director.frame_count(), 2);
    }
}
