//! Fixed timestep timeline driver
//!
//! Converts wall-clock readings into a reproducible simulation time and the
//! normalized progress `t` that every curve evaluator consumes. `t` depends
//! only on `elapsed_seconds` and the sequence duration, never on the wall
//! clock, so two timelines fed the same `now` readings stay bit-identical.

use serde::Serialize;

use super::phase::{Phase, PhaseKey, phase_at};
use crate::config::CinematicConfig;

/// Slack when comparing the accumulator against one step, so a delta that is
/// an exact multiple of the step is not short one iteration after rounding.
const STEP_EPSILON: f64 = 1e-9;

/// Playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Playback {
    /// Never started
    Idle,
    /// Accumulating time
    Playing,
    /// Frozen, elapsed time kept
    Paused,
}

/// Read-only snapshot handed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineState {
    pub t: f32,
    pub elapsed_seconds: f64,
    pub phase: PhaseKey,
    pub phase_name: &'static str,
    pub phase_progress: f32,
    pub is_playing: bool,
    pub seed: u32,
    pub loops: u32,
}

/// What one `update` call did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Advance {
    /// Fixed steps integrated
    pub steps: u32,
    /// Simulation time advanced (`steps * fixed_time_step`)
    pub sim_delta_seconds: f64,
    /// Wall-clock time discarded by the catch-up cap
    pub dropped_seconds: f64,
    /// Elapsed time wrapped past the end of the sequence
    pub wrapped: bool,
}

/// The single shared clock for all render layers
#[derive(Debug, Clone)]
pub struct Timeline {
    total_duration: f64,
    fixed_time_step: f64,
    max_catch_up_steps: u32,
    looping: bool,

    seed: u32,
    pending_seed: Option<u32>,

    playback: Playback,
    elapsed_seconds: f64,
    accumulator: f64,
    last_real_time_seconds: f64,
    loops: u32,

    t: f32,
    phase: PhaseKey,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(&CinematicConfig::default())
    }
}

impl Timeline {
    /// Create an idle timeline; the config is sanitized first
    pub fn new(config: &CinematicConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            total_duration: config.total_duration,
            fixed_time_step: config.fixed_time_step,
            max_catch_up_steps: config.max_catch_up_steps,
            looping: config.looping,
            seed: config.seed,
            pending_seed: None,
            playback: Playback::Idle,
            elapsed_seconds: 0.0,
            accumulator: 0.0,
            last_real_time_seconds: 0.0,
            loops: 0,
            t: 0.0,
            phase: PhaseKey::FarApproach,
        }
    }

    // === Control surface ===

    /// Start over from zero. Legal from any state; a staged seed takes effect here.
    pub fn restart(&mut self, now_seconds: f64) {
        if let Some(seed) = self.pending_seed.take() {
            log::info!("Applying staged seed {} (was {})", seed, self.seed);
            self.seed = seed;
        }
        self.playback = Playback::Playing;
        self.elapsed_seconds = 0.0;
        self.accumulator = 0.0;
        self.loops = 0;
        self.last_real_time_seconds = if now_seconds.is_finite() { now_seconds } else { 0.0 };
        self.refresh_derived();
        log::info!("Timeline restarted (seed {})", self.seed);
    }

    /// Freeze playback, keeping elapsed time
    pub fn pause(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
            log::debug!("Timeline paused at t={:.4}", self.t);
        }
    }

    /// Same as `pause`; the UI exposes it as Stop
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Continue from a pause, rebasing the wall-clock reference so the idle gap
    /// is not integrated. Resuming a never-started timeline restarts it.
    pub fn resume(&mut self, now_seconds: f64) {
        match self.playback {
            Playback::Paused => {
                self.playback = Playback::Playing;
                if now_seconds.is_finite() {
                    self.last_real_time_seconds = now_seconds;
                }
                log::debug!("Timeline resumed at t={:.4}", self.t);
            }
            Playback::Idle => self.restart(now_seconds),
            Playback::Playing => {}
        }
    }

    /// Stage a seed for the next `restart`
    pub fn set_seed(&mut self, seed: u32) {
        self.pending_seed = Some(seed);
        log::info!("Seed {} staged; takes effect on restart", seed);
    }

    /// Jump to a normalized progress value (scrubbing). Clears the accumulator.
    ///
    /// `seek(1.0)` lands on the final frame even when looping; the next
    /// fixed step wraps as usual.
    pub fn seek(&mut self, t: f32) {
        let t = crate::clamp01(t) as f64;
        self.elapsed_seconds = t * self.total_duration;
        self.accumulator = 0.0;
        self.refresh_derived();
    }

    // === Per-frame driver ===

    /// Advance simulation time to match `now_seconds`.
    ///
    /// No-op unless playing. Regressing or non-finite clock readings contribute
    /// zero time. At most `max_catch_up_steps` fixed steps are integrated per
    /// call; wall-clock time beyond that is dropped and reported in
    /// `Advance::dropped_seconds`.
    pub fn update(&mut self, now_seconds: f64) -> Advance {
        let mut advance = Advance::default();
        if self.playback != Playback::Playing {
            return advance;
        }

        let mut delta = now_seconds - self.last_real_time_seconds;
        if now_seconds.is_finite() {
            self.last_real_time_seconds = now_seconds;
        }
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("Clock anomaly (delta {delta}); integrating zero time");
            delta = 0.0;
        }

        let step = self.fixed_time_step;
        let max_delta = f64::from(self.max_catch_up_steps) * step;
        if delta > max_delta {
            advance.dropped_seconds = delta - max_delta;
            log::warn!(
                "Frame delta {:.3}s exceeds catch-up cap; dropping {:.3}s",
                delta,
                advance.dropped_seconds
            );
            delta = max_delta;
        }
        self.accumulator += delta;

        while self.accumulator + STEP_EPSILON >= step && advance.steps < self.max_catch_up_steps {
            if self.is_finished() {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator = (self.accumulator - step).max(0.0);
            advance.steps += 1;
            if self.step_once() {
                advance.wrapped = true;
            }
        }
        if self.accumulator >= step {
            advance.dropped_seconds += self.accumulator - self.accumulator % step;
            self.accumulator %= step;
        }
        advance.sim_delta_seconds = f64::from(advance.steps) * step;

        self.refresh_derived();
        advance
    }

    /// One fixed step; returns true when elapsed time wrapped
    fn step_once(&mut self) -> bool {
        self.elapsed_seconds += self.fixed_time_step;
        if self.elapsed_seconds < self.total_duration {
            return false;
        }
        if self.looping {
            self.elapsed_seconds %= self.total_duration;
            self.loops = self.loops.wrapping_add(1);
            log::debug!("Timeline wrapped (loop {})", self.loops);
            true
        } else {
            self.elapsed_seconds = self.total_duration;
            false
        }
    }

    fn refresh_derived(&mut self) {
        let t = (self.elapsed_seconds / self.total_duration).min(1.0) as f32;
        self.t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        let phase = phase_at(self.t).key;
        if phase != self.phase {
            log::debug!("Phase {} -> {} at t={:.4}", self.phase.as_str(), phase.as_str(), self.t);
            self.phase = phase;
        }
    }

    // === Readers ===

    /// Normalized progress in [0, 1]
    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn fixed_time_step(&self) -> f64 {
        self.fixed_time_step
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
    }

    /// True once a non-looping sequence has reached its end
    pub fn is_finished(&self) -> bool {
        !self.looping && self.elapsed_seconds >= self.total_duration
    }

    /// Active seed (a staged seed is not reported until restart)
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn pending_seed(&self) -> Option<u32> {
        self.pending_seed
    }

    /// Completed passes through the sequence since the last restart
    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn current_phase(&self) -> &'static Phase {
        self.phase.phase()
    }

    /// Progress through the current phase in [0, 1]
    pub fn phase_progress(&self) -> f32 {
        self.current_phase().progress(self.t)
    }

    pub fn state(&self) -> TimelineState {
        let phase = self.current_phase();
        TimelineState {
            t: self.t,
            elapsed_seconds: self.elapsed_seconds,
            phase: phase.key,
            phase_name: phase.name,
            phase_progress: phase.progress(self.t),
            is_playing: self.is_playing(),
            seed: self.seed,
            loops: self.loops,
        }
    }
}
