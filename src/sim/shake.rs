//! Camera shake
//!
//! Intensity is a piecewise function of progress: silent through the
//! approach, ramping during the near rush, peaking through impact and easing
//! out to exactly zero before the sequence ends. The 3-axis wobble comes from
//! layered sines of sequence time rather than the seeded RNG, so it stays
//! continuous from frame to frame.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::curves::{ease_in_quad, ease_out_cubic};
use super::phase::{PhaseKey, T_AFTERMATH};

/// Shake tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeParams {
    /// Intensity reached at the end of the near rush
    pub near_rush_peak: f32,
    /// Intensity held through the impact phase
    pub impact_peak: f32,
    /// Seconds to ease back to zero after impact (capped to the aftermath length)
    pub decay_seconds: f32,
    /// Positional offset at intensity 1 (world units)
    pub position_amplitude: f32,
    /// Rotational offset at intensity 1 (radians)
    pub rotation_amplitude: f32,
    /// Base wobble frequency (Hz)
    pub frequency: f32,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            near_rush_peak: 0.35,
            impact_peak: 1.0,
            decay_seconds: 0.3,
            position_amplitude: 0.8,
            rotation_amplitude: 0.03,
            frequency: 17.0,
        }
    }
}

/// Camera offset for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ShakeOffset {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl ShakeOffset {
    pub const ZERO: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };
}

/// Layered-sine noise in [-1, 1], continuous in `seconds`
#[inline]
pub fn pseudo_noise(seconds: f32, frequency: f32, salt: f32) -> f32 {
    let x = seconds * frequency * TAU;
    0.6 * (x + salt).sin() + 0.4 * (2.37 * x + 1.91 * salt).sin()
}

impl ShakeParams {
    /// Shake intensity at `t` for a sequence of `total_duration` seconds
    pub fn intensity(&self, t: f32, total_duration: f32) -> f32 {
        let phase = super::phase::phase_at(t);
        match phase.key {
            PhaseKey::FarApproach | PhaseKey::MidApproach => 0.0,
            PhaseKey::NearRush => self.near_rush_peak * ease_in_quad(phase.progress(t)),
            PhaseKey::Impact => self.impact_peak,
            PhaseKey::Aftermath => {
                let aftermath_seconds = (1.0 - T_AFTERMATH) * total_duration;
                let decay = self.decay_seconds.min(aftermath_seconds);
                if decay <= 0.0 {
                    return 0.0;
                }
                let since = (t - T_AFTERMATH) * total_duration;
                if since >= decay {
                    return 0.0;
                }
                self.impact_peak * (1.0 - ease_out_cubic((since / decay).max(0.0)))
            }
        }
    }

    /// 3-axis positional and rotational offset at `t`
    pub fn offset(&self, t: f32, total_duration: f32) -> ShakeOffset {
        let intensity = self.intensity(t, total_duration);
        if intensity.is_nan() || intensity <= 0.0 {
            return ShakeOffset::ZERO;
        }
        let seconds = t * total_duration;
        let f = self.frequency;
        let position = Vec3::new(
            pseudo_noise(seconds, f, 0.0),
            pseudo_noise(seconds, f * 1.13, 1.7),
            pseudo_noise(seconds, f * 0.87, 3.1),
        ) * (self.position_amplitude * intensity);
        let rotation = Vec3::new(
            pseudo_noise(seconds, f * 0.71, 4.3),
            pseudo_noise(seconds, f * 0.59, 5.9),
            pseudo_noise(seconds, f * 0.93, 7.7),
        ) * (self.rotation_amplitude * intensity);
        ShakeOffset { position, rotation }
    }

    /// Replace non-finite or negative values with defaults
    pub fn sanitized(self) -> Self {
        let values = [
            self.near_rush_peak,
            self.impact_peak,
            self.decay_seconds,
            self.position_amplitude,
            self.rotation_amplitude,
            self.frequency,
        ];
        if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
            self
        } else {
            log::warn!("Invalid shake parameters; using defaults");
            Self::default()
        }
    }
}
