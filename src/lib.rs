//! Impact Cinematic - deterministic driver for a procedural asteroid-impact sequence
//!
//! Core modules:
//! - `sim`: Deterministic timeline, seeded RNG and curve evaluators (pure, no rendering)
//! - `render`: Render-layer adapters fed from one shared timeline each frame
//! - `settings`: Quality presets and visual preferences
//! - `config`: Sequence tuning loaded from JSON

pub mod config;
pub mod render;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{CinematicConfig, ConfigError};
pub use render::{Director, FrameInput, RenderAdapter};
pub use settings::{QualityPreset, Settings};
pub use sim::{SeededRng, Timeline, TimelineState};

use glam::Vec3;

/// Sequence constants shared by every consumer
pub mod consts {
    /// Normalized progress at which the asteroid strikes the ground.
    /// Camera, heat, flash and particle triggers all read this one value.
    pub const T_IMPACT: f32 = 0.95;
    /// Width of the Impact phase in normalized progress
    pub const IMPACT_WINDOW: f32 = 0.02;

    /// Fixed simulation timestep (60 Hz)
    pub const FIXED_TIME_STEP: f64 = 1.0 / 60.0;
    /// Full sequence length in seconds
    pub const TOTAL_DURATION: f64 = 12.0;
    /// Maximum fixed steps integrated per update call (10 s of catch-up at 60 Hz).
    /// Anything beyond this is dropped so a suspended tab cannot stall the caller.
    pub const MAX_CATCH_UP_STEPS: u32 = 600;

    /// Seed used until the UI stages another one
    pub const DEFAULT_SEED: u32 = 12345;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Hermite smoothstep between two edges
///
/// A degenerate range (`e0 == e1`) behaves as a hard step at `e0`.
#[inline]
pub fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let span = e1 - e0;
    if span == 0.0 {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - e0) / span);
    t * t * (3.0 - 2.0 * t)
}

/// True when every component is finite
#[inline]
pub fn is_finite_vec3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        // Reversed edges still map into [0, 1]
        assert!((smoothstep(1.0, 0.0, 0.25) - 0.84375).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_degenerate_range() {
        assert_eq!(smoothstep(2.0, 2.0, 1.0), 0.0);
        assert_eq!(smoothstep(2.0, 2.0, 2.0), 1.0);
    }

    #[test]
    fn test_clamp01_nan() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(-3.0), 0.0);
    }

    #[test]
    fn test_phase_constants_ordered() {
        use consts::*;
        assert!(T_IMPACT > 0.6);
        assert!(T_IMPACT + IMPACT_WINDOW < 1.0);
    }
}
