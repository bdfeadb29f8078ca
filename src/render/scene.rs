//! Base scene layer: camera, lighting and the impact flash
//!
//! Produces the uniform block the starfield/ground pass reads each frame.

use bytemuck::{Pod, Zeroable};

use super::{FrameInput, RenderAdapter};
use crate::config::CinematicConfig;
use crate::consts::T_IMPACT;
use crate::settings::Settings;
use crate::sim::curves::ease_out_cubic;
use crate::sim::{ShakeOffset, ShakeParams};
use crate::{clamp01, lerp, smoothstep};

/// Seconds for the flash to reach full brightness
const FLASH_RISE_SECONDS: f32 = 0.05;
/// Seconds for the flash to fade back to zero
const FLASH_FADE_SECONDS: f32 = 0.4;
/// Fraction of sunlight lost to the dust cloud by the end
const DUST_DIMMING: f32 = 0.6;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub camera_offset: [f32; 3],   // offset 0
    pub t: f32,                    // offset 12
    pub camera_rotation: [f32; 3], // offset 16
    pub flash: f32,                // offset 28
    pub shake_intensity: f32,      // offset 32
    pub sun_intensity: f32,        // offset 36
    pub phase_index: u32,          // offset 40
    pub starfield: u32,            // offset 44 - 1 when the starfield is drawn
}

/// Impact flash: sharp rise at `T_IMPACT`, eased fade to exactly zero
pub fn impact_flash(t: f32, total_duration: f32) -> f32 {
    if t < T_IMPACT {
        return 0.0;
    }
    let since = (t - T_IMPACT) * total_duration;
    if since < FLASH_RISE_SECONDS {
        return clamp01(since / FLASH_RISE_SECONDS);
    }
    let fade = clamp01((since - FLASH_RISE_SECONDS) / FLASH_FADE_SECONDS);
    1.0 - ease_out_cubic(fade)
}

/// Sunlight multiplier, dimming as the dust cloud spreads after impact
pub fn sun_intensity(t: f32) -> f32 {
    lerp(1.0, 1.0 - DUST_DIMMING, smoothstep(T_IMPACT, 1.0, t))
}

/// Starfield/ground/lighting adapter
pub struct SceneLayer {
    shake: ShakeParams,
    shake_enabled: bool,
    flash_scale: f32,
    starfield: bool,
    offset: ShakeOffset,
    uniforms: SceneUniforms,
}

impl SceneLayer {
    pub fn new(config: &CinematicConfig, settings: &Settings) -> Self {
        Self {
            shake: config.shake.clone(),
            shake_enabled: settings.effective_screen_shake(),
            flash_scale: settings.flash_scale(),
            starfield: settings.quality.starfield_enabled(),
            offset: ShakeOffset::ZERO,
            uniforms: SceneUniforms::zeroed(),
        }
    }

    /// Camera offset applied this frame
    pub fn camera_offset(&self) -> ShakeOffset {
        self.offset
    }

    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    /// Uniform block as bytes for upload
    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }
}

impl RenderAdapter for SceneLayer {
    fn name(&self) -> &str {
        "scene"
    }

    fn on_restart(&mut self, _seed: u32) {
        self.offset = ShakeOffset::ZERO;
        self.uniforms = SceneUniforms::zeroed();
    }

    fn on_frame(&mut self, frame: &FrameInput) {
        let t = frame.t;
        let (intensity, offset) = if self.shake_enabled {
            (
                self.shake.intensity(t, frame.total_duration),
                self.shake.offset(t, frame.total_duration),
            )
        } else {
            (0.0, ShakeOffset::ZERO)
        };
        self.offset = offset;
        self.uniforms = SceneUniforms {
            camera_offset: offset.position.to_array(),
            t,
            camera_rotation: offset.rotation.to_array(),
            flash: impact_flash(t, frame.total_duration) * self.flash_scale,
            shake_intensity: intensity,
            sun_intensity: sun_intensity(t),
            phase_index: frame.phase.key as u32,
            starfield: u32::from(self.starfield),
        };
    }
}
