//! Sequence configuration
//!
//! Loaded from JSON (a file on native, an inline string from the page on
//! wasm). Malformed values are coerced to defaults with a warning instead of
//! being rejected; only unparseable JSON is an error.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_SEED, FIXED_TIME_STEP, MAX_CATCH_UP_STEPS, TOTAL_DURATION};
use crate::sim::{HeatParams, PathCurve, ShakeParams, coerce_seed};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Everything that shapes the sequence. Quality settings live elsewhere and
/// never feed into this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicConfig {
    /// Sequence length (seconds)
    pub total_duration: f64,
    /// Simulation step (seconds)
    pub fixed_time_step: f64,
    /// Cap on fixed steps integrated by a single update
    pub max_catch_up_steps: u32,
    /// Wrap back to the start instead of holding on the last frame
    pub looping: bool,
    #[serde(deserialize_with = "deserialize_seed")]
    pub seed: u32,
    /// Camera position distances are measured from
    pub camera_position: Vec3,
    pub path: PathCurve,
    pub heat: HeatParams,
    pub shake: ShakeParams,
}

impl Default for CinematicConfig {
    fn default() -> Self {
        Self {
            total_duration: TOTAL_DURATION,
            fixed_time_step: FIXED_TIME_STEP,
            max_catch_up_steps: MAX_CATCH_UP_STEPS,
            looping: true,
            seed: DEFAULT_SEED,
            camera_position: Vec3::new(0.0, 4.0, 60.0),
            path: PathCurve::default(),
            heat: HeatParams::default(),
            shake: ShakeParams::default(),
        }
    }
}

impl CinematicConfig {
    /// Parse and sanitize
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Read a JSON file and parse it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Coerce every out-of-range value to its default
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.total_duration.is_finite() && self.total_duration > 0.0) {
            log::warn!(
                "total_duration {} invalid; using {}",
                self.total_duration,
                defaults.total_duration
            );
            self.total_duration = defaults.total_duration;
        }
        if !(self.fixed_time_step.is_finite()
            && self.fixed_time_step > 0.0
            && self.fixed_time_step <= self.total_duration)
        {
            log::warn!(
                "fixed_time_step {} invalid; using {}",
                self.fixed_time_step,
                defaults.fixed_time_step
            );
            self.fixed_time_step = defaults.fixed_time_step.min(self.total_duration);
        }
        if self.max_catch_up_steps == 0 {
            log::warn!(
                "max_catch_up_steps must be at least 1; using {}",
                defaults.max_catch_up_steps
            );
            self.max_catch_up_steps = defaults.max_catch_up_steps;
        }
        if !crate::is_finite_vec3(self.camera_position) {
            log::warn!("camera_position not finite; using default");
            self.camera_position = defaults.camera_position;
        }
        if !self.path.is_finite() {
            log::warn!("path has non-finite control points; using default");
            self.path = defaults.path;
        }
        self.heat = self.heat.sanitized();
        self.shake = self.shake.sanitized();
        self
    }
}

/// Accepts any JSON number (wrapped to u32) or numeric string
fn deserialize_seed<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let seed = match &value {
        serde_json::Value::Number(n) => n.as_f64().map(coerce_seed).unwrap_or(DEFAULT_SEED),
        serde_json::Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => coerce_seed(v),
            Err(_) => {
                log::warn!("Seed {:?} is not numeric; using default", s);
                DEFAULT_SEED
            }
        },
        other => {
            log::warn!("Seed {} has the wrong type; using default", other);
            DEFAULT_SEED
        }
    };
    Ok(seed)
}
