//! Atmospheric heating curves
//!
//! Two models are supported: a threshold + power curve over normalized
//! progress, and a physically flavoured blend of instantaneous speed and
//! altitude. The model is picked in config; consumers only see `heat01`.

use serde::{Deserialize, Serialize};

use crate::{clamp01, smoothstep};

/// Which input drives heating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatModel {
    /// Function of normalized progress only
    #[default]
    Progress,
    /// Function of speed and altitude from finite-differenced position
    SpeedAltitude,
}

/// Heating tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatParams {
    pub model: HeatModel,
    /// Progress below which there is no glow
    pub threshold: f32,
    /// Exponent applied to normalized progress past the threshold
    pub power: f32,
    /// Emissive intensity at heat01 = 1
    pub max_emissive: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            model: HeatModel::Progress,
            threshold: 0.4,
            power: 2.0,
            max_emissive: 2.5,
            speed_min: 20.0,
            speed_max: 250.0,
            altitude_min: 0.0,
            altitude_max: 200.0,
        }
    }
}

/// Progress heating in [0, 1]: zero below `threshold`, then
/// `((t - threshold) / (1 - threshold))^power`
pub fn progress_heat(t: f32, threshold: f32, power: f32) -> f32 {
    if t.is_nan() || t < threshold {
        return 0.0;
    }
    let span = 1.0 - threshold;
    if span <= 0.0 {
        return 1.0;
    }
    clamp01((t - threshold) / span).powf(power)
}

/// Speed/altitude heating in [0, 1]:
/// `0.7·smoothstep(speed) + 0.3·(1 - smoothstep(altitude))`
pub fn speed_altitude_heat(speed: f32, altitude: f32, params: &HeatParams) -> f32 {
    let speed_term = smoothstep(params.speed_min, params.speed_max, speed);
    let altitude_term = 1.0 - smoothstep(params.altitude_min, params.altitude_max, altitude);
    clamp01(0.7 * speed_term + 0.3 * altitude_term)
}

impl HeatParams {
    /// heat01 under the configured model
    pub fn heat01(&self, t: f32, speed: f32, altitude: f32) -> f32 {
        match self.model {
            HeatModel::Progress => progress_heat(t, self.threshold, self.power),
            HeatModel::SpeedAltitude => speed_altitude_heat(speed, altitude, self),
        }
    }

    /// Emissive intensity for a heat01 value
    pub fn emissive(&self, heat01: f32) -> f32 {
        clamp01(heat01) * self.max_emissive
    }

    /// Emissive intensity of the progress curve at `t`
    pub fn emissive_at(&self, t: f32) -> f32 {
        self.emissive(progress_heat(t, self.threshold, self.power))
    }

    /// Replace non-finite or inverted values with defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite = [
            self.threshold,
            self.power,
            self.max_emissive,
            self.speed_min,
            self.speed_max,
            self.altitude_min,
            self.altitude_max,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || self.power <= 0.0 || self.max_emissive < 0.0 {
            log::warn!("Invalid heat parameters; using defaults");
            return Self {
                model: self.model,
                ..defaults
            };
        }
        let mut params = Self {
            threshold: clamp01(self.threshold),
            ..self
        };
        if params.speed_min >= params.speed_max {
            log::warn!(
                "Heat speed range {}..{} is empty or inverted; using {}..{}",
                params.speed_min,
                params.speed_max,
                defaults.speed_min,
                defaults.speed_max
            );
            params.speed_min = defaults.speed_min;
            params.speed_max = defaults.speed_max;
        }
        if params.altitude_min >= params.altitude_max {
            log::warn!(
                "Heat altitude range {}..{} is empty or inverted; using {}..{}",
                params.altitude_min,
                params.altitude_max,
                defaults.altitude_min,
                defaults.altitude_max
            );
            params.altitude_min = defaults.altitude_min;
            params.altitude_max = defaults.altitude_max;
        }
        params
    }
}
