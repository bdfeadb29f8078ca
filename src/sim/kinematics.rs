//! Asteroid kinematics
//!
//! Snapshots are recomputed from `t` every frame rather than integrated, so
//! there is no drift. Velocity comes from differencing two path samples one
//! fixed step apart.

use glam::Vec3;
use serde::Serialize;

use super::curves::PathCurve;
use super::heat::HeatParams;
use crate::is_finite_vec3;

/// Derived per-frame motion state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KinematicsSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    /// Height above the ground plane (y = 0)
    pub altitude: f32,
    pub heat01: f32,
    pub distance_to_reference: f32,
}

impl KinematicsSnapshot {
    pub fn is_finite(&self) -> bool {
        is_finite_vec3(self.position)
            && is_finite_vec3(self.velocity)
            && self.speed.is_finite()
            && self.altitude.is_finite()
            && self.heat01.is_finite()
            && self.distance_to_reference.is_finite()
    }
}

/// Inputs that stay fixed for a whole run
#[derive(Debug, Clone, Copy)]
pub struct KinematicsContext<'a> {
    pub path: &'a PathCurve,
    pub heat: &'a HeatParams,
    /// Sequence length in seconds
    pub total_duration: f32,
    /// Differencing interval in seconds (one fixed step)
    pub sample_seconds: f32,
    /// Point distances are measured from (the camera)
    pub reference: Vec3,
}

/// Evaluate the snapshot at `t`
///
/// Uses a backward difference `[t - h, t]`, or a forward one at the very
/// start where no earlier sample exists.
pub fn evaluate(ctx: &KinematicsContext<'_>, t: f32) -> KinematicsSnapshot {
    let position = ctx.path.position(t);

    let h = if ctx.total_duration > 0.0 {
        ctx.sample_seconds / ctx.total_duration
    } else {
        0.0
    };
    let (a, b) = if t >= h { (t - h, t) } else { (t, t + h) };
    let dt = (b - a) * ctx.total_duration;
    let velocity = if dt > 0.0 {
        (ctx.path.position(b) - ctx.path.position(a)) / dt
    } else {
        Vec3::ZERO
    };
    let speed = velocity.length();
    let altitude = position.y;

    KinematicsSnapshot {
        position,
        velocity,
        speed,
        altitude,
        heat01: ctx.heat.heat01(t, speed, altitude),
        distance_to_reference: position.distance(ctx.reference),
    }
}

/// Keeps the last finite snapshot and substitutes it when a frame goes bad
#[derive(Debug, Clone, Default)]
pub struct KinematicsTracker {
    last_good: KinematicsSnapshot,
    recoveries: u32,
}

impl KinematicsTracker {
    pub fn new(initial: KinematicsSnapshot) -> Self {
        Self {
            last_good: initial,
            recoveries: 0,
        }
    }

    /// Pass a fresh snapshot through; non-finite values are replaced by the
    /// last good one
    pub fn accept(&mut self, snapshot: KinematicsSnapshot) -> KinematicsSnapshot {
        if snapshot.is_finite() {
            self.last_good = snapshot;
        } else {
            self.recoveries += 1;
            log::warn!(
                "Non-finite kinematics ({:?}); reusing last good snapshot",
                snapshot.position
            );
        }
        self.last_good
    }

    pub fn last_good(&self) -> &KinematicsSnapshot {
        &self.last_good
    }

    /// Frames that needed recovery
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::T_IMPACT;
    use crate::sim::heat::HeatModel;

    fn context<'a>(path: &'a PathCurve, heat: &'a HeatParams) -> KinematicsContext<'a> {
        KinematicsContext {
            path,
            heat,
            total_duration: 12.0,
            sample_seconds: 1.0 / 60.0,
            reference: Vec3::new(0.0, 4.0, 60.0),
        }
    }

    #[test]
    fn test_speed_grows_during_approach() {
        let path = PathCurve::default();
        let heat = HeatParams::default();
        let ctx = context(&path, &heat);
        let early = evaluate(&ctx, 0.2);
        let late = evaluate(&ctx, 0.9);
        assert!(late.speed > early.speed * 5.0);
        assert!(late.altitude < early.altitude);
    }

    #[test]
    fn test_start_uses_forward_difference() {
        let path = PathCurve::Linear {
            start: Vec3::new(0.0, 100.0, 0.0),
            end: Vec3::ZERO,
            easing: crate::sim::curves::Easing::Linear,
        };
        let heat = HeatParams::default();
        let snap = evaluate(&context(&path, &heat), 0.0);
        // 100 units over T_IMPACT * 12 seconds
        let expected = 100.0 / (T_IMPACT * 12.0);
        assert!((snap.speed - expected).abs() < 0.05, "speed {}", snap.speed);
        assert!(snap.velocity.y < 0.0);
    }

    #[test]
    fn test_stationary_after_impact() {
        let path = PathCurve::default();
        let heat = HeatParams::default();
        let snap = evaluate(&context(&path, &heat), 0.99);
        assert_eq!(snap.speed, 0.0);
        assert_eq!(snap.altitude, 0.0);
    }

    #[test]
    fn test_speed_altitude_heat_rises() {
        let path = PathCurve::default();
        let heat = HeatParams {
            model: HeatModel::SpeedAltitude,
            ..Default::default()
        };
        let ctx = context(&path, &heat);
        let cold = evaluate(&ctx, 0.05);
        let hot = evaluate(&ctx, 0.93);
        assert!(cold.heat01 < 0.1);
        assert!(hot.heat01 > 0.8);
    }

    #[test]
    fn test_distance_to_reference() {
        let path = PathCurve::default();
        let heat = HeatParams::default();
        let snap = evaluate(&context(&path, &heat), 1.0);
        assert!((snap.distance_to_reference - Vec3::new(0.0, 4.0, 60.0).length()).abs() < 1e-4);
    }

    #[test]
    fn test_tracker_recovers_from_nan() {
        let path = PathCurve::default();
        let heat = HeatParams::default();
        let good = evaluate(&context(&path, &heat), 0.5);
        let mut tracker = KinematicsTracker::default();
        assert_eq!(tracker.accept(good), good);

        let bad = KinematicsSnapshot {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            ..good
        };
        assert_eq!(tracker.accept(bad), good);
        assert_eq!(tracker.recoveries(), 1);
    }

    #[test]
    fn test_non_finite_path_is_recoverable() {
        let path = PathCurve::Linear {
            start: Vec3::splat(f32::INFINITY),
            end: Vec3::ZERO,
            easing: Default::default(),
        };
        let heat = HeatParams::default();
        let mut tracker = KinematicsTracker::default();
        let snap = tracker.accept(evaluate(&context(&path, &heat), 0.5));
        assert!(snap.is_finite());
    }
}
