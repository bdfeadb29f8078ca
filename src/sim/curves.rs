//! Easing functions and path curves
//!
//! Everything here is a pure function of its inputs, so the same `t` always
//! yields the same bits.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::consts::T_IMPACT;

#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = -2.0 * t + 2.0;
        1.0 - f * f * f / 2.0
    }
}

/// Named easing curve, selectable from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    InQuad,
    #[default]
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Easing {
    /// Apply to `t`, clamped to [0, 1] first
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp01(t);
        match self {
            Easing::Linear => t,
            Easing::InQuad => ease_in_quad(t),
            Easing::InCubic => ease_in_cubic(t),
            Easing::OutCubic => ease_out_cubic(t),
            Easing::InOutCubic => ease_in_out_cubic(t),
        }
    }
}

/// Cubic Bézier: (1-u)³P0 + 3(1-u)²u·P1 + 3(1-u)u²·P2 + u³·P3
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, u: f32) -> Vec3 {
    let v = 1.0 - u;
    let b0 = v * v * v;
    let b1 = 3.0 * v * v * u;
    let b2 = 3.0 * v * u * u;
    let b3 = u * u * u;
    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// The asteroid's flight path as a function of normalized progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathCurve {
    /// Straight line from `start` to `end`, eased while approaching, arriving
    /// at `T_IMPACT` and held at `end` afterwards
    Linear {
        start: Vec3,
        end: Vec3,
        #[serde(default)]
        easing: Easing,
    },
    /// Pre-authored four-point Bézier evaluated at `u = min(t / span, 1)`
    Bezier {
        control: [Vec3; 4],
        #[serde(default = "default_bezier_span")]
        span: f32,
    },
}

fn default_bezier_span() -> f32 {
    1.0
}

impl Default for PathCurve {
    fn default() -> Self {
        PathCurve::Linear {
            start: Vec3::new(-420.0, 260.0, -900.0),
            end: Vec3::ZERO,
            easing: Easing::InCubic,
        }
    }
}

impl PathCurve {
    /// World-space position at normalized progress `t`
    pub fn position(&self, t: f32) -> Vec3 {
        match self {
            PathCurve::Linear { start, end, easing } => {
                let u = easing.apply(t / T_IMPACT);
                start.lerp(*end, u)
            }
            PathCurve::Bezier { control, span } => {
                let u = if *span > 0.0 { clamp01(t / span) } else { 1.0 };
                cubic_bezier(control[0], control[1], control[2], control[3], u)
            }
        }
    }

    /// Point the asteroid travels towards
    pub fn end_point(&self) -> Vec3 {
        match self {
            PathCurve::Linear { end, .. } => *end,
            PathCurve::Bezier { control, .. } => control[3],
        }
    }

    /// True when every control value is finite
    pub fn is_finite(&self) -> bool {
        match self {
            PathCurve::Linear { start, end, .. } => {
                crate::is_finite_vec3(*start) && crate::is_finite_vec3(*end)
            }
            PathCurve::Bezier { control, span } => {
                span.is_finite() && control.iter().all(|p| crate::is_finite_vec3(*p))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::InQuad,
            Easing::InCubic,
            Easing::OutCubic,
            Easing::InOutCubic,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-1.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(2.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_ease_in_out_cubic_midpoint() {
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bezier_endpoints_and_midpoint() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(0.0, 1.0, 0.0);
        let p2 = Vec3::new(1.0, 1.0, 0.0);
        let p3 = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(cubic_bezier(p0, p1, p2, p3, 0.0), p0);
        assert_eq!(cubic_bezier(p0, p1, p2, p3, 1.0), p3);
        let mid = cubic_bezier(p0, p1, p2, p3, 0.5);
        assert!((mid - Vec3::new(0.5, 0.75, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_linear_path_arrives_at_impact_and_holds() {
        let path = PathCurve::default();
        let end = path.end_point();
        assert!((path.position(T_IMPACT) - end).length() < 1e-3);
        assert_eq!(path.position(0.99), end);
        assert_eq!(path.position(1.0), end);
    }

    #[test]
    fn test_linear_path_accelerates() {
        let path = PathCurve::default();
        let early = (path.position(0.1) - path.position(0.0)).length();
        let late = (path.position(0.9) - path.position(0.8)).length();
        assert!(late > early * 10.0);
    }

    #[test]
    fn test_bezier_path_span() {
        let control = [
            Vec3::new(0.0, 100.0, -500.0),
            Vec3::new(50.0, 80.0, -300.0),
            Vec3::new(20.0, 30.0, -100.0),
            Vec3::ZERO,
        ];
        let path = PathCurve::Bezier { control, span: 1.0 };
        assert_eq!(path.position(0.0), control[0]);
        assert_eq!(path.position(1.0), control[3]);
        let early = PathCurve::Bezier { control, span: 0.5 };
        assert_eq!(early.position(0.75), control[3]);
    }

    #[test]
    fn test_path_is_bit_reproducible() {
        let path = PathCurve::default();
        for i in 0..100 {
            let t = i as f32 / 100.0;
            assert_eq!(path.position(t).to_array(), path.position(t).to_array());
        }
    }

    #[test]
    fn test_path_from_json() {
        let json = r#"{"kind":"bezier","control":[[0,1,2],[1,1,1],[2,2,2],[0,0,0]]}"#;
        let path: PathCurve = serde_json::from_str(json).unwrap();
        assert!(matches!(path, PathCurve::Bezier { span, .. } if span == 1.0));
        assert!(path.is_finite());
    }
}
