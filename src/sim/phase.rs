//! Cinematic phase table
//!
//! The phases form a fixed, ascending, gap-free partition of [0, 1].
//! Every interval is half-open `[start, end)` except the last, which is
//! closed at 1.0.

use serde::{Deserialize, Serialize};

use crate::consts::{IMPACT_WINDOW, T_IMPACT};

/// Cinematic beat identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKey {
    FarApproach,
    MidApproach,
    NearRush,
    Impact,
    Aftermath,
}

impl PhaseKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKey::FarApproach => "far_approach",
            PhaseKey::MidApproach => "mid_approach",
            PhaseKey::NearRush => "near_rush",
            PhaseKey::Impact => "impact",
            PhaseKey::Aftermath => "aftermath",
        }
    }

    /// Table entry for this key
    pub fn phase(&self) -> &'static Phase {
        // Table order matches enum order
        &PHASES[*self as usize]
    }
}

/// A named interval of normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    pub key: PhaseKey,
    pub start: f32,
    pub end: f32,
    pub name: &'static str,
}

impl Phase {
    /// Whether `t` falls inside this phase (end exclusive)
    #[inline]
    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t < self.end
    }

    /// Length of the interval
    #[inline]
    pub fn span(&self) -> f32 {
        self.end - self.start
    }

    /// Progress through this phase in [0, 1]; a zero-length phase reports 1.0
    pub fn progress(&self, t: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 {
            return 1.0;
        }
        crate::clamp01((t - self.start) / span)
    }
}

/// Impact phase ends here; aftermath begins
pub const T_AFTERMATH: f32 = T_IMPACT + IMPACT_WINDOW;

/// Ordered phase table
pub const PHASES: [Phase; 5] = [
    Phase {
        key: PhaseKey::FarApproach,
        start: 0.0,
        end: 0.3,
        name: "Far Approach",
    },
    Phase {
        key: PhaseKey::MidApproach,
        start: 0.3,
        end: 0.6,
        name: "Mid Approach",
    },
    Phase {
        key: PhaseKey::NearRush,
        start: 0.6,
        end: T_IMPACT,
        name: "Near Rush",
    },
    Phase {
        key: PhaseKey::Impact,
        start: T_IMPACT,
        end: T_AFTERMATH,
        name: "Impact",
    },
    Phase {
        key: PhaseKey::Aftermath,
        start: T_AFTERMATH,
        end: 1.0,
        name: "Aftermath",
    },
];

/// Phase containing `t`
///
/// Linear scan of the table; `t >= 1.0` lands in the terminal phase and
/// anything below 0 (or NaN) in the first.
pub fn phase_at(t: f32) -> &'static Phase {
    if t.is_nan() || t <= 0.0 {
        return &PHASES[0];
    }
    PHASES
        .iter()
        .find(|p| p.contains(t))
        .unwrap_or(&PHASES[PHASES.len() - 1])
}
