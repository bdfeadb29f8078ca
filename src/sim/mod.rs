//! Deterministic simulation module
//!
//! Everything the render layers read lives here. This module must stay pure
//! and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Curves are functions of `t` (and the seed), never of wall-clock time
//! - No rendering or platform dependencies

pub mod curves;
pub mod heat;
pub mod kinematics;
pub mod phase;
pub mod rng;
pub mod shake;
pub mod timeline;
pub mod trigger;

pub use curves::{Easing, PathCurve, cubic_bezier};
pub use heat::{HeatModel, HeatParams};
pub use kinematics::{KinematicsContext, KinematicsSnapshot, KinematicsTracker};
pub use phase::{PHASES, Phase, PhaseKey, T_AFTERMATH, phase_at};
pub use rng::{SeededRng, coerce_seed};
pub use shake::{ShakeOffset, ShakeParams};
pub use timeline::{Advance, Playback, Timeline, TimelineState};
pub use trigger::ImpactLatch;
