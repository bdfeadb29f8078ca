//! One-shot threshold triggers
//!
//! Turns the continuously sampled progress value into discrete events
//! (explosion, shockwave, debris burst) that fire once per crossing.

use crate::consts::T_IMPACT;

/// Edge-detecting latch over normalized progress
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactLatch {
    threshold: f32,
    high: bool,
}

impl Default for ImpactLatch {
    fn default() -> Self {
        Self::new(T_IMPACT)
    }
}

impl ImpactLatch {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            high: false,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Current latch level
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Feed one progress sample; returns true only on the rising edge.
    ///
    /// Seeing `t` below the threshold (a restart, seek or wrap) re-arms the latch.
    pub fn observe(&mut self, t: f32) -> bool {
        if t.is_nan() {
            return false;
        }
        let was_high = self.high;
        if t < self.threshold {
            if was_high {
                log::debug!("Impact latch re-armed at t={:.4}", t);
            }
            self.high = false;
        } else if !was_high {
            self.high = true;
        }
        self.high && !was_high
    }

    /// Force back to low, as on restart
    pub fn reset(&mut self) {
        self.high = false;
    }
}
