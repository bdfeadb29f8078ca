//! Distance-based level-of-detail switching
//!
//! Each detail level's resource is built once up front; switching only moves
//! the active index. Hysteresis around each threshold keeps a body hovering
//! near a boundary from flickering between meshes.

use serde::{Deserialize, Serialize};

/// Detail tiers, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailLevel {
    Far,
    Mid,
    Near,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::Far, DetailLevel::Mid, DetailLevel::Near];

    fn index(self) -> usize {
        self as usize
    }
}

/// Switch distances in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    /// Closer than this is Near
    pub near: f32,
    /// Farther than this is Far
    pub far: f32,
    /// Extra distance needed to leave the current level
    pub hysteresis: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            near: 150.0,
            far: 600.0,
            hysteresis: 20.0,
        }
    }
}

impl LodThresholds {
    /// Next level given the current one and a distance.
    ///
    /// Boundaries are shifted in favour of the current level by `hysteresis`.
    /// A non-finite distance keeps the current level.
    pub fn transition(&self, current: DetailLevel, distance: f32) -> DetailLevel {
        if !distance.is_finite() {
            return current;
        }
        let near_boundary = if current == DetailLevel::Near {
            self.near + self.hysteresis
        } else {
            self.near - self.hysteresis
        };
        let far_boundary = if current == DetailLevel::Far {
            self.far - self.hysteresis
        } else {
            self.far + self.hysteresis
        };

        if distance < near_boundary {
            DetailLevel::Near
        } else if distance <= far_boundary {
            DetailLevel::Mid
        } else {
            DetailLevel::Far
        }
    }
}

/// Preallocated per-level resources with one active
#[derive(Debug, Clone)]
pub struct LodSwitch<T> {
    levels: [T; 3],
    active: DetailLevel,
    thresholds: LodThresholds,
    switches: u32,
}

impl<T> LodSwitch<T> {
    /// `levels` are ordered Far, Mid, Near; starts at Far
    pub fn new(levels: [T; 3], thresholds: LodThresholds) -> Self {
        Self {
            levels,
            active: DetailLevel::Far,
            thresholds,
            switches: 0,
        }
    }

    /// Re-evaluate for a new distance; returns true if the active level changed
    pub fn update(&mut self, distance: f32) -> bool {
        let next = self.thresholds.transition(self.active, distance);
        if next == self.active {
            return false;
        }
        log::debug!("LOD {:?} -> {:?} at distance {:.1}", self.active, next, distance);
        self.active = next;
        self.switches += 1;
        true
    }

    pub fn level(&self) -> DetailLevel {
        self.active
    }

    /// Resource for the active level
    pub fn active(&self) -> &T {
        &self.levels[self.active.index()]
    }

    pub fn get(&self, level: DetailLevel) -> &T {
        &self.levels[level.index()]
    }

    /// Back to the coarsest level, as on restart
    pub fn reset(&mut self) {
        self.active = DetailLevel::Far;
    }

    pub fn switches(&self) -> u32 {
        self.switches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_thresholds() {
        let t = LodThresholds::default();
        assert_eq!(t.transition(DetailLevel::Far, 1000.0), DetailLevel::Far);
        assert_eq!(t.transition(DetailLevel::Far, 300.0), DetailLevel::Mid);
        assert_eq!(t.transition(DetailLevel::Far, 50.0), DetailLevel::Near);
    }

    #[test]
    fn test_hysteresis_holds_level() {
        let t = LodThresholds::default();
        // Just inside the far threshold is not enough to leave Far
        assert_eq!(t.transition(DetailLevel::Far, 590.0), DetailLevel::Far);
        assert_eq!(t.transition(DetailLevel::Far, 579.0), DetailLevel::Mid);
        // And Mid does not fall back out until past far + hysteresis
        assert_eq!(t.transition(DetailLevel::Mid, 610.0), DetailLevel::Mid);
        assert_eq!(t.transition(DetailLevel::Mid, 621.0), DetailLevel::Far);
        assert_eq!(t.transition(DetailLevel::Near, 160.0), DetailLevel::Near);
        assert_eq!(t.transition(DetailLevel::Near, 171.0), DetailLevel::Mid);
    }

    #[test]
    fn test_nan_distance_keeps_level() {
        let t = LodThresholds::default();
        assert_eq!(t.transition(DetailLevel::Mid, f32::NAN), DetailLevel::Mid);
    }

    #[test]
    fn test_switch_swaps_active_resource() {
        let mut lod = LodSwitch::new(["far", "mid", "near"], LodThresholds::default());
        assert_eq!(*lod.active(), "far");
        assert!(lod.update(300.0));
        assert_eq!(*lod.active(), "mid");
        assert!(!lod.update(310.0));
        assert!(lod.update(10.0));
        assert_eq!(lod.level(), DetailLevel::Near);
        assert_eq!(*lod.get(DetailLevel::Far), "far");
        assert_eq!(lod.switches(), 2);
        lod.reset();
        assert_eq!(lod.level(), DetailLevel::Far);
    }

    #[test]
    fn test_approach_sequence_never_flickers() {
        let mut lod = LodSwitch::new([0u8, 1, 2], LodThresholds::default());
        // Jittery approach around the far threshold
        for d in [700.0, 605.0, 595.0, 601.0, 590.0, 598.0, 575.0, 585.0, 560.0] {
            lod.update(d);
        }
        assert_eq!(lod.level(), DetailLevel::Mid);
        assert_eq!(lod.switches(), 1);
    }
}
