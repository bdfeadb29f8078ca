//! Asteroid overlay layer
//!
//! Positions the asteroid, drives its heat glow and detail level, and turns
//! the impact crossing into one-shot particle bursts.

use std::f32::consts::TAU;

use glam::Vec3;

use super::effects::{EffectKind, Emitter, ParticleInstance};
use super::lod::{DetailLevel, LodSwitch, LodThresholds};
use super::{FrameInput, RenderAdapter};
use crate::config::CinematicConfig;
use crate::consts::T_IMPACT;
use crate::settings::{GeometryDetail, Settings};
use crate::sim::kinematics::{self, KinematicsContext, KinematicsSnapshot, KinematicsTracker};
use crate::sim::{HeatParams, ImpactLatch, PathCurve, SeededRng};

/// Effects released when the latch fires
const IMPACT_BURSTS: [EffectKind; 4] = [
    EffectKind::Explosion,
    EffectKind::Shockwave,
    EffectKind::Debris,
    EffectKind::Spark,
];

/// Prebuilt asteroid mesh variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsteroidMesh {
    pub level: DetailLevel,
    /// Icosphere subdivision count
    pub subdivisions: u32,
}

impl AsteroidMesh {
    fn variants(detail: GeometryDetail) -> [AsteroidMesh; 3] {
        let bonus = match detail {
            GeometryDetail::Low => 0,
            GeometryDetail::Medium => 1,
            GeometryDetail::High => 2,
        };
        DetailLevel::ALL.map(|level| AsteroidMesh {
            level,
            subdivisions: level as u32 + 1 + bonus,
        })
    }
}

/// Asteroid/particle/explosion adapter
pub struct OverlayLayer {
    path: PathCurve,
    heat: HeatParams,
    camera_position: Vec3,

    tracker: KinematicsTracker,
    latch: ImpactLatch,
    lod: LodSwitch<AsteroidMesh>,
    emitters: Vec<Emitter>,

    spin_axis: Vec3,
    spin_rate: f32,
    spin_angle: f32,
    snapshot: KinematicsSnapshot,
    visible: bool,
    impacts: u32,
}

impl OverlayLayer {
    pub fn new(config: &CinematicConfig, settings: &Settings) -> Self {
        let capacity = settings.max_particles();
        let meshes = AsteroidMesh::variants(settings.quality.options().geometry_detail);
        let emitters = EffectKind::ALL
            .iter()
            .map(|kind| Emitter::new(kind.descriptor(), capacity, config.seed))
            .collect();

        let mut layer = Self {
            path: config.path.clone(),
            heat: config.heat.clone(),
            camera_position: config.camera_position,
            tracker: KinematicsTracker::default(),
            latch: ImpactLatch::new(T_IMPACT),
            lod: LodSwitch::new(meshes, LodThresholds::default()),
            emitters,
            spin_axis: Vec3::Y,
            spin_rate: 0.0,
            spin_angle: 0.0,
            snapshot: KinematicsSnapshot::default(),
            visible: true,
            impacts: 0,
        };
        layer.reseed(config.seed);
        layer
    }

    fn reseed(&mut self, seed: u32) {
        let mut rng = SeededRng::new(seed);
        let axis = Vec3::new(
            rng.range(-1.0, 1.0),
            rng.range(-1.0, 1.0),
            rng.range(-1.0, 1.0),
        );
        self.spin_axis = axis.try_normalize().unwrap_or(Vec3::Y);
        self.spin_rate = rng.range(0.3, 1.2);
        for emitter in &mut self.emitters {
            emitter.reset(seed);
        }
    }

    fn emitter_mut(&mut self, kind: EffectKind) -> &mut Emitter {
        // Emitters are built from EffectKind::ALL, in enum order
        &mut self.emitters[kind as usize]
    }

    pub fn emitter(&self, kind: EffectKind) -> &Emitter {
        &self.emitters[kind as usize]
    }

    pub fn snapshot(&self) -> &KinematicsSnapshot {
        &self.snapshot
    }

    /// Emissive intensity for the asteroid material
    pub fn emissive(&self) -> f32 {
        self.heat.emissive(self.snapshot.heat01)
    }

    /// The asteroid is drawn until it strikes
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn spin(&self) -> (Vec3, f32) {
        (self.spin_axis, self.spin_angle)
    }

    pub fn lod_level(&self) -> DetailLevel {
        self.lod.level()
    }

    pub fn active_mesh(&self) -> &AsteroidMesh {
        self.lod.active()
    }

    /// Detail-level changes since construction
    pub fn lod_switches(&self) -> u32 {
        self.lod.switches()
    }

    /// Impacts triggered since construction
    pub fn impacts(&self) -> u32 {
        self.impacts
    }

    pub fn particle_count(&self) -> usize {
        self.emitters.iter().map(Emitter::len).sum()
    }

    /// All live particles, grouped by effect kind
    pub fn particle_instances(&self) -> Vec<ParticleInstance> {
        self.emitters.iter().flat_map(|e| e.instances()).collect()
    }

    pub fn kinematics_recoveries(&self) -> u32 {
        self.tracker.recoveries()
    }

    fn trigger_impact(&mut self, t: f32) {
        self.impacts += 1;
        log::info!("Impact triggered at t={:.4} (#{})", t, self.impacts);
        let ground = self.path.end_point();
        for kind in IMPACT_BURSTS {
            self.emitter_mut(kind).burst(ground, Vec3::Y);
        }
    }
}

impl RenderAdapter for OverlayLayer {
    fn name(&self) -> &str {
        "overlay"
    }

    fn on_restart(&mut self, seed: u32) {
        self.latch.reset();
        self.lod.reset();
        self.tracker = KinematicsTracker::default();
        self.visible = true;
        self.reseed(seed);
    }

    fn on_frame(&mut self, frame: &FrameInput) {
        let t = frame.t;
        let ctx = KinematicsContext {
            path: &self.path,
            heat: &self.heat,
            total_duration: frame.total_duration,
            sample_seconds: frame.fixed_time_step,
            reference: self.camera_position,
        };
        self.snapshot = self.tracker.accept(kinematics::evaluate(&ctx, t));
        self.visible = t < T_IMPACT;
        self.spin_angle = (self.spin_rate * frame.elapsed_seconds as f32) % TAU;
        self.lod.update(self.snapshot.distance_to_reference);

        if self.latch.observe(t) {
            self.trigger_impact(t);
        }

        let step = frame.fixed_time_step;
        let position = self.snapshot.position;
        let trail = -self.snapshot.velocity;
        let heat01 = self.snapshot.heat01;
        let ground = self.path.end_point();
        let smoking = t >= T_IMPACT;
        for _ in 0..frame.fixed_steps {
            if self.visible {
                self.emitter_mut(EffectKind::Fire)
                    .emit_continuous(position, trail, heat01, step);
                self.emitter_mut(EffectKind::Plasma)
                    .emit_continuous(position, trail, heat01 * heat01, step);
            }
            if smoking {
                self.emitter_mut(EffectKind::Smoke)
                    .emit_continuous(ground, Vec3::Y, 1.0, step);
            }
            for emitter in &mut self.emitters {
                emitter.step(step);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Director;
    use crate::settings::QualityPreset;
    use std::cell::RefCell;
    use std::rc::Rc;

    const STEP: f64 = 1.0 / 60.0;

    fn rig(seed: u32) -> (Director, Rc<RefCell<OverlayLayer>>) {
        let config = CinematicConfig {
            seed,
            ..Default::default()
        };
        rig_with(&config, &Settings::default())
    }

    fn rig_with(
        config: &CinematicConfig,
        settings: &Settings,
    ) -> (Director, Rc<RefCell<OverlayLayer>>) {
        let overlay = Rc::new(RefCell::new(OverlayLayer::new(config, settings)));
        let mut director = Director::new(config);
        director.add_adapter(overlay.clone());
        director.restart(0.0);
        (director, overlay)
    }

    /// Drive frames at 60 Hz for frame indices `from..=to`, offset by `base` seconds
    fn play(director: &mut Director, base: f64, from: u32, to: u32) {
        for i in from..=to {
            director.frame(base + i as f64 * STEP);
        }
    }

    #[test]
    fn test_impact_fires_once_per_pass() {
        let (mut director, overlay) = rig(1);
        play(&mut director, 0.0, 1, 700);
        assert_eq!(overlay.borrow().impacts(), 1);
        assert!(!overlay.borrow().visible());
        assert_eq!(overlay.borrow().emitter(EffectKind::Shockwave).len(), 1);
        // Through the wrap and past the impact of the next pass
        play(&mut director, 0.0, 701, 1420);
        assert_eq!(overlay.borrow().impacts(), 2);
    }

    #[test]
    fn test_restart_rearms_latch() {
        let (mut director, overlay) = rig(1);
        play(&mut director, 0.0, 1, 690);
        assert_eq!(overlay.borrow().impacts(), 1);

        director.restart(20.0);
        play(&mut director, 20.0, 1, 30);
        assert_eq!(overlay.borrow().impacts(), 1);
        assert!(overlay.borrow().visible());
        assert_eq!(overlay.borrow().emitter(EffectKind::Shockwave).len(), 0);

        play(&mut director, 20.0, 31, 690);
        assert_eq!(overlay.borrow().impacts(), 2);
    }

    #[test]
    fn test_heat_glow_builds_on_approach() {
        let (mut director, overlay) = rig(1);
        director.frame(3.0);
        assert_eq!(overlay.borrow().emissive(), 0.0);
        assert_eq!(overlay.borrow().emitter(EffectKind::Fire).len(), 0);
        director.frame(11.0);
        let o = overlay.borrow();
        assert!(o.emissive() > 1.5);
        assert!(!o.emitter(EffectKind::Fire).is_empty());
        assert_eq!(o.kinematics_recoveries(), 0);
    }

    #[test]
    fn test_lod_tightens_as_asteroid_closes() {
        let (mut director, overlay) = rig(1);
        director.frame(1.0);
        assert_eq!(overlay.borrow().lod_level(), DetailLevel::Far);
        // t ~= 0.94, just short of the ground
        play(&mut director, 0.0, 61, 677);
        assert_eq!(overlay.borrow().lod_level(), DetailLevel::Near);
        assert_eq!(overlay.borrow().active_mesh().level, DetailLevel::Near);
        assert_eq!(overlay.borrow().lod_switches(), 2);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let (mut a, overlay_a) = rig(42);
        let (mut b, overlay_b) = rig(42);
        for i in 1..=720 {
            let now = i as f64 * 0.0161;
            a.frame(now);
            b.frame(now);
        }
        assert_eq!(
            overlay_a.borrow().particle_instances(),
            overlay_b.borrow().particle_instances()
        );
        assert!(overlay_a.borrow().particle_count() > 0);
    }

    #[test]
    fn test_spin_depends_on_seed() {
        let (_, a) = rig(1);
        let (_, b) = rig(2);
        assert_ne!(a.borrow().spin().0, b.borrow().spin().0);
    }

    #[test]
    fn test_particles_disabled_means_empty_pools() {
        let settings = Settings {
            particles: false,
            ..Settings::from_preset(QualityPreset::High)
        };
        let (mut director, overlay) = rig_with(&CinematicConfig::default(), &settings);
        play(&mut director, 0.0, 1, 700);
        assert_eq!(overlay.borrow().particle_count(), 0);
        assert_eq!(overlay.borrow().impacts(), 1);
    }

    #[test]
    fn test_mesh_variants_follow_quality() {
        let low = AsteroidMesh::variants(GeometryDetail::Low);
        let high = AsteroidMesh::variants(GeometryDetail::High);
        assert_eq!(low[0].subdivisions, 1);
        assert_eq!(high[2].subdivisions, 5);
        assert_eq!(high[2].level, DetailLevel::Near);
    }
}
