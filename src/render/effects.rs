//! Particle effects
//!
//! One descriptor type covers every effect; the per-kind differences are
//! data in `EffectConfig`. Emitters own a fixed-capacity pool and a seeded
//! RNG, so a replay with the same seed and frame sequence emits the same
//! particles.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::is_finite_vec3;
use crate::sim::SeededRng;

/// Effect families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Fire,
    Smoke,
    Spark,
    Debris,
    Plasma,
    Explosion,
    Shockwave,
}

/// How particles are released
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Emission {
    /// Steady stream, scaled each frame by the caller's intensity
    Continuous { rate_per_second: f32 },
    /// All at once when triggered
    Burst { count: u32 },
}

/// Shared parameter record for every effect kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub emission: Emission,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Relative size change per second
    pub growth: f32,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Downward acceleration (world units/s²)
    pub gravity: f32,
    /// Half-angle of the emission cone (radians); PI emits in all directions
    pub spread: f32,
    pub color: [f32; 4],
    pub additive: bool,
}

/// An effect kind plus its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub kind: EffectKind,
    pub config: EffectConfig,
}

impl EffectKind {
    pub const ALL: [EffectKind; 7] = [
        EffectKind::Fire,
        EffectKind::Smoke,
        EffectKind::Spark,
        EffectKind::Debris,
        EffectKind::Plasma,
        EffectKind::Explosion,
        EffectKind::Shockwave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Fire => "fire",
            EffectKind::Smoke => "smoke",
            EffectKind::Spark => "spark",
            EffectKind::Debris => "debris",
            EffectKind::Plasma => "plasma",
            EffectKind::Explosion => "explosion",
            EffectKind::Shockwave => "shockwave",
        }
    }

    /// Tuned defaults for this kind
    pub fn default_config(self) -> EffectConfig {
        let base = EffectConfig {
            emission: Emission::Continuous { rate_per_second: 60.0 },
            lifetime_min: 0.5,
            lifetime_max: 1.0,
            speed_min: 1.0,
            speed_max: 4.0,
            size_min: 0.5,
            size_max: 1.0,
            growth: 0.0,
            drag: 0.5,
            gravity: 0.0,
            spread: 0.4,
            color: [1.0, 1.0, 1.0, 1.0],
            additive: true,
        };
        match self {
            EffectKind::Fire => EffectConfig {
                emission: Emission::Continuous { rate_per_second: 180.0 },
                lifetime_min: 0.3,
                lifetime_max: 0.7,
                size_min: 1.5,
                size_max: 3.0,
                growth: 0.8,
                color: [1.0, 0.55, 0.15, 1.0],
                ..base
            },
            EffectKind::Plasma => EffectConfig {
                emission: Emission::Continuous { rate_per_second: 120.0 },
                lifetime_min: 0.15,
                lifetime_max: 0.35,
                speed_min: 2.0,
                speed_max: 6.0,
                size_min: 1.0,
                size_max: 2.2,
                spread: 0.25,
                color: [0.6, 0.8, 1.0, 1.0],
                ..base
            },
            EffectKind::Smoke => EffectConfig {
                emission: Emission::Continuous { rate_per_second: 40.0 },
                lifetime_min: 2.5,
                lifetime_max: 4.0,
                speed_min: 0.5,
                speed_max: 2.0,
                size_min: 4.0,
                size_max: 8.0,
                growth: 0.6,
                drag: 0.8,
                gravity: -0.5,
                spread: 0.9,
                color: [0.25, 0.22, 0.2, 0.7],
                additive: false,
                ..base
            },
            EffectKind::Spark => EffectConfig {
                emission: Emission::Burst { count: 120 },
                lifetime_min: 0.4,
                lifetime_max: 1.2,
                speed_min: 20.0,
                speed_max: 60.0,
                size_min: 0.2,
                size_max: 0.5,
                drag: 1.2,
                gravity: 9.8,
                spread: 1.2,
                color: [1.0, 0.85, 0.4, 1.0],
                ..base
            },
            EffectKind::Debris => EffectConfig {
                emission: Emission::Burst { count: 80 },
                lifetime_min: 1.5,
                lifetime_max: 3.0,
                speed_min: 15.0,
                speed_max: 45.0,
                size_min: 0.5,
                size_max: 2.0,
                drag: 0.2,
                gravity: 9.8,
                spread: 1.0,
                color: [0.35, 0.3, 0.25, 1.0],
                additive: false,
                ..base
            },
            EffectKind::Explosion => EffectConfig {
                emission: Emission::Burst { count: 200 },
                lifetime_min: 0.6,
                lifetime_max: 1.4,
                speed_min: 10.0,
                speed_max: 35.0,
                size_min: 3.0,
                size_max: 7.0,
                growth: 1.5,
                drag: 1.5,
                spread: PI,
                color: [1.0, 0.6, 0.2, 1.0],
                ..base
            },
            EffectKind::Shockwave => EffectConfig {
                emission: Emission::Burst { count: 1 },
                lifetime_min: 1.2,
                lifetime_max: 1.2,
                speed_min: 0.0,
                speed_max: 0.0,
                size_min: 2.0,
                size_max: 2.0,
                growth: 40.0,
                drag: 0.0,
                spread: 0.0,
                color: [1.0, 0.95, 0.85, 0.8],
                ..base
            },
        }
    }

    pub fn descriptor(self) -> EffectDescriptor {
        EffectDescriptor {
            kind: self,
            config: self.default_config(),
        }
    }

    /// Stream salt so each emitter draws its own sequence from the run seed
    fn seed_salt(self) -> u32 {
        (self as u32 + 1).wrapping_mul(0x9E37_79B9)
    }
}

/// A live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// 1 at birth, 0 at death
    pub life: f32,
    /// Lifetime in seconds
    pub lifetime: f32,
    pub size: f32,
}

/// GPU instance record (must match the particle shader)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub pos: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// Fixed-capacity particle pool for one effect
#[derive(Debug, Clone)]
pub struct Emitter {
    descriptor: EffectDescriptor,
    particles: Vec<Particle>,
    capacity: usize,
    spawn_budget: f32,
    rng: SeededRng,
    dropped: u32,
}

impl Emitter {
    pub fn new(descriptor: EffectDescriptor, capacity: usize, seed: u32) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            spawn_budget: 0.0,
            rng: SeededRng::new(seed ^ descriptor.kind.seed_salt()),
            dropped: 0,
            descriptor,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.descriptor.kind
    }

    pub fn descriptor(&self) -> &EffectDescriptor {
        &self.descriptor
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles that did not fit in the pool
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Clear the pool and reseed, as on restart
    pub fn reset(&mut self, seed: u32) {
        self.particles.clear();
        self.spawn_budget = 0.0;
        self.dropped = 0;
        self.rng.set_seed(seed ^ self.descriptor.kind.seed_salt());
    }

    /// Release `count` particles at `origin`, aimed along `direction`
    pub fn emit(&mut self, origin: Vec3, direction: Vec3, count: u32) {
        let cfg = self.descriptor.config;
        let axis = direction.try_normalize().unwrap_or(Vec3::Y);
        let orient = Quat::from_rotation_arc(Vec3::Z, axis);
        let cos_spread = cfg.spread.clamp(0.0, PI).cos();

        for _ in 0..count {
            if self.particles.len() >= self.capacity {
                self.dropped += 1;
                continue;
            }
            // Uniform direction inside the cone around +Z, then rotated onto the axis
            let z = self.rng.range(cos_spread, 1.0);
            let phi = self.rng.range(0.0, TAU);
            let r = (1.0 - z * z).max(0.0).sqrt();
            let dir = orient * Vec3::new(r * phi.cos(), r * phi.sin(), z);

            let speed = self.rng.range(cfg.speed_min, cfg.speed_max);
            let lifetime = self.rng.range(cfg.lifetime_min, cfg.lifetime_max).max(1e-3);
            let size = self.rng.range(cfg.size_min, cfg.size_max);
            self.particles.push(Particle {
                pos: origin,
                vel: dir * speed,
                life: 1.0,
                lifetime,
                size,
            });
        }
    }

    /// Fire the configured burst (no-op for continuous effects)
    pub fn burst(&mut self, origin: Vec3, direction: Vec3) {
        if let Emission::Burst { count } = self.descriptor.config.emission {
            self.emit(origin, direction, count);
        }
    }

    /// Accumulate continuous emission for `dt` seconds at `intensity` (0-1)
    pub fn emit_continuous(&mut self, origin: Vec3, direction: Vec3, intensity: f32, dt: f32) {
        let Emission::Continuous { rate_per_second } = self.descriptor.config.emission else {
            return;
        };
        let intensity = crate::clamp01(intensity);
        if intensity <= 0.0 || dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.spawn_budget += rate_per_second * intensity * dt;
        let whole = self.spawn_budget.floor();
        self.spawn_budget -= whole;
        self.emit(origin, direction, whole as u32);
    }

    /// Integrate all particles by `dt` and retire dead ones
    pub fn step(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        let cfg = self.descriptor.config;
        let damping = (1.0 - cfg.drag * dt).max(0.0);
        let mut corrupted = 0;
        for p in self.particles.iter_mut() {
            p.vel *= damping;
            p.vel.y -= cfg.gravity * dt;
            p.pos += p.vel * dt;
            p.size *= 1.0 + cfg.growth * dt;
            p.life -= dt / p.lifetime;
            if !is_finite_vec3(p.pos) || !p.size.is_finite() {
                p.life = 0.0;
                corrupted += 1;
            }
        }
        if corrupted > 0 {
            log::warn!("{} {} particles went non-finite; retired", corrupted, self.kind().as_str());
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Instance data for upload, fading alpha with remaining life
    pub fn instances(&self) -> Vec<ParticleInstance> {
        let [r, g, b, a] = self.descriptor.config.color;
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                pos: p.pos.to_array(),
                size: p.size,
                color: [r, g, b, a * p.life.clamp(0.0, 1.0)],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_sane_defaults() {
        for kind in EffectKind::ALL {
            let cfg = kind.default_config();
            assert!(cfg.lifetime_min > 0.0 && cfg.lifetime_min <= cfg.lifetime_max, "{kind:?}");
            assert!(cfg.speed_min <= cfg.speed_max, "{kind:?}");
            assert!(cfg.size_min <= cfg.size_max, "{kind:?}");
        }
    }

    #[test]
    fn test_burst_respects_capacity() {
        let mut emitter = Emitter::new(EffectKind::Explosion.descriptor(), 50, 1);
        emitter.burst(Vec3::ZERO, Vec3::Y);
        assert_eq!(emitter.len(), 50);
        assert_eq!(emitter.dropped(), 150);
    }

    #[test]
    fn test_continuous_ignores_burst_and_vice_versa() {
        let mut fire = Emitter::new(EffectKind::Fire.descriptor(), 100, 1);
        fire.burst(Vec3::ZERO, Vec3::Y);
        assert!(fire.is_empty());
        let mut debris = Emitter::new(EffectKind::Debris.descriptor(), 100, 1);
        debris.emit_continuous(Vec3::ZERO, Vec3::Y, 1.0, 1.0);
        assert!(debris.is_empty());
    }

    #[test]
    fn test_continuous_rate_accumulates_fractions() {
        let mut fire = Emitter::new(EffectKind::Fire.descriptor(), 1000, 1);
        // 180/s at half intensity for 60 frames of 1/60 s = 90 particles
        for _ in 0..60 {
            fire.emit_continuous(Vec3::ZERO, Vec3::Y, 0.5, 1.0 / 60.0);
        }
        assert!((89..=90).contains(&fire.len()), "got {}", fire.len());
    }

    #[test]
    fn test_particles_expire() {
        let mut sparks = Emitter::new(EffectKind::Spark.descriptor(), 500, 3);
        sparks.burst(Vec3::ZERO, Vec3::Y);
        assert_eq!(sparks.len(), 120);
        for _ in 0..100 {
            sparks.step(1.0 / 60.0);
        }
        assert!(sparks.is_empty());
    }

    #[test]
    fn test_emission_direction_within_cone() {
        let mut plasma = Emitter::new(EffectKind::Plasma.descriptor(), 500, 9);
        plasma.emit(Vec3::ZERO, Vec3::X, 200);
        let cos_spread = plasma.descriptor().config.spread.cos();
        for p in plasma.particles() {
            let dir = p.vel.normalize();
            assert!(dir.dot(Vec3::X) >= cos_spread - 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = Emitter::new(EffectKind::Debris.descriptor(), 200, 42);
        let mut b = Emitter::new(EffectKind::Debris.descriptor(), 200, 42);
        a.burst(Vec3::ZERO, Vec3::Y);
        b.burst(Vec3::ZERO, Vec3::Y);
        for _ in 0..10 {
            a.step(1.0 / 60.0);
            b.step(1.0 / 60.0);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut emitter = Emitter::new(EffectKind::Spark.descriptor(), 200, 5);
        emitter.burst(Vec3::ZERO, Vec3::Y);
        let first = emitter.particles().to_vec();
        emitter.reset(5);
        assert!(emitter.is_empty());
        emitter.burst(Vec3::ZERO, Vec3::Y);
        assert_eq!(emitter.particles(), first.as_slice());
    }

    #[test]
    fn test_kinds_draw_distinct_streams() {
        let mut spark = Emitter::new(EffectKind::Spark.descriptor(), 10, 5);
        let mut debris = Emitter::new(EffectKind::Debris.descriptor(), 10, 5);
        spark.emit(Vec3::ZERO, Vec3::Y, 1);
        debris.emit(Vec3::ZERO, Vec3::Y, 1);
        assert_ne!(spark.particles()[0].vel.normalize(), debris.particles()[0].vel.normalize());
    }

    #[test]
    fn test_non_finite_particles_retired() {
        let mut smoke = Emitter::new(EffectKind::Smoke.descriptor(), 10, 5);
        smoke.emit(Vec3::splat(f32::NAN), Vec3::Y, 3);
        smoke.step(1.0 / 60.0);
        assert!(smoke.is_empty());
    }

    #[test]
    fn test_instances_fade_with_life() {
        let mut shock = Emitter::new(EffectKind::Shockwave.descriptor(), 4, 5);
        shock.burst(Vec3::ZERO, Vec3::Y);
        shock.step(0.6);
        let instances = shock.instances();
        assert_eq!(instances.len(), 1);
        assert!((instances[0].color[3] - 0.4).abs() < 1e-4);
        assert!(instances[0].size > 2.0);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&instances).len(), 32);
    }
}
