//! Ember field and point-cloud fire simulation.

use rand::Rng;
use serde::Serialize;
use sysinfo::System;

/// Decorative flame layers drawn behind the embers, back to front.
pub const FLAME_LAYERS: [&str; 4] = ["main", "secondary", "tertiary", "glow"];

/// One floating ember. Position is in percent of the container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ember {
    pub left: f32,
    pub top: f32,
    pub delay_secs: f32,
    pub duration_secs: f32,
    pub size_px: f32,
}

/// Randomised embers plus the flame layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmberField {
    pub embers: Vec<Ember>,
    pub flames: [&'static str; 4],
}

impl EmberField {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let count = rng.gen_range(20..30);
        let embers = (0..count)
            .map(|_| Ember {
                left: rng.gen_range(0.0..100.0),
                top: rng.gen_range(0.0..100.0),
                delay_secs: rng.gen_range(0.0..5.0),
                duration_secs: rng.gen_range(5.0..12.0),
                size_px: rng.gen_range(3.0..8.0),
            })
            .collect();

        Self {
            embers,
            flames: FLAME_LAYERS,
        }
    }
}

/// Colour band of a fire particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlameColor {
    Yellow,
    Orange,
    Red,
}

impl FlameColor {
    fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let stage: f32 = rng.gen();
        if stage > 0.7 {
            Self::Yellow
        } else if stage > 0.3 {
            Self::Orange
        } else {
            Self::Red
        }
    }

    pub fn rgb(self) -> [f32; 3] {
        match self {
            Self::Yellow => [1.0, 0.85, 0.1],
            Self::Orange => [1.0, 0.5, 0.0],
            Self::Red => [1.0, 0.3, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub lifetime: f32,
    pub size: f32,
    pub color: FlameColor,
}

pub const DEFAULT_PARTICLE_COUNT: usize = 3000;
pub const BASE_WIDTH: f32 = 10.0;
pub const BASE_HEIGHT: f32 = 0.5;
/// Particles above this height are recycled.
pub const MAX_HEIGHT: f32 = 20.0;

const SPEED_SCALE: f32 = 0.5;
const DECAY_RATE: f32 = 0.2;

/// Per-frame particle integrator for the fire effect.
pub struct FireSimulation<R: Rng> {
    particles: Vec<Particle>,
    rng: R,
    recycled: u64,
}

impl<R: Rng> FireSimulation<R> {
    pub fn new(rng: R) -> Self {
        Self::with_count(DEFAULT_PARTICLE_COUNT, rng)
    }

    pub fn with_count(count: usize, mut rng: R) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                position: spawn_position(&mut rng),
                velocity: spawn_velocity(&mut rng),
                lifetime: 1.0,
                size: rng.gen_range(3.0..6.0),
                color: FlameColor::pick(&mut rng),
            })
            .collect();

        Self {
            particles,
            rng,
            recycled: 0,
        }
    }

    /// Advance every particle by `delta` seconds.
    pub fn step(&mut self, delta: f32) {
        for particle in &mut self.particles {
            for axis in 0..3 {
                particle.position[axis] += particle.velocity[axis] * delta * SPEED_SCALE;
            }
            particle.lifetime -= delta * DECAY_RATE;

            if particle.lifetime <= 0.0 || particle.position[1] > MAX_HEIGHT {
                particle.position = spawn_position(&mut self.rng);
                particle.velocity = spawn_velocity(&mut self.rng);
                particle.lifetime = 1.0;
                self.recycled += 1;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Total recycles since creation.
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    /// Highest particle, or 0 when empty.
    pub fn peak_height(&self) -> f32 {
        self.particles
            .iter()
            .map(|p| p.position[1])
            .fold(0.0, f32::max)
    }
}

fn spawn_position<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    [
        (rng.gen::<f32>() - 0.5) * BASE_WIDTH,
        rng.gen::<f32>() * BASE_HEIGHT,
        (rng.gen::<f32>() - 0.5) * BASE_WIDTH,
    ]
}

fn spawn_velocity<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    [
        (rng.gen::<f32>() - 0.5) * 2.0,
        6.0 + rng.gen::<f32>() * 4.0,
        (rng.gen::<f32>() - 0.5) * 2.0,
    ]
}

/// What the host device can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub is_mobile: bool,
    pub hardware_concurrency: usize,
}

impl DeviceCapabilities {
    pub const MIN_CORES: usize = 4;

    /// Capabilities of the machine we are running on.
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let hardware_concurrency = match sys.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };
        log::debug!("[effects] Detected {} logical cores", hardware_concurrency);
        Self {
            is_mobile: cfg!(any(target_os = "android", target_os = "ios")),
            hardware_concurrency,
        }
    }

    pub fn supports_gpu_effect(&self) -> bool {
        !self.is_mobile && self.hardware_concurrency >= Self::MIN_CORES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ember_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let field = EmberField::generate(&mut rng);
            assert!((20..30).contains(&field.embers.len()));
            for ember in &field.embers {
                assert!((0.0..100.0).contains(&ember.left));
                assert!((0.0..100.0).contains(&ember.top));
                assert!((0.0..5.0).contains(&ember.delay_secs));
                assert!((5.0..12.0).contains(&ember.duration_secs));
                assert!((3.0..8.0).contains(&ember.size_px));
            }
        }
    }

    #[test]
    fn test_spawn_within_base() {
        let sim = FireSimulation::new(StdRng::seed_from_u64(1));
        assert_eq!(sim.particles().len(), DEFAULT_PARTICLE_COUNT);
        for p in sim.particles() {
            assert!(p.position[0].abs() <= BASE_WIDTH / 2.0);
            assert!((0.0..=BASE_HEIGHT).contains(&p.position[1]));
            assert!((6.0..=10.0).contains(&p.velocity[1]));
            assert!(p.velocity[0].abs() <= 1.0);
            assert_eq!(p.lifetime, 1.0);
        }
    }

    #[test]
    fn test_step_integrates_and_decays() {
        let mut sim = FireSimulation::with_count(1, StdRng::seed_from_u64(3));
        let before = sim.particles()[0].clone();
        sim.step(0.1);
        let after = &sim.particles()[0];
        let expected_y = before.position[1] + before.velocity[1] * 0.1 * 0.5;
        assert!((after.position[1] - expected_y).abs() < 1e-5);
        assert!((after.lifetime - 0.98).abs() < 1e-5);
        assert_eq!(sim.recycled(), 0);
    }

    #[test]
    fn test_expired_particles_recycle() {
        let mut sim = FireSimulation::with_count(100, StdRng::seed_from_u64(9));
        // Lifetime 1.0 is gone after 5 seconds.
        sim.step(6.0);
        assert_eq!(sim.recycled(), 100);
        assert!(sim.particles().iter().all(|p| p.lifetime == 1.0));
        assert!(sim.peak_height() <= BASE_HEIGHT);
    }

    #[test]
    fn test_gpu_gate() {
        let desktop = DeviceCapabilities {
            is_mobile: false,
            hardware_concurrency: 8,
        };
        assert!(desktop.supports_gpu_effect());
        assert!(!DeviceCapabilities {
            is_mobile: true,
            ..desktop
        }
        .supports_gpu_effect());
        assert!(!DeviceCapabilities {
            is_mobile: false,
            hardware_concurrency: 2,
        }
        .supports_gpu_effect());
    }
}
