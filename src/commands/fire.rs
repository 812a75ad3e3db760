//! Headless run of the background fire effect.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use codequest_rewards::effects::particles::DEFAULT_PARTICLE_COUNT;
use codequest_rewards::effects::{DeviceCapabilities, FireSimulation, FlameColor};
use codequest_rewards::AppError;

use super::Output;

const FRAME_SECS: f32 = 1.0 / 60.0;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FireReport {
    frames: u32,
    particles: usize,
    recycled: u64,
    peak_height: f32,
    yellow: usize,
    orange: usize,
    red: usize,
    gpu_effect: bool,
    cores: usize,
}

pub fn run(frames: u32, particles: Option<usize>, out: &Output) -> Result<(), AppError> {
    let caps = DeviceCapabilities::detect();
    if !caps.supports_gpu_effect() {
        log::info!(
            "[effects] {} cores, the dashboard would fall back to the static fire",
            caps.hardware_concurrency
        );
    }

    let count = particles.unwrap_or(DEFAULT_PARTICLE_COUNT);
    let mut sim = FireSimulation::with_count(count, StdRng::from_entropy());
    for _ in 0..frames {
        sim.step(FRAME_SECS);
    }

    let colors = |color: FlameColor| sim.particles().iter().filter(|p| p.color == color).count();
    let report = FireReport {
        frames,
        particles: sim.particles().len(),
        recycled: sim.recycled(),
        peak_height: sim.peak_height(),
        yellow: colors(FlameColor::Yellow),
        orange: colors(FlameColor::Orange),
        red: colors(FlameColor::Red),
        gpu_effect: caps.supports_gpu_effect(),
        cores: caps.hardware_concurrency,
    };
    out.emit(&report, |r| {
        format!(
            "🔥 {} particles after {} frames ({} recycled, peak {:.2})\n\
             yellow {}  orange {}  red {}\n\
             GPU effect: {} ({} cores)",
            r.particles,
            r.frames,
            r.recycled,
            r.peak_height,
            r.yellow,
            r.orange,
            r.red,
            if r.gpu_effect { "on" } else { "off" },
            r.cores
        )
    })
}
