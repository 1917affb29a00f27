//! Synthetic cyclic tensile tests.
//!
//! Strain and stress follow sine waves of the same period, stress leading
//! strain by a phase angle, with optional Gaussian noise from a seeded
//! generator so every run produces the same series.

use std::f64::consts::TAU;

use crate::data::model::TensileSeries;
use crate::error::Result;

/// Parameters of a synthetic test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticTest {
    pub period_s: f64,
    pub duration_s: f64,
    pub sample_rate_hz: f64,
    pub strain_mean: f64,
    pub strain_amplitude: f64,
    pub stress_mean: f64,
    pub stress_amplitude: f64,
    /// Phase by which stress leads strain, radians.
    pub phase_lead: f64,
    /// Noise standard deviation as a fraction of each amplitude.
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticTest {
    fn default() -> Self {
        Self {
            period_s: 10.0,
            duration_s: 100.0,
            sample_rate_hz: 20.0,
            strain_mean: 0.035,
            strain_amplitude: 0.015,
            stress_mean: 25.0,
            stress_amplitude: 15.0,
            phase_lead: 0.0,
            noise: 0.0,
            seed: 42,
        }
    }
}

impl SyntheticTest {
    /// Number of samples, `floor(duration * rate)`.
    pub fn sample_count(&self) -> usize {
        (self.duration_s * self.sample_rate_hz).floor().max(0.0) as usize
    }

    pub fn generate(&self) -> Result<TensileSeries> {
        let mut rng = SimpleRng::new(self.seed);
        let n = self.sample_count();
        let omega = TAU / self.period_s;

        let mut time_s = Vec::with_capacity(n);
        let mut strain = Vec::with_capacity(n);
        let mut stress = Vec::with_capacity(n);

        for i in 0..n {
            let t = i as f64 / self.sample_rate_hz;
            let strain_noise = rng.gauss(0.0, self.noise * self.strain_amplitude);
            let stress_noise = rng.gauss(0.0, self.noise * self.stress_amplitude);

            time_s.push(t);
            strain.push(self.strain_mean + self.strain_amplitude * (omega * t).sin() + strain_noise);
            stress.push(
                self.stress_mean
                    + self.stress_amplitude * (omega * t + self.phase_lead).sin()
                    + stress_noise,
            );
        }

        TensileSeries::from_seconds(time_s, strain, stress)
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + std_dev * z
    }
}
