//! Seedable random source shared by the whole game.
//!
//! Everything random in a run draws from one `GameRng`, so a fixed seed
//! replays the same session given the same input.

use std::f32::consts::TAU;

use log::info;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64;

use crate::engine::graphics::Color;

#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg64,
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Pcg64::from_entropy(),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                info!("Using fixed random seed {}", seed);
                Self::seeded(seed)
            }
            None => Self::from_entropy(),
        }
    }

    /// Uniform in [0, 1).
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform between `a` and `b`. The bounds may come in either order.
    pub fn range(&mut self, a: f32, b: f32) -> f32 {
        a + (b - a) * self.unit()
    }

    /// Uniform angle in [0, 2pi).
    pub fn angle(&mut self) -> f32 {
        self.range(0.0, TAU)
    }

    /// Uniform index in `0..n`. Returns 0 when `n` is 0.
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.gen_range(0..n)
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }

    /// Uniform in `low..=high`.
    pub fn byte(&mut self, low: u8, high: u8) -> u8 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    pub fn random_color(&mut self) -> Color {
        Color::rgb(self.byte(0, 255), self.byte(0, 255), self.byte(0, 255))
    }

    pub fn random_dark_color(&mut self) -> Color {
        Color::rgb(self.byte(0, 127), self.byte(0, 127), self.byte(0, 127))
    }

    pub fn random_red_color(&mut self) -> Color {
        Color::rgb(self.byte(128, 255), self.byte(0, 127), self.byte(0, 127))
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
