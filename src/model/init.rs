use rand::{rngs::StdRng, Rng, SeedableRng};

/// Weight initializer. Draws from a seeded or entropy-backed `StdRng`.
pub struct WeightInit {
    rng: StdRng,
}

impl WeightInit {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Box-Muller sample from N(mean, std).
    pub fn gauss(&mut self, mean: f32, std: f32) -> f32 {
        let u1: f64 = self.rng.gen::<f64>().max(1e-30);
        let u2: f64 = self.rng.gen();
        let mag = (-2.0 * u1.ln()).sqrt();
        mean + std * (mag * (2.0 * std::f64::consts::PI * u2).cos()) as f32
    }

    pub fn normal(&mut self, numel: usize, std: f32) -> Vec<f32> {
        (0..numel).map(|_| self.gauss(0.0, std)).collect()
    }
}
