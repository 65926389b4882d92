use super::*;

/// Purely random placement: keep picking uniformly random positions, mining each one that
/// isn't mined yet, until the requested count is reached.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: &LakeConfig) -> Minefield {
        use rand::prelude::*;
        use rand::rngs::StdRng;

        let mut mines: Array2<bool> =
            Array2::default([config.rows() as usize, config.cols() as usize]);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut placed = 0;
        while placed < config.mines() {
            let row = rng.random_range(0..config.rows());
            let col = rng.random_range(0..config.cols());
            let cell = &mut mines[Coords::new(row, col).to_nd_index(0)];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        log::debug!(
            "Placed {} mines on {}x{} with seed {}",
            placed,
            config.rows(),
            config.cols(),
            self.seed
        );
        Minefield::from_mask(mines)
    }
}
