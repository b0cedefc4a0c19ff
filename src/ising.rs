/*!
# 2D Ising lattice with single-spin-flip Metropolis dynamics

A square grid of ±1 spins on a torus: every edge wraps around to the opposite
side, so each site has exactly four neighbors. The model carries three
independently mutable physical parameters — temperature `T`, pairwise
interaction strength `J`, and external field strength `H` — under the
Hamiltonian

```text
E = -J * sum over bonds of s_a * s_b  -  H * sum over sites of s
```

with every pairwise bond counted once. The simulator keeps a cached total
energy, updated incrementally on each accepted flip; the same `dE` drives the
acceptance rule and the cache, so a full [`energy`](IsingModel::energy)
rescan agrees with the cache to floating-point summation error.

## Example

```rust
use micro_mcmc::ising::IsingModel;

let mut model = IsingModel::new(16, 2.0, 1.0, 0.0).unwrap().set_seed(42);
model.update(5_000);
assert!((model.energy() - model.cached_energy()).abs() < 1e-9);
assert!(model.magnetization().abs() <= 1.0);
```

## Small lattices

On a `2x2` grid the periodic "up" and "down" neighbors of a cell coincide, as
do "left" and "right", so every bond appears twice in the four-neighbor sum.
The energy bookkeeping stays exact because the full scan sees the same
duplicated bonds. On a `1x1` grid every neighbor is the cell itself; flipping
the spin flips its neighbors with it, which no local update formula can track,
so the cached energy is only meaningful for sizes of at least 2.
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView2};
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use rand_distr::Exp1;

use crate::error::{Error, Result};

/// Square-lattice Ising model with periodic boundary conditions.
///
/// Owns its spin grid, physical parameters, cached total energy, and random
/// number generator. Construction seeds the generator from entropy;
/// [`set_seed`](IsingModel::set_seed) makes a run reproducible.
#[derive(Debug, Clone)]
pub struct IsingModel {
    /// Height and width of the square lattice.
    size: usize,
    /// Temperature, strictly positive.
    temperature: f64,
    /// Strength of the pairwise interaction.
    interaction: f64,
    /// Strength of the external magnetic field.
    field: f64,
    /// The spin configuration, entries in {-1, +1}.
    grid: Array2<i8>,
    /// Total energy of `grid`, maintained incrementally.
    energy: f64,
    /// The seed behind `rng`.
    seed: u64,
    rng: SmallRng,
}

impl IsingModel {
    /**
    Creates a lattice of independent uniform ±1 spins.

    # Arguments

    * `size` - Side length of the square lattice, at least 1.
    * `temperature` - Temperature, finite and strictly positive.
    * `interaction` - Pairwise interaction strength `J`, finite.
    * `field` - External field strength `H`, finite.

    # Errors

    [`Error::InvalidParameter`] if any argument is out of range; nothing is
    allocated or drawn in that case.

    # Examples

    ```rust
    use micro_mcmc::ising::IsingModel;

    let model = IsingModel::new(8, 2.5, 1.0, 0.0).unwrap();
    assert_eq!(model.size(), 8);
    assert!(IsingModel::new(8, 0.0, 1.0, 0.0).is_err());
    ```
    */
    pub fn new(size: usize, temperature: f64, interaction: f64, field: f64) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidParameter {
                name: "size",
                value: 0.0,
                constraint: "at least 1",
            });
        }
        validate_temperature(temperature)?;
        validate_finite("interaction", interaction)?;
        validate_finite("field", field)?;

        let seed = thread_rng().gen::<u64>();
        let mut model = Self {
            size,
            temperature,
            interaction,
            field,
            grid: Array2::ones((size, size)),
            energy: 0.0,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        };
        model.randomize();
        Ok(model)
    }

    /// Reseeds the generator and redraws the initial configuration, so that
    /// everything after this call is a pure function of `seed`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self.randomize();
        self
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let grid = Array2::from_shape_simple_fn((self.size, self.size), || {
            if rng.gen::<f64>() > 0.5 {
                1i8
            } else {
                -1i8
            }
        });
        self.grid = grid;
        self.energy = self.energy();
    }

    /**
    Performs a single Metropolis step: pick a site uniformly at random and
    flip it with probability `min(1, exp(-dE / T))`.

    The energy change of flipping spin `s` with periodic four-neighbor sum
    `S` is `dE = 2 s (J S + H)`. The flip is accepted iff `dE / T` is below a
    fresh `Exp(1)` draw, which realizes the acceptance probability above; on
    acceptance the spin is negated and `dE` is added to the cached energy.
    */
    pub fn metropolis_step(&mut self) {
        let d = self.size;
        let i = self.rng.gen_range(0..d);
        let j = self.rng.gen_range(0..d);
        let spin = f64::from(self.grid[(i, j)]);
        let neighbors = f64::from(self.grid[((i + d - 1) % d, j)])
            + f64::from(self.grid[((i + 1) % d, j)])
            + f64::from(self.grid[(i, (j + d - 1) % d)])
            + f64::from(self.grid[(i, (j + 1) % d)]);
        let delta = 2.0 * spin * (self.interaction * neighbors + self.field);

        let threshold: f64 = self.rng.sample(Exp1);
        if delta / self.temperature < threshold {
            self.grid[(i, j)] *= -1;
            self.energy += delta;
        }
    }

    /// Performs `steps` independent single-spin Metropolis steps (not full
    /// lattice sweeps).
    pub fn update(&mut self, steps: usize) {
        for _ in 0..steps {
            self.metropolis_step();
        }
    }

    /// Like [`update`](IsingModel::update), reporting progress on the
    /// console. Useful for the multi-million-step runs of an animation or
    /// annealing driver.
    pub fn update_with_progress(&mut self, steps: usize) {
        let pb = ProgressBar::new(steps as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        pb.set_prefix(format!("{}x{} lattice", self.size, self.size));
        for _ in 0..steps {
            self.metropolis_step();
            pb.inc(1);
        }
        pb.finish_with_message("Done!");
    }

    /// Recomputes the total energy of the current configuration from
    /// scratch, counting every bond once through each site's wrap-around
    /// "down" and "right" neighbors.
    ///
    /// Always within floating summation error of
    /// [`cached_energy`](IsingModel::cached_energy) for sizes of at least 2;
    /// recomputing is the drift check, not a cheaper substitute for the
    /// cache.
    pub fn energy(&self) -> f64 {
        let d = self.size;
        let mut total = 0.0;
        for i in 0..d {
            for j in 0..d {
                let spin = f64::from(self.grid[(i, j)]);
                let down = f64::from(self.grid[((i + 1) % d, j)]);
                let right = f64::from(self.grid[(i, (j + 1) % d)]);
                total -= self.interaction * spin * (down + right);
                total -= self.field * spin;
            }
        }
        total
    }

    /// The incrementally maintained total energy.
    pub fn cached_energy(&self) -> f64 {
        self.energy
    }

    /// Mean spin of the configuration, in [-1, 1].
    pub fn magnetization(&self) -> f64 {
        let total: f64 = self.grid.iter().map(|&s| f64::from(s)).sum();
        total / (self.size * self.size) as f64
    }

    /// Read-only view of the spin grid, for renderers and diagnostics.
    pub fn grid(&self) -> ArrayView2<'_, i8> {
        self.grid.view()
    }

    /// Sets the temperature. Subsequent steps use the new value immediately.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for non-finite or non-positive values; the
    /// previous temperature is kept in that case.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    /// Sets the pairwise interaction strength `J` and refreshes the cached
    /// energy, which is a total under the new Hamiltonian.
    pub fn set_interaction(&mut self, interaction: f64) -> Result<()> {
        validate_finite("interaction", interaction)?;
        self.interaction = interaction;
        self.energy = self.energy();
        Ok(())
    }

    /// Sets the external field strength `H` and refreshes the cached energy.
    pub fn set_field(&mut self, field: f64) -> Result<()> {
        validate_finite("field", field)?;
        self.field = field;
        self.energy = self.energy();
        Ok(())
    }

    /// Side length of the square lattice.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Current pairwise interaction strength.
    pub fn interaction(&self) -> f64 {
        self.interaction
    }

    /// Current external field strength.
    pub fn field(&self) -> f64 {
        self.field
    }

    /// The seed behind this model's generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

fn validate_temperature(temperature: f64) -> Result<()> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "temperature",
            value: temperature,
            constraint: "finite and positive",
        });
    }
    Ok(())
}

fn validate_finite(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidParameter {
            name,
            value,
            constraint: "finite",
        });
    }
    Ok(())
}
