//! Ordered versus disordered regimes of the Ising lattice: well below the
//! critical temperature the lattice magnetizes, far above it the spins stay
//! uncorrelated.

use micro_mcmc::ising::IsingModel;

const SIZE: usize = 20;
const SEEDS: [u64; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Cools a lattice through the critical region down to `target`, then
/// reports |m|. Cooling in stages instead of quenching straight down avoids
/// the metastable striped states of the torus.
fn annealed_abs_magnetization(seed: u64, target: f64) -> f64 {
    let mut model = IsingModel::new(SIZE, 2.6, 1.0, 0.0).unwrap().set_seed(seed);
    for &t in &[2.6, 2.4, 2.2, 2.0, 1.5, 1.0] {
        model.set_temperature(t).unwrap();
        model.update(100_000);
    }
    model.set_temperature(target).unwrap();
    model.update(100_000);
    model.magnetization().abs()
}

fn hot_abs_magnetization(seed: u64, temperature: f64) -> f64 {
    let mut model = IsingModel::new(SIZE, temperature, 1.0, 0.0)
        .unwrap()
        .set_seed(seed);
    model.update(200_000);
    model.magnetization().abs()
}

#[test]
fn cold_lattice_orders_hot_lattice_does_not() {
    let cold: f64 = SEEDS
        .iter()
        .map(|&s| annealed_abs_magnetization(s, 0.5))
        .sum::<f64>()
        / SEEDS.len() as f64;
    let hot: f64 = SEEDS
        .iter()
        .map(|&s| hot_abs_magnetization(s, 10.0))
        .sum::<f64>()
        / SEEDS.len() as f64;

    assert!(cold > 0.3, "cold lattice failed to order: mean |m| = {cold}");
    assert!(hot < 0.15, "hot lattice ordered unexpectedly: mean |m| = {hot}");
    assert!(
        cold > 2.0 * hot,
        "regimes not separated: cold |m| = {cold}, hot |m| = {hot}"
    );
}
