/*!
# Metropolis and Metropolis–Hastings acceptance steps

This module implements the accept/reject rule at the heart of Markov Chain
Monte Carlo as two free functions that work with any state type `S` and any
caller-supplied log-density. The caller drives the chain: it generates a
proposal however it likes, hands the current and proposed states to one of the
step functions together with a random number generator, and receives the next
state of the chain back.

## Overview

- **Target log-density**: a function `S -> T` returning the unnormalized
  log-probability of a state. `-inf` is the valid "zero probability" signal;
  NaN is treated as a caller bug and surfaced as
  [`Error::NonFiniteDensity`](crate::error::Error::NonFiniteDensity).
- **Proposal log-density** (Hastings variant only): a function of an ordered
  pair of states evaluating the conditional log-probability `log q(a | b)`.
- **Randomness**: every call consumes exactly one uniform draw from the
  generator passed in, so a seeded [`SmallRng`](rand::rngs::SmallRng) makes
  runs fully reproducible.

In log space the Metropolis rule accepts a proposal `y` from state `x` iff

```text
log u < log p(y) - log p(x),        u ~ Uniform(0, 1)
```

so moves that do not decrease the target density are always accepted. The
Hastings generalization adds the proposal-asymmetry correction
`log q(x | y) - log q(y | x)` to the ratio.

## Example

```rust
use micro_mcmc::metropolis::metropolis_step;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

// Random-walk Metropolis over a standard normal target.
let log_target = |x: &f64| -0.5 * x * x;
let mut rng = SmallRng::seed_from_u64(42);
let mut x = 3.0f64;
for _ in 0..1_000 {
    let noise: f64 = rng.sample(StandardNormal);
    x = metropolis_step(&mut rng, x, x + noise, log_target).unwrap();
}
assert!(x.is_finite());
```
*/

use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, Open01};

use crate::error::{Error, Result};

/**
Performs one Metropolis accept/reject decision for a symmetric proposal.

Computes `log_ratio = log_target(&proposed) - log_target(&current)` and
accepts the proposal iff `ln(u) < log_ratio` for a fresh `u ~ Uniform(0, 1)`.
Two consequences worth knowing:

- If `log_target(&proposed) >= log_target(&current)`, acceptance is certain.
- If `log_target(&proposed)` is `-inf`, rejection is certain.

# Arguments

* `rng` - The random number generator supplying the uniform draw.
* `current` - The current state of the Markov chain.
* `proposed` - The proposed state, drawn from a symmetric proposal.
* `log_target` - The unnormalized log-density of the target distribution.

# Errors

Returns [`Error::NonFiniteDensity`] if `log_target` evaluates to NaN at
either state. The density function itself is never retried or repaired.

# Examples

```rust
use micro_mcmc::metropolis::metropolis_step;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(0);
let log_target = |x: &f64| -0.5 * x * x;

// An uphill move is always taken.
let next = metropolis_step(&mut rng, 2.0, 0.5, log_target).unwrap();
assert_eq!(next, 0.5);
```
*/
pub fn metropolis_step<S, T, L, R>(
    rng: &mut R,
    current: S,
    proposed: S,
    mut log_target: L,
) -> Result<S>
where
    T: Float,
    L: FnMut(&S) -> T,
    R: Rng,
    Open01: Distribution<T>,
{
    let current_lp = log_target(&current);
    if current_lp.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "current state",
        });
    }
    let proposed_lp = log_target(&proposed);
    if proposed_lp.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "proposed state",
        });
    }
    if proposed_lp == T::neg_infinity() {
        return Ok(current);
    }

    let log_accept_ratio = proposed_lp - current_lp;
    if log_accept_ratio.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "acceptance ratio",
        });
    }
    let u: T = rng.sample(Open01);
    if u.ln() < log_accept_ratio {
        Ok(proposed)
    } else {
        Ok(current)
    }
}

/**
Performs one Metropolis–Hastings accept/reject decision for an asymmetric
proposal.

The acceptance ratio in log space is

```text
log_ratio = [log p(proposed) + log q(current | proposed)]
          - [log p(current)  + log q(proposed | current)]
```

which reduces to the plain Metropolis ratio whenever the proposal density is
symmetric. The accept/reject rule and the certain-acceptance /
certain-rejection consequences are the same as for [`metropolis_step`].

# Arguments

* `rng` - The random number generator supplying the uniform draw.
* `current` - The current state of the Markov chain.
* `proposed` - The proposed state, drawn from `q(. | current)`.
* `log_proposal` - Evaluates `log q(a | b)` for an ordered pair of states,
  called as `log_proposal(&a, &b)`.
* `log_target` - The unnormalized log-density of the target distribution.

# Errors

Returns [`Error::NonFiniteDensity`] if the target or proposal log-density
evaluates to NaN, or if the combined ratio degenerates to NaN (an `inf - inf`
between the correction terms).

# Examples

```rust
use micro_mcmc::metropolis::metropolis_hastings_step;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(0);
let log_target = |x: &f64| -x.abs();
// A symmetric proposal makes the correction vanish.
let log_proposal = |_: &f64, _: &f64| 0.0;

let next = metropolis_hastings_step(&mut rng, 4.0, 1.0, log_proposal, log_target).unwrap();
assert_eq!(next, 1.0);
```
*/
pub fn metropolis_hastings_step<S, T, L, Q, R>(
    rng: &mut R,
    current: S,
    proposed: S,
    mut log_proposal: Q,
    mut log_target: L,
) -> Result<S>
where
    T: Float,
    L: FnMut(&S) -> T,
    Q: FnMut(&S, &S) -> T,
    R: Rng,
    Open01: Distribution<T>,
{
    let current_lp = log_target(&current);
    if current_lp.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "current state",
        });
    }
    let proposed_lp = log_target(&proposed);
    if proposed_lp.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "proposed state",
        });
    }
    if proposed_lp == T::neg_infinity() {
        return Ok(current);
    }

    let log_q_forward = log_proposal(&proposed, &current);
    if log_q_forward.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "forward proposal density",
        });
    }
    let log_q_backward = log_proposal(&current, &proposed);
    if log_q_backward.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "backward proposal density",
        });
    }

    let log_accept_ratio = (proposed_lp + log_q_backward) - (current_lp + log_q_forward);
    if log_accept_ratio.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "acceptance ratio",
        });
    }
    let u: T = rng.sample(Open01);
    if u.ln() < log_accept_ratio {
        Ok(proposed)
    } else {
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn gaussian_lp(x: &f64) -> f64 {
        -0.5 * x * x
    }

    #[test]
    fn uphill_moves_are_always_accepted() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let next = metropolis_step(&mut rng, 1.5, 0.5, gaussian_lp).unwrap();
            assert_eq!(next, 0.5);
        }
    }

    #[test]
    fn equal_density_moves_are_always_accepted() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let next = metropolis_step(&mut rng, -1.0, 1.0, gaussian_lp).unwrap();
            assert_eq!(next, 1.0);
        }
    }

    #[test]
    fn zero_probability_proposals_are_always_rejected() {
        let lp = |x: &f64| if *x > 0.0 { 0.0 } else { f64::NEG_INFINITY };
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let next = metropolis_step(&mut rng, 1.0, -1.0, lp).unwrap();
            assert_eq!(next, 1.0);
        }
    }

    #[test]
    fn nan_density_is_surfaced_as_an_error() {
        let lp = |x: &f64| if *x < 0.0 { f64::NAN } else { 0.0 };
        let mut rng = SmallRng::seed_from_u64(42);
        let err = metropolis_step(&mut rng, 1.0, -1.0, lp).unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteDensity {
                context: "proposed state"
            }
        );
        let err = metropolis_step(&mut rng, -1.0, 1.0, lp).unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteDensity {
                context: "current state"
            }
        );
    }

    #[test]
    fn hastings_with_symmetric_proposal_matches_metropolis() {
        // Identical RNG streams must produce identical decisions, including
        // on downhill moves that depend on the uniform draw.
        let mut rng_a = SmallRng::seed_from_u64(7);
        let mut rng_b = SmallRng::seed_from_u64(7);
        let symmetric = |_: &f64, _: &f64| 0.0;
        for trial in 0..200 {
            let proposed = 1.0 + 0.01 * trial as f64;
            let a = metropolis_step(&mut rng_a, 0.0, proposed, gaussian_lp).unwrap();
            let b =
                metropolis_hastings_step(&mut rng_b, 0.0, proposed, symmetric, gaussian_lp)
                    .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn proposal_correction_shifts_the_decision() {
        let mut rng = SmallRng::seed_from_u64(42);

        // Strongly downhill target move, overwhelmed by the correction term:
        // acceptance becomes certain.
        let lp = |x: &f64| -x.abs();
        let favoring = |a: &f64, b: &f64| if a < b { 100.0 } else { 0.0 };
        for _ in 0..100 {
            let next = metropolis_hastings_step(&mut rng, 1.0, 51.0, favoring, lp).unwrap();
            assert_eq!(next, 51.0);
        }

        // Uphill target move penalized by the same proposal asymmetry: the
        // acceptance probability drops to exp(-50) and the move never happens
        // in practice.
        for _ in 0..100 {
            let next = metropolis_hastings_step(&mut rng, 51.0, 1.0, favoring, lp).unwrap();
            assert_eq!(next, 51.0);
        }
    }

    #[test]
    fn nan_proposal_density_is_surfaced_as_an_error() {
        let mut rng = SmallRng::seed_from_u64(42);
        let bad_proposal = |_: &f64, _: &f64| f64::NAN;
        let err =
            metropolis_hastings_step(&mut rng, 0.0, 1.0, bad_proposal, gaussian_lp).unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteDensity {
                context: "forward proposal density"
            }
        );
    }

    #[test]
    fn works_with_vector_states() {
        let lp = |x: &[f64; 2]| -0.5 * (x[0] * x[0] + x[1] * x[1]);
        let mut rng = SmallRng::seed_from_u64(42);
        let next = metropolis_step(&mut rng, [3.0, 4.0], [0.1, 0.2], lp).unwrap();
        assert_eq!(next, [0.1, 0.2]);
    }
}
