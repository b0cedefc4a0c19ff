/*!
# One-dimensional slice sampler

Implements Neal's slice-sampling algorithm for scalar densities: draw an
auxiliary vertical level uniformly under the density at the current point,
bracket the resulting horizontal slice by stepping out, then shrink the
bracket around rejected candidates until one lands inside the slice.

The target is supplied as an opaque log-density `logp`; `-inf` marks points of
zero probability and naturally halts the stepping-out search on that side.
Both search loops are bounded by caller-configurable iteration caps so a
pathological density fails with
[`Error::IterationLimit`](crate::error::Error::IterationLimit) instead of
spinning forever.

## Example

```rust
use micro_mcmc::slice::{slice_sample, SliceConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);
let config = SliceConfig::new(1.0).unwrap();

// Sample a standard normal.
let mut x = 0.0f64;
for _ in 0..100 {
    x = slice_sample(&mut rng, |t: f64| -0.5 * t * t, x, &config).unwrap();
}
assert!(x.is_finite());
```
*/

use num_traits::{Float, ToPrimitive};
use rand::Rng;
use rand_distr::{Distribution, Exp1, Standard};

use crate::error::{Error, Result};

/// Tuning knobs for [`slice_sample`].
///
/// The fields are public so a driver can adjust them between calls; they are
/// re-validated on every call, before any random draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceConfig<T> {
    /// Initial bracket width, also the stepping-out increment. Must be finite
    /// and positive.
    pub width: T,
    /// Set for densities supported on the positive half-line only.
    pub positive_support: bool,
    /// Left endpoint used in place of zero when `positive_support` is set.
    /// Must be positive.
    pub eps: T,
    /// Cap on the total number of stepping-out expansions (both sides share
    /// the budget).
    pub max_step_out: usize,
    /// Cap on the number of shrinkage redraws.
    pub max_shrink: usize,
}

impl<T: Float> Default for SliceConfig<T> {
    fn default() -> Self {
        Self {
            width: T::one(),
            positive_support: false,
            eps: T::from(1e-10).unwrap(),
            max_step_out: 1_000,
            max_shrink: 1_000,
        }
    }
}

impl<T: Float> SliceConfig<T> {
    /// Creates a configuration with the given slice width and defaults for
    /// everything else.
    pub fn new(width: T) -> Result<Self> {
        let config = Self {
            width,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric fields, rejecting them eagerly with
    /// [`Error::InvalidParameter`].
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > T::zero()) {
            return Err(Error::InvalidParameter {
                name: "width",
                value: self.width.to_f64().unwrap_or(f64::NAN),
                constraint: "finite and positive",
            });
        }
        if !(self.eps.is_finite() && self.eps > T::zero()) {
            return Err(Error::InvalidParameter {
                name: "eps",
                value: self.eps.to_f64().unwrap_or(f64::NAN),
                constraint: "finite and positive",
            });
        }
        Ok(())
    }
}

/**
Draws the next sample of a slice-sampling Markov chain started at `x0`.

The four stages:

1. **Level**: `log_height = logp(x0) - Exp(1)`, an exact draw of a uniform
   level under the density at `x0`, kept in log space.
2. **Bracket**: place an interval of length `width` uniformly around `x0`.
   Under `positive_support` a left endpoint below zero is clamped to
   `config.eps` before the right endpoint is placed, so the bracket never
   inverts.
3. **Stepping-out**: push each endpoint outward in `width` increments while
   the density there still exceeds the level. The left endpoint stops at
   `eps` under `positive_support`; a `-inf` density stops a side naturally.
4. **Shrinkage**: draw candidates uniformly from the bracket, pulling the
   violated endpoint in to each rejected candidate, until one lands inside
   the slice.

The returned sample `s` always satisfies `logp(s) >= log_height`, and
`s >= eps` whenever the clamp in stage 2 fired.

# Arguments

* `rng` - The random number generator supplying uniform and exponential draws.
* `logp` - The log-density of the (unnormalized) target.
* `x0` - The current state of the chain.
* `config` - Width, support, and iteration-cap settings.

# Errors

- [`Error::InvalidParameter`] if the configuration fails validation.
- [`Error::NonFiniteDensity`] if `logp` returns NaN at any evaluation point.
- [`Error::IterationLimit`] if stepping-out or shrinkage exhausts its cap.

# Examples

```rust
use micro_mcmc::slice::{slice_sample, SliceConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// An Exponential(1) target, supported on the positive half-line.
let logp = |x: f64| if x > 0.0 { -x } else { f64::NEG_INFINITY };

let mut config = SliceConfig::new(1.0).unwrap();
config.positive_support = true;

let mut rng = SmallRng::seed_from_u64(42);
let sample = slice_sample(&mut rng, logp, 0.5, &config).unwrap();
assert!(sample > 0.0);
```
*/
pub fn slice_sample<T, L, R>(rng: &mut R, mut logp: L, x0: T, config: &SliceConfig<T>) -> Result<T>
where
    T: Float,
    L: FnMut(T) -> T,
    R: Rng,
    Exp1: Distribution<T>,
    Standard: Distribution<T>,
{
    config.validate()?;
    let SliceConfig {
        width,
        positive_support,
        eps,
        max_step_out,
        max_shrink,
    } = *config;

    let logp_x0 = logp(x0);
    if logp_x0.is_nan() {
        return Err(Error::NonFiniteDensity {
            context: "initial point",
        });
    }
    let level: T = rng.sample(Exp1);
    let log_height = logp_x0 - level;

    let u: T = rng.gen();
    let mut left = x0 - width * u;
    if positive_support && left < T::zero() {
        left = eps;
    }
    let mut right = left + width;

    // Stepping-out, both sides drawing on one expansion budget.
    let mut expansions = 0usize;
    loop {
        let lp = logp(left);
        if lp.is_nan() {
            return Err(Error::NonFiniteDensity {
                context: "left interval endpoint",
            });
        }
        if lp <= log_height {
            break;
        }
        if expansions == max_step_out {
            return Err(Error::IterationLimit {
                stage: "stepping-out",
                max: max_step_out,
            });
        }
        expansions += 1;
        left = left - width;
        if positive_support && left < eps {
            left = eps;
            break;
        }
    }
    loop {
        let lp = logp(right);
        if lp.is_nan() {
            return Err(Error::NonFiniteDensity {
                context: "right interval endpoint",
            });
        }
        if lp <= log_height {
            break;
        }
        if expansions == max_step_out {
            return Err(Error::IterationLimit {
                stage: "stepping-out",
                max: max_step_out,
            });
        }
        expansions += 1;
        right = right + width;
    }

    // Shrinkage: candidates can only tighten the bracket, so the accepted
    // sample stays inside [left, right].
    for _ in 0..max_shrink {
        let u: T = rng.gen();
        let candidate = left + (right - left) * u;
        let lp = logp(candidate);
        if lp.is_nan() {
            return Err(Error::NonFiniteDensity {
                context: "shrinkage candidate",
            });
        }
        if lp >= log_height {
            return Ok(candidate);
        }
        if candidate < x0 {
            left = candidate;
        } else {
            right = candidate;
        }
    }
    Err(Error::IterationLimit {
        stage: "shrinkage",
        max: max_shrink,
    })
}
