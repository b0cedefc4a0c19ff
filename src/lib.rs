//! Small building blocks for teaching Markov Chain Monte Carlo: generic
//! Metropolis and Metropolis-Hastings acceptance steps, a one-dimensional
//! slice sampler, and a 2D Ising lattice driven by single-spin-flip
//! Metropolis dynamics. The components are independent leaves; drivers,
//! plotting, and animation live outside this crate and compose them.

pub mod error;
pub mod ising;
pub mod metropolis;
pub mod slice;
