#![forbid(unsafe_code)]

//! Ontogenesis runtime — the evolutionary layer over B-series kernels.
//!
//! Kernels become individuals: a genome (coefficient, symmetry, and
//! preservation genes), a developmental state machine, and reproduction
//! operators. Populations evolve by elitism + tournament selection.
//!
//! All randomness enters through a caller-supplied `rand::Rng`, so a
//! seeded generator replays a run exactly. All history and ancestry
//! lives in a caller-owned [`session::EvolutionSession`] — there is no
//! global mutable state.

pub mod error;
pub mod genome;
pub mod development;
pub mod session;
pub mod individual;
pub mod reproduction;
pub mod evolution;
pub mod population;
