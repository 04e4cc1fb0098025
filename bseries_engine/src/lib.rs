#![forbid(unsafe_code)]

/// Engine v1 — coefficient formulas and catalogs are frozen.
/// Behavioral changes require engine_v2.
pub const ENGINE_VERSION: u32 = 1;

pub mod error;
pub mod numeric;
pub mod domain;
pub mod tree;
pub mod tableau;
pub mod analysis;
pub mod grip;
pub mod bseries;
pub mod optimizer;
pub mod kernel;
pub mod export;
