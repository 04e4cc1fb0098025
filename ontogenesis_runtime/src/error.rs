use thiserror::Error;

use bseries_engine::error::EngineError;

/// Genetic operations degrade gracefully (empty or single-member
/// populations never raise); the only failures surfaced here come from
/// kernel generation underneath.
#[derive(Debug, Error)]
pub enum OntogenesisError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
