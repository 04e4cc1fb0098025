/// Engine v1 — Error Kinds
///
/// All failures are synchronous and surfaced to the immediate caller.
/// Numerical degeneracy (zero-norm vectors, empty coefficient sets) is
/// absorbed locally by the grip metrics and never raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain type, order, and tree type must agree before any kernel
    /// is assembled. No partial kernel survives a failed validation.
    #[error("invalid domain specification: {reason}")]
    InvalidDomainSpecification { reason: String },

    /// Lookup-style dispatch received an unrecognized analysis key.
    #[error("unknown component: {0:?}")]
    UnknownComponent(String),

    /// Lookup-style dispatch received an unrecognized operator name.
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    /// Lookup-style dispatch received an unrecognized export format.
    #[error("unknown export format: {0:?}")]
    UnknownFormat(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
