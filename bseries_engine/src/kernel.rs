/// Engine v1 — Kernel Generator
///
/// Top-level orchestrator. Validates the domain declaration, builds the
/// initial expansion against a goal profile, refines coefficients with
/// the grip optimizer, and assembles an immutable kernel. A failed
/// validation aborts before any partial kernel exists.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::bseries::{
    chain_compose, generate_expansion, product_compose, BSeriesExpansion,
};
use crate::domain::{DomainPreset, DomainSpecification, DomainType, OptimizationGoal};
use crate::error::EngineError;
use crate::grip::{goal_profile, GripMetric, VERIFICATION_GRIP_THRESHOLD};
use crate::optimizer::{
    optimize_expansion, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use crate::tree::RootedTree;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelMetadata {
    pub generated_at: DateTime<Utc>,
    pub engine_version: u32,
    pub optimizer_iterations: u32,
}

impl KernelMetadata {
    fn now(optimizer_iterations: u32) -> KernelMetadata {
        KernelMetadata {
            generated_at: Utc::now(),
            engine_version: ENGINE_VERSION,
            optimizer_iterations,
        }
    }
}

/// A generated numerical kernel. Trees and coefficients are parallel
/// arrays — always the same length. Immutable once produced; only the
/// ontogenesis layer rewrites one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kernel {
    pub spec: DomainSpecification,
    pub order: u32,
    pub trees: Vec<RootedTree>,
    pub coefficients: Vec<f64>,
    pub grip: GripMetric,
    pub expansion: BSeriesExpansion,
    pub metadata: KernelMetadata,
}

impl Kernel {
    fn from_expansion(expansion: BSeriesExpansion, metadata: KernelMetadata) -> Kernel {
        Kernel {
            spec: expansion.spec.clone(),
            order: expansion.spec.order,
            trees: expansion.terms.iter().map(|t| t.tree.clone()).collect(),
            coefficients: expansion.coefficients(),
            grip: expansion.grip,
            expansion,
            metadata,
        }
    }

    /// Canonical SHA-256 fingerprint. Timestamps are excluded so the
    /// fingerprint depends only on what the kernel computes.
    pub fn fingerprint(&self) -> String {
        let mut root = Map::new();
        root.insert(
            "engine_version".to_string(),
            Value::Number(ENGINE_VERSION.into()),
        );
        root.insert(
            "domain".to_string(),
            Value::String(self.spec.domain.to_string()),
        );
        root.insert("order".to_string(), Value::Number(self.order.into()));
        root.insert(
            "labels".to_string(),
            Value::Array(
                self.trees
                    .iter()
                    .map(|t| Value::String(t.label.clone()))
                    .collect(),
            ),
        );
        root.insert(
            "coefficients".to_string(),
            Value::Array(
                self.coefficients
                    .iter()
                    .map(|c| Value::String(format!("{:?}", c)))
                    .collect(),
            ),
        );
        let canonical = Value::Object(root).to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Calculus-flavored operators over two kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelOperator {
    Chain,
    Product,
    Quotient,
}

impl FromStr for KernelOperator {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<KernelOperator, EngineError> {
        match s {
            "chain" => Ok(KernelOperator::Chain),
            "product" => Ok(KernelOperator::Product),
            "quotient" => Ok(KernelOperator::Quotient),
            other => Err(EngineError::UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationContext {
    pub spec: DomainSpecification,
    pub goal: OptimizationGoal,
}

/// Generate a kernel: validate, expand, optimize, assemble.
pub fn generate(context: &GenerationContext) -> Result<Kernel, EngineError> {
    context.spec.validate()?;

    let profile = goal_profile(context.goal);
    let mut expansion = generate_expansion(&context.spec, &profile);
    let outcome = optimize_expansion(&expansion, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE);
    expansion.replace_coefficients(&outcome.coefficients);
    expansion.grip = outcome.grip;

    tracing::info!(
        domain = %context.spec.domain,
        order = context.spec.order,
        iterations = outcome.iterations,
        overall = outcome.grip.overall,
        "kernel generated"
    );

    Ok(Kernel::from_expansion(
        expansion,
        KernelMetadata::now(outcome.iterations),
    ))
}

/// Generate from one of the five fixed domain presets.
pub fn generate_preset(domain: DomainType) -> Result<Kernel, EngineError> {
    let preset = DomainPreset::for_domain(domain);
    generate(&GenerationContext {
        spec: preset.spec,
        goal: preset.goal,
    })
}

/// Apply an operator to two kernels.
///
/// Chain and product delegate to label-matched B-series composition.
/// Quotient is NOT a calculus quotient rule: it re-enumerates trees for
/// the larger order and combines coefficients positionally as
/// `(l - r) / (1 + |r|)`, with its own grip rule. The asymmetry is
/// frozen behavior.
pub fn apply_operator(op: KernelOperator, left: &Kernel, right: &Kernel) -> Kernel {
    let expansion = match op {
        KernelOperator::Chain => chain_compose(&left.expansion, &right.expansion),
        KernelOperator::Product => product_compose(&left.expansion, &right.expansion),
        KernelOperator::Quotient => quotient_expansion(left, right),
    };
    Kernel::from_expansion(expansion, KernelMetadata::now(0))
}

/// Name-keyed operator dispatch; unrecognized names are an error.
pub fn apply_operator_named(
    name: &str,
    left: &Kernel,
    right: &Kernel,
) -> Result<Kernel, EngineError> {
    Ok(apply_operator(name.parse()?, left, right))
}

fn quotient_expansion(left: &Kernel, right: &Kernel) -> BSeriesExpansion {
    let max_order = left.order.max(right.order);
    let mut spec = left.spec.clone();
    spec.order = max_order;

    let grip = GripMetric::from_components(
        (left.grip.contact + right.grip.contact) / 2.0,
        left.grip.coverage.min(right.grip.coverage),
        (left.grip.efficiency + right.grip.efficiency) / 2.0,
        left.grip.stability.min(right.grip.stability),
    );

    let mut expansion = generate_expansion(&spec, &grip);
    let combined: Vec<f64> = (0..expansion.terms.len())
        .map(|k| {
            let l = left.coefficients.get(k).copied().unwrap_or(0.0);
            let r = right.coefficients.get(k).copied().unwrap_or(0.0);
            (l - r) / (1.0 + r.abs())
        })
        .collect();
    expansion.replace_coefficients(&combined);
    expansion.grip = grip;
    expansion
}

/// A kernel is valid iff its order conditions hold, its overall grip
/// clears the verification threshold, and its domain declaration is
/// well-formed.
pub fn verify(kernel: &Kernel) -> bool {
    kernel.expansion.verify_order_conditions()
        && kernel.grip.overall >= VERIFICATION_GRIP_THRESHOLD
        && kernel.spec.is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_name() {
        let err = "divergence".parse::<KernelOperator>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownOperator(_)));
    }

    #[test]
    fn test_generate_rejects_bad_spec() {
        let mut context = GenerationContext {
            spec: DomainPreset::for_domain(DomainType::Physics).spec,
            goal: OptimizationGoal::Stability,
        };
        context.spec.tree_type = crate::domain::TreeType::Echo;
        assert!(generate(&context).is_err());
    }

    #[test]
    fn test_parallel_arrays() {
        for domain in DomainType::ALL {
            let kernel = generate_preset(domain).unwrap();
            assert_eq!(kernel.trees.len(), kernel.coefficients.len());
            assert_eq!(kernel.trees.len(), kernel.expansion.terms.len());
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = generate_preset(DomainType::Computing).unwrap();
        let b = generate_preset(DomainType::Computing).unwrap();
        // Timestamps differ; fingerprints must not.
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut altered = a.clone();
        altered.coefficients[0] += 0.5;
        assert_ne!(a.fingerprint(), altered.fingerprint());
    }

    #[test]
    fn test_quotient_is_positional() {
        let left = generate_preset(DomainType::Computing).unwrap();
        let right = generate_preset(DomainType::Physics).unwrap();
        let q = apply_operator(KernelOperator::Quotient, &left, &right);
        assert_eq!(q.order, left.order.max(right.order));
        for (k, c) in q.coefficients.iter().enumerate() {
            let l = left.coefficients.get(k).copied().unwrap_or(0.0);
            let r = right.coefficients.get(k).copied().unwrap_or(0.0);
            assert!(((l - r) / (1.0 + r.abs()) - c).abs() < 1e-12);
        }
    }
}
