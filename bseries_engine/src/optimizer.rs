/// Engine v1 — Grip Optimizer
///
/// Improves a coefficient vector against its domain's grip expectations
/// by numeric gradient ascent, or by conjugate gradient with a
/// backtracking line search. The objective is the overall grip score;
/// gradients are central differences.

use crate::bseries::BSeriesExpansion;
use crate::domain::DomainSpecification;
use crate::grip::{measure_grip, GripMetric};
use crate::numeric::norm;

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Central-difference step size.
const GRADIENT_EPSILON: f64 = 1e-8;

/// Line-search halving limit.
const LINE_SEARCH_STEPS: u32 = 10;

#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub coefficients: Vec<f64>,
    pub grip: GripMetric,
    pub iterations: u32,
}

fn objective(coefficients: &[f64], spec: &DomainSpecification) -> f64 {
    measure_grip(coefficients, spec).overall
}

fn gradient(coefficients: &[f64], spec: &DomainSpecification) -> Vec<f64> {
    let mut grad = vec![0.0; coefficients.len()];
    let mut probe = coefficients.to_vec();
    for i in 0..coefficients.len() {
        let original = probe[i];
        probe[i] = original + GRADIENT_EPSILON;
        let upper = objective(&probe, spec);
        probe[i] = original - GRADIENT_EPSILON;
        let lower = objective(&probe, spec);
        probe[i] = original;
        grad[i] = (upper - lower) / (2.0 * GRADIENT_EPSILON);
    }
    grad
}

/// Gradient ascent with a decaying learning rate `0.1 · 0.95^(iter/10)`.
/// Stops when the gradient norm drops below tolerance or iterations run
/// out.
pub fn optimize(
    coefficients: &[f64],
    spec: &DomainSpecification,
    max_iterations: u32,
    tolerance: f64,
) -> OptimizationOutcome {
    let mut current = coefficients.to_vec();
    let mut iterations = 0;

    for iter in 0..max_iterations {
        let grad = gradient(&current, spec);
        if norm(&grad) < tolerance {
            break;
        }
        let rate = 0.1 * 0.95_f64.powf(iter as f64 / 10.0);
        for (c, g) in current.iter_mut().zip(grad.iter()) {
            *c += rate * g;
        }
        iterations = iter + 1;
    }

    let grip = measure_grip(&current, spec);
    tracing::debug!(
        domain = %spec.domain,
        iterations,
        overall = grip.overall,
        "gradient ascent finished"
    );
    OptimizationOutcome {
        coefficients: current,
        grip,
        iterations,
    }
}

/// Convenience wrapper over an expansion's coefficient vector.
pub fn optimize_expansion(
    expansion: &BSeriesExpansion,
    max_iterations: u32,
    tolerance: f64,
) -> OptimizationOutcome {
    optimize(
        &expansion.coefficients(),
        &expansion.spec,
        max_iterations,
        tolerance,
    )
}

/// Conjugate gradient ascent with Polak–Ribière direction updates and a
/// backtracking line search (initial step 1.0, halved until the step
/// improves the objective, at most ten halvings). Same stopping rule as
/// plain gradient ascent.
pub fn conjugate_gradient_optimize(
    coefficients: &[f64],
    spec: &DomainSpecification,
    max_iterations: u32,
    tolerance: f64,
) -> OptimizationOutcome {
    let mut current = coefficients.to_vec();
    let mut grad = gradient(&current, spec);
    let mut direction = grad.clone();
    let mut iterations = 0;

    for iter in 0..max_iterations {
        if norm(&grad) < tolerance {
            break;
        }

        if let Some(step) = backtracking_step(&current, &direction, spec) {
            for (c, d) in current.iter_mut().zip(direction.iter()) {
                *c += step * d;
            }
        }

        let next_grad = gradient(&current, spec);
        let denominator: f64 = grad.iter().map(|g| g * g).sum();
        let beta = if denominator <= f64::EPSILON {
            0.0
        } else {
            let numerator: f64 = next_grad
                .iter()
                .zip(grad.iter())
                .map(|(n, g)| n * (n - g))
                .sum();
            (numerator / denominator).max(0.0)
        };

        for (d, n) in direction.iter_mut().zip(next_grad.iter()) {
            *d = n + beta * *d;
        }
        grad = next_grad;
        iterations = iter + 1;
    }

    let grip = measure_grip(&current, spec);
    OptimizationOutcome {
        coefficients: current,
        grip,
        iterations,
    }
}

/// First step in 1.0, 0.5, 0.25, ... that improves the objective.
fn backtracking_step(
    current: &[f64],
    direction: &[f64],
    spec: &DomainSpecification,
) -> Option<f64> {
    let baseline = objective(current, spec);
    let mut step = 1.0;
    for _ in 0..LINE_SEARCH_STEPS {
        let probe: Vec<f64> = current
            .iter()
            .zip(direction.iter())
            .map(|(c, d)| c + step * d)
            .collect();
        if objective(&probe, spec) > baseline {
            return Some(step);
        }
        step /= 2.0;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainPreset, DomainType};

    #[test]
    fn test_optimize_preserves_length_and_bounds() {
        let spec = DomainPreset::for_domain(DomainType::Computing).spec;
        let outcome = optimize(&[0.5, 0.25], &spec, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE);
        assert_eq!(outcome.coefficients.len(), 2);
        assert!(outcome.iterations <= DEFAULT_MAX_ITERATIONS);
        assert!((0.0..=1.0).contains(&outcome.grip.overall));
    }

    #[test]
    fn test_conjugate_gradient_never_worsens() {
        let spec = DomainPreset::for_domain(DomainType::Biology).spec;
        let start = [0.8, -0.3, 0.1];
        let before = measure_grip(&start, &spec).overall;
        let outcome =
            conjugate_gradient_optimize(&start, &spec, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE);
        // The line search only ever accepts improving steps.
        assert!(outcome.grip.overall >= before - 1e-12);
    }

    #[test]
    fn test_empty_vector_is_a_fixed_point() {
        let spec = DomainPreset::for_domain(DomainType::Physics).spec;
        let outcome = optimize(&[], &spec, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE);
        assert!(outcome.coefficients.is_empty());
        assert_eq!(outcome.iterations, 0);
    }
}
