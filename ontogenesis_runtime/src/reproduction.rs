//! Reproduction operators: self-composition, self-optimization, and the
//! three sexual/asexual methods.
//!
//! Crossover is a literal single-point splice: every offspring
//! coefficient equals one parent's raw value. Gene expressions (not
//! coefficients) are averaged during the genome merge.

use rand::Rng;
use serde::{Deserialize, Serialize};

use bseries_engine::grip::measure_grip;
use bseries_engine::kernel::{apply_operator, Kernel, KernelOperator};
use bseries_engine::optimizer::{
    optimize_expansion, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};

use crate::development::{DevelopmentEventKind, MutationRecord, OntogeneticState};
use crate::individual::OntogeneticKernel;
use crate::session::{EvolutionSession, OperationKind};

/// Relative size of a mutation perturbation.
const MUTATION_SPAN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReproductionMethod {
    Crossover,
    Mutation,
    Cloning,
}

/// Maturity decides which operator an individual applies to itself.
fn operator_for_maturity(maturity: f64) -> KernelOperator {
    if maturity < 0.5 {
        KernelOperator::Chain
    } else if maturity < 0.8 {
        KernelOperator::Product
    } else {
        KernelOperator::Quotient
    }
}

/// Compose a parent with itself and wrap the result as a fresh
/// offspring one generation down.
pub fn self_generate(
    parent: &OntogeneticKernel,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> OntogeneticKernel {
    let op = operator_for_maturity(parent.state.maturity);
    let kernel = apply_operator(op, &parent.kernel, &parent.kernel);
    let child = OntogeneticKernel::descend(
        kernel,
        parent.genome.generation + 1,
        vec![parent.genome.id],
        rng,
        session,
    );
    session.record(
        OperationKind::SelfGenerate,
        Some(child.genome.id),
        format!("{:?} self-composition", op),
    );
    child
}

/// Run the grip optimizer repeatedly over the individual's expansion.
/// Each iteration bumps maturity by 0.1 (clamped) and logs that call's
/// grip delta — which is not guaranteed positive across a whole run.
pub fn self_optimize(
    individual: &mut OntogeneticKernel,
    iterations: u32,
    session: &mut EvolutionSession,
) {
    for _ in 0..iterations {
        let before = individual.kernel.grip.overall;
        let outcome = optimize_expansion(
            &individual.kernel.expansion,
            DEFAULT_MAX_ITERATIONS,
            DEFAULT_TOLERANCE,
        );
        individual
            .kernel
            .expansion
            .replace_coefficients(&outcome.coefficients);
        individual.kernel.expansion.grip = outcome.grip;
        individual.kernel.coefficients = outcome.coefficients;
        individual.kernel.grip = outcome.grip;
        individual.resync_genome();

        individual.state.maturity = (individual.state.maturity + 0.1).min(1.0);
        individual.state.reproductive_capability = individual.state.maturity;

        let delta = individual.kernel.grip.overall - before;
        individual.state.record_event(
            DevelopmentEventKind::Optimization,
            format!("grip delta {:+.6}", delta),
            Some(delta),
        );
        individual.state.advance_stage(individual.genome.age);
    }
    session.record(
        OperationKind::SelfOptimize,
        Some(individual.genome.id),
        format!("{} optimization passes", iterations),
    );
}

/// Sexual/asexual reproduction. Crossover and mutation yield two
/// offspring; cloning yields one. Never raises, whatever the parents.
pub fn self_reproduce(
    p1: &OntogeneticKernel,
    p2: &OntogeneticKernel,
    method: ReproductionMethod,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> Vec<OntogeneticKernel> {
    match method {
        ReproductionMethod::Crossover => crossover(p1, p2, rng, session),
        ReproductionMethod::Mutation => {
            vec![
                mutated_offspring(p1, rng, session),
                mutated_offspring(p2, rng, session),
            ]
        }
        ReproductionMethod::Cloning => vec![cloned_offspring(p1, rng, session)],
    }
}

/// Single-point crossover: one uniformly random cut index, two
/// complementary splices over each parent's own tree basis.
fn crossover(
    p1: &OntogeneticKernel,
    p2: &OntogeneticKernel,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> Vec<OntogeneticKernel> {
    let cut_limit = p1.kernel.coefficients.len().min(p2.kernel.coefficients.len());
    let cut = rng.gen_range(0..=cut_limit);
    let generation = p1.genome.generation.max(p2.genome.generation) + 1;
    let lineage = vec![p1.genome.id, p2.genome.id];

    let first = spliced_child(p1, p2, cut, generation, lineage.clone(), rng, session);
    let second = spliced_child(p2, p1, cut, generation, lineage, rng, session);
    session.record(
        OperationKind::Crossover,
        Some(first.genome.id),
        format!("cut index {}", cut),
    );
    vec![first, second]
}

fn spliced_child(
    base: &OntogeneticKernel,
    donor: &OntogeneticKernel,
    cut: usize,
    generation: u32,
    lineage: Vec<uuid::Uuid>,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> OntogeneticKernel {
    let mut coefficients = base.kernel.coefficients.clone();
    for k in cut..coefficients.len() {
        if let Some(&d) = donor.kernel.coefficients.get(k) {
            coefficients[k] = d;
        }
    }

    let kernel = rewritten_kernel(&base.kernel, coefficients);
    let mut genome = base
        .genome
        .merged_with(&donor.genome, generation, lineage.clone(), rng);
    genome.resync_coefficients(&kernel.coefficients);
    session.register_lineage(genome.id, lineage, generation);

    let mut child = OntogeneticKernel {
        kernel,
        genome,
        state: OntogeneticState::new(),
    };
    child.state.record_event(
        DevelopmentEventKind::Reproduction,
        format!("crossover splice at {}", cut),
        None,
    );
    child
}

/// One random coefficient perturbed by ±10%, logged in the offspring's
/// mutation history.
pub fn mutated_offspring(
    parent: &OntogeneticKernel,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> OntogeneticKernel {
    let mut kernel = parent.kernel.clone();
    let record = perturb_one(&mut kernel, rng);

    let mut child = OntogeneticKernel::descend(
        kernel,
        parent.genome.generation + 1,
        vec![parent.genome.id],
        rng,
        session,
    );
    if let Some(record) = record {
        child.state.record_mutation(record);
    }
    session.record(
        OperationKind::Mutation,
        Some(child.genome.id),
        "perturbed offspring".to_string(),
    );
    child
}

/// Structural copy of the first parent under a new identity with a
/// reset developmental state.
fn cloned_offspring(
    parent: &OntogeneticKernel,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> OntogeneticKernel {
    let generation = parent.genome.generation + 1;
    let lineage = vec![parent.genome.id];
    let genome = parent.genome.renewed(generation, lineage.clone(), rng);
    session.register_lineage(genome.id, lineage, generation);
    session.record(
        OperationKind::Cloning,
        Some(genome.id),
        "structural copy".to_string(),
    );
    OntogeneticKernel {
        kernel: parent.kernel.clone(),
        genome,
        state: OntogeneticState::new(),
    }
}

/// In-place mutation of an existing offspring (used when an evolution
/// round replaces its newest member with a mutated version).
pub fn mutate_in_place(
    individual: &mut OntogeneticKernel,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) {
    let mut kernel = individual.kernel.clone();
    if let Some(record) = perturb_one(&mut kernel, rng) {
        individual.kernel = kernel;
        individual.resync_genome();
        individual.state.record_mutation(record);
        session.record(
            OperationKind::Mutation,
            Some(individual.genome.id),
            "in-place perturbation".to_string(),
        );
    }
}

/// Perturb one random coefficient by a uniform ±10% factor and re-score
/// the grip. No-op on an empty coefficient vector.
fn perturb_one(kernel: &mut Kernel, rng: &mut impl Rng) -> Option<MutationRecord> {
    if kernel.coefficients.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..kernel.coefficients.len());
    let previous = kernel.coefficients[index];
    let current = previous * (1.0 + rng.gen_range(-MUTATION_SPAN..MUTATION_SPAN));
    kernel.coefficients[index] = current;

    let coefficients = kernel.coefficients.clone();
    kernel.expansion.replace_coefficients(&coefficients);
    kernel.grip = measure_grip(&coefficients, &kernel.spec);
    kernel.expansion.grip = kernel.grip;

    Some(MutationRecord {
        index,
        previous,
        current,
    })
}

fn rewritten_kernel(original: &Kernel, coefficients: Vec<f64>) -> Kernel {
    let mut kernel = original.clone();
    kernel.expansion.replace_coefficients(&coefficients);
    kernel.grip = measure_grip(&coefficients, &kernel.spec);
    kernel.expansion.grip = kernel.grip;
    kernel.coefficients = coefficients;
    kernel
}
