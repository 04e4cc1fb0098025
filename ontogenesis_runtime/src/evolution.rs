//! Generational evolution: fitness, tournament selection, elitism.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::genome::genetic_distance;
use crate::individual::OntogeneticKernel;
use crate::population::KernelPopulation;
use crate::reproduction::{
    mutate_in_place, self_reproduce, ReproductionMethod,
};
use crate::session::{EvolutionSession, OperationKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
}

impl Default for EvolutionParams {
    fn default() -> EvolutionParams {
        EvolutionParams {
            population_size: 20,
            elitism_rate: 0.1,
            crossover_rate: 0.7,
            mutation_rate: 0.1,
            tournament_size: 3,
        }
    }
}

/// Fitness of one individual against a comparison set.
///
/// Novelty is the mean genetic distance to the rest — 1.0 for a lone
/// individual. The symmetry term reads the symmetry gene's expression.
pub fn evaluate_fitness(
    individual: &OntogeneticKernel,
    rest: &[&OntogeneticKernel],
) -> f64 {
    let novelty = if rest.is_empty() {
        1.0
    } else {
        rest.iter()
            .map(|other| {
                genetic_distance(
                    &individual.kernel.coefficients,
                    &other.kernel.coefficients,
                )
            })
            .sum::<f64>()
            / rest.len() as f64
    };

    let grip = &individual.kernel.grip;
    0.4 * grip.overall
        + 0.2 * grip.stability
        + 0.2 * grip.efficiency
        + 0.1 * novelty
        + 0.1 * individual.genome.symmetry_expression()
}

/// Score every member against the rest of its population.
pub fn assign_fitness(members: &mut [OntogeneticKernel]) {
    let scores: Vec<f64> = (0..members.len())
        .map(|i| {
            let rest: Vec<&OntogeneticKernel> = members
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, m)| m)
                .collect();
            evaluate_fitness(&members[i], &rest)
        })
        .collect();
    for (member, score) in members.iter_mut().zip(scores) {
        member.genome.fitness = score;
    }
}

/// Mean pairwise genetic distance; 0 below two members.
pub fn diversity(members: &[OntogeneticKernel]) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0u32;
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            total += genetic_distance(
                &members[i].kernel.coefficients,
                &members[j].kernel.coefficients,
            );
            pairs += 1;
        }
    }
    total / pairs as f64
}

/// Best of `size` draws with replacement. Works with a single
/// candidate. Callers guarantee a non-empty slice.
pub fn tournament_select<'a>(
    members: &'a [OntogeneticKernel],
    size: usize,
    rng: &mut impl Rng,
) -> &'a OntogeneticKernel {
    let mut best = &members[rng.gen_range(0..members.len())];
    for _ in 1..size.max(1) {
        let candidate = &members[rng.gen_range(0..members.len())];
        if candidate.genome.fitness > best.genome.fitness {
            best = candidate;
        }
    }
    best
}

/// One generation step.
///
/// Rank, carry elites unchanged, fill by tournament-selected crossover
/// or cloning, maybe mutate the newest offspring, truncate to the fixed
/// size, age everyone (elites included), re-stage, re-score.
pub fn evolve(
    population: &KernelPopulation,
    params: &EvolutionParams,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> KernelPopulation {
    let next_generation = population.generation + 1;

    let mut members = population.individuals.clone();
    if members.is_empty() {
        // Nothing to select from; the empty population just ages.
        return KernelPopulation::from_members(next_generation, members, params.population_size);
    }

    assign_fitness(&mut members);
    members.sort_by(|a, b| b.genome.fitness.total_cmp(&a.genome.fitness));

    let elite_count = ((params.population_size as f64) * params.elitism_rate).floor() as usize;
    let mut next: Vec<OntogeneticKernel> =
        members[..elite_count.min(members.len())].to_vec();

    while next.len() < params.population_size {
        let p1 = tournament_select(&members, params.tournament_size, rng);
        let p2 = tournament_select(&members, params.tournament_size, rng);

        let offspring = if rng.gen::<f64>() < params.crossover_rate {
            self_reproduce(p1, p2, ReproductionMethod::Crossover, rng, session)
        } else {
            self_reproduce(p1, p2, ReproductionMethod::Cloning, rng, session)
        };
        next.extend(offspring);

        if rng.gen::<f64>() < params.mutation_rate {
            if let Some(latest) = next.last_mut() {
                mutate_in_place(latest, rng, session);
            }
        }
    }
    next.truncate(params.population_size);

    for individual in next.iter_mut() {
        individual.genome.age += 1;
        let age = individual.genome.age;
        individual.state.advance_stage(age);
    }

    let population = KernelPopulation::from_members(next_generation, next, params.population_size);
    session.record(
        OperationKind::Evolve,
        None,
        format!(
            "generation {} best {:.6} avg {:.6}",
            population.generation, population.best_fitness, population.average_fitness
        ),
    );
    tracing::debug!(
        generation = population.generation,
        best = population.best_fitness,
        average = population.average_fitness,
        diversity = population.diversity,
        "evolution round complete"
    );
    population
}
