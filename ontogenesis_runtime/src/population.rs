//! Population container, seeding, and the multi-generation driver.

use rand::Rng;
use serde::{Deserialize, Serialize};

use bseries_engine::domain::DomainType;
use bseries_engine::kernel::{generate_preset, Kernel};

use crate::error::OntogenesisError;
use crate::evolution::{assign_fitness, diversity, evolve, EvolutionParams};
use crate::individual::OntogeneticKernel;
use crate::reproduction::mutated_offspring;
use crate::session::{EvolutionSession, OperationKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelPopulation {
    pub generation: u32,
    pub individuals: Vec<OntogeneticKernel>,
    pub population_size: usize,
    pub average_fitness: f64,
    pub best_fitness: f64,
    /// Mean pairwise genetic distance.
    pub diversity: f64,
}

impl KernelPopulation {
    /// Assemble a population, scoring members and statistics.
    pub fn from_members(
        generation: u32,
        mut individuals: Vec<OntogeneticKernel>,
        population_size: usize,
    ) -> KernelPopulation {
        assign_fitness(&mut individuals);
        let best_fitness = individuals
            .iter()
            .map(|i| i.genome.fitness)
            .fold(0.0_f64, f64::max);
        let average_fitness = if individuals.is_empty() {
            0.0
        } else {
            individuals.iter().map(|i| i.genome.fitness).sum::<f64>()
                / individuals.len() as f64
        };
        let diversity = diversity(&individuals);
        KernelPopulation {
            generation,
            individuals,
            population_size,
            average_fitness,
            best_fitness,
            diversity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OntogenesisConfig {
    pub seed_kernels: Vec<Kernel>,
    pub params: EvolutionParams,
    pub max_generations: u32,
    pub fitness_threshold: f64,
}

impl Default for OntogenesisConfig {
    fn default() -> OntogenesisConfig {
        OntogenesisConfig {
            seed_kernels: Vec::new(),
            params: EvolutionParams::default(),
            max_generations: 10,
            fitness_threshold: 0.9,
        }
    }
}

/// Generation 0: one individual per seed kernel, remaining slots filled
/// by mutating a randomly chosen existing member — or, with no seeds at
/// all, by generating the default consciousness kernel first.
pub fn seed_population(
    config: &OntogenesisConfig,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> Result<KernelPopulation, OntogenesisError> {
    let size = config.params.population_size;
    let mut individuals: Vec<OntogeneticKernel> = Vec::with_capacity(size);

    for kernel in config.seed_kernels.iter().take(size) {
        individuals.push(OntogeneticKernel::initialize(kernel.clone(), rng, session));
    }

    while individuals.len() < size {
        if individuals.is_empty() {
            let kernel = generate_preset(DomainType::Consciousness)?;
            individuals.push(OntogeneticKernel::initialize(kernel, rng, session));
        } else {
            let pick = rng.gen_range(0..individuals.len());
            let parent = individuals[pick].clone();
            individuals.push(mutated_offspring(&parent, rng, session));
        }
    }

    session.record(
        OperationKind::Seed,
        None,
        format!(
            "{} seeds, {} filled",
            config.seed_kernels.len().min(size),
            size.saturating_sub(config.seed_kernels.len())
        ),
    );

    Ok(KernelPopulation::from_members(0, individuals, size))
}

/// Drive evolution for up to `max_generations`, stopping early the
/// first generation whose best fitness clears the threshold. Returns
/// every generation in order, generation 0 included.
pub fn run_ontogenesis(
    config: &OntogenesisConfig,
    rng: &mut impl Rng,
    session: &mut EvolutionSession,
) -> Result<Vec<KernelPopulation>, OntogenesisError> {
    let mut generations = vec![seed_population(config, rng, session)?];

    for _ in 0..config.max_generations {
        let next = {
            let Some(current) = generations.last() else { break };
            if current.best_fitness >= config.fitness_threshold {
                break;
            }
            evolve(current, &config.params, rng, session)
        };
        tracing::info!(
            generation = next.generation,
            best = next.best_fitness,
            "ontogenesis advanced"
        );
        generations.push(next);
    }

    Ok(generations)
}
