//! A kernel wrapped with its genome and developmental state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use bseries_engine::kernel::Kernel;

use crate::development::OntogeneticState;
use crate::genome::KernelGenome;
use crate::session::{EvolutionSession, OperationKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntogeneticKernel {
    pub kernel: Kernel,
    pub genome: KernelGenome,
    pub state: OntogeneticState,
}

impl OntogeneticKernel {
    /// Wrap a kernel as a seed individual: generation 0, no parents,
    /// embryonic state, empty logs.
    pub fn initialize(
        kernel: Kernel,
        rng: &mut impl Rng,
        session: &mut EvolutionSession,
    ) -> OntogeneticKernel {
        let individual = OntogeneticKernel::descend(kernel, 0, Vec::new(), rng, session);
        session.record(
            OperationKind::Initialize,
            Some(individual.genome.id),
            format!("seed individual for {}", individual.kernel.spec.domain),
        );
        individual
    }

    /// Wrap a kernel at a given point in the family tree. Registers the
    /// new id with the session's lineage map.
    pub fn descend(
        kernel: Kernel,
        generation: u32,
        lineage: Vec<uuid::Uuid>,
        rng: &mut impl Rng,
        session: &mut EvolutionSession,
    ) -> OntogeneticKernel {
        let genome = KernelGenome::from_kernel(&kernel, generation, lineage.clone(), rng);
        session.register_lineage(genome.id, lineage, generation);
        OntogeneticKernel {
            kernel,
            genome,
            state: OntogeneticState::new(),
        }
    }

    /// Keep coefficient gene expressions in step with the kernel after
    /// its coefficients were rewritten.
    pub fn resync_genome(&mut self) {
        let coefficients = self.kernel.coefficients.clone();
        self.genome.resync_coefficients(&coefficients);
    }
}
