/// Genome encoding of a kernel.
///
/// One mutable gene per coefficient, one immutable symmetry gene (named
/// after the domain's symmetry label), one immutable gene per preserved
/// quantity. Ids are v4 UUIDs built from injected RNG bytes, so they
/// stay globally unique AND reproducible under a seeded generator.
/// Lineage lists parent ids only and never shrinks; full ancestry is
/// the session's concern.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bseries_engine::kernel::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneKind {
    Coefficient,
    Symmetry,
    Preservation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    pub kind: GeneKind,
    /// Expression strength in [0, 1].
    pub expression: f64,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelGenome {
    pub id: Uuid,
    /// 0 for seed individuals.
    pub generation: u32,
    /// Parent ids, append-only.
    pub lineage: Vec<Uuid>,
    pub genes: Vec<Gene>,
    pub fitness: f64,
    /// Monotonically non-decreasing; +1 per evolution round.
    pub age: u32,
}

/// Fresh id from the injected random source.
pub fn new_genome_id(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Coefficient expression strength: magnitude clamped to the unit
/// interval.
fn coefficient_expression(c: f64) -> f64 {
    c.abs().min(1.0)
}

impl KernelGenome {
    /// Build a genome for a kernel.
    pub fn from_kernel(
        kernel: &Kernel,
        generation: u32,
        lineage: Vec<Uuid>,
        rng: &mut impl Rng,
    ) -> KernelGenome {
        let mut genes: Vec<Gene> = kernel
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, &c)| Gene {
                name: format!("c{}", i),
                kind: GeneKind::Coefficient,
                expression: coefficient_expression(c),
                mutable: true,
            })
            .collect();

        genes.push(Gene {
            name: kernel.spec.symmetry.clone(),
            kind: GeneKind::Symmetry,
            expression: 0.5,
            mutable: false,
        });

        for quantity in &kernel.spec.preserves {
            genes.push(Gene {
                name: quantity.clone(),
                kind: GeneKind::Preservation,
                expression: 1.0,
                mutable: false,
            });
        }

        KernelGenome {
            id: new_genome_id(rng),
            generation,
            lineage,
            genes,
            fitness: 0.0,
            age: 0,
        }
    }

    /// Expression strength of the symmetry gene; 0.5 if absent.
    pub fn symmetry_expression(&self) -> f64 {
        self.genes
            .iter()
            .find(|g| g.kind == GeneKind::Symmetry)
            .map_or(0.5, |g| g.expression)
    }

    /// Re-derive coefficient gene expressions after the kernel's
    /// coefficients changed underneath.
    pub fn resync_coefficients(&mut self, coefficients: &[f64]) {
        let mut index = 0;
        for gene in self.genes.iter_mut() {
            if gene.kind == GeneKind::Coefficient {
                if let Some(&c) = coefficients.get(index) {
                    gene.expression = coefficient_expression(c);
                }
                index += 1;
            }
        }
    }

    /// Merge two parents' genes: per-gene average of expression
    /// strengths, pairwise by position; unpaired genes carry over from
    /// the longer parent unchanged.
    pub fn merged_with(
        &self,
        other: &KernelGenome,
        generation: u32,
        lineage: Vec<Uuid>,
        rng: &mut impl Rng,
    ) -> KernelGenome {
        let mut genes = Vec::with_capacity(self.genes.len().max(other.genes.len()));
        for i in 0..self.genes.len().max(other.genes.len()) {
            match (self.genes.get(i), other.genes.get(i)) {
                (Some(a), Some(b)) => {
                    let mut gene = a.clone();
                    gene.expression = (a.expression + b.expression) / 2.0;
                    genes.push(gene);
                }
                (Some(a), None) => genes.push(a.clone()),
                (None, Some(b)) => genes.push(b.clone()),
                (None, None) => {}
            }
        }
        KernelGenome {
            id: new_genome_id(rng),
            generation,
            lineage,
            genes,
            fitness: 0.0,
            age: 0,
        }
    }

    /// Structural copy under a fresh identity (cloning reproduction).
    pub fn renewed(
        &self,
        generation: u32,
        lineage: Vec<Uuid>,
        rng: &mut impl Rng,
    ) -> KernelGenome {
        KernelGenome {
            id: new_genome_id(rng),
            generation,
            lineage,
            genes: self.genes.clone(),
            fitness: 0.0,
            age: 0,
        }
    }
}

/// Genetic distance between two coefficient vectors: mean absolute
/// per-index difference. A missing index counts as 0; the divisor is
/// the longer length. Two empty vectors are at distance 0.
pub fn genetic_distance(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().max(b.len());
    if len == 0 {
        return 0.0;
    }
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0.0);
            let y = b.get(i).copied().unwrap_or(0.0);
            (x - y).abs()
        })
        .sum::<f64>()
        / len as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_distance_basics() {
        assert_eq!(genetic_distance(&[], &[]), 0.0);
        assert_eq!(genetic_distance(&[1.0], &[1.0]), 0.0);
        assert!((genetic_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-12);
        // Unequal lengths: missing entries are zero.
        assert!((genetic_distance(&[1.0, 1.0], &[1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ids_replay_under_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(new_genome_id(&mut a), new_genome_id(&mut b));
        let id = new_genome_id(&mut a);
        assert_eq!(id.get_version_num(), 4);
    }
}
