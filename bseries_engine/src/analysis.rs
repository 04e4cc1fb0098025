/// Engine v1 — Domain Analyzer
///
/// Descriptive topology/symmetry/flow metadata derived from a domain
/// declaration. Feature extraction and validation only — nothing here
/// feeds the numerics.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainSpecification, DomainType};
use crate::error::EngineError;
use crate::tree;

/// Cognitive-region cell counts carried by the consciousness analysis.
/// The five regions total 776 = 2^3 * 97.
pub const COGNITIVE_REGION_CELLS: [usize; 5] = [343, 110, 117, 125, 81];

/// Total cognitive cells across all regions.
pub fn cognitive_cell_total() -> usize {
    COGNITIVE_REGION_CELLS.iter().sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAnalysis {
    pub domain: DomainType,
    pub topology: String,
    pub symmetry_class: String,
    pub flow_character: String,
    pub conserved_quantities: Vec<String>,
    /// Exact tree count for the declared order (A000081 lookup).
    pub expected_tree_count: u64,
    /// Present for the consciousness domain only.
    pub cognitive_cells: Option<Vec<usize>>,
}

impl DomainAnalysis {
    /// Lookup-style attribute access; unrecognized keys are an error.
    pub fn attribute(&self, name: &str) -> Result<&str, EngineError> {
        match name {
            "topology" => Ok(&self.topology),
            "symmetry" => Ok(&self.symmetry_class),
            "flow" => Ok(&self.flow_character),
            other => Err(EngineError::UnknownComponent(other.to_string())),
        }
    }
}

/// Derive descriptive metadata from a domain declaration.
pub fn analyze(spec: &DomainSpecification) -> DomainAnalysis {
    let (topology, flow_character) = match spec.domain {
        DomainType::Physics => ("phase-space manifold", "conservative flow"),
        DomainType::Chemistry => ("reaction network", "dissipative kinetics"),
        DomainType::Biology => ("metabolic web", "regulatory flux"),
        DomainType::Computing => ("call graph", "recursive descent"),
        DomainType::Consciousness => ("echo lattice", "reentrant feedback"),
    };

    let cognitive_cells = match spec.domain {
        DomainType::Consciousness => Some(COGNITIVE_REGION_CELLS.to_vec()),
        _ => None,
    };

    DomainAnalysis {
        domain: spec.domain,
        topology: topology.to_string(),
        symmetry_class: spec.symmetry.clone(),
        flow_character: flow_character.to_string(),
        conserved_quantities: spec.preserves.clone(),
        expected_tree_count: tree::count(spec.order),
        cognitive_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainPreset;

    #[test]
    fn test_cognitive_cell_total() {
        assert_eq!(cognitive_cell_total(), 776);
        assert_eq!(776, 2_usize.pow(3) * 97);
    }

    #[test]
    fn test_cells_only_for_consciousness() {
        for domain in DomainType::ALL {
            let analysis = analyze(&DomainPreset::for_domain(domain).spec);
            assert_eq!(
                analysis.cognitive_cells.is_some(),
                domain == DomainType::Consciousness
            );
        }
    }

    #[test]
    fn test_attribute_dispatch() {
        let analysis = analyze(&DomainPreset::for_domain(DomainType::Physics).spec);
        assert_eq!(analysis.attribute("topology").unwrap(), "phase-space manifold");
        assert!(matches!(
            analysis.attribute("viscosity"),
            Err(EngineError::UnknownComponent(_))
        ));
    }
}
