/// Engine v1 — Domain Model
///
/// Pure data. Each application domain accepts exactly one tree type and
/// carries one relabeling glyph. Presets fix the defaults a caller gets
/// when it names a domain without a full specification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Orders outside this range are rejected before any work happens.
pub const MIN_ORDER: u32 = 1;
pub const MAX_ORDER: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    Physics,
    Chemistry,
    Biology,
    Computing,
    Consciousness,
}

impl DomainType {
    pub const ALL: [DomainType; 5] = [
        DomainType::Physics,
        DomainType::Chemistry,
        DomainType::Biology,
        DomainType::Computing,
        DomainType::Consciousness,
    ];

    /// The function symbol substituted into tree labels for this domain.
    pub fn glyph(self) -> &'static str {
        match self {
            DomainType::Physics => "H",
            DomainType::Chemistry => "R",
            DomainType::Biology => "M",
            DomainType::Computing => "λ",
            DomainType::Consciousness => "Ψ",
        }
    }

    /// The single tree type this domain accepts.
    pub fn tree_type(self) -> TreeType {
        match self {
            DomainType::Physics => TreeType::Hamiltonian,
            DomainType::Chemistry => TreeType::Reaction,
            DomainType::Biology => TreeType::Metabolic,
            DomainType::Computing => TreeType::Recursion,
            DomainType::Consciousness => TreeType::Echo,
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainType::Physics => "physics",
            DomainType::Chemistry => "chemistry",
            DomainType::Biology => "biology",
            DomainType::Computing => "computing",
            DomainType::Consciousness => "consciousness",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeType {
    Hamiltonian,
    Reaction,
    Metabolic,
    Recursion,
    Echo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    Speed,
    Accuracy,
    Stability,
    Balanced,
}

/// Full domain declaration — input to expansion and kernel generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainSpecification {
    pub domain: DomainType,
    pub order: u32,
    pub tree_type: TreeType,
    /// Free-text symmetry label, descriptive only.
    pub symmetry: String,
    /// Conserved-quantity names, descriptive only.
    pub preserves: Vec<String>,
}

impl DomainSpecification {
    /// Check order range and domain/tree-type agreement.
    /// A failed validation aborts generation before any kernel exists.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.order < MIN_ORDER || self.order > MAX_ORDER {
            return Err(EngineError::InvalidDomainSpecification {
                reason: format!(
                    "order {} outside [{}, {}]",
                    self.order, MIN_ORDER, MAX_ORDER
                ),
            });
        }
        if self.tree_type != self.domain.tree_type() {
            return Err(EngineError::InvalidDomainSpecification {
                reason: format!(
                    "domain {} requires tree type {:?}, got {:?}",
                    self.domain,
                    self.domain.tree_type(),
                    self.tree_type
                ),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// A fixed per-domain default: specification plus optimization goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainPreset {
    pub spec: DomainSpecification,
    pub goal: OptimizationGoal,
}

impl DomainPreset {
    /// The five canonical presets.
    pub fn for_domain(domain: DomainType) -> DomainPreset {
        let (order, symmetry, preserves, goal) = match domain {
            DomainType::Physics => (
                4,
                "symplectic",
                vec!["energy", "momentum"],
                OptimizationGoal::Stability,
            ),
            DomainType::Chemistry => (
                3,
                "mass-action",
                vec!["mass", "charge"],
                OptimizationGoal::Accuracy,
            ),
            DomainType::Biology => (
                3,
                "homeostatic",
                vec!["population"],
                OptimizationGoal::Balanced,
            ),
            DomainType::Computing => (
                2,
                "time-reversible",
                vec!["complexity"],
                OptimizationGoal::Speed,
            ),
            DomainType::Consciousness => (
                4,
                "self-referential",
                vec!["coherence"],
                OptimizationGoal::Balanced,
            ),
        };
        DomainPreset {
            spec: DomainSpecification {
                domain,
                order,
                tree_type: domain.tree_type(),
                symmetry: symmetry.to_string(),
                preserves: preserves.into_iter().map(String::from).collect(),
            },
            goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for domain in DomainType::ALL {
            let preset = DomainPreset::for_domain(domain);
            preset.spec.validate().unwrap();
        }
    }

    #[test]
    fn test_tree_type_mismatch_rejected() {
        let spec = DomainSpecification {
            domain: DomainType::Physics,
            order: 3,
            tree_type: TreeType::Reaction,
            symmetry: "symplectic".to_string(),
            preserves: vec![],
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_order_range_rejected() {
        let mut spec = DomainPreset::for_domain(DomainType::Biology).spec;
        spec.order = 11;
        assert!(spec.validate().is_err());
        spec.order = 0;
        assert!(spec.validate().is_err());
    }
}
