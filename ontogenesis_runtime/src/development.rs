/// Developmental state of an individual.
///
/// Stages only move forward: embryonic → juvenile → mature → senescent.
/// Senescence depends on age alone; the two earlier gates need both
/// maturity and age. An individual that never matures never ages past
/// its current stage, however old it gets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopmentStage {
    Embryonic,
    Juvenile,
    Mature,
    Senescent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub index: usize,
    pub previous: f64,
    pub current: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentEventKind {
    StageTransition,
    Optimization,
    Reproduction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentEvent {
    pub kind: DevelopmentEventKind,
    pub detail: String,
    /// Grip change for optimization events; not guaranteed positive.
    pub grip_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntogeneticState {
    pub stage: DevelopmentStage,
    /// Rises only through self-optimization, +0.1 per iteration.
    pub maturity: f64,
    pub reproductive_capability: f64,
    /// Append-only.
    pub mutations: Vec<MutationRecord>,
    /// Append-only.
    pub development_history: Vec<DevelopmentEvent>,
}

impl OntogeneticState {
    pub fn new() -> OntogeneticState {
        OntogeneticState {
            stage: DevelopmentStage::Embryonic,
            maturity: 0.0,
            reproductive_capability: 0.0,
            mutations: Vec::new(),
            development_history: Vec::new(),
        }
    }

    pub fn record_event(
        &mut self,
        kind: DevelopmentEventKind,
        detail: String,
        grip_delta: Option<f64>,
    ) {
        self.development_history.push(DevelopmentEvent {
            kind,
            detail,
            grip_delta,
        });
    }

    pub fn record_mutation(&mut self, record: MutationRecord) {
        self.mutations.push(record);
    }

    /// Walk the stage machine forward as far as the gates allow,
    /// appending one history event per transition.
    pub fn advance_stage(&mut self, age: u32) {
        loop {
            let next = match self.stage {
                DevelopmentStage::Embryonic if self.maturity >= 0.5 && age >= 3 => {
                    DevelopmentStage::Juvenile
                }
                DevelopmentStage::Juvenile if self.maturity >= 0.8 && age >= 5 => {
                    DevelopmentStage::Mature
                }
                DevelopmentStage::Mature if age >= 20 => DevelopmentStage::Senescent,
                _ => return,
            };
            self.stage = next;
            self.record_event(
                DevelopmentEventKind::StageTransition,
                format!("reached {:?} at age {}", next, age),
                None,
            );
        }
    }
}

impl Default for OntogeneticState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_gates_required() {
        let mut state = OntogeneticState::new();
        state.maturity = 0.9;
        state.advance_stage(2); // old enough? no — age gate fails
        assert_eq!(state.stage, DevelopmentStage::Embryonic);
        state.advance_stage(3);
        assert_eq!(state.stage, DevelopmentStage::Juvenile);
    }

    #[test]
    fn test_chained_transitions() {
        let mut state = OntogeneticState::new();
        state.maturity = 1.0;
        state.advance_stage(10);
        assert_eq!(state.stage, DevelopmentStage::Mature);
        assert_eq!(state.development_history.len(), 2);
    }

    #[test]
    fn test_senescence_ignores_maturity_but_needs_the_path() {
        // Maturity never rose: stuck embryonic at any age.
        let mut stuck = OntogeneticState::new();
        stuck.advance_stage(25);
        assert_eq!(stuck.stage, DevelopmentStage::Embryonic);

        let mut mature = OntogeneticState::new();
        mature.maturity = 0.8;
        mature.advance_stage(20);
        assert_eq!(mature.stage, DevelopmentStage::Senescent);
    }
}
