//! Caller-owned session state — operation history plus the lineage DAG.
//!
//! Passed `&mut` through every runtime call; resetting it is explicit.
//! The lineage map is keyed by genome id and append-only, so ancestry
//! survives population turnover even after an individual is evicted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Initialize,
    Seed,
    SelfGenerate,
    SelfOptimize,
    Crossover,
    Mutation,
    Cloning,
    Evolve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub subject: Option<Uuid>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageEntry {
    pub parents: Vec<Uuid>,
    pub generation: u32,
}

#[derive(Debug, Default)]
pub struct EvolutionSession {
    history: Vec<OperationRecord>,
    lineage: BTreeMap<Uuid, LineageEntry>,
}

impl EvolutionSession {
    pub fn new() -> EvolutionSession {
        EvolutionSession::default()
    }

    pub fn record(&mut self, kind: OperationKind, subject: Option<Uuid>, detail: String) {
        self.history.push(OperationRecord {
            kind,
            subject,
            detail,
        });
    }

    pub fn register_lineage(&mut self, id: Uuid, parents: Vec<Uuid>, generation: u32) {
        self.lineage.insert(id, LineageEntry {
            parents,
            generation,
        });
    }

    pub fn history(&self) -> &[OperationRecord] {
        &self.history
    }

    pub fn lineage_entry(&self, id: &Uuid) -> Option<&LineageEntry> {
        self.lineage.get(id)
    }

    pub fn lineage_size(&self) -> usize {
        self.lineage.len()
    }

    /// Every ancestor id reachable from the given individual,
    /// oldest-first discovery order, each listed once.
    pub fn ancestors(&self, id: &Uuid) -> Vec<Uuid> {
        let mut seen: Vec<Uuid> = Vec::new();
        let mut frontier: Vec<Uuid> = vec![*id];
        while let Some(current) = frontier.pop() {
            if let Some(entry) = self.lineage.get(&current) {
                for parent in &entry.parents {
                    if !seen.contains(parent) {
                        seen.push(*parent);
                        frontier.push(*parent);
                    }
                }
            }
        }
        seen
    }

    /// Pretty-printed JSON dump of the operation history.
    pub fn history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.history)
    }

    /// Drop all recorded history and ancestry.
    pub fn reset(&mut self) {
        self.history.clear();
        self.lineage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_ancestry_walk() {
        let mut session = EvolutionSession::new();
        session.register_lineage(uid(1), vec![], 0);
        session.register_lineage(uid(2), vec![uid(1)], 1);
        session.register_lineage(uid(3), vec![uid(2)], 2);

        let ancestors = session.ancestors(&uid(3));
        assert!(ancestors.contains(&uid(1)));
        assert!(ancestors.contains(&uid(2)));
        assert_eq!(ancestors.len(), 2);
    }

    #[test]
    fn test_history_json_dump() {
        let mut session = EvolutionSession::new();
        session.record(OperationKind::Evolve, None, "round".to_string());
        let dump = session.history_json().unwrap();
        assert!(dump.contains("\"evolve\""));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = EvolutionSession::new();
        session.record(OperationKind::Seed, None, "seed".to_string());
        session.register_lineage(uid(9), vec![], 0);
        session.reset();
        assert!(session.history().is_empty());
        assert_eq!(session.lineage_size(), 0);
    }
}
