/// Engine v1 — Rooted Tree Enumerator
///
/// Trees live in an arena of nodes addressed by index; each node stores
/// its order, label, and child indices. Structural hashes (SHA-256 over
/// order + ordered child hashes, labels excluded) are memoized at
/// insertion, so deep-equality checks cost a byte compare instead of a
/// recursive walk. Relabeling a tree for a domain never changes its
/// structural hash.
///
/// The canonical catalogs for orders 1–4 are hardcoded, not computed.
/// The order-4 catalog deliberately lists five trees although the exact
/// enumeration count for order 4 is four — the mirrored-children pair
/// is a frozen erratum, and `count` is NOT reconciled with it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::DomainType;

pub type NodeId = usize;

/// Exact rooted-tree counts for n = 0..=14.
const EXACT_COUNTS: [u64; 15] = [
    1, 1, 1, 2, 4, 9, 20, 48, 115, 286, 719, 1842, 4766, 12486, 32973,
];

/// Growth constant of the asymptotic count approximation.
const OTTER_GROWTH: f64 = 2.9557652856;

/// A standalone tree snapshot — the serializable public form.
/// Immutable once built; the root-only tree of order 1 has no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootedTree {
    pub order: u32,
    pub label: String,
    pub children: Vec<RootedTree>,
}

struct TreeNode {
    order: u32,
    label: String,
    children: Vec<NodeId>,
}

/// Arena holding every enumerated tree, with memoized structural hashes
/// and one canonical forest per generated order.
pub struct TreeArena {
    nodes: Vec<TreeNode>,
    hashes: Vec<[u8; 32]>,
    forests: BTreeMap<u32, Vec<NodeId>>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            hashes: Vec::new(),
            forests: BTreeMap::new(),
        }
    }

    /// Insert a node built from already-interned children.
    fn intern(&mut self, children: Vec<NodeId>) -> NodeId {
        let order: u32 = 1 + children.iter().map(|&c| self.nodes[c].order).sum::<u32>();
        let label = if children.is_empty() {
            "f".to_string()
        } else {
            let inner: Vec<&str> = children
                .iter()
                .map(|&c| self.nodes[c].label.as_str())
                .collect();
            format!("f[{}]", inner.join(","))
        };

        let mut hasher = Sha256::new();
        hasher.update(order.to_be_bytes());
        for &c in &children {
            hasher.update(self.hashes[c]);
        }
        let hash: [u8; 32] = hasher.finalize().into();

        self.nodes.push(TreeNode {
            order,
            label,
            children,
        });
        self.hashes.push(hash);
        self.nodes.len() - 1
    }

    pub fn order(&self, id: NodeId) -> u32 {
        self.nodes[id].order
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id].label
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Memoized structural hash — equal bytes iff equal structure.
    pub fn structural_hash(&self, id: NodeId) -> &[u8; 32] {
        &self.hashes[id]
    }

    /// Canonical forest for one order.
    ///
    /// Orders 1–4 return the hardcoded catalog (1, 1, 2, 5 trees).
    /// Orders above 4 build one tree per integer partition of order-1,
    /// partitions in non-increasing order, taking the structurally-first
    /// tree of each part's forest as the child.
    pub fn generate(&mut self, order: u32) -> Vec<NodeId> {
        for o in 1..=order {
            self.ensure_forest(o);
        }
        self.forests.get(&order).cloned().unwrap_or_default()
    }

    fn ensure_forest(&mut self, order: u32) {
        if self.forests.contains_key(&order) {
            return;
        }
        let roots = match order {
            0 => Vec::new(),
            1 => vec![self.intern(vec![])],
            2 => {
                let leaf = self.forests[&1][0];
                vec![self.intern(vec![leaf])]
            }
            3 => {
                let leaf = self.forests[&1][0];
                let stick = self.forests[&2][0];
                vec![
                    self.intern(vec![leaf, leaf]),
                    self.intern(vec![stick]),
                ]
            }
            4 => {
                // Frozen catalog. Five entries: the second and third are
                // mirrored-children forms of the same multiset, kept as
                // distinct ordered trees. `count(4)` reports 4.
                let leaf = self.forests[&1][0];
                let stick = self.forests[&2][0];
                let bushy = self.forests[&3][0];
                let tall = self.forests[&3][1];
                vec![
                    self.intern(vec![leaf, leaf, leaf]),
                    self.intern(vec![leaf, stick]),
                    self.intern(vec![stick, leaf]),
                    self.intern(vec![bushy]),
                    self.intern(vec![tall]),
                ]
            }
            _ => {
                let mut roots = Vec::new();
                for partition in partitions(order - 1) {
                    let children: Vec<NodeId> = partition
                        .iter()
                        .map(|&part| self.forests[&part][0])
                        .collect();
                    roots.push(self.intern(children));
                }
                roots
            }
        };
        self.forests.insert(order, roots);
    }

    /// Tree depth: a leaf has depth 1.
    pub fn depth(&self, id: NodeId) -> u32 {
        1 + self.nodes[id]
            .children
            .iter()
            .map(|&c| self.depth(c))
            .max()
            .unwrap_or(0)
    }

    /// Symmetry factor: group immediate children by structural hash,
    /// multiply the factorial of each group's multiplicity and every
    /// child's own factor. Leaves have factor 1.
    pub fn symmetry_factor(&self, id: NodeId) -> u64 {
        let children = &self.nodes[id].children;
        if children.is_empty() {
            return 1;
        }
        let mut groups: BTreeMap<[u8; 32], u64> = BTreeMap::new();
        for &c in children {
            *groups.entry(self.hashes[c]).or_insert(0) += 1;
        }
        let mut factor: u64 = 1;
        for multiplicity in groups.values() {
            factor *= (1..=*multiplicity).product::<u64>();
        }
        for &c in children {
            factor *= self.symmetry_factor(c);
        }
        factor
    }

    /// Snapshot a node as a standalone tree with the generic `f` symbol.
    pub fn extract(&self, id: NodeId) -> RootedTree {
        self.extract_with_symbol(id, "f")
    }

    /// Snapshot a node with the function symbol replaced by a domain
    /// glyph throughout the tree and every subtree label.
    pub fn extract_with_symbol(&self, id: NodeId, symbol: &str) -> RootedTree {
        let node = &self.nodes[id];
        let children: Vec<RootedTree> = node
            .children
            .iter()
            .map(|&c| self.extract_with_symbol(c, symbol))
            .collect();
        let label = if children.is_empty() {
            symbol.to_string()
        } else {
            let inner: Vec<&str> = children.iter().map(|c| c.label.as_str()).collect();
            format!("{}[{}]", symbol, inner.join(","))
        };
        RootedTree {
            order: node.order,
            label,
            children,
        }
    }
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate the canonical forest for an order with the domain's glyph
/// substituted for the generic function symbol throughout every tree
/// and subtree label.
pub fn generate_domain_specific(domain: DomainType, order: u32) -> Vec<RootedTree> {
    let mut arena = TreeArena::new();
    let glyph = domain.glyph();
    arena
        .generate(order)
        .into_iter()
        .map(|id| arena.extract_with_symbol(id, glyph))
        .collect()
}

/// Rooted-tree count.
///
/// Exact table lookup for n <= 14; for larger n an asymptotic
/// approximation `floor(g^n / sqrt(n))`, which is NOT exact. Note the
/// deliberate disagreement with the hardcoded order-4 catalog.
pub fn count(n: u32) -> u64 {
    if (n as usize) < EXACT_COUNTS.len() {
        return EXACT_COUNTS[n as usize];
    }
    (OTTER_GROWTH.powi(n as i32) / (n as f64).sqrt()).floor() as u64
}

/// Integer partitions of n in non-increasing part order, enumerated
/// largest-first. partitions(4) = [4], [3,1], [2,2], [2,1,1], [1,1,1,1].
pub fn partitions(n: u32) -> Vec<Vec<u32>> {
    fn descend(n: u32, max: u32, prefix: &mut Vec<u32>, out: &mut Vec<Vec<u32>>) {
        if n == 0 {
            out.push(prefix.clone());
            return;
        }
        let mut part = max.min(n);
        while part >= 1 {
            prefix.push(part);
            descend(n - part, part, prefix, out);
            prefix.pop();
            if part == 1 {
                break;
            }
            part -= 1;
        }
    }
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    descend(n, n, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        let mut arena = TreeArena::new();
        assert_eq!(arena.generate(1).len(), 1);
        assert_eq!(arena.generate(2).len(), 1);
        assert_eq!(arena.generate(3).len(), 2);
        assert_eq!(arena.generate(4).len(), 5);
    }

    #[test]
    fn test_order_four_catalog_disagrees_with_count() {
        let mut arena = TreeArena::new();
        assert_eq!(arena.generate(4).len(), 5);
        assert_eq!(count(4), 4);
    }

    #[test]
    fn test_count_table() {
        assert_eq!(count(0), 1);
        assert_eq!(count(1), 1);
        assert_eq!(count(2), 1);
        assert_eq!(count(3), 2);
        assert_eq!(count(5), 9);
        assert_eq!(count(14), 32973);
    }

    #[test]
    fn test_count_approximation_grows() {
        assert!(count(15) > count(14));
        assert!(count(16) > count(15));
    }

    #[test]
    fn test_partition_forest_sizes() {
        let mut arena = TreeArena::new();
        // One tree per partition of 4.
        assert_eq!(arena.generate(5).len(), 5);
        for id in arena.generate(5) {
            assert_eq!(arena.order(id), 5);
        }
    }

    #[test]
    fn test_labels() {
        let mut arena = TreeArena::new();
        let roots = arena.generate(3);
        assert_eq!(arena.label(roots[0]), "f[f,f]");
        assert_eq!(arena.label(roots[1]), "f[f[f]]");
    }

    #[test]
    fn test_symmetry_factors() {
        let mut arena = TreeArena::new();
        let order3 = arena.generate(3);
        assert_eq!(arena.symmetry_factor(order3[0]), 2); // f[f,f]
        assert_eq!(arena.symmetry_factor(order3[1]), 1); // f[f[f]]
        let order4 = arena.generate(4);
        assert_eq!(arena.symmetry_factor(order4[0]), 6); // f[f,f,f]
        assert_eq!(arena.symmetry_factor(order4[1]), 1); // f[f,f[f]]
    }

    #[test]
    fn test_structural_hash_ignores_labels() {
        let mut arena = TreeArena::new();
        let roots = arena.generate(3);
        let relabeled = arena.extract_with_symbol(roots[0], "H");
        assert_eq!(relabeled.label, "H[H,H]");
        // Same structure, same hash, regardless of relabeling.
        let other = arena.generate(3);
        assert_eq!(
            arena.structural_hash(roots[0]),
            arena.structural_hash(other[0])
        );
        assert_ne!(
            arena.structural_hash(roots[0]),
            arena.structural_hash(roots[1])
        );
    }

    #[test]
    fn test_domain_specific_relabeling() {
        let trees = generate_domain_specific(DomainType::Consciousness, 3);
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].label, "Ψ[Ψ,Ψ]");
        assert_eq!(trees[1].label, "Ψ[Ψ[Ψ]]");
        assert_eq!(trees[1].children[0].label, "Ψ[Ψ]");
    }

    #[test]
    fn test_depth() {
        let mut arena = TreeArena::new();
        let roots = arena.generate(3);
        assert_eq!(arena.depth(roots[0]), 2); // f[f,f]
        assert_eq!(arena.depth(roots[1]), 3); // f[f[f]]
    }
}
