/// Engine v1 — B-Series Expansion
///
/// A weighted sum over rooted trees, repurposed as the kernel
/// representation per application domain. Per-tree coefficients come
/// from a single tableau formula, NOT the exact per-node elementary
/// weight product of textbook B-series theory — the simplification is
/// frozen behavior.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainSpecification, DomainType, TreeType};
use crate::grip::GripMetric;
use crate::numeric::factorial;
use crate::tableau::ButcherTableau;
use crate::tree::{RootedTree, TreeArena};

/// Order conditions must hold within this tolerance.
pub const ORDER_CONDITION_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSeriesTerm {
    pub tree: RootedTree,
    pub order: u32,
    pub symmetry: u64,
    pub coefficient: f64,
    /// Per-term grip weight, derived from tree shape and the profile
    /// the expansion was generated against.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSeriesExpansion {
    pub spec: DomainSpecification,
    pub convergence_order: u32,
    /// One term per enumerated tree of every order 1..=spec.order,
    /// order-stable.
    pub terms: Vec<BSeriesTerm>,
    pub grip: GripMetric,
}

impl BSeriesExpansion {
    pub fn coefficients(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.coefficient).collect()
    }

    /// Replace the coefficient vector in place, keeping terms parallel.
    /// Extra entries are ignored; missing entries leave terms untouched.
    pub fn replace_coefficients(&mut self, coefficients: &[f64]) {
        for (term, &c) in self.terms.iter_mut().zip(coefficients.iter()) {
            term.coefficient = c;
        }
    }

    pub fn term_by_label(&self, label: &str) -> Option<&BSeriesTerm> {
        self.terms.iter().find(|t| t.tree.label == label)
    }

    /// Sum of the coefficients of all terms of one order.
    pub fn order_term_sum(&self, order: u32) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.order == order)
            .map(|t| t.coefficient)
            .sum()
    }

    /// For each order p up to the convergence order, the order-p
    /// coefficient sum must equal 1/p! within tolerance.
    pub fn verify_order_conditions(&self) -> bool {
        (1..=self.convergence_order).all(|p| {
            (self.order_term_sum(p) - 1.0 / factorial(p)).abs() <= ORDER_CONDITION_TOLERANCE
        })
    }
}

fn term_weight(
    grip: &GripMetric,
    order: u32,
    depth_ratio: f64,
    balance_ratio: f64,
) -> f64 {
    (grip.contact * depth_ratio
        + grip.coverage * balance_ratio
        + grip.efficiency / order as f64
        + grip.stability * 0.8)
        / 4.0
}

/// Build the initial expansion for a domain against a grip profile.
///
/// One tableau — chosen for `min(order, 4)` — feeds every coefficient:
/// `Σ_i b_i·c_i^(order-1) / (symmetry · order)` per tree.
pub fn generate_expansion(
    spec: &DomainSpecification,
    grip: &GripMetric,
) -> BSeriesExpansion {
    let tableau = ButcherTableau::for_order(spec.order);
    let glyph = spec.domain.glyph();
    let mut arena = TreeArena::new();
    let mut terms = Vec::new();

    for order in 1..=spec.order {
        for root in arena.generate(order) {
            let symmetry = arena.symmetry_factor(root);
            let coefficient =
                tableau.elementary_weight_sum(order) / (symmetry as f64 * order as f64);

            let depth_ratio = arena.depth(root) as f64 / order as f64;
            let balance_ratio = child_balance(&arena, root);

            terms.push(BSeriesTerm {
                tree: arena.extract_with_symbol(root, glyph),
                order,
                symmetry,
                coefficient,
                weight: term_weight(grip, order, depth_ratio, balance_ratio),
            });
        }
    }

    tracing::debug!(
        domain = %spec.domain,
        order = spec.order,
        terms = terms.len(),
        "expansion generated"
    );

    BSeriesExpansion {
        spec: spec.clone(),
        convergence_order: spec.order,
        terms,
        grip: *grip,
    }
}

/// min/max depth ratio over immediate children; 1 for leaves.
fn child_balance(arena: &TreeArena, root: crate::tree::NodeId) -> f64 {
    let children = arena.children(root);
    if children.is_empty() {
        return 1.0;
    }
    let depths: Vec<u32> = children.iter().map(|&c| arena.depth(c)).collect();
    let min = *depths.iter().min().unwrap_or(&1) as f64;
    let max = *depths.iter().max().unwrap_or(&1) as f64;
    min / max
}

enum ComposeMode {
    Chain,
    Product,
}

/// Chain-rule composition: term coefficients multiply.
pub fn chain_compose(f: &BSeriesExpansion, g: &BSeriesExpansion) -> BSeriesExpansion {
    compose(f, g, ComposeMode::Chain)
}

/// Product-rule composition: term coefficients add.
pub fn product_compose(f: &BSeriesExpansion, g: &BSeriesExpansion) -> BSeriesExpansion {
    compose(f, g, ComposeMode::Product)
}

fn compose(
    f: &BSeriesExpansion,
    g: &BSeriesExpansion,
    mode: ComposeMode,
) -> BSeriesExpansion {
    let max_order = f.convergence_order.max(g.convergence_order);
    let mut spec = f.spec.clone();
    spec.order = max_order;

    let grip = match mode {
        ComposeMode::Chain => GripMetric::from_components(
            (f.grip.contact + g.grip.contact) / 2.0,
            (f.grip.coverage + g.grip.coverage) / 2.0,
            (f.grip.efficiency + g.grip.efficiency) / 2.0,
            f.grip.stability.min(g.grip.stability),
        ),
        ComposeMode::Product => GripMetric::from_components(
            f.grip.contact.max(g.grip.contact),
            (f.grip.coverage + g.grip.coverage) / 2.0,
            (f.grip.efficiency + g.grip.efficiency) / 2.0,
            f.grip.stability.min(g.grip.stability),
        ),
    };

    let glyph = spec.domain.glyph();
    let mut arena = TreeArena::new();
    let mut terms = Vec::new();

    for order in 1..=max_order {
        for root in arena.generate(order) {
            let tree = arena.extract_with_symbol(root, glyph);
            // Label-matched lookup; a term absent from either side
            // contributes 0.
            let cf = f.term_by_label(&tree.label).map_or(0.0, |t| t.coefficient);
            let cg = g.term_by_label(&tree.label).map_or(0.0, |t| t.coefficient);
            let coefficient = match mode {
                ComposeMode::Chain => cf * cg,
                ComposeMode::Product => cf + cg,
            };

            let depth_ratio = arena.depth(root) as f64 / order as f64;
            let balance_ratio = child_balance(&arena, root);

            terms.push(BSeriesTerm {
                tree,
                order,
                symmetry: arena.symmetry_factor(root),
                coefficient,
                weight: term_weight(&grip, order, depth_ratio, balance_ratio),
            });
        }
    }

    BSeriesExpansion {
        spec,
        convergence_order: max_order,
        terms,
        grip,
    }
}

/// The fixed Runge–Kutta preset: a computing/recursion declaration with
/// a frozen grip profile (overall stored as given, not recomputed).
pub fn generate_runge_kutta(order: u32) -> BSeriesExpansion {
    let spec = DomainSpecification {
        domain: DomainType::Computing,
        order,
        tree_type: TreeType::Recursion,
        symmetry: "time-reversible".to_string(),
        preserves: vec!["complexity".to_string()],
    };
    let grip = GripMetric {
        contact: 1.0,
        coverage: 1.0,
        efficiency: 0.9,
        stability: 1.0,
        overall: 0.975,
    };
    generate_expansion(&spec, &grip)
}
