/// Engine v1 — Butcher Tableaux
///
/// Exactly four canonical tableaux exist. A declared order above 4
/// reuses the order-4 tableau; this is a frozen limitation, not a
/// higher-order method.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButcherTableau {
    pub order: u32,
    pub stages: usize,
    /// Stage matrix, strictly lower-triangular.
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
}

impl ButcherTableau {
    /// Tableau for a declared order, clamped to `min(order, 4)`.
    pub fn for_order(order: u32) -> ButcherTableau {
        match order.min(4) {
            1 => euler(),
            2 => midpoint(),
            3 => kutta3(),
            _ => rk4(),
        }
    }

    /// `Σ_i b_i · c_i^(order-1)` — the single-formula weight feeding
    /// every per-tree coefficient of that order.
    pub fn elementary_weight_sum(&self, order: u32) -> f64 {
        self.b
            .iter()
            .zip(self.c.iter())
            .map(|(&b, &c)| b * c.powi(order as i32 - 1))
            .sum()
    }
}

fn euler() -> ButcherTableau {
    ButcherTableau {
        order: 1,
        stages: 1,
        a: vec![vec![0.0]],
        b: vec![1.0],
        c: vec![0.0],
    }
}

fn midpoint() -> ButcherTableau {
    ButcherTableau {
        order: 2,
        stages: 2,
        a: vec![vec![0.0, 0.0], vec![0.5, 0.0]],
        b: vec![0.0, 1.0],
        c: vec![0.0, 0.5],
    }
}

fn kutta3() -> ButcherTableau {
    ButcherTableau {
        order: 3,
        stages: 3,
        a: vec![
            vec![0.0, 0.0, 0.0],
            vec![0.5, 0.0, 0.0],
            vec![-1.0, 2.0, 0.0],
        ],
        b: vec![1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
        c: vec![0.0, 0.5, 1.0],
    }
}

fn rk4() -> ButcherTableau {
    ButcherTableau {
        order: 4,
        stages: 4,
        a: vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.5, 0.0, 0.0, 0.0],
            vec![0.0, 0.5, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
        ],
        b: vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
        c: vec![0.0, 0.5, 0.5, 1.0],
    }
}
