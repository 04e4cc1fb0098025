//! End-to-end checks for the kernel generation pipeline.
//!
//! Covers the frozen enumeration catalogs, the order-condition gate,
//! domain validation, operator application, export round-trips, and
//! double-run determinism of the whole pipeline.

use bseries_engine::bseries::generate_runge_kutta;
use bseries_engine::domain::{
    DomainSpecification, DomainType, OptimizationGoal, TreeType,
};
use bseries_engine::export::export;
use bseries_engine::grip::{is_sufficient_grip, measure_grip, DEFAULT_GRIP_THRESHOLD};
use bseries_engine::kernel::{
    apply_operator, apply_operator_named, generate, generate_preset, verify,
    GenerationContext, KernelOperator,
};
use bseries_engine::tree::{count, TreeArena};

#[test]
fn tree_counts_match_reference_sequence() {
    assert_eq!(count(1), 1);
    assert_eq!(count(2), 1);
    assert_eq!(count(3), 2);
    assert_eq!(count(5), 9);
    let expected: [u64; 15] = [
        1, 1, 1, 2, 4, 9, 20, 48, 115, 286, 719, 1842, 4766, 12486, 32973,
    ];
    for (n, want) in expected.iter().enumerate() {
        assert_eq!(count(n as u32), *want, "count({}) mismatch", n);
    }
}

#[test]
fn catalog_and_count_disagree_at_order_four() {
    let mut arena = TreeArena::new();
    assert_eq!(arena.generate(4).len(), 5);
    assert_eq!(count(4), 4);
}

#[test]
fn rk4_first_order_condition_holds() {
    let expansion = generate_runge_kutta(4);
    assert!((expansion.order_term_sum(1) - 1.0).abs() < 1e-10);
}

#[test]
fn every_preset_has_parallel_trees_and_coefficients() {
    for domain in DomainType::ALL {
        let kernel = generate_preset(domain).unwrap();
        assert_eq!(
            kernel.trees.len(),
            kernel.coefficients.len(),
            "parallel arrays broken for {}",
            domain
        );
    }
}

#[test]
fn domain_validation_accepts_matching_tree_type() {
    let spec = DomainSpecification {
        domain: DomainType::Physics,
        order: 3,
        tree_type: TreeType::Hamiltonian,
        symmetry: "symplectic".to_string(),
        preserves: vec!["energy".to_string()],
    };
    assert!(spec.is_valid());
}

#[test]
fn domain_validation_rejects_foreign_tree_type() {
    let spec = DomainSpecification {
        domain: DomainType::Physics,
        order: 3,
        tree_type: TreeType::Reaction,
        symmetry: "symplectic".to_string(),
        preserves: vec![],
    };
    assert!(!spec.is_valid());
}

#[test]
fn grip_sufficiency_gate() {
    let strong = bseries_engine::grip::GripMetric {
        contact: 0.9,
        coverage: 0.9,
        efficiency: 0.9,
        stability: 0.9,
        overall: 0.9,
    };
    assert!(is_sufficient_grip(&strong, DEFAULT_GRIP_THRESHOLD));

    let weak = bseries_engine::grip::GripMetric {
        contact: 0.5,
        coverage: 0.5,
        efficiency: 0.5,
        stability: 0.5,
        overall: 0.5,
    };
    assert!(!is_sufficient_grip(&weak, DEFAULT_GRIP_THRESHOLD));
}

#[test]
fn generation_is_deterministic_across_runs() {
    // Same declaration twice; only metadata timestamps may differ.
    let a = generate_preset(DomainType::Chemistry).unwrap();
    let b = generate_preset(DomainType::Chemistry).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.coefficients, b.coefficients);
}

#[test]
fn generate_fails_without_partial_kernel() {
    let context = GenerationContext {
        spec: DomainSpecification {
            domain: DomainType::Chemistry,
            order: 99,
            tree_type: TreeType::Reaction,
            symmetry: "mass-action".to_string(),
            preserves: vec![],
        },
        goal: OptimizationGoal::Accuracy,
    };
    assert!(generate(&context).is_err());
}

#[test]
fn operators_compose_and_dispatch() {
    let left = generate_preset(DomainType::Computing).unwrap();
    let right = generate_preset(DomainType::Computing).unwrap();

    for op in [
        KernelOperator::Chain,
        KernelOperator::Product,
        KernelOperator::Quotient,
    ] {
        let composed = apply_operator(op, &left, &right);
        assert_eq!(composed.order, left.order);
        assert_eq!(composed.trees.len(), composed.coefficients.len());
    }

    assert!(apply_operator_named("product", &left, &right).is_ok());
    assert!(apply_operator_named("laplace", &left, &right).is_err());
}

#[test]
fn chain_self_composition_squares_coefficients() {
    let kernel = generate_preset(DomainType::Computing).unwrap();
    let squared = apply_operator(KernelOperator::Chain, &kernel, &kernel);
    for (i, c) in squared.coefficients.iter().enumerate() {
        let original = kernel.coefficients[i];
        assert!((c - original * original).abs() < 1e-12);
    }
}

#[test]
fn verification_requires_all_three_gates() {
    // A first-order computing kernel before optimization: the single
    // coefficient is exactly 1, so the order condition holds, and the
    // measured grip clears the verification threshold.
    let expansion = generate_runge_kutta(1);
    assert!(expansion.verify_order_conditions());

    let kernel = {
        let mut k = generate_preset(DomainType::Computing).unwrap();
        // Restore the unoptimized first-order shape by hand.
        k.spec.order = 1;
        k.order = 1;
        k.trees.truncate(1);
        k.coefficients = vec![1.0];
        k.expansion = generate_runge_kutta(1);
        k.grip = measure_grip(&k.coefficients, &k.expansion.spec);
        k
    };
    assert!(verify(&kernel));

    let mut broken = kernel.clone();
    broken.expansion.replace_coefficients(&[0.25]);
    assert!(!verify(&broken));
}

#[test]
fn json_export_round_trips_numerically() {
    let kernel = generate_preset(DomainType::Biology).unwrap();
    let dumped = export(&kernel, "json").unwrap();
    let back: bseries_engine::kernel::Kernel = serde_json::from_str(&dumped).unwrap();
    assert_eq!(back.order, kernel.order);
    assert_eq!(back.spec.domain, kernel.spec.domain);
    assert_eq!(back.coefficients.len(), kernel.coefficients.len());
    for (a, b) in back.coefficients.iter().zip(kernel.coefficients.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn ggml_and_scheme_follow_templates() {
    let kernel = generate_preset(DomainType::Physics).unwrap();

    let ggml = export(&kernel, "ggml").unwrap();
    let lines: Vec<&str> = ggml.lines().collect();
    assert_eq!(lines[0], "GGML Kernel physics");
    assert_eq!(lines[1], format!("Order: {}", kernel.order));
    assert!(lines[2].starts_with("Coefficients: ["));
    assert!(lines[3].starts_with("Grip: "));
    assert_eq!(lines[4], format!("Trees: {}", kernel.trees.len()));

    let scheme = export(&kernel, "scheme").unwrap();
    assert!(scheme.starts_with("(define physics-kernel\n"));
    assert!(scheme.contains(&format!("(order . {})", kernel.order)));
    assert!(scheme.contains("(symmetry . \"symplectic\")"));
}
