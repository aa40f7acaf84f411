use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::expression::{ExprArena, Expression, NodeId};
use crate::generator::{CandidateGenerator, CandidateKind};
use crate::inputs::{DigitPool, Operator, OperatorRegistry, parse_inputs};

fn all_operators() -> OperatorRegistry {
    OperatorRegistry::from_operators(Operator::ALL)
}

fn one_to_nine() -> DigitPool {
    DigitPool::from_digits(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap_or_default()
}

/// Every leaf digit of `root` must be backed by a unit of `pool`
fn is_backed_by_pool(arena: &ExprArena, root: NodeId, pool: &DigitPool) -> bool {
    let mut used = [0u32; 10];
    for digit in arena.leaves(root) {
        if let Some(count) = used.get_mut(usize::from(digit)) {
            *count += 1;
        }
    }
    (0u8..10).all(|d| used.get(usize::from(d)).copied().unwrap_or(0) <= pool.initial_count(d))
}

#[test]
fn test_construct_respects_pool_and_size() {
    let operators = all_operators();
    let mut generator =
        CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(7)).with_max_size(15);
    let mut pool = one_to_nine();
    let mut arena = ExprArena::new();

    let mut built = 0;
    for _ in 0..2_000 {
        if let Some(root) = generator.construct(&mut arena, &mut pool) {
            built += 1;
            assert!(arena.size(root) <= 15);
            assert!(is_backed_by_pool(&arena, root, &pool));
        }
        assert!(pool.is_balanced());
    }
    assert!(built > 0);
}

#[test]
fn test_construct_with_single_unary_operator_and_digit() {
    let operators = OperatorRegistry::from_operators([Operator::Sqrt]);
    let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(1));
    let mut pool = DigitPool::from_digits(&[5]).unwrap_or_default();
    let mut arena = ExprArena::new();

    let mut saw_sqrt_five = false;
    for _ in 0..200 {
        let mark = arena.checkpoint();
        if let Some(root) = generator.construct(&mut arena, &mut pool) {
            let rendered = arena.render(root).unwrap_or_default();
            assert!(rendered == "5" || rendered.starts_with("sqrt("));
            assert_eq!(arena.leaves(root), vec![5]);
            saw_sqrt_five |= rendered == "sqrt(5)";
        }
        arena.rollback(mark);
        assert!(pool.is_balanced());
    }
    assert!(saw_sqrt_five);
}

#[test]
fn test_construct_never_nests_negations() {
    let operators = OperatorRegistry::from_operators([Operator::Neg, Operator::Add]);
    let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(3));
    let mut pool = one_to_nine();
    let mut arena = ExprArena::new();

    for _ in 0..500 {
        if let Some(root) = generator.construct(&mut arena, &mut pool) {
            let rendered = arena.render(root).unwrap_or_default();
            assert!(!rendered.contains("neg(neg("), "nested negation: {}", rendered);
        }
    }
}

#[test]
fn test_construct_on_exhausted_pool_is_abandoned() {
    let operators = all_operators();
    let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(0));
    let mut pool = DigitPool::from_digits(&[4]).unwrap_or_default();
    let mut arena = ExprArena::new();

    let _ = pool.consume(4);
    assert!(generator.construct(&mut arena, &mut pool).is_none());
    assert!(arena.is_empty());
    assert_eq!(pool.available_count(4), 0);
}

#[test]
fn test_abandoned_builds_leave_no_trace() {
    // Without binary operators only one leaf can ever be placed
    let operators = OperatorRegistry::from_operators([Operator::Neg]);
    let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(11));
    let mut pool = DigitPool::from_digits(&[1, 2, 3]).unwrap_or_default();
    let mut arena = ExprArena::new();

    for _ in 0..100 {
        let mark = arena.checkpoint();
        if let Some(root) = generator.construct(&mut arena, &mut pool) {
            assert_eq!(arena.leaves(root).len(), 1);
        } else {
            assert_eq!(arena.checkpoint(), mark);
        }
        assert!(pool.is_balanced());
    }
}

#[test]
fn test_perturb_preserves_pool_balance_and_shares_nodes() {
    let operators = all_operators();
    let mut generator =
        CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(42)).with_max_size(21);
    let mut pool = one_to_nine();
    let mut arena = ExprArena::new();

    let incumbent = Expression::Add(
        Box::new(Expression::Mul(
            Box::new(Expression::Digit(3)),
            Box::new(Expression::Digit(4)),
        )),
        Box::new(Expression::Sqrt(Box::new(Expression::Digit(9)))),
    );
    let root = arena.insert_expression(&incumbent);
    assert!(root.is_ok());
    let Ok(root) = root else {
        return;
    };

    let mut perturbed = 0;
    for _ in 0..500 {
        let mark = arena.checkpoint();
        let before = arena.len();
        if let Some(neighbor) = generator.perturb(&mut arena, &mut pool, root) {
            perturbed += 1;
            assert!(arena.size(neighbor) <= 21);
            assert!(is_backed_by_pool(&arena, neighbor, &pool));
            // only the replacement and its ancestors are new
            assert!(arena.len() - before <= arena.size(neighbor));
        } else {
            assert_eq!(arena.len(), before);
        }
        arena.rollback(mark);
        assert!(pool.is_balanced());
        assert_eq!(arena.render(root), Ok("((3 * 4) + sqrt(9))".to_string()));
    }
    assert!(perturbed > 0);
}

#[test]
fn test_perturb_rejects_incumbent_outside_pool() {
    let operators = all_operators();
    let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(5));
    let mut pool = DigitPool::from_digits(&[1]).unwrap_or_default();
    let mut arena = ExprArena::new();

    // (7 + 7) cannot come from a pool holding a single 1, unless the whole
    // tree is replaced
    let root = arena.insert_expression(&Expression::Add(
        Box::new(Expression::Digit(7)),
        Box::new(Expression::Digit(7)),
    ));
    if let Ok(root) = root {
        for _ in 0..100 {
            if let Some(neighbor) = generator.perturb(&mut arena, &mut pool, root) {
                assert_eq!(arena.leaves(neighbor), vec![1]);
            }
            assert!(pool.is_balanced());
        }
    }
}

#[test]
fn test_next_candidate_alternates_by_ratio() {
    let inputs = parse_inputs("+,-,*,/,1-9");
    assert!(inputs.is_ok());
    let Ok(inputs) = inputs else {
        return;
    };
    let mut pool = inputs.pool().clone();
    let mut arena = ExprArena::new();

    let mut always_perturb = CandidateGenerator::new(inputs.operators(), ChaCha8Rng::seed_from_u64(9))
        .with_perturbation_ratio(1.0);
    let mut never_perturb = CandidateGenerator::new(inputs.operators(), ChaCha8Rng::seed_from_u64(9))
        .with_perturbation_ratio(0.0);

    let incumbent = arena.insert_expression(&Expression::Digit(1)).ok();
    for _ in 0..50 {
        if let Some(candidate) = always_perturb.next_candidate(&mut arena, &mut pool, incumbent) {
            assert_eq!(candidate.kind, CandidateKind::Perturbed);
        }
        if let Some(candidate) = never_perturb.next_candidate(&mut arena, &mut pool, incumbent) {
            assert_eq!(candidate.kind, CandidateKind::Constructed);
        }
        // without an incumbent there is nothing to perturb
        if let Some(candidate) = always_perturb.next_candidate(&mut arena, &mut pool, None) {
            assert_eq!(candidate.kind, CandidateKind::Constructed);
        }
    }
    assert!(pool.is_balanced());
}

#[test]
fn test_same_seed_same_candidates() {
    let operators = all_operators();
    let render_run = |seed: u64| {
        let mut generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(seed));
        let mut pool = one_to_nine();
        let mut arena = ExprArena::new();
        let roots: Vec<_> = (0..20)
            .filter_map(|_| generator.construct(&mut arena, &mut pool))
            .collect();
        roots
            .into_iter()
            .filter_map(|root| arena.render(root).ok())
            .collect::<Vec<_>>()
    };
    assert_eq!(render_run(123), render_run(123));
}

#[test]
fn test_builder_clamps_invalid_settings() {
    let operators = all_operators();
    let generator = CandidateGenerator::new(&operators, ChaCha8Rng::seed_from_u64(0))
        .with_perturbation_ratio(f64::NAN)
        .with_max_size(0);
    assert_eq!(generator.max_size(), 1);
}
