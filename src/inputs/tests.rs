use crate::expression::ExpressionError;
use crate::inputs::{
    DigitPool, Operator, OperatorRegistry, PoolError, SearchInputs, ValidationError, parse_inputs,
};

#[test]
fn test_parse_full_form_inputs() {
    let result = parse_inputs("+,-,*,/,^,neg,sqrt,1-9");
    assert!(result.is_ok());
    if let Ok(inputs) = result {
        assert_eq!(inputs.operators().len(), 7);
        assert_eq!(inputs.operators().binary().len(), 5);
        assert_eq!(inputs.operators().unary().len(), 2);
        assert_eq!(inputs.pool().total_units(), 9);
        assert_eq!(inputs.pool().available_count(0), 0);
        for digit in 1..=9 {
            assert_eq!(inputs.pool().available_count(digit), 1);
        }
    }
}

#[test]
fn test_parse_repeated_digits_accumulate() {
    let result = parse_inputs("+, 1-3, 2, 2");
    assert!(result.is_ok());
    if let Ok(inputs) = result {
        assert_eq!(inputs.pool().available_count(1), 1);
        assert_eq!(inputs.pool().available_count(2), 3);
        assert_eq!(inputs.pool().available_count(3), 1);
        assert_eq!(inputs.pool().total_units(), 5);
    }
}

#[test]
fn test_parse_deduplicates_operators_keeping_order() {
    let result = parse_inputs("sqrt,+,sqrt,+,5");
    assert!(result.is_ok());
    if let Ok(inputs) = result {
        let ops: Vec<_> = inputs.operators().iter().collect();
        assert_eq!(ops, vec![Operator::Sqrt, Operator::Add]);
    }
}

#[test]
fn test_parse_skips_empty_tokens() {
    let result = parse_inputs("+,,5,");
    assert!(result.is_ok());
}

#[test]
fn test_empty_operator_set_is_rejected() {
    assert_eq!(parse_inputs("1-9"), Err(ValidationError::EmptyOperatorSet));
    assert_eq!(parse_inputs(""), Err(ValidationError::EmptyOperatorSet));
}

#[test]
fn test_empty_digit_pool_is_rejected() {
    assert_eq!(parse_inputs("+,-,sqrt"), Err(ValidationError::NoDigits));
    assert_eq!(parse_inputs("+,"), Err(ValidationError::NoDigits));
}

#[test]
fn test_unknown_token_is_rejected() {
    assert_eq!(
        parse_inputs("+,%,1"),
        Err(ValidationError::UnknownToken("%".to_string()))
    );
    assert_eq!(
        parse_inputs("+,12"),
        Err(ValidationError::UnknownToken("12".to_string()))
    );
    assert_eq!(
        parse_inputs("+,9-1"),
        Err(ValidationError::InvalidRange("9-1".to_string()))
    );
}

#[test]
fn test_validation_is_idempotent() {
    for notation in ["", "1-9", "+", "+,x,", "+,7-3"] {
        let first = parse_inputs(notation);
        let second = parse_inputs(notation);
        assert!(first.is_err());
        assert_eq!(first, second);
    }
}

#[test]
fn test_token_errors_take_precedence_over_empty_sets() {
    // No operators and no digits, but the bad token is reported first
    assert_eq!(
        parse_inputs("abc"),
        Err(ValidationError::UnknownToken("abc".to_string()))
    );
}

#[test]
fn test_from_parts() {
    let result = SearchInputs::from_parts(["+", " sqrt "], "0-2,9");
    assert!(result.is_ok());
    if let Ok(inputs) = result {
        assert!(inputs.operators().contains(Operator::Add));
        assert!(inputs.operators().contains(Operator::Sqrt));
        assert_eq!(inputs.pool().total_units(), 4);
    }

    assert_eq!(
        SearchInputs::from_parts(Vec::<&str>::new(), "1"),
        Err(ValidationError::EmptyOperatorSet)
    );
    assert_eq!(
        SearchInputs::from_parts(["+"], "+"),
        Err(ValidationError::UnknownToken("+".to_string()))
    );
    assert_eq!(
        SearchInputs::from_parts(["mod"], "1"),
        Err(ValidationError::UnknownToken("mod".to_string()))
    );
}

#[test]
fn test_pool_consume_and_restore() {
    let result = DigitPool::from_digits(&[5, 5, 7]);
    assert!(result.is_ok());
    if let Ok(mut pool) = result {
        assert_eq!(pool.available_count(5), 2);
        assert!(pool.consume(5).is_ok());
        assert!(pool.consume(5).is_ok());
        assert_eq!(pool.consume(5), Err(PoolError::Exhausted(5)));
        assert_eq!(pool.available_count(5), 0);
        assert!(!pool.is_balanced());

        assert!(pool.restore(5).is_ok());
        assert!(pool.restore(5).is_ok());
        assert_eq!(pool.restore(5), Err(PoolError::Overfull(5)));
        assert!(pool.is_balanced());

        assert_eq!(pool.consume(3), Err(PoolError::Exhausted(3)));
        assert_eq!(pool.consume(12), Err(PoolError::NotADigit(12)));
    }
}

#[test]
fn test_pool_rejects_non_digits() {
    assert_eq!(DigitPool::from_digits(&[1, 10]), Err(PoolError::NotADigit(10)));
}

#[test]
fn test_available_digits_are_ascending_and_skip_empty() {
    let pool = DigitPool::from_counts([0, 2, 0, 1, 0, 0, 0, 0, 0, 4]);
    let digits: Vec<_> = pool.available_digits().collect();
    assert_eq!(digits, vec![1, 3, 9]);
    assert_eq!(pool.total_available(), 7);
}

#[test]
fn test_lease_restores_on_drop() {
    let mut pool = DigitPool::from_counts([1, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
    {
        let mut lease = pool.lease();
        assert!(lease.take(0).is_ok());
        assert!(lease.take(2).is_ok());
        assert_eq!(lease.take(2), Err(PoolError::Exhausted(2)));
        assert_eq!(lease.taken(), &[0, 2]);
        assert_eq!(lease.total_available(), 1);
    }
    assert!(pool.is_balanced());
}

#[test]
fn test_lease_restores_on_early_return() {
    fn take_then_fail(pool: &mut DigitPool) -> Result<(), PoolError> {
        let mut lease = pool.lease();
        lease.take(4)?;
        lease.take(4)?;
        Ok(())
    }

    let mut pool = DigitPool::from_counts([0, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
    assert_eq!(take_then_fail(&mut pool), Err(PoolError::Exhausted(4)));
    assert!(pool.is_balanced());
}

#[test]
fn test_registry_by_arity() {
    let registry = OperatorRegistry::from_operators(Operator::ALL);
    assert_eq!(
        registry.operators_by_arity(1),
        &[Operator::Neg, Operator::Sqrt]
    );
    assert_eq!(registry.operators_by_arity(2).len(), 5);
    assert!(registry.operators_by_arity(3).is_empty());
}

#[test]
fn test_operator_symbols_round_trip() {
    for op in Operator::ALL {
        assert_eq!(op.symbol().parse::<Operator>(), Ok(op));
    }
}

#[test]
fn test_operator_domain_guards() {
    assert_eq!(
        Operator::Div.evaluate(&[1.0, 0.0]),
        Err(ExpressionError::DivisionByZero)
    );
    assert_eq!(
        Operator::Div.evaluate(&[1.0, f64::EPSILON / 4.0]),
        Err(ExpressionError::DivisionByZero)
    );
    assert_eq!(
        Operator::Sqrt.evaluate(&[-4.0]),
        Err(ExpressionError::NegativeRadicand)
    );
    assert_eq!(
        Operator::Pow.evaluate(&[-8.0, 0.5]),
        Err(ExpressionError::ComplexResult)
    );
    assert_eq!(
        Operator::Pow.evaluate(&[9.0, 400.0]),
        Err(ExpressionError::NonFinite)
    );
    assert_eq!(
        Operator::Pow.evaluate(&[0.0, -1.0]),
        Err(ExpressionError::NonFinite)
    );
    assert!(matches!(
        Operator::Add.evaluate(&[1.0]),
        Err(ExpressionError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn test_operator_evaluation() {
    assert_eq!(Operator::Add.evaluate(&[2.0, 3.0]), Ok(5.0));
    assert_eq!(Operator::Sub.evaluate(&[2.0, 3.0]), Ok(-1.0));
    assert_eq!(Operator::Mul.evaluate(&[2.0, 3.0]), Ok(6.0));
    assert_eq!(Operator::Div.evaluate(&[3.0, 2.0]), Ok(1.5));
    assert_eq!(Operator::Pow.evaluate(&[2.0, 3.0]), Ok(8.0));
    assert_eq!(Operator::Pow.evaluate(&[-2.0, 3.0]), Ok(-8.0));
    assert_eq!(Operator::Neg.evaluate(&[4.0]), Ok(-4.0));
    assert_eq!(Operator::Sqrt.evaluate(&[9.0]), Ok(3.0));
}
