//! Time-value-of-money primitives on monthly periods.
//!
//! Every operation is checked: an overflowing power, product or quotient is
//! reported as [`BuyRentError::ArithmeticOverflow`] against the calling stage
//! instead of panicking, and annuity factors refuse a zero rate.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::BuyRentError;
use crate::types::{Money, Months, Rate};
use crate::BuyRentResult;

/// Rates whose magnitude is below this are treated as zero.
pub const RATE_EPSILON: Decimal = dec!(0.000000000001);

/// Relative step size at which the Newton root is accepted.
const ROOT_TOLERANCE: Decimal = dec!(0.000000000000000000000001);
const MAX_ROOT_ITERATIONS: u32 = 100;

/// Lift a checked Decimal operation into the crate result type.
pub(crate) fn checked(value: Option<Decimal>, stage: &str) -> BuyRentResult<Decimal> {
    value.ok_or_else(|| BuyRentError::overflow(stage))
}

/// Reject rates that would divide by zero in an annuity factor.
pub fn ensure_nonzero_rate(rate: Rate) -> BuyRentResult<()> {
    if rate.abs() < RATE_EPSILON {
        return Err(BuyRentError::DegenerateRate { rate });
    }
    Ok(())
}

/// Growth factor (1 + rate)^n.
pub fn growth_factor(rate: Rate, n: Months, stage: &str) -> BuyRentResult<Decimal> {
    let one_plus_r = checked(Decimal::ONE.checked_add(rate), stage)?;
    checked(one_plus_r.checked_powu(u64::from(n)), stage)
}

/// Root base^(1/periods) of a strictly positive base.
///
/// Whole period counts use Newton's method on x^k = base, which stays exact to
/// Decimal precision; fractional counts fall back to `powd`.
pub fn periodic_root(base: Decimal, periods: Decimal, stage: &str) -> BuyRentResult<Decimal> {
    if base <= Decimal::ZERO || periods <= Decimal::ZERO {
        return Err(BuyRentError::invalid(
            stage,
            format!("root of {base} over {periods} periods is undefined"),
        ));
    }
    match periods.fract().is_zero().then(|| periods.to_u32()).flatten() {
        Some(k) => nth_root(base, k, stage),
        None => checked(base.checked_powd(Decimal::ONE / periods), stage),
    }
}

fn nth_root(base: Decimal, k: u32, stage: &str) -> BuyRentResult<Decimal> {
    if k == 1 || base == Decimal::ONE {
        return Ok(base);
    }

    let k_dec = Decimal::from(k);
    // Seed from powd; Bernoulli's 1 + (a-1)/k only if that fails
    let mut guess = base
        .checked_powd(Decimal::ONE / k_dec)
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or_else(|| Decimal::ONE + (base - Decimal::ONE) / k_dec);
    let mut delta = Decimal::ZERO;

    for _ in 0..MAX_ROOT_ITERATIONS {
        let g_k_minus_1 = checked(guess.checked_powu(u64::from(k - 1)), stage)?;
        if g_k_minus_1.is_zero() {
            break;
        }
        let g_k = checked(g_k_minus_1.checked_mul(guess), stage)?;
        let slope = checked(k_dec.checked_mul(g_k_minus_1), stage)?;
        delta = checked((g_k - base).checked_div(slope), stage)?;
        guess -= delta;

        if delta.abs() <= ROOT_TOLERANCE * guess.abs() {
            return Ok(guess);
        }
    }

    Err(BuyRentError::ConvergenceFailure {
        function: format!("{stage} root"),
        iterations: MAX_ROOT_ITERATIONS,
        last_delta: delta,
    })
}

/// Level payment that amortises `principal` over `n` periods.
///
/// PMT = P * r * (1+r)^n / ((1+r)^n - 1)
pub fn annuity_payment(principal: Money, rate: Rate, n: Months, stage: &str) -> BuyRentResult<Money> {
    ensure_nonzero_rate(rate)?;
    if n == 0 {
        return Err(BuyRentError::invalid(
            "loan_life_months",
            "Number of periods must be > 0",
        ));
    }
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let factor = growth_factor(rate, n, stage)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(BuyRentError::DegenerateRate { rate });
    }

    let numerator = checked(
        principal
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(factor)),
        stage,
    )?;
    checked(numerator.checked_div(denominator), stage)
}

/// Present value of `n` remaining level payments.
///
/// PV = PMT * ((1+r)^n - 1) / (r * (1+r)^n)
pub fn annuity_present_value(payment: Money, rate: Rate, n: Months, stage: &str) -> BuyRentResult<Money> {
    ensure_nonzero_rate(rate)?;
    let factor = growth_factor(rate, n, stage)?;
    let denominator = checked(rate.checked_mul(factor), stage)?;
    if denominator.is_zero() {
        return Err(BuyRentError::DegenerateRate { rate });
    }
    let annuity_factor = checked((factor - Decimal::ONE).checked_div(denominator), stage)?;
    checked(payment.checked_mul(annuity_factor), stage)
}

/// Future value of an ordinary annuity of `n` level payments.
///
/// FV = PMT * ((1+r)^n - 1) / r
pub fn annuity_future_value(payment: Money, rate: Rate, n: Months, stage: &str) -> BuyRentResult<Money> {
    ensure_nonzero_rate(rate)?;
    let factor = growth_factor(rate, n, stage)?;
    let accumulated = checked(payment.checked_mul(factor - Decimal::ONE), stage)?;
    checked(accumulated.checked_div(rate), stage)
}

/// Discount a single amount `n` periods back to t=0.
pub fn discount(amount: Money, rate: Rate, n: Months, stage: &str) -> BuyRentResult<Money> {
    let factor = growth_factor(rate, n, stage)?;
    if factor.is_zero() {
        return Err(BuyRentError::DegenerateRate { rate });
    }
    checked(amount.checked_div(factor), stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, label: &str) {
        assert!(
            (actual - expected).abs() < tol,
            "{label}: expected ~{expected}, got {actual}"
        );
    }

    #[test]
    fn test_growth_factor_basic() {
        let f = growth_factor(dec!(0.10), 2, "test").unwrap();
        assert_eq!(f, dec!(1.21));
    }

    #[test]
    fn test_growth_factor_zero_periods() {
        assert_eq!(growth_factor(dec!(0.05), 0, "test").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_growth_factor_overflow_is_reported() {
        let err = growth_factor(dec!(10), 1_000, "monthly_payment").unwrap_err();
        match err {
            BuyRentError::ArithmeticOverflow { stage } => assert_eq!(stage, "monthly_payment"),
            e => panic!("Expected ArithmeticOverflow, got {e:?}"),
        }
    }

    #[test]
    fn test_annuity_payment_textbook() {
        // 100,000 over 360 months at 0.5% per month ~ 599.55
        let pmt = annuity_payment(dec!(100000), dec!(0.005), 360, "test").unwrap();
        assert_close(pmt, dec!(599.55), dec!(0.01), "30y mortgage payment");
    }

    #[test]
    fn test_annuity_payment_zero_principal() {
        let pmt = annuity_payment(Decimal::ZERO, dec!(0.005), 360, "test").unwrap();
        assert_eq!(pmt, Decimal::ZERO);
    }

    #[test]
    fn test_annuity_payment_zero_rate_is_degenerate() {
        let err = annuity_payment(dec!(1000), Decimal::ZERO, 12, "test").unwrap_err();
        assert!(matches!(err, BuyRentError::DegenerateRate { .. }));
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let principal = dec!(250000);
        let pmt = annuity_payment(principal, dec!(0.004), 240, "test").unwrap();
        let pv = annuity_present_value(pmt, dec!(0.004), 240, "test").unwrap();
        assert_close(pv, principal, dec!(0.0001), "PV of full schedule");
    }

    #[test]
    fn test_present_value_no_remaining_periods() {
        let pv = annuity_present_value(dec!(500), dec!(0.004), 0, "test").unwrap();
        assert_eq!(pv, Decimal::ZERO);
    }

    #[test]
    fn test_future_value_single_period() {
        // One payment at the end of the only period accrues nothing
        let fv = annuity_future_value(dec!(100), dec!(0.01), 1, "test").unwrap();
        assert_close(fv, dec!(100), dec!(0.0000001), "FV one period");
    }

    #[test]
    fn test_future_value_two_periods() {
        // 100 * 1.01 + 100 = 201
        let fv = annuity_future_value(dec!(100), dec!(0.01), 2, "test").unwrap();
        assert_close(fv, dec!(201), dec!(0.0000001), "FV two periods");
    }

    #[test]
    fn test_discount_basic() {
        let pv = discount(dec!(121), dec!(0.10), 2, "test").unwrap();
        assert_close(pv, dec!(100), dec!(0.0000001), "discount two periods");
    }

    #[test]
    fn test_periodic_root_whole_periods() {
        let root = periodic_root(dec!(1.02), dec!(6), "test").unwrap();
        assert_close(root, dec!(1.0033058903246372019414946658), dec!(0.0000000000000000001), "1.02^(1/6)");
    }

    #[test]
    fn test_periodic_root_exact_power() {
        let root = periodic_root(dec!(1.21), dec!(2), "test").unwrap();
        assert_close(root, dec!(1.1), dec!(0.0000000000000000001), "sqrt(1.21)");
    }

    #[test]
    fn test_periodic_root_fractional_periods() {
        // 1.21^(1/0.5) = 1.4641
        let root = periodic_root(dec!(1.21), dec!(0.5), "test").unwrap();
        assert_close(root, dec!(1.4641), dec!(0.000001), "1.21^2");
    }

    #[test]
    fn test_periodic_root_rejects_nonpositive_base() {
        assert!(periodic_root(Decimal::ZERO, dec!(6), "test").is_err());
        assert!(periodic_root(dec!(-0.5), dec!(6), "test").is_err());
    }

    #[test]
    fn test_periodic_root_many_periods() {
        // 1 + 0.04/12 * 20000 = 67.666..., twenty-thousandth root
        let base = Decimal::ONE + dec!(0.04) / dec!(12) * dec!(20000);
        let root = periodic_root(base, dec!(20000), "test").unwrap();
        assert_close(root, dec!(1.00021075188957838024), dec!(0.000000000000001), "k = 20000");
        let back = root.checked_powu(20000).unwrap();
        assert_close(back, base, dec!(0.0000000001), "root^k");
    }

    #[test]
    fn test_periodic_root_large_base() {
        let root = periodic_root(dec!(100000000000000000000), dec!(2), "test").unwrap();
        assert_close(root, dec!(10000000000), dec!(0.000001), "sqrt(1e20)");
    }

    #[test]
    fn test_tiny_rate_is_degenerate() {
        assert!(ensure_nonzero_rate(dec!(0.0000000000001)).is_err());
        assert!(ensure_nonzero_rate(dec!(-0.0000000000001)).is_err());
        assert!(ensure_nonzero_rate(dec!(0.0001)).is_ok());
    }
}
