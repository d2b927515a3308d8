//! The ten stages of the buy-versus-rent chain.
//!
//! Each stage reads only the inputs and prior results it needs. Stages that
//! divide by the monthly effective rate refuse a degenerate rate, and all
//! arithmetic is checked so extreme inputs surface as overflow errors.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::BuyRentError;
use crate::inputs::{InputRecord, SaleSchedule};
use crate::time_value::{self, checked, ensure_nonzero_rate};
use crate::types::{Money, Months, Rate};
use crate::BuyRentResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// loan = buy_price * (1 - down_payment)
pub fn loan(input: &InputRecord) -> BuyRentResult<Money> {
    checked(
        input
            .buy_price
            .checked_mul(Decimal::ONE - input.down_payment),
        "loan",
    )
}

/// Monthly effective rate.
///
/// i = (1 + annual_interest_rate / 12 * yearly_compound_periods)^(1 / yearly_compound_periods) - 1
///
/// The periodic rate is multiplied back by the period count inside the base,
/// so k = 1 reduces to r/12 and larger k raises the base.
pub fn monthly_effective_rate(input: &InputRecord) -> BuyRentResult<Rate> {
    const STAGE: &str = "monthly_effective_rate";
    let periods = input.yearly_compound_periods;
    if periods <= Decimal::ZERO {
        return Err(BuyRentError::invalid(
            "yearly_compound_periods",
            "must be positive",
        ));
    }

    let periodic = checked(
        (input.annual_interest_rate / MONTHS_PER_YEAR).checked_mul(periods),
        STAGE,
    )?;
    let base = checked(Decimal::ONE.checked_add(periodic), STAGE)?;
    if base <= Decimal::ZERO {
        return Err(BuyRentError::invalid(
            "annual_interest_rate",
            format!("rate conversion base 1 + r/12*k must be positive, got {base}"),
        ));
    }

    let root = time_value::periodic_root(base, periods, STAGE)?;
    let rate = root - Decimal::ONE;
    ensure_nonzero_rate(rate)?;
    Ok(rate)
}

/// Amortised monthly installment on `loan` over `loan_life_months`.
pub fn monthly_payment(loan: Money, rate: Rate, loan_life_months: Months) -> BuyRentResult<Money> {
    time_value::annuity_payment(loan, rate, loan_life_months, "monthly_payment")
}

/// Upfront cash: down payment, transfer tax and buy closing fees.
pub fn disbursement(input: &InputRecord) -> BuyRentResult<Money> {
    let share = input.buy_tax + input.down_payment;
    let on_price = checked(share.checked_mul(input.buy_price), "disbursement")?;
    checked(on_price.checked_add(input.buy_closing_fees), "disbursement")
}

/// Monthly return forgone on the upfront cash.
pub fn opportunity_cost(disbursement: Money, rate: Rate) -> BuyRentResult<Money> {
    checked(disbursement.checked_mul(rate), "opportunity_cost")
}

/// Monthly cost of owning minus the rent it replaces. Negative when owning is cheaper.
pub fn marginal_payment(
    input: &InputRecord,
    monthly_payment: Money,
    opportunity_cost: Money,
) -> BuyRentResult<Money> {
    let outflow = [
        input.monthly_condo_fee,
        input.monthly_tax,
        input.maintainance,
        monthly_payment,
        opportunity_cost,
    ]
    .iter()
    .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v));
    let outflow = checked(outflow, "marginal_payment")?;
    checked(outflow.checked_sub(input.current_rent), "marginal_payment")
}

/// Cash received at sale after closing fees and realtor commission.
pub fn sell_inflow(input: &InputRecord) -> BuyRentResult<Money> {
    let commission = checked(
        input.sell_realtor_fee.checked_mul(input.sell_price),
        "sell_inflow",
    )?;
    checked(
        input
            .sell_price
            .checked_sub(input.sell_closing_fees)
            .and_then(|v| v.checked_sub(commission)),
        "sell_inflow",
    )
}

/// Amount owed on the loan at the sale: present value of the unpaid installments.
pub fn balance_due(monthly_payment: Money, rate: Rate, schedule: &SaleSchedule) -> BuyRentResult<Money> {
    time_value::annuity_present_value(
        monthly_payment,
        rate,
        schedule.remaining_months(),
        "balance_due",
    )
}

/// Marginal payments accumulated at the effective rate up to the month of sale.
pub fn fv_marginal_payment(marginal_payment: Money, rate: Rate, month_of_sale: Months) -> BuyRentResult<Money> {
    time_value::annuity_future_value(marginal_payment, rate, month_of_sale, "fv_marginal_payment")
}

/// Terminal cash position discounted back to t=0.
///
/// (sell_inflow - balance_due - fv_marginal_payment - disbursement) / (1+i)^month_of_sale
pub fn pv_net_income(
    sell_inflow: Money,
    balance_due: Money,
    fv_marginal_payment: Money,
    disbursement: Money,
    rate: Rate,
    month_of_sale: Months,
) -> BuyRentResult<Money> {
    let terminal = checked(
        sell_inflow
            .checked_sub(balance_due)
            .and_then(|v| v.checked_sub(fv_marginal_payment))
            .and_then(|v| v.checked_sub(disbursement)),
        "net_income",
    )?;
    time_value::discount(terminal, rate, month_of_sale, "net_income")
}
