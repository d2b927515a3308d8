//! Buy-versus-rent valuation engine.
//!
//! Runs the stage chain in [`super::stages`] over a validated
//! [`InputRecord`] and discounts the terminal position of owning (sale
//! proceeds net of the outstanding loan, the accumulated extra monthly cost of
//! owning over renting, and the upfront cash) back to today.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::inputs::InputRecord;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::valuation::decision::Recommendation;
use crate::valuation::stages;
use crate::BuyRentResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Intermediate and final results of one evaluation, in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub loan: Money,
    pub monthly_effective_rate: Rate,
    pub monthly_payment: Money,
    pub disbursement: Money,
    pub opportunity_cost: Money,
    pub marginal_payment: Money,
    pub sell_inflow: Money,
    pub balance_due: Money,
    pub fv_marginal_payment: Money,
    pub net_income: Money,
}

impl ResultRecord {
    /// Results as an ordered flat `(name, value)` mapping.
    pub fn entries(&self) -> [(&'static str, Decimal); 10] {
        [
            ("loan", self.loan),
            ("monthly_effective_rate", self.monthly_effective_rate),
            ("monthly_payment", self.monthly_payment),
            ("disbursement", self.disbursement),
            ("opportunity_cost", self.opportunity_cost),
            ("marginal_payment", self.marginal_payment),
            ("sell_inflow", self.sell_inflow),
            ("balance_due", self.balance_due),
            ("fv_marginal_payment", self.fv_marginal_payment),
            ("net_income", self.net_income),
        ]
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::from_net_income(self.net_income)
    }
}

/// Output of the buy-versus-rent analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyVsRentOutput {
    #[serde(flatten)]
    pub results: ResultRecord,
    /// True when the present value of buying is strictly positive
    pub profitable: bool,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate one scenario through the full stage chain.
///
/// Inputs are validated first; nothing is computed for an invalid record and
/// no partial results are returned on failure.
pub fn evaluate(input: &InputRecord) -> BuyRentResult<ResultRecord> {
    let schedule = input.validate()?;

    let loan = stages::loan(input)?;
    let rate = stages::monthly_effective_rate(input)?;
    let monthly_payment = stages::monthly_payment(loan, rate, schedule.loan_life_months)?;
    debug!(%loan, %rate, %monthly_payment, "loan sized and amortised");

    let disbursement = stages::disbursement(input)?;
    let opportunity_cost = stages::opportunity_cost(disbursement, rate)?;
    let marginal_payment = stages::marginal_payment(input, monthly_payment, opportunity_cost)?;
    debug!(%disbursement, %opportunity_cost, %marginal_payment, "monthly cash flow versus renting");

    let sell_inflow = stages::sell_inflow(input)?;
    let balance_due = stages::balance_due(monthly_payment, rate, &schedule)?;
    let fv_marginal_payment =
        stages::fv_marginal_payment(marginal_payment, rate, schedule.month_of_sale)?;
    let net_income = stages::pv_net_income(
        sell_inflow,
        balance_due,
        fv_marginal_payment,
        disbursement,
        rate,
        schedule.month_of_sale,
    )?;
    debug!(
        %sell_inflow,
        %balance_due,
        %fv_marginal_payment,
        %net_income,
        month_of_sale = schedule.month_of_sale,
        "sale position discounted"
    );

    Ok(ResultRecord {
        loan,
        monthly_effective_rate: rate,
        monthly_payment,
        disbursement,
        opportunity_cost,
        marginal_payment,
        sell_inflow,
        balance_due,
        fv_marginal_payment,
        net_income,
    })
}

/// Evaluate a scenario and wrap the results, verdict and warnings in the
/// standard computation envelope.
pub fn analyze_buy_vs_rent(
    input: &InputRecord,
) -> BuyRentResult<ComputationOutput<BuyVsRentOutput>> {
    let start = Instant::now();

    let results = evaluate(input)?;
    let warnings = collect_warnings(input, &results);
    for w in &warnings {
        warn!(warning = %w, "buy-vs-rent analysis");
    }

    let recommendation = results.recommendation();
    let output = BuyVsRentOutput {
        results,
        profitable: recommendation.is_profitable(),
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Buy vs rent NPV: amortised loan, opportunity cost of upfront cash, marginal monthly flows compounded to sale",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect_warnings(input: &InputRecord, results: &ResultRecord) -> Vec<String> {
    let mut warnings = Vec::new();

    if results.marginal_payment < Decimal::ZERO {
        warnings.push(format!(
            "Owning is cheaper than renting month to month (marginal payment {})",
            results.marginal_payment.round_dp(2)
        ));
    }
    if results.sell_inflow < results.balance_due {
        warnings.push(format!(
            "Sale proceeds ({}) do not cover the balance due on the loan ({})",
            results.sell_inflow.round_dp(2),
            results.balance_due.round_dp(2)
        ));
    }
    if input.down_payment == Decimal::ONE {
        warnings.push("Down payment covers the full price; no loan is taken".into());
    }
    if input.yearly_compound_periods != Decimal::ONE {
        warnings.push(format!(
            "Effective rate uses (1 + r/12 * k)^(1/k) - 1 with k = {}; cross-check against the lender's quoted APR",
            input.yearly_compound_periods
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
