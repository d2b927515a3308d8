//! Display formatting of valuation results.
//!
//! Monetary values are thousands-separated with two decimals and the
//! effective rate is shown as a percentage with four decimals.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::types::{Money, Rate};
use crate::valuation::buy_vs_rent::ResultRecord;
use crate::valuation::decision::Recommendation;

pub const REPORT_TITLE: &str = "Buy vs Rent";
pub const REPORT_SUMMARY: &str =
    "This simulator will provide the expected profit of buying a property compared to continue renting";
pub const DECISION_QUESTION: &str = "Should I buy?";

/// A single displayed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Decimal,
    pub display: String,
}

/// Everything a front-end needs to render one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: &'static str,
    pub summary: &'static str,
    pub metrics: Vec<Metric>,
    pub question: &'static str,
    pub recommendation: Recommendation,
    pub headline: &'static str,
    pub message: &'static str,
}

/// Format a monetary amount as `-1,234,567.89`.
pub fn format_currency(value: Money) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{}.{cents}", group_thousands(whole))
}

/// Format a rate as a percentage with four decimals, e.g. `0.3306%`.
pub fn format_percent(rate: Rate) -> String {
    let pct = (rate * dec!(100)).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.4}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The displayed metrics in page order.
///
/// Marginal payment and sale inflow are intermediate and not shown.
pub fn report_metrics(results: &ResultRecord) -> Vec<Metric> {
    let money = |key, label, value: Money| Metric {
        key,
        label,
        value,
        display: format_currency(value),
    };

    vec![
        money("loan", "Loan", results.loan),
        Metric {
            key: "monthly_effective_rate",
            label: "Monthly Effective Rate",
            value: results.monthly_effective_rate,
            display: format_percent(results.monthly_effective_rate),
        },
        money("monthly_payment", "Monthly payment", results.monthly_payment),
        money("disbursement", "Disbursement", results.disbursement),
        money("opportunity_cost", "Opportunity Cost", results.opportunity_cost),
        money("balance_due", "Balance due", results.balance_due),
        money(
            "fv_marginal_payment",
            "Future value marginal payment",
            results.fv_marginal_payment,
        ),
        money("net_income", "Net Income of the investment", results.net_income),
    ]
}

pub fn build_report(results: &ResultRecord) -> Report {
    let recommendation = results.recommendation();
    Report {
        title: REPORT_TITLE,
        summary: REPORT_SUMMARY,
        metrics: report_metrics(results),
        question: DECISION_QUESTION,
        recommendation,
        headline: recommendation.headline(),
        message: recommendation.message(),
    }
}

impl Report {
    /// Width of the longest metric label, for aligning the value column.
    pub fn label_width(&self) -> usize {
        self.metrics.iter().map(|m| m.label.len()).max().unwrap_or(0)
    }

    /// The recommendation message with its bold headline marker removed.
    pub fn verdict(&self) -> &'static str {
        let marker = match self.recommendation {
            Recommendation::Buy => "**Yes**",
            Recommendation::DontBuy => "**No**",
        };
        self.message.strip_prefix(marker).unwrap_or(self.message)
    }
}
