use clap::Args;
use colored::Colorize;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use buy_rent_core::report::{build_report, Report};
use buy_rent_core::{analyze_buy_vs_rent, evaluate, InputRecord, Recommendation};

use crate::input;

/// Scenario inputs. Unset flags keep the value from the input file, piped
/// stdin, or the reference defaults, in that order.
#[derive(Args, Default)]
#[command(allow_hyphen_values = true)]
pub struct ScenarioArgs {
    /// Value of the property at t=0
    #[arg(long)]
    pub buy_price: Option<Decimal>,

    /// Fraction of the buy price paid in advance (e.g. 0.2 for 20%)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Closing fees paid at purchase
    #[arg(long)]
    pub buy_closing_fees: Option<Decimal>,

    /// Fraction of the buy price paid as transfer tax
    #[arg(long)]
    pub buy_tax: Option<Decimal>,

    /// Monthly rent currently paid
    #[arg(long, alias = "rent")]
    pub current_rent: Option<Decimal>,

    /// Monthly condo fee if you own the property
    #[arg(long)]
    pub monthly_condo_fee: Option<Decimal>,

    /// Monthly property tax if you own the property
    #[arg(long)]
    pub monthly_tax: Option<Decimal>,

    /// Monthly maintainance expenses if you own the property
    #[arg(long, alias = "maintenance")]
    pub maintainance: Option<Decimal>,

    /// Nominal annual loan rate (e.g. 0.04 for 4%)
    #[arg(long, alias = "rate")]
    pub annual_interest_rate: Option<Decimal>,

    /// Compounding periods per year (semiannual: 6, monthly: 1)
    #[arg(long)]
    pub yearly_compound_periods: Option<Decimal>,

    /// Loan term in months
    #[arg(long)]
    pub loan_life_months: Option<Decimal>,

    /// Sale price at exit
    #[arg(long)]
    pub sell_price: Option<Decimal>,

    /// Month in which the property is sold
    #[arg(long)]
    pub month_of_sale: Option<Decimal>,

    /// Closing fees paid at sale
    #[arg(long)]
    pub sell_closing_fees: Option<Decimal>,

    /// Fraction of the sale price paid as realtor commission
    #[arg(long)]
    pub sell_realtor_fee: Option<Decimal>,

    /// Path to a JSON or YAML file with any subset of the input fields
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the formatted report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Emit the report as structured data through --output instead of text
    #[arg(long)]
    pub structured: bool,
}

impl ScenarioArgs {
    fn overrides(&self) -> Vec<(&'static str, Decimal)> {
        [
            ("buy_price", self.buy_price),
            ("down_payment", self.down_payment),
            ("buy_closing_fees", self.buy_closing_fees),
            ("buy_tax", self.buy_tax),
            ("current_rent", self.current_rent),
            ("monthly_condo_fee", self.monthly_condo_fee),
            ("monthly_tax", self.monthly_tax),
            ("maintainance", self.maintainance),
            ("annual_interest_rate", self.annual_interest_rate),
            ("yearly_compound_periods", self.yearly_compound_periods),
            ("loan_life_months", self.loan_life_months),
            ("sell_price", self.sell_price),
            ("month_of_sale", self.month_of_sale),
            ("sell_closing_fees", self.sell_closing_fees),
            ("sell_realtor_fee", self.sell_realtor_fee),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// Layer defaults, then file or stdin fields, then explicit flags.
pub fn build_input(args: &ScenarioArgs) -> Result<InputRecord, Box<dyn std::error::Error>> {
    let mut record = InputRecord::default();

    let layered = if let Some(ref path) = args.input {
        Some(input::file::read_value(path)?)
    } else {
        input::stdin::read_stdin()?
    };
    if let Some(value) = layered {
        debug!("applying input fields");
        record.merge_json(&value)?;
    }

    for (name, value) in args.overrides() {
        debug!(field = name, %value, "flag override");
        record.set_field(name, value)?;
    }

    Ok(record)
}

pub fn run_evaluate(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record = build_input(&args)?;
    let result = analyze_buy_vs_rent(&record)?;
    Ok(serde_json::to_value(result)?)
}

/// Print the report page, or return it as data when `--structured` is set.
pub fn run_report(args: ReportArgs) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let record = build_input(&args.scenario)?;
    let results = evaluate(&record)?;
    let report = build_report(&results);

    if args.structured {
        return Ok(Some(serde_json::to_value(report)?));
    }
    print_report(&report);
    Ok(None)
}

fn print_report(report: &Report) {
    let width = report.label_width();

    println!("{}", report.title.bold());
    println!("{}\n", report.summary.dimmed());
    for m in &report.metrics {
        let display = if m.value < Decimal::ZERO {
            m.display.red()
        } else {
            m.display.normal()
        };
        println!("{:<width$}  {}", m.label, display);
    }

    println!("\n{}", report.question.bold());
    let headline = match report.recommendation {
        Recommendation::Buy => report.headline.green().bold(),
        Recommendation::DontBuy => report.headline.red().bold(),
    };
    println!("{}{}", headline, report.verdict());
}

#[cfg(test)]
mod tests {
    use super::*;
    use buy_rent_core::BuyRentError;
    use std::fs;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_file_then_flags_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        fs::write(&path, r#"{"sell_price": 650000, "month_of_sale": "36"}"#).unwrap();

        let args = ScenarioArgs {
            input: Some(path.to_string_lossy().into_owned()),
            month_of_sale: Some(dec(48)),
            ..Default::default()
        };
        let record = build_input(&args).unwrap();

        assert_eq!(record.sell_price, dec(650000));
        assert_eq!(record.month_of_sale, dec(48));
        assert_eq!(record.buy_price, dec(600000));
    }

    #[test]
    fn test_yaml_file_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, "current_rent: 3500\nloan_life_months: 360\n").unwrap();

        let args = ScenarioArgs {
            input: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let record = build_input(&args).unwrap();

        assert_eq!(record.current_rent, dec(3500));
        assert_eq!(record.loan_life_months, dec(360));
    }

    #[test]
    fn test_bad_file_value_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        fs::write(&path, r#"{"buy_price": "six hundred"}"#).unwrap();

        let args = ScenarioArgs {
            input: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let err = build_input(&args).unwrap_err();
        match err.downcast_ref::<BuyRentError>() {
            Some(BuyRentError::InvalidInput { field, .. }) => assert_eq!(field, "buy_price"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yml");
        fs::write(&path, "current_rent: [3500\n").unwrap();

        let args = ScenarioArgs {
            input: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let err = build_input(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuyRentError>(),
            Some(BuyRentError::SerializationError(_))
        ));
    }
}
