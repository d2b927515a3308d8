use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BuyRentError;
use crate::BuyRentResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Whole month counts used as compounding exponents.
pub type Months = u32;

/// Convert a month count carried as a Decimal into an exponent.
///
/// Fractional, negative or out-of-range values are rejected against `field`.
pub fn whole_months(field: &str, value: Decimal) -> BuyRentResult<Months> {
    if !value.fract().is_zero() {
        return Err(BuyRentError::invalid(
            field,
            format!("must be a whole number of months, got {value}"),
        ));
    }
    if value.is_sign_negative() && !value.is_zero() {
        return Err(BuyRentError::invalid(
            field,
            format!("cannot be negative, got {value}"),
        ));
    }
    value
        .to_u32()
        .ok_or_else(|| BuyRentError::invalid(field, format!("{value} months is out of range")))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap an engine result with methodology, echoed inputs and warnings.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
