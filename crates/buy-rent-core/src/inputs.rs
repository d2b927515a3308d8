//! Input record for the buy-versus-rent valuation and the ordered field table
//! that describes it.
//!
//! The table drives everything that needs to enumerate the inputs: defaults,
//! labels and help text for a form, parsing of flat name/value maps, and the
//! per-field domain checks run before any computation.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BuyRentError;
use crate::types::{whole_months, Money, Months, Rate};
use crate::BuyRentResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Financial parameters of one buy-versus-rent scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputRecord {
    /// Value of the property at t=0
    pub buy_price: Money,
    /// Fraction of the buy price paid in advance
    pub down_payment: Rate,
    /// Fixed closing fees paid at purchase
    pub buy_closing_fees: Money,
    /// Fraction of the buy price paid as transfer tax
    pub buy_tax: Rate,
    /// Monthly rent currently paid
    pub current_rent: Money,
    pub monthly_condo_fee: Money,
    pub monthly_tax: Money,
    pub maintainance: Money,
    /// Nominal annual loan rate
    pub annual_interest_rate: Rate,
    /// Compounding periods per year
    pub yearly_compound_periods: Decimal,
    /// Loan term in whole months
    pub loan_life_months: Decimal,
    /// Expected sale price at exit
    pub sell_price: Money,
    /// Month (1-based) in which the property is sold
    pub month_of_sale: Decimal,
    /// Fixed closing fees paid at sale
    pub sell_closing_fees: Money,
    /// Fraction of the sale price paid as commission
    pub sell_realtor_fee: Rate,
}

/// Valid range of a single input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDomain {
    /// Any number
    Unbounded,
    /// Fraction in [0, 1)
    Fraction,
    /// Fraction in [0, 1]
    FractionInclusive,
    /// Strictly positive number
    Positive,
    /// Whole number of months, strictly positive
    WholeMonths,
}

impl FieldDomain {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldDomain::Unbounded => "any number",
            FieldDomain::Fraction => "0 <= x < 1",
            FieldDomain::FractionInclusive => "0 <= x <= 1",
            FieldDomain::Positive => "x > 0",
            FieldDomain::WholeMonths => "whole number > 0",
        }
    }

    /// Check `value` against this domain, reporting failures against `field`.
    pub fn check(&self, field: &str, value: Decimal) -> BuyRentResult<()> {
        match self {
            FieldDomain::Unbounded => Ok(()),
            FieldDomain::Fraction => {
                if value < Decimal::ZERO || value >= Decimal::ONE {
                    return Err(BuyRentError::invalid(
                        field,
                        format!("must be a fraction in [0, 1), got {value}"),
                    ));
                }
                Ok(())
            }
            FieldDomain::FractionInclusive => {
                if value < Decimal::ZERO || value > Decimal::ONE {
                    return Err(BuyRentError::invalid(
                        field,
                        format!("must be a fraction in [0, 1], got {value}"),
                    ));
                }
                Ok(())
            }
            FieldDomain::Positive => {
                if value <= Decimal::ZERO {
                    return Err(BuyRentError::invalid(
                        field,
                        format!("must be positive, got {value}"),
                    ));
                }
                Ok(())
            }
            FieldDomain::WholeMonths => {
                if whole_months(field, value)? == 0 {
                    return Err(BuyRentError::invalid(field, "must be at least 1 month"));
                }
                Ok(())
            }
        }
    }
}

/// Name, default, help text and valid range of one input field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub default: Decimal,
    pub help: &'static str,
    pub domain: FieldDomain,
}

impl FieldDescriptor {
    /// Human-readable label: the field name with underscores as spaces.
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Whole-month schedule of the loan and the sale, derived from a validated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleSchedule {
    pub loan_life_months: Months,
    pub month_of_sale: Months,
}

impl SaleSchedule {
    /// Installments still owed when the property is sold.
    pub fn remaining_months(&self) -> Months {
        self.loan_life_months - self.month_of_sale
    }
}

// ---------------------------------------------------------------------------
// Field table
// ---------------------------------------------------------------------------

static INPUT_FIELDS: [FieldDescriptor; 15] = [
    // buy inputs
    FieldDescriptor {
        name: "buy_price",
        default: dec!(600000),
        help: "value of the property at t=0",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "down_payment",
        default: dec!(0.2),
        help: "percentage of the buy price that will be paid in advance",
        domain: FieldDomain::FractionInclusive,
    },
    FieldDescriptor {
        name: "buy_closing_fees",
        default: dec!(2000),
        help: "amount in USD of the buy-closing-fees",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "buy_tax",
        default: dec!(0.03),
        help: "percentage of the buy-price that will be paid as tax",
        domain: FieldDomain::Fraction,
    },
    FieldDescriptor {
        name: "current_rent",
        default: dec!(3000),
        help: "amount of monthly rent in USD that you currently pay",
        domain: FieldDomain::Unbounded,
    },
    // ownership running costs
    FieldDescriptor {
        name: "monthly_condo_fee",
        default: dec!(1055),
        help: "monthly amount that should be paid in USD if you own the property",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "monthly_tax",
        default: dec!(300),
        help: "monthly amount that should be paid in USD if you own the property",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "maintainance",
        default: dec!(50),
        help: "monthly amount of maintainance expenses in USD if you own the property",
        domain: FieldDomain::Unbounded,
    },
    // loan inputs
    FieldDescriptor {
        name: "annual_interest_rate",
        default: dec!(0.04),
        help: "percentage annualized interest rate for the loan",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "yearly_compound_periods",
        default: dec!(6),
        help: "if semiannual, then 6; if monthly, then 1",
        domain: FieldDomain::Positive,
    },
    FieldDescriptor {
        name: "loan_life_months",
        default: dec!(300),
        help: "number of months given for the loan",
        domain: FieldDomain::WholeMonths,
    },
    // sell inputs
    FieldDescriptor {
        name: "sell_price",
        default: dec!(600000),
        help: "selling value of the property at the time of the sale",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "month_of_sale",
        default: dec!(24),
        help: "number of month when the sell takes place",
        domain: FieldDomain::WholeMonths,
    },
    FieldDescriptor {
        name: "sell_closing_fees",
        default: dec!(2000),
        help: "amount in USD of the selling closing fees",
        domain: FieldDomain::Unbounded,
    },
    FieldDescriptor {
        name: "sell_realtor_fee",
        default: dec!(0.05),
        help: "percentage of the sell price that will be paid to realtor",
        domain: FieldDomain::Fraction,
    },
];

/// The ordered input field table.
pub fn input_fields() -> &'static [FieldDescriptor] {
    &INPUT_FIELDS
}

/// Parse free text as a decimal number, the way a form field would be read.
pub fn parse_field_value(field: &str, text: &str) -> BuyRentResult<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BuyRentError::invalid(field, "value is empty"));
    }
    let cleaned = trimmed.replace('_', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| BuyRentError::invalid(field, format!("'{trimmed}' is not a number")))
}

// ---------------------------------------------------------------------------
// InputRecord
// ---------------------------------------------------------------------------

impl Default for InputRecord {
    /// The reference scenario built from the field table defaults.
    fn default() -> Self {
        let mut record = InputRecord::zeroed();
        for field in input_fields() {
            if let Some(slot) = record.field_mut(field.name) {
                *slot = field.default;
            }
        }
        record
    }
}

impl InputRecord {
    fn zeroed() -> Self {
        InputRecord {
            buy_price: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            buy_closing_fees: Decimal::ZERO,
            buy_tax: Decimal::ZERO,
            current_rent: Decimal::ZERO,
            monthly_condo_fee: Decimal::ZERO,
            monthly_tax: Decimal::ZERO,
            maintainance: Decimal::ZERO,
            annual_interest_rate: Decimal::ZERO,
            yearly_compound_periods: Decimal::ZERO,
            loan_life_months: Decimal::ZERO,
            sell_price: Decimal::ZERO,
            month_of_sale: Decimal::ZERO,
            sell_closing_fees: Decimal::ZERO,
            sell_realtor_fee: Decimal::ZERO,
        }
    }

    /// Build a record from a flat name/text mapping.
    ///
    /// Every field in the table must be present exactly once by name; unknown
    /// names, repeated names and non-numeric values are rejected.
    pub fn from_fields<I, K, V>(entries: I) -> BuyRentResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = InputRecord::zeroed();
        let mut seen = [false; 15];
        for (name, text) in entries {
            let name = name.as_ref();
            let index = INPUT_FIELDS
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| BuyRentError::invalid(name, "unknown input field"))?;
            if seen[index] {
                return Err(BuyRentError::invalid(name, "field given more than once"));
            }
            record.set_field(name, parse_field_value(name, text.as_ref())?)?;
            seen[index] = true;
        }
        if let Some(missing) = INPUT_FIELDS
            .iter()
            .zip(seen.iter())
            .find(|(_, present)| !**present)
        {
            return Err(BuyRentError::invalid(missing.0.name, "required field is missing"));
        }
        Ok(record)
    }

    /// Overwrite the named fields from a flat name/text mapping, leaving the rest.
    pub fn merge_fields<I, K, V>(&mut self, entries: I) -> BuyRentResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, text) in entries {
            let name = name.as_ref();
            let value = parse_field_value(name, text.as_ref())?;
            self.set_field(name, value)?;
        }
        Ok(())
    }

    /// Overwrite fields from a JSON object of field name to number or numeric
    /// string. YAML input converted to a JSON value goes through here too.
    pub fn merge_json(&mut self, value: &Value) -> BuyRentResult<()> {
        let map = value.as_object().ok_or_else(|| {
            BuyRentError::SerializationError(
                "input must be an object mapping field names to numbers".into(),
            )
        })?;

        let mut fields = Vec::with_capacity(map.len());
        for (name, val) in map {
            let text = match val {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                other => {
                    return Err(BuyRentError::invalid(
                        name,
                        format!("must be a number, got {other}"),
                    ))
                }
            };
            fields.push((name.as_str(), text));
        }
        self.merge_fields(fields)
    }

    /// The reference defaults overlaid with a JSON object of field values.
    pub fn from_partial_json(json: &str) -> BuyRentResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut record = InputRecord::default();
        record.merge_json(&value)?;
        Ok(record)
    }

    /// Read a field by name.
    pub fn field(&self, name: &str) -> Option<Decimal> {
        let value = match name {
            "buy_price" => self.buy_price,
            "down_payment" => self.down_payment,
            "buy_closing_fees" => self.buy_closing_fees,
            "buy_tax" => self.buy_tax,
            "current_rent" => self.current_rent,
            "monthly_condo_fee" => self.monthly_condo_fee,
            "monthly_tax" => self.monthly_tax,
            "maintainance" => self.maintainance,
            "annual_interest_rate" => self.annual_interest_rate,
            "yearly_compound_periods" => self.yearly_compound_periods,
            "loan_life_months" => self.loan_life_months,
            "sell_price" => self.sell_price,
            "month_of_sale" => self.month_of_sale,
            "sell_closing_fees" => self.sell_closing_fees,
            "sell_realtor_fee" => self.sell_realtor_fee,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Decimal> {
        let slot = match name {
            "buy_price" => &mut self.buy_price,
            "down_payment" => &mut self.down_payment,
            "buy_closing_fees" => &mut self.buy_closing_fees,
            "buy_tax" => &mut self.buy_tax,
            "current_rent" => &mut self.current_rent,
            "monthly_condo_fee" => &mut self.monthly_condo_fee,
            "monthly_tax" => &mut self.monthly_tax,
            "maintainance" => &mut self.maintainance,
            "annual_interest_rate" => &mut self.annual_interest_rate,
            "yearly_compound_periods" => &mut self.yearly_compound_periods,
            "loan_life_months" => &mut self.loan_life_months,
            "sell_price" => &mut self.sell_price,
            "month_of_sale" => &mut self.month_of_sale,
            "sell_closing_fees" => &mut self.sell_closing_fees,
            "sell_realtor_fee" => &mut self.sell_realtor_fee,
            _ => return None,
        };
        Some(slot)
    }

    /// Set a field by name.
    pub fn set_field(&mut self, name: &str, value: Decimal) -> BuyRentResult<()> {
        let slot = self
            .field_mut(name)
            .ok_or_else(|| BuyRentError::invalid(name, "unknown input field"))?;
        *slot = value;
        Ok(())
    }

    /// Fields in table order as `(name, value)` pairs.
    pub fn entries(&self) -> Vec<(&'static str, Decimal)> {
        input_fields()
            .iter()
            .filter_map(|f| self.field(f.name).map(|v| (f.name, v)))
            .collect()
    }

    /// Run every per-field domain check plus the cross-field sale window check.
    pub fn validate(&self) -> BuyRentResult<SaleSchedule> {
        for descriptor in input_fields() {
            if let Some(value) = self.field(descriptor.name) {
                descriptor.domain.check(descriptor.name, value)?;
            }
        }

        let loan_life_months = whole_months("loan_life_months", self.loan_life_months)?;
        let month_of_sale = whole_months("month_of_sale", self.month_of_sale)?;
        if month_of_sale >= loan_life_months {
            return Err(BuyRentError::invalid(
                "month_of_sale",
                format!(
                    "sale must happen before the loan matures (month {month_of_sale} >= term {loan_life_months})"
                ),
            ));
        }

        Ok(SaleSchedule {
            loan_life_months,
            month_of_sale,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_text_fields() -> Vec<(String, String)> {
        input_fields()
            .iter()
            .map(|f| (f.name.to_string(), f.default.to_string()))
            .collect()
    }

    #[test]
    fn test_table_order_and_size() {
        let names: Vec<&str> = input_fields().iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 15);
        assert_eq!(names.first(), Some(&"buy_price"));
        assert_eq!(names.last(), Some(&"sell_realtor_fee"));
    }

    #[test]
    fn test_default_record_matches_table() {
        let record = InputRecord::default();
        assert_eq!(record.buy_price, dec!(600000));
        assert_eq!(record.down_payment, dec!(0.2));
        assert_eq!(record.yearly_compound_periods, dec!(6));
        assert_eq!(record.month_of_sale, dec!(24));
        assert_eq!(record.sell_realtor_fee, dec!(0.05));
    }

    #[test]
    fn test_labels_replace_underscores() {
        let d = &input_fields()[8];
        assert_eq!(d.label(), "annual interest rate");
    }

    #[test]
    fn test_from_fields_round_trips_defaults() {
        let record = InputRecord::from_fields(default_text_fields()).unwrap();
        assert_eq!(record, InputRecord::default());
    }

    #[test]
    fn test_from_fields_missing_field() {
        let fields: Vec<(String, String)> = default_text_fields()
            .into_iter()
            .filter(|(k, _)| k != "current_rent")
            .collect();
        match InputRecord::from_fields(fields).unwrap_err() {
            BuyRentError::InvalidInput { field, reason } => {
                assert_eq!(field, "current_rent");
                assert!(reason.contains("missing"));
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_from_fields_unknown_field() {
        let mut fields = default_text_fields();
        fields.push(("hoa_dues".into(), "10".into()));
        match InputRecord::from_fields(fields).unwrap_err() {
            BuyRentError::InvalidInput { field, .. } => assert_eq!(field, "hoa_dues"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_from_fields_repeated_field() {
        let mut fields = default_text_fields();
        fields.push(("sell_price".into(), "1".into()));
        match InputRecord::from_fields(fields).unwrap_err() {
            BuyRentError::InvalidInput { field, reason } => {
                assert_eq!(field, "sell_price");
                assert!(reason.contains("more than once"));
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_merge_json_numbers_and_strings() {
        let mut record = InputRecord::default();
        record
            .merge_json(&serde_json::json!({ "sell_price": 650000, "down_payment": "0.25" }))
            .unwrap();
        assert_eq!(record.sell_price, dec!(650000));
        assert_eq!(record.down_payment, dec!(0.25));
        assert_eq!(record.buy_price, dec!(600000));
    }

    #[test]
    fn test_merge_json_rejects_non_numbers() {
        let mut record = InputRecord::default();
        match record
            .merge_json(&serde_json::json!({ "buy_price": true }))
            .unwrap_err()
        {
            BuyRentError::InvalidInput { field, .. } => assert_eq!(field, "buy_price"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
        assert!(matches!(
            record.merge_json(&serde_json::json!([1, 2, 3])).unwrap_err(),
            BuyRentError::SerializationError(_)
        ));
    }

    #[test]
    fn test_from_partial_json() {
        let record = InputRecord::from_partial_json(r#"{"month_of_sale": 60}"#).unwrap();
        assert_eq!(record.month_of_sale, dec!(60));
        assert_eq!(record.current_rent, dec!(3000));

        assert!(matches!(
            InputRecord::from_partial_json("{ not json").unwrap_err(),
            BuyRentError::SerializationError(_)
        ));
    }

    #[test]
    fn test_from_fields_non_numeric() {
        let mut record = InputRecord::default();
        let err = record.merge_fields([("buy_price", "six hundred")]).unwrap_err();
        match err {
            BuyRentError::InvalidInput { field, reason } => {
                assert_eq!(field, "buy_price");
                assert!(reason.contains("not a number"));
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_parse_accepts_form_style_numbers() {
        assert_eq!(parse_field_value("x", " 600_000 ").unwrap(), dec!(600000));
        assert_eq!(parse_field_value("x", "6e5").unwrap(), dec!(600000));
        assert_eq!(parse_field_value("x", "0.04").unwrap(), dec!(0.04));
        assert!(parse_field_value("x", "").is_err());
    }

    #[test]
    fn test_merge_overrides_only_named_fields() {
        let mut record = InputRecord::default();
        record
            .merge_fields([("sell_price", "650000"), ("month_of_sale", "60")])
            .unwrap();
        assert_eq!(record.sell_price, dec!(650000));
        assert_eq!(record.month_of_sale, dec!(60));
        assert_eq!(record.buy_price, dec!(600000));
    }

    #[test]
    fn test_validate_defaults() {
        let schedule = InputRecord::default().validate().unwrap();
        assert_eq!(schedule.loan_life_months, 300);
        assert_eq!(schedule.month_of_sale, 24);
        assert_eq!(schedule.remaining_months(), 276);
    }

    #[test]
    fn test_validate_fraction_domains() {
        let mut record = InputRecord::default();
        record.buy_tax = Decimal::ONE;
        assert!(record.validate().is_err());

        let mut record = InputRecord::default();
        record.sell_realtor_fee = dec!(-0.01);
        assert!(record.validate().is_err());

        let mut record = InputRecord::default();
        record.down_payment = Decimal::ONE;
        assert!(record.validate().is_ok());

        record.down_payment = dec!(1.01);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_sale_window() {
        let mut record = InputRecord::default();
        record.month_of_sale = dec!(299);
        assert!(record.validate().is_ok());

        record.month_of_sale = dec!(300);
        match record.validate().unwrap_err() {
            BuyRentError::InvalidInput { field, .. } => assert_eq!(field, "month_of_sale"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }

        record.month_of_sale = Decimal::ZERO;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_compound_periods_positive() {
        let mut record = InputRecord::default();
        record.yearly_compound_periods = Decimal::ZERO;
        match record.validate().unwrap_err() {
            BuyRentError::InvalidInput { field, .. } => {
                assert_eq!(field, "yearly_compound_periods")
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        let mut value = serde_json::to_value(InputRecord::default()).unwrap();
        value["garage_rent"] = serde_json::json!("100");
        assert!(serde_json::from_value::<InputRecord>(value).is_err());
    }

    #[test]
    fn test_entries_follow_table_order() {
        let entries = InputRecord::default().entries();
        assert_eq!(entries.len(), 15);
        assert_eq!(entries[8], ("annual_interest_rate", dec!(0.04)));
    }
}
