use napi::Result as NapiResult;
use napi_derive::napi;
use serde_json::Value;

use buy_rent_core::InputRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a flat JSON object of field name to number (or numeric string),
/// layered over the reference defaults.
fn parse_input(input_json: &str) -> NapiResult<InputRecord> {
    InputRecord::from_partial_json(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_buy_vs_rent(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = buy_rent_core::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_buy_vs_rent(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = buy_rent_core::analyze_buy_vs_rent(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[napi]
pub fn buy_vs_rent_report(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let results = buy_rent_core::evaluate(&input).map_err(to_napi_error)?;
    let report = buy_rent_core::report::build_report(&results);
    serde_json::to_string(&report).map_err(to_napi_error)
}

#[napi]
pub fn input_fields() -> NapiResult<String> {
    let fields: Vec<Value> = buy_rent_core::input_fields()
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": f.name,
                "label": f.label(),
                "default": f.default,
                "help": f.help,
                "domain": f.domain,
            })
        })
        .collect();
    serde_json::to_string(&fields).map_err(to_napi_error)
}
