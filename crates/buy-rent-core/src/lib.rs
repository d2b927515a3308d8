pub mod error;
pub mod inputs;
pub mod time_value;
pub mod types;
pub mod valuation;

#[cfg(feature = "report")]
pub mod report;

pub use error::BuyRentError;
pub use inputs::{input_fields, FieldDescriptor, FieldDomain, InputRecord};
pub use types::*;
pub use valuation::buy_vs_rent::{analyze_buy_vs_rent, evaluate, BuyVsRentOutput, ResultRecord};
pub use valuation::decision::Recommendation;

/// Standard result type for all buy-rent operations
pub type BuyRentResult<T> = Result<T, BuyRentError>;
