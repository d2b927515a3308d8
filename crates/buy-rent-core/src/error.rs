use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuyRentError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Degenerate rate: monthly effective rate {rate} is indistinguishable from zero")]
    DegenerateRate { rate: Decimal },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Arithmetic overflow in {stage}")]
    ArithmeticOverflow { stage: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BuyRentError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BuyRentError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(stage: &str) -> Self {
        BuyRentError::ArithmeticOverflow {
            stage: stage.into(),
        }
    }
}

impl From<serde_json::Error> for BuyRentError {
    fn from(e: serde_json::Error) -> Self {
        BuyRentError::SerializationError(e.to_string())
    }
}
