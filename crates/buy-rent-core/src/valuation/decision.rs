use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Buy / don't-buy verdict derived from the sign of the present-value net income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Buy,
    DontBuy,
}

impl Recommendation {
    /// Strictly positive net income recommends buying; zero does not.
    pub fn from_net_income(net_income: Money) -> Self {
        if net_income > Decimal::ZERO {
            Recommendation::Buy
        } else {
            Recommendation::DontBuy
        }
    }

    pub fn is_profitable(&self) -> bool {
        matches!(self, Recommendation::Buy)
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Yes",
            Recommendation::DontBuy => "No",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Buy => {
                "**Yes**. According to this simulation, buying is profitable."
            }
            Recommendation::DontBuy => {
                "**No**. According to this simulation, buying is unprofitable."
            }
        }
    }
}
