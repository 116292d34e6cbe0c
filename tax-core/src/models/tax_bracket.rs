use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of the progressive income tax schedule.
///
/// Brackets are stored by their upper limit only; the lower bound of a
/// bracket is the upper limit of the bracket before it (or zero for the
/// first). `upper_limit == None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
    pub label: String,
}

impl TaxBracket {
    pub fn bounded(
        upper_limit: Decimal,
        rate: Decimal,
        label: impl Into<String>,
    ) -> Self {
        Self {
            upper_limit: Some(upper_limit),
            rate,
            label: label.into(),
        }
    }

    pub fn unbounded(
        rate: Decimal,
        label: impl Into<String>,
    ) -> Self {
        Self {
            upper_limit: None,
            rate,
            label: label.into(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_limit.is_none()
    }
}
