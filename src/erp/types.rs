//! Wire types shared by the ERP endpoints.
//!
//! Every backend answer is wrapped in an [`Envelope`]; the payloads themselves
//! are the domain types in `production` and `print`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::production::Stage;

/// Standard response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the stage-update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageUpdate {
    pub stage: Stage,
}

/// Deserializes a strictly positive decimal sent either as a JSON number or
/// as a numeric string (`"6.00"`), which is how the backend serializes
/// NUMERIC columns. Zero, negative and non-finite values are rejected.
pub fn positive_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid decimal: {s:?}")))?,
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(D::Error::custom(format!(
            "expected a positive decimal, got {value}"
        )));
    }
    Ok(value)
}
