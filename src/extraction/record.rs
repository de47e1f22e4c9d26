use super::ExtractionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Column order of the persisted file; matches the field order below
pub const RECORD_FIELDS: [&str; 6] = [
    "amount",
    "currency",
    "due_date",
    "description",
    "company",
    "contact",
];

/// One invoice extracted from an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub amount: f64,
    pub currency: String,
    pub due_date: String,
    pub description: String,
    pub company: String,
    pub contact: String,
}

impl ExtractionRecord {
    /// Parse the raw model reply into a record.
    ///
    /// The reply must be a JSON object. Missing or null fields become empty
    /// strings, non-string values keep their compact JSON text, and `amount`
    /// is coerced to a float with `0.0` as the fallback.
    pub fn from_model_output(raw: &str) -> Result<Self, ExtractionError> {
        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|e| ExtractionError::MalformedOutput {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;

        let Value::Object(fields) = value else {
            return Err(ExtractionError::MalformedOutput {
                raw: raw.to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };

        Ok(Self {
            amount: coerce_amount(fields.get("amount")),
            currency: text_field(&fields, "currency"),
            due_date: text_field(&fields, "due_date"),
            description: text_field(&fields, "description"),
            company: text_field(&fields, "company"),
            contact: text_field(&fields, "contact"),
        })
    }
}

fn text_field(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => return 0.0,
        Some(Value::String(s)) if s.trim().is_empty() => return 0.0,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(amount) if amount.is_finite() => amount,
        _ => {
            tracing::warn!(
                amount = %value.map(|v| v.to_string()).unwrap_or_default(),
                "could not convert amount to a number, defaulting to 0.0"
            );
            0.0
        }
    }
}
