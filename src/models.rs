use crate::error::AppError;
use crate::extraction::ExtractionRecord;
use serde::{Deserialize, Serialize};

// Chat completion request; missing fields surface as validation errors
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct PrefillRequest {
    #[serde(default)]
    pub email_text: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PrefillResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractionRecord>,
}

impl PrefillResponse {
    pub fn extracted(record: ExtractionRecord) -> Self {
        Self {
            success: true,
            message: "Data extracted and written successfully.".to_string(),
            data: Some(record),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required and must not be empty")));
    }
    Ok(())
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("model_name", &self.model_name)?;
        require("prompt", &self.prompt)
    }
}

impl PrefillRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("email_text", &self.email_text)?;
        require("model", &self.model)
    }
}
