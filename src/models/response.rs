use crate::config::ApiVariant;
use crate::gateway::GenerationOutcome;
use serde::Serialize;

/// Success body of `POST /generate-image/`, shaped by the configured variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Simple {
        enhanced_prompt: String,
        image_base64: String,
    },
    Parameterized {
        image: String,
    },
}

impl ResponsePayload {
    pub fn from_outcome(variant: ApiVariant, outcome: &GenerationOutcome) -> Self {
        match variant {
            ApiVariant::Simple => ResponsePayload::Simple {
                enhanced_prompt: outcome.prompt.clone(),
                image_base64: outcome.image.to_base64(),
            },
            ApiVariant::Parameterized => ResponsePayload::Parameterized {
                image: outcome.image.to_data_uri(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub variant: &'static str,
    pub version: &'static str,
}
