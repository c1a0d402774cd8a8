use crate::{
    config::GeminiConfig,
    error::{GatewayError, Result},
    models::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
};
use reqwest::{Client, StatusCode};

/// Shared HTTP plumbing for the `generateContent` endpoint.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Gemini returned {} for model {}", status, model);
            return Err(GatewayError::Upstream(error_message(status, &body)));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GatewayError::Upstream(format!("invalid Gemini response: {}", e)))
    }
}

/// Prefers the API's own error message over the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("{} {}", status.as_u16(), envelope.error.message)
        }
        _ if body.trim().is_empty() => status.to_string(),
        _ => format!("{} {}", status.as_u16(), body.trim()),
    }
}
