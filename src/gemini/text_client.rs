use super::transport::Transport;
use crate::{
    error::Result,
    models::{GenerateContentRequest, GenerateContentResponse},
};

#[derive(Clone)]
pub struct TextClient {
    transport: Transport,
}

impl TextClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateContentResponse> {
        log::info!("Invoking text model: {}", model);
        log::debug!("Text generation prompt: {}", prompt);

        let request = GenerateContentRequest::from_prompt(prompt);
        let response = self.transport.generate_content(model, &request).await?;

        log::debug!(
            "Text model {} returned {} candidate(s)",
            model,
            response.candidates.len()
        );
        Ok(response)
    }
}
