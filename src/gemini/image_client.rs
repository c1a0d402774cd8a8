use super::transport::Transport;
use crate::{
    error::Result,
    models::{GenerateContentRequest, GenerateContentResponse, Modality},
};

#[derive(Clone)]
pub struct ImageClient {
    transport: Transport,
}

impl ImageClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest::from_prompt(prompt).with_modalities(modalities);

        log::info!("Generating image with model: {}", model);

        let response = self.transport.generate_content(model, &request).await?;

        let inline_parts = response
            .first_candidate_parts()
            .iter()
            .filter(|part| part.inline_data.is_some())
            .count();
        log::debug!(
            "Image model {} returned {} inline part(s)",
            model,
            inline_parts
        );

        Ok(response)
    }
}
