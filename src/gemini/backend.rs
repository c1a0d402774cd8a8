use crate::{
    error::Result,
    models::{GenerateContentResponse, Modality},
};
use async_trait::async_trait;

/// The two generative capabilities the gateway consumes.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Plain text completion for `prompt`.
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<GenerateContentResponse>;

    /// Multimodal generation; the response may mix text and inline image parts.
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<GenerateContentResponse>;
}
