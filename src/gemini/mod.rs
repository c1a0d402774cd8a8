pub mod backend;
pub mod image_client;
pub mod text_client;
pub mod transport;

use crate::{
    config::GeminiConfig,
    error::Result,
    models::{GenerateContentResponse, Modality},
};
use async_trait::async_trait;

pub use backend::GenerativeBackend;
pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use transport::Transport;

/// Gemini API client bound to one key. Create once at startup and share.
#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        if !config.has_api_key() {
            log::warn!("GEMINI_API_KEY is not set; requests will fail upstream authentication");
        }

        let transport = Transport::new(config)?;

        Ok(Self {
            text_client: TextClient::new(transport.clone()),
            image_client: ImageClient::new(transport),
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<GenerateContentResponse> {
        self.text_client.generate(model, prompt).await
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<GenerateContentResponse> {
        self.image_client.generate(model, prompt, modalities).await
    }
}
