use crate::{
    config::{ApiVariant, GatewayConfig, GeminiConfig},
    error::{GatewayError, Result},
    gemini::GenerativeBackend,
    imaging::GeneratedImage,
    logger,
    models::{GenerationRequest, Modality, RequestDefaults, ValidatedRequest},
};
use std::sync::Arc;

const IMAGE_MODALITIES: [Modality; 2] = [Modality::Text, Modality::Image];

/// Result of one successful pass through the pipeline.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The prompt the image was generated from, enhanced or verbatim.
    pub prompt: String,
    pub enhanced: bool,
    pub image: GeneratedImage,
}

/// Enhance → generate → extract → re-encode, one linear pass per request.
pub struct ImageGateway {
    backend: Arc<dyn GenerativeBackend>,
    text_model: String,
    image_model: String,
    config: GatewayConfig,
    defaults: RequestDefaults,
}

impl ImageGateway {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        gemini: &GeminiConfig,
        config: GatewayConfig,
    ) -> Self {
        Self {
            backend,
            text_model: gemini.text_model.clone(),
            image_model: gemini.image_model.clone(),
            defaults: RequestDefaults::for_variant(config.variant),
            config,
        }
    }

    pub fn variant(&self) -> ApiVariant {
        self.config.variant
    }

    /// Validates the raw body, then runs the pipeline. Nothing upstream is
    /// contacted for an invalid request.
    pub async fn handle(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let request = request.validate(&self.defaults)?;
        self.generate(&request).await
    }

    pub async fn generate(&self, request: &ValidatedRequest) -> Result<GenerationOutcome> {
        let _timer = logger::timer("generate-image");

        let prompt = if request.enhance {
            self.enhance(request).await?
        } else {
            request.prompt.clone()
        };

        let image = self.render(&prompt).await?;

        if let Some(path) = &self.config.save_path {
            image.persist(path).await?;
        }

        log::info!(
            "Generated {}x{} image ({} bytes PNG)",
            image.width,
            image.height,
            image.png.len()
        );

        Ok(GenerationOutcome {
            prompt,
            enhanced: request.enhance,
            image,
        })
    }

    async fn enhance(&self, request: &ValidatedRequest) -> Result<String> {
        let instruction = request.enhancement_instruction();

        let response = self
            .backend
            .generate_text(&self.text_model, &instruction)
            .await
            .map_err(|e| e.in_stage("Error enhancing prompt"))?;

        let enhanced = response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Upstream("Failed to enhance prompt".into()))?;

        log::debug!("Enhanced prompt: {}", enhanced);
        Ok(enhanced)
    }

    async fn render(&self, prompt: &str) -> Result<GeneratedImage> {
        let response = self
            .backend
            .generate_content(&self.image_model, prompt, &IMAGE_MODALITIES)
            .await
            .map_err(|e| e.in_stage("Error generating image"))?;

        let inline = response.first_inline_data().ok_or_else(|| {
            log::warn!("Image model returned no inline image data");
            GatewayError::GenerationFailed
        })?;

        GeneratedImage::from_inline_data(inline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerateContentResponse, Part};
    use crate::testing::{sample_image, sample_image_part, MockBackend};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn gateway(backend: Arc<MockBackend>, config: GatewayConfig) -> ImageGateway {
        ImageGateway::new(backend, &GeminiConfig::new().with_models("text-m", "image-m"), config)
    }

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("imagegate-{}.png", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_prompt_contacts_nothing() {
        let backend = Arc::new(MockBackend::new());
        let gateway = gateway(backend.clone(), GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingPrompt));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_enhancement_disabled_uses_prompt_verbatim() {
        let backend = Arc::new(MockBackend::new());
        let gateway = gateway(
            backend.clone(),
            GatewayConfig::for_variant(ApiVariant::Parameterized),
        );

        let outcome = gateway
            .handle(GenerationRequest::new("  a red fox in snow ").with_enhancement(false))
            .await
            .unwrap();

        assert!(backend.text_prompts().is_empty());
        assert_eq!(backend.image_prompts(), vec!["  a red fox in snow ".to_string()]);
        assert_eq!(outcome.prompt, "  a red fox in snow ");
        assert!(!outcome.enhanced);
    }

    #[tokio::test]
    async fn test_enhancement_enabled_uses_first_candidate() {
        let backend = Arc::new(MockBackend::new().with_enhanced_text("a vivid red fox"));
        let gateway = gateway(
            backend.clone(),
            GatewayConfig::for_variant(ApiVariant::Parameterized),
        );

        let outcome = gateway
            .handle(GenerationRequest::new("a red fox").with_enhancement(true))
            .await
            .unwrap();

        let text_calls = backend.text_calls.lock().unwrap().clone();
        assert_eq!(text_calls.len(), 1);
        assert_eq!(text_calls[0].0, "text-m");
        assert!(text_calls[0].1.contains("a red fox"));

        let image_calls = backend.image_calls.lock().unwrap().clone();
        assert_eq!(image_calls[0].0, "image-m");
        assert_eq!(image_calls[0].1, "a vivid red fox");
        assert_eq!(image_calls[0].2, vec![Modality::Text, Modality::Image]);
        assert_eq!(outcome.prompt, "a vivid red fox");
    }

    #[tokio::test]
    async fn test_simple_variant_always_enhances() {
        let backend = Arc::new(MockBackend::new());
        let gateway = gateway(backend.clone(), GatewayConfig::default().without_save_path());

        gateway
            .handle(GenerationRequest::new("a cat").with_enhancement(false))
            .await
            .unwrap();

        assert_eq!(backend.text_prompts().len(), 1);
        assert_eq!(backend.image_prompts(), vec!["an enhanced prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_variant_count_never_multiplies_calls() {
        for count in [0, -1, 3] {
            let backend = Arc::new(MockBackend::new());
            let gateway = gateway(
                backend.clone(),
                GatewayConfig::for_variant(ApiVariant::Parameterized),
            );
            let mut request = GenerationRequest::new("a lone tree");
            request.num_variants = Some(count);

            gateway.handle(request).await.unwrap();
            assert_eq!(backend.image_prompts().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_output_reconstructs_original_pixels() {
        let backend = Arc::new(MockBackend::new());
        let gateway = gateway(backend, GatewayConfig::default().without_save_path());

        let outcome = gateway.handle(GenerationRequest::new("x")).await.unwrap();
        let png = STANDARD.decode(outcome.image.to_base64()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), sample_image().as_raw());
    }

    #[tokio::test]
    async fn test_first_inline_part_wins() {
        let other = {
            let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 255]));
            let mut bytes = Vec::new();
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
                .unwrap();
            Part::inline("image/png", STANDARD.encode(bytes))
        };
        let backend = Arc::new(MockBackend::new().with_image_parts(vec![
            Part::text("caption"),
            sample_image_part(),
            other,
        ]));
        let gateway = gateway(backend, GatewayConfig::default().without_save_path());

        let outcome = gateway.handle(GenerationRequest::new("x")).await.unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (3, 2));
    }

    #[tokio::test]
    async fn test_no_image_part_fails_without_writing() {
        let path = temp_path();
        let backend =
            Arc::new(MockBackend::new().with_image_parts(vec![Part::text("I cannot draw that")]));
        let gateway = gateway(backend, GatewayConfig::default().with_save_path(&path));

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::GenerationFailed));
        assert_eq!(err.status_code(), 500);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_leading_inline_part_fails() {
        let backend = Arc::new(MockBackend::new().with_image_parts(vec![
            Part::inline("image/png", ""),
            sample_image_part(),
        ]));
        let gateway = gateway(backend, GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::GenerationFailed));
    }

    #[tokio::test]
    async fn test_success_persists_to_save_path() {
        let path = temp_path();
        let backend = Arc::new(MockBackend::new());
        let gateway = gateway(backend, GatewayConfig::default().with_save_path(&path));

        let outcome = gateway.handle(GenerationRequest::new("x")).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), outcome.image.png);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_enhancement_errors_are_upstream() {
        let backend = Arc::new(MockBackend::new().with_text_error("quota exceeded"));
        let gateway = gateway(backend.clone(), GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error enhancing prompt: quota exceeded");
        assert!(backend.image_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates_fails_enhancement() {
        let backend =
            Arc::new(MockBackend::new().with_text_response(GenerateContentResponse::default()));
        let gateway = gateway(backend.clone(), GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to enhance prompt");
        assert!(backend.image_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_image_errors_are_upstream() {
        let backend = Arc::new(MockBackend::new().with_image_error("model overloaded"));
        let gateway = gateway(backend, GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Stage { .. }));
        assert_eq!(err.to_string(), "Error generating image: model overloaded");
        assert_eq!(err.detail(), "model overloaded");
    }

    #[tokio::test]
    async fn test_undecodable_image_is_unexpected() {
        let backend = Arc::new(
            MockBackend::new()
                .with_image_parts(vec![Part::inline("image/png", STANDARD.encode(b"nope"))]),
        );
        let gateway = gateway(backend, GatewayConfig::default().without_save_path());

        let err = gateway.handle(GenerationRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected(_)));
    }

    // Concurrent requests share the save path without coordination; only the
    // last writer's bytes are guaranteed to survive, so only a valid PNG is
    // asserted here.
    #[tokio::test]
    async fn test_concurrent_writes_leave_some_png() {
        let path = temp_path();
        let backend = Arc::new(MockBackend::new());
        let gateway = Arc::new(gateway(backend, GatewayConfig::default().with_save_path(&path)));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    gateway
                        .handle(GenerationRequest::new(format!("prompt {}", i)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
