use crate::config::ApiVariant;
use crate::error::{GatewayError, Result};
use serde::Deserialize;

const ENHANCEMENT_LEAD: &str =
    "Enhance this image prompt with more vivid details while keeping the meaning intact";

/// Body of `POST /generate-image/`.
///
/// Every field is optional on the wire so that a missing prompt is reported
/// as [`GatewayError::MissingPrompt`] instead of a body parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    pub prompt: Option<String>,
    pub enhance_prompt: Option<bool>,
    pub style: Option<String>,
    pub aspect_ratio: Option<String>,
    pub detail_level: Option<String>,
    pub lighting_mood: Option<String>,
    pub camera_view: Option<String>,
    pub composition: Option<String>,
    pub color_palette: Option<String>,
    pub background: Option<String>,
    /// Requested image count. Any integer is accepted; one image is produced.
    pub num_variants: Option<i64>,
}

impl GenerationRequest {
    /// A request carrying only a prompt; everything else falls back to the variant defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Sets `enhance_prompt`. Ignored by the simple variant, which always enhances.
    pub fn with_enhancement(mut self, enabled: bool) -> Self {
        self.enhance_prompt = Some(enabled);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    /// Checks the prompt and fills every unset parameter from `defaults`.
    ///
    /// A missing, empty or whitespace-only prompt is the only rejection.
    /// Scene parameters are dropped when `defaults` carries none.
    pub fn validate(self, defaults: &RequestDefaults) -> Result<ValidatedRequest> {
        let prompt = match self.prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => return Err(GatewayError::MissingPrompt),
        };

        let enhance = match defaults.enhancement {
            Enhancement::Always => true,
            Enhancement::Optional { default } => self.enhance_prompt.unwrap_or(default),
        };

        let num_variants = self.num_variants.unwrap_or(defaults.num_variants);

        let scene = defaults.scene.as_ref().map(|scene| SceneParams {
            detail_level: self
                .detail_level
                .unwrap_or_else(|| scene.detail_level.clone()),
            lighting_mood: self
                .lighting_mood
                .unwrap_or_else(|| scene.lighting_mood.clone()),
            camera_view: self
                .camera_view
                .unwrap_or_else(|| scene.camera_view.clone()),
            composition: self
                .composition
                .unwrap_or_else(|| scene.composition.clone()),
            color_palette: self
                .color_palette
                .unwrap_or_else(|| scene.color_palette.clone()),
            background: self
                .background
                .unwrap_or_else(|| scene.background.clone()),
        });

        Ok(ValidatedRequest {
            prompt,
            enhance,
            style: self.style.unwrap_or_else(|| defaults.style.clone()),
            aspect_ratio: self
                .aspect_ratio
                .unwrap_or_else(|| defaults.aspect_ratio.clone()),
            scene,
            num_variants,
        })
    }
}

/// Whether the prompt goes through the text model before image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    Always,
    Optional { default: bool },
}

/// Scene-level presentation parameters; only the parameterized variant carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneParams {
    pub detail_level: String,
    pub lighting_mood: String,
    pub camera_view: String,
    pub composition: String,
    pub color_palette: String,
    pub background: String,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            detail_level: "High".to_string(),
            lighting_mood: "Bright & Vibrant".to_string(),
            camera_view: "Wide-angle".to_string(),
            composition: "Centered".to_string(),
            color_palette: "Vibrant".to_string(),
            background: "Detailed".to_string(),
        }
    }
}

/// Per-variant default table used by [`GenerationRequest::validate`].
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub enhancement: Enhancement,
    pub style: String,
    pub aspect_ratio: String,
    pub scene: Option<SceneParams>,
    pub num_variants: i64,
}

impl RequestDefaults {
    /// Prompt, style and aspect ratio only; always enhanced.
    pub fn simple() -> Self {
        Self {
            enhancement: Enhancement::Always,
            style: "Default".to_string(),
            aspect_ratio: "1:1".to_string(),
            scene: None,
            num_variants: 1,
        }
    }

    /// Full presentation parameter set; enhancement is opt-in.
    pub fn parameterized() -> Self {
        Self {
            enhancement: Enhancement::Optional { default: false },
            style: "Realistic".to_string(),
            aspect_ratio: "16:9".to_string(),
            scene: Some(SceneParams::default()),
            num_variants: 1,
        }
    }

    pub fn for_variant(variant: ApiVariant) -> Self {
        match variant {
            ApiVariant::Simple => Self::simple(),
            ApiVariant::Parameterized => Self::parameterized(),
        }
    }
}

/// A request with its prompt checked and every default resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub prompt: String,
    pub enhance: bool,
    pub style: String,
    pub aspect_ratio: String,
    pub scene: Option<SceneParams>,
    /// Accepted for compatibility; a single image is generated regardless.
    pub num_variants: i64,
}

impl ValidatedRequest {
    /// Instruction sent to the text model when the prompt is enhanced.
    pub fn enhancement_instruction(&self) -> String {
        let mut instruction = format!(
            "{}: {}, Style: {}, Aspect Ratio: {}",
            ENHANCEMENT_LEAD, self.prompt, self.style, self.aspect_ratio
        );
        if let Some(scene) = &self.scene {
            instruction.push_str(&format!(
                ", Detail Level: {}, Lighting: {}, Camera View: {}, Composition: {}, Color Palette: {}, Background: {}",
                scene.detail_level,
                scene.lighting_mood,
                scene.camera_view,
                scene.composition,
                scene.color_palette,
                scene.background
            ));
        }
        instruction
    }
}
