//! Fixtures shared by the unit tests.

use crate::error::{GatewayError, Result};
use crate::gemini::GenerativeBackend;
use crate::models::{GenerateContentResponse, Modality, Part};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Mutex;

pub fn sample_image() -> RgbaImage {
    RgbaImage::from_fn(3, 2, |x, y| {
        Rgba([(x * 80) as u8, (y * 120) as u8, 200, 255 - (x + y) as u8])
    })
}

pub fn sample_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(sample_image())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode fixture");
    bytes
}

pub fn sample_image_part() -> Part {
    Part::inline("image/png", STANDARD.encode(sample_png()))
}

enum Reply {
    Response(GenerateContentResponse),
    Error(String),
}

impl Reply {
    fn get(&self) -> Result<GenerateContentResponse> {
        match self {
            Reply::Response(response) => Ok(response.clone()),
            Reply::Error(message) => Err(GatewayError::Upstream(message.clone())),
        }
    }
}

/// Backend that replays canned responses and records every prompt it receives.
pub struct MockBackend {
    text: Reply,
    image: Reply,
    pub text_calls: Mutex<Vec<(String, String)>>,
    pub image_calls: Mutex<Vec<(String, String, Vec<Modality>)>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            text: Reply::Response(GenerateContentResponse::from_parts(vec![Part::text(
                "an enhanced prompt",
            )])),
            image: Reply::Response(GenerateContentResponse::from_parts(vec![
                Part::text("Here is your image"),
                sample_image_part(),
            ])),
            text_calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_enhanced_text(mut self, text: &str) -> Self {
        self.text = Reply::Response(GenerateContentResponse::from_parts(vec![Part::text(text)]));
        self
    }

    pub fn with_text_response(mut self, response: GenerateContentResponse) -> Self {
        self.text = Reply::Response(response);
        self
    }

    pub fn with_text_error(mut self, message: &str) -> Self {
        self.text = Reply::Error(message.to_string());
        self
    }

    pub fn with_image_parts(mut self, parts: Vec<Part>) -> Self {
        self.image = Reply::Response(GenerateContentResponse::from_parts(parts));
        self
    }

    pub fn with_image_error(mut self, message: &str) -> Self {
        self.image = Reply::Error(message.to_string());
        self
    }

    pub fn text_prompts(&self) -> Vec<String> {
        self.text_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt, _)| prompt.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.text_calls.lock().unwrap().len() + self.image_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<GenerateContentResponse> {
        self.text_calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.text.get()
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<GenerateContentResponse> {
        self.image_calls.lock().unwrap().push((
            model.to_string(),
            prompt.to_string(),
            modalities.to_vec(),
        ));
        self.image.get()
    }
}
