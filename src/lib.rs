//! Imagegate: an HTTP gateway that turns a prompt into a base64 PNG by way of
//! Gemini's text and image generation models.

pub mod config;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod imaging;
pub mod logger;
pub mod models;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ApiVariant, Config, GatewayConfig, GeminiConfig};
pub use error::{GatewayError, Result};
pub use gateway::{GenerationOutcome, ImageGateway};
pub use gemini::{GeminiClient, GenerativeBackend, ImageClient, TextClient};
pub use imaging::GeneratedImage;
pub use models::*;
