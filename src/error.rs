use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Upstream(String),
    /// A failure from one pipeline stage, prefixed with that stage.
    #[error("{context}: {source}")]
    Stage {
        context: &'static str,
        #[source]
        source: Box<GatewayError>,
    },
    #[error("Image generation failed")]
    GenerationFailed,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status the error is reported with at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::MissingPrompt | GatewayError::InvalidRequest(_) => 400,
            GatewayError::Stage { source, .. } => source.status_code(),
            _ => 500,
        }
    }

    pub fn in_stage(self, context: &'static str) -> Self {
        GatewayError::Stage {
            context,
            source: Box::new(self),
        }
    }

    /// The message without any stage prefix.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Stage { source, .. } => source.detail(),
            other => other.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Upstream(format!("Gemini request failed: {}", e))
    }
}

impl From<image::ImageError> for GatewayError {
    fn from(e: image::ImageError) -> Self {
        GatewayError::Unexpected(e.to_string())
    }
}

impl From<base64::DecodeError> for GatewayError {
    fn from(e: base64::DecodeError) -> Self {
        GatewayError::Unexpected(format!("inline image data is not valid base64: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
