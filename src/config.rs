use crate::error::{GatewayError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_SAVE_PATH: &str = "generated_image.png";

/// Upstream connection settings shared by the text and image clients.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Sent as the `key` query parameter; absence is tolerated until a call fails upstream.
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    /// Per-request timeout; `None` leaves the client without one.
    pub timeout: Option<Duration>,
}

/// Which request defaults and response shape the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVariant {
    /// Prompt plus style/aspect ratio, always enhanced, bare base64 in the response.
    Simple,
    /// Full presentation parameters, opt-in enhancement, data URI in the response.
    Parameterized,
}

impl ApiVariant {
    /// Case-insensitive; only `simple` and `parameterized` are recognised.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ApiVariant::Simple),
            "parameterized" => Ok(ApiVariant::Parameterized),
            other => Err(GatewayError::Config(format!(
                "unknown gateway variant '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVariant::Simple => "simple",
            ApiVariant::Parameterized => "parameterized",
        }
    }
}

/// Per-deployment pipeline behaviour.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub variant: ApiVariant,
    /// Where each generated PNG is overwritten, if anywhere.
    pub save_path: Option<PathBuf>,
}

/// Top-level server configuration, normally read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini: GeminiConfig,
    pub gateway: GatewayConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the enhancement and image model names.
    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// True when a non-empty key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map_or(false, |key| !key.is_empty())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::for_variant(ApiVariant::Simple)
    }
}

impl GatewayConfig {
    /// The simple variant persists every image to the fixed save path; the
    /// parameterized one does not.
    pub fn for_variant(variant: ApiVariant) -> Self {
        let save_path = match variant {
            ApiVariant::Simple => Some(PathBuf::from(DEFAULT_SAVE_PATH)),
            ApiVariant::Parameterized => None,
        };
        GatewayConfig { variant, save_path }
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn without_save_path(mut self) -> Self {
        self.save_path = None;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            gemini: GeminiConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the process environment. `.env` loading happens in the binary.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset keys keep
    /// their defaults; `GEMINI_API_KEY` is not required here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| GatewayError::Config(format!("invalid PORT '{}'", port)))?;
        }

        let mut gemini = GeminiConfig::default();
        gemini.api_key = lookup("GEMINI_API_KEY");
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            gemini.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            gemini.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            gemini.image_model = model;
        }
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                GatewayError::Config(format!("invalid GEMINI_TIMEOUT_SECS '{}'", secs))
            })?;
            gemini.timeout = Some(Duration::from_secs(secs));
        }
        config.gemini = gemini;

        let variant = match lookup("GATEWAY_VARIANT") {
            Some(value) => ApiVariant::parse(&value)?,
            None => ApiVariant::Simple,
        };
        let mut gateway = GatewayConfig::for_variant(variant);
        match lookup("GATEWAY_SAVE_PATH").as_deref() {
            Some("") | Some("none") => gateway.save_path = None,
            Some(path) => gateway.save_path = Some(PathBuf::from(path)),
            None => {}
        }
        config.gateway = gateway;

        Ok(config)
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_gateway(mut self, config: GatewayConfig) -> Self {
        self.gateway = config;
        self
    }

    /// `host:port` as passed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
