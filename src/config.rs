use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro-vision";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Route served by the proxy and targeted by `ProxyClient`.
pub const TRY_ON_PATH: &str = "/api/try-on";

pub const MAX_UPLOAD_BYTES: usize = 12 * 1024 * 1024;
pub const MAX_ENCODED_BYTES: usize = 4 * 1024 * 1024;
pub const MAX_DIMENSION: u32 = 1400;
pub const QUALITY_LADDER: [f32; 2] = [0.82, 0.72];

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PreparationConfig {
    pub max_upload_bytes: usize,
    pub max_dimension: u32,
    pub quality_ladder: Vec<f32>,
    pub max_encoded_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub preparation: PreparationConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = env::var("GOOGLE_API_KEY").ok();
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let model = env::var("GEMINI_MODEL").unwrap_or(defaults.model);
        let timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        GeminiConfig {
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint without the credential; the key travels as a query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for PreparationConfig {
    fn default() -> Self {
        PreparationConfig {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_dimension: MAX_DIMENSION,
            quality_ladder: QUALITY_LADDER.to_vec(),
            max_encoded_bytes: MAX_ENCODED_BYTES,
        }
    }
}

impl PreparationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_quality_ladder(mut self, ladder: Vec<f32>) -> Self {
        self.quality_ladder = ladder;
        self
    }

    pub fn with_max_encoded_bytes(mut self, bytes: usize) -> Self {
        self.max_encoded_bytes = bytes;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);

        ServerConfig {
            host,
            port,
            body_limit_bytes: defaults.body_limit_bytes,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            preparation: PreparationConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            server: ServerConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            preparation: PreparationConfig::default(),
        }
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_preparation(mut self, config: PreparationConfig) -> Self {
        self.preparation = config;
        self
    }
}
