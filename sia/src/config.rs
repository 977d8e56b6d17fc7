use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub remote: RemoteConfig,
    pub ocr: OcrConfig,
    pub render: RenderConfig,
}

/// Where the limits and secret resources are read from.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// When set, resources are fetched over HTTP relative to this URL.
    pub base_url: Option<String>,
    /// Local directory used when no base URL is configured.
    pub dir: String,
    pub limits_resource: String,
    pub secret_resource: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub languages: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub target_width: u32,
    pub jpeg_quality: u8,
    pub pdfium_library_path: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            dir: "config".to_string(),
            limits_resource: "limits.json".to_string(),
            secret_resource: "secret.txt".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            api_key: None,
            base_url: None,
            languages: "eng".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_width: 1000,
            jpeg_quality: 80,
            pdfium_library_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let remote = RemoteConfig::default();
        let ocr = OcrConfig::default();
        let render = RenderConfig::default();

        Self {
            remote: RemoteConfig {
                base_url: env_non_empty("SIA_CONFIG_URL"),
                dir: env::var("SIA_CONFIG_DIR").unwrap_or(remote.dir),
                limits_resource: env::var("SIA_LIMITS_RESOURCE").unwrap_or(remote.limits_resource),
                secret_resource: env::var("SIA_SECRET_RESOURCE").unwrap_or(remote.secret_resource),
                timeout_secs: parse_env_or("SIA_CONFIG_TIMEOUT", remote.timeout_secs),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or(ocr.model),
                api_key: env_non_empty("OCR_API_KEY"),
                base_url: env_non_empty("OCR_BASE_URL"),
                languages: env::var("OCR_LANGUAGES").unwrap_or(ocr.languages),
                timeout_secs: parse_env_or("OCR_TIMEOUT", ocr.timeout_secs),
            },
            render: RenderConfig {
                target_width: parse_env_or("PDF_RENDER_WIDTH", render.target_width),
                jpeg_quality: parse_env_or("PDF_JPEG_QUALITY", render.jpeg_quality).clamp(1, 100),
                pdfium_library_path: env_non_empty("PDFIUM_LIBRARY_PATH"),
            },
        }
    }
}

/// Known OCR providers that speak the OpenAI vision chat API
pub const KNOWN_OCR_API_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an OCR model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if prefix_lower == "local" || KNOWN_OCR_API_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to local provider
    ("local", model)
}
