//! Process configuration — application constants plus the env-driven
//! `Settings` read once at startup and shared through `AppState`.

use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ArogyaKrishi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Classifier input edge: images are normalized to 224x224 before inference.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// Runtime settings, read from the environment.
///
/// Every field has a default so the server starts with zero configuration.
/// `DATABASE_URL` keeps the historical name even though the value is a
/// plain SQLite file path.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database path.
    pub database_url: PathBuf,
    /// Maximum accepted upload size in megabytes.
    pub max_image_size_mb: usize,
    /// Serve randomized plausible classifications instead of a real model.
    pub use_mock_inference: bool,
    /// Path to the plant-disease ONNX model file.
    pub model_path: PathBuf,
    /// Ollama binary invoked for advisory generation.
    pub ollama_bin: String,
    /// Ollama model tag passed to `ollama run`.
    pub ollama_model: String,
    /// Upper bound on one advisory subprocess call, in seconds.
    pub advisory_timeout_secs: u64,
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("arogya_krishi.db")),
            max_image_size_mb: parse_env("MAX_IMAGE_SIZE_MB", 10),
            use_mock_inference: parse_env("USE_MOCK_INFERENCE", false),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/plant_disease.onnx")),
            ollama_bin: std::env::var("OLLAMA_BIN").unwrap_or_else(|_| "ollama".into()),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.1:8b".into()),
            advisory_timeout_secs: parse_env("ADVISORY_TIMEOUT_SECS", 30),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into()),
        }
    }

    /// Upload cap in bytes.
    pub fn max_image_size_bytes(&self) -> usize {
        self.max_image_size_mb * 1024 * 1024
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: PathBuf::from("arogya_krishi.db"),
            max_image_size_mb: 10,
            use_mock_inference: false,
            model_path: PathBuf::from("models/plant_disease.onnx"),
            ollama_bin: "ollama".into(),
            ollama_model: "llama3.1:8b".into(),
            advisory_timeout_secs: 30,
            bind_addr: "0.0.0.0:8000".into(),
        }
    }
}

/// Parse an env var, falling back to `default` when unset or unparseable.
/// A set-but-garbage value is logged rather than silently ignored.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, raw = %raw, "Unparseable env value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.max_image_size_mb, 10);
        assert!(!settings.use_mock_inference);
        assert_eq!(settings.advisory_timeout_secs, 30);
        assert_eq!(settings.ollama_model, "llama3.1:8b");
    }

    #[test]
    fn max_size_converts_to_bytes() {
        let settings = Settings {
            max_image_size_mb: 2,
            ..Settings::default()
        };
        assert_eq!(settings.max_image_size_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
