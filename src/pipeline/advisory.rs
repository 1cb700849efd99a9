//! Advisory text generation through a local LLM runtime.
//!
//! The primary path shells out to `ollama run <model>` with a strict
//! plain-text prompt and a hard timeout. Every failure mode — missing
//! binary, non-zero exit, timeout, unusable output — collapses into the
//! fixed fallback report, so callers never see an error from this module.
//! One attempt, no retries: advisory text is best-effort enrichment.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::Settings;

/// Produces the six-section farmer advisory for a disease.
///
/// Infallible by contract — implementations degrade internally.
#[async_trait]
pub trait AdvisoryGenerator: Send + Sync {
    async fn generate(&self, disease_name: &str) -> String;
}

/// Internal failure taxonomy — logged, never propagated.
#[derive(Debug, thiserror::Error)]
enum AdvisoryError {
    #[error("failed to spawn '{bin}': {source}")]
    Spawn {
        bin: String,
        source: std::io::Error,
    },
    #[error("I/O error talking to the model process: {0}")]
    Io(#[from] std::io::Error),
    #[error("model process exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },
    #[error("model process did not finish within {0}s")]
    Timeout(u64),
    #[error("model process produced no usable output")]
    EmptyOutput,
}

/// Advisory generator backed by the Ollama CLI.
pub struct OllamaAdvisory {
    bin: String,
    model: String,
    timeout: Duration,
}

impl OllamaAdvisory {
    pub fn new(bin: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            bin: bin.into(),
            model: model.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.ollama_bin.clone(),
            settings.ollama_model.clone(),
            settings.advisory_timeout_secs,
        )
    }

    /// One subprocess round-trip: prompt on stdin, report from stdout.
    async fn run_model(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let mut child = Command::new(&self.bin)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reap the process if the timeout drops the wait future.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AdvisoryError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A runtime that closes stdin after reading enough prompt is
            // not an error — keep waiting for its output.
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                tracing::debug!(error = %e, "Model process closed stdin early");
            }
            // Closing stdin signals end of prompt.
            drop(stdin);
        }

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AdvisoryError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(AdvisoryError::NonZeroExit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AdvisoryError::EmptyOutput);
        }
        Ok(text)
    }
}

#[async_trait]
impl AdvisoryGenerator for OllamaAdvisory {
    async fn generate(&self, disease_name: &str) -> String {
        let prompt = build_prompt(disease_name);

        match self.run_model(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    disease = disease_name,
                    model = %self.model,
                    error = %e,
                    "Advisory generation failed, serving fallback"
                );
                fallback_advisory(disease_name)
            }
        }
    }
}

/// Prompt demanding exactly the six-section plain-text report.
fn build_prompt(disease_name: &str) -> String {
    format!(
        "Disease: {disease_name}\n\n\
         Return ONLY this format with exactly two lines per section:\n\n\
         1 Cause\n\
         2 Symptoms\n\
         3 Treatment Steps\n\
         4 Prevention\n\
         5 Best Pesticide Types\n\
         7 Spray Schedule\n\n\
         Use simple farmer-friendly language.\n\
         No extra paragraphs.\n\
         No markdown formatting.\n\
         No explanations outside sections."
    )
}

/// Deterministic advisory used whenever the model call fails: the same six
/// sections, filled with generic consult-an-expert guidance.
pub fn fallback_advisory(disease_name: &str) -> String {
    format!(
        "1 Cause\nUnknown cause for {disease_name}.\n\n\
         2 Symptoms\nPlease consult local agricultural expert.\n\n\
         3 Treatment Steps\nSeek professional advice.\n\n\
         4 Prevention\nMonitor crops regularly.\n\n\
         5 Best Pesticide Types\nConsult local extension service.\n\n\
         7 Spray Schedule\nAs recommended by experts."
    )
}

/// Mock generator for tests — returns a canned report.
pub struct MockAdvisory {
    text: String,
}

impl MockAdvisory {
    pub fn new(text: &str) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl AdvisoryGenerator for MockAdvisory {
    async fn generate(&self, _disease_name: &str) -> String {
        self.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: &[&str] = &[
        "Cause",
        "Symptoms",
        "Treatment Steps",
        "Prevention",
        "Best Pesticide Types",
        "Spray Schedule",
    ];

    #[test]
    fn fallback_contains_all_sections_and_disease_name() {
        let text = fallback_advisory("Early Blight");
        for section in SECTIONS {
            assert!(text.contains(section), "missing section {section}");
        }
        assert!(text.contains("Early Blight"));
    }

    #[test]
    fn fallback_handles_empty_and_unicode_names() {
        assert!(!fallback_advisory("").is_empty());
        let text = fallback_advisory("तोल्ल ఫాతు");
        assert!(text.contains("तोल्ल ఫాతు"));
    }

    #[test]
    fn prompt_demands_plain_text_sections() {
        let prompt = build_prompt("Leaf Rust");
        assert!(prompt.starts_with("Disease: Leaf Rust"));
        assert!(prompt.contains("No markdown formatting."));
        for section in SECTIONS {
            assert!(prompt.contains(section));
        }
    }

    #[tokio::test]
    async fn missing_binary_degrades_to_fallback() {
        let generator = OllamaAdvisory::new("ollama-binary-that-does-not-exist", "llama3.1:8b", 5);
        let text = generator.generate("Late Blight").await;
        assert_eq!(text, fallback_advisory("Late Blight"));
        assert!(text.contains("Late Blight"));
    }

    #[tokio::test]
    async fn failing_process_degrades_to_fallback() {
        // `cat run <model>` exits non-zero (no such file), exercising the
        // non-zero-exit path end to end.
        let generator = OllamaAdvisory::new("cat", "llama3.1:8b", 5);
        let text = generator.generate("Powdery Mildew").await;
        assert_eq!(text, fallback_advisory("Powdery Mildew"));
    }

    #[tokio::test]
    async fn successful_process_output_is_returned_verbatim() {
        // `echo run <model>` exits zero with non-empty stdout, exercising
        // the success path without a real model runtime.
        let generator = OllamaAdvisory::new("echo", "llama3.1:8b", 5);
        let text = generator.generate("Early Blight").await;
        assert_eq!(text, "run llama3.1:8b");
    }

    #[tokio::test]
    async fn mock_returns_canned_text() {
        let generator = MockAdvisory::new("canned advisory");
        assert_eq!(generator.generate("anything").await, "canned advisory");
    }
}
