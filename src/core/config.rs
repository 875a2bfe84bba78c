use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::services::llm::LlmConfig;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output_file")]
    pub output_file: String,

    #[serde(default)]
    pub unattended: bool,

    pub llm: LlmConfig,

    #[serde(default)]
    pub book: BookConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookConfig {
    /// Skips the interactive prompt when set.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_min_category_length")]
    pub min_category_length: usize,
    #[serde(default = "default_chapter_count")]
    pub chapter_count: usize,
    #[serde(default = "default_total_words")]
    pub total_words: u64,
    #[serde(default = "default_section_words")]
    pub section_words: u64,
    #[serde(default = "default_style_instruction")]
    pub style_instruction: String,
    #[serde(default = "default_section_placeholder")]
    pub section_placeholder: String,
    #[serde(default = "default_section_break")]
    pub section_break: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            category: None,
            min_category_length: default_min_category_length(),
            chapter_count: default_chapter_count(),
            total_words: default_total_words(),
            section_words: default_section_words(),
            style_instruction: default_style_instruction(),
            section_placeholder: default_section_placeholder(),
            section_break: default_section_break(),
        }
    }
}

fn default_output_file() -> String {
    "generated_book.txt".to_string()
}
fn default_min_category_length() -> usize {
    3
}
fn default_chapter_count() -> usize {
    12
}
fn default_total_words() -> u64 {
    60_000
}
fn default_section_words() -> u64 {
    1_000
}
fn default_style_instruction() -> String {
    "Each paragraph must be exactly 8 sentences long. Write in a formal, book-like style."
        .to_string()
}
fn default_section_placeholder() -> String {
    "Section could not be generated due to errors.".to_string()
}
fn default_section_break() -> String {
    "*****".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", CONFIG_FILE);
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::ErrorKind;

    #[test]
    fn test_minimal_config_uses_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "llm:\n  provider: openai\n  openai:\n    api_key: sk-test\n",
        )?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.output_file, "generated_book.txt");
        assert!(!config.unattended);
        assert_eq!(config.llm.timeout_seconds, 600);
        assert_eq!(config.llm.retry.max_attempts, 3);
        let openai = config.llm.openai.as_ref().unwrap();
        assert_eq!(openai.model, "gpt-3.5-turbo");
        assert_eq!(config.book.chapter_count, 12);
        assert_eq!(config.book.section_break, "*****");
        assert!(config.book.category.is_none());
        Ok(())
    }

    #[test]
    fn test_full_config_overrides() -> Result<()> {
        let yaml = r#"
output_file: out/book.txt
unattended: true
llm:
  provider: ollama
  timeout_seconds: 30
  temperature: 0.7
  retry:
    max_attempts: 5
    initial_delay_ms: 250
    jitter: true
    retry_on: [timeout, rate_limited]
  ollama:
    base_url: http://127.0.0.1:11434
    model: llama3
book:
  category: sourdough baking
  chapter_count: 8
  section_break: "———"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml)?;
        assert_eq!(config.output_file, "out/book.txt");
        assert!(config.unattended);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.temperature, Some(0.7));
        assert_eq!(config.llm.retry.max_attempts, 5);
        assert!(config.llm.retry.jitter);
        assert_eq!(
            config.llm.retry.retry_on,
            vec![ErrorKind::Timeout, ErrorKind::RateLimited]
        );
        assert_eq!(config.book.category.as_deref(), Some("sourdough baking"));
        assert_eq!(config.book.chapter_count, 8);
        assert_eq!(config.book.total_words, 60_000);
        assert_eq!(config.book.section_break, "———");
        Ok(())
    }

    #[test]
    fn test_missing_llm_section_is_an_error() {
        let result: std::result::Result<Config, _> = serde_yaml_ng::from_str("unattended: true");
        assert!(result.is_err());
    }
}
