//! Configuration for datecheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DATECHECK_HOME, DATECHECK_OLLAMA_URL, DATECHECK_MODEL)
//! 2. Config file (.datecheck/config.yaml)
//! 3. Defaults (~/.datecheck, local Ollama, gemma3:1b)
//!
//! Config file discovery:
//! - Searches current directory and parents for .datecheck/config.yaml
//! - A relative `home` is resolved against the .datecheck/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::ollama::DEFAULT_BASE_URL;
use crate::adapters::GenerationParams;
use crate::core::questions::{DEFAULT_CONTEXT, DEFAULT_FALLBACK};
use crate::core::{HarnessConfig, PromptStyle, QuestionGenerator, QuestionRule};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_MODEL: &str = "gemma3:1b";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer questions accurately and concisely. When asked about dates, provide the specific date in a clear format.";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub harness: HarnessSection,
    #[serde(default)]
    pub prompt: PromptSection,
    #[serde(default)]
    pub sweep: SweepSection,
    /// Extra rules, tried before the built-in table
    #[serde(default)]
    pub question_rules: Vec<QuestionRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSection {
    pub base_url: Option<String>,
    pub name: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationSection {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub seed: Option<u64>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessSection {
    pub max_concurrency: Option<usize>,
    pub sample_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptSection {
    /// "question" or "context"
    pub style: Option<String>,
    pub context: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SweepSection {
    pub temperatures: Option<Vec<f64>>,
    pub trials: Option<u32>,
}

/// Model server settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSettings {
    pub base_url: String,
    pub name: String,
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            name: DEFAULT_MODEL.to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Temperature sweep settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSettings {
    pub temperatures: Vec<f64>,
    pub trials: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            temperatures: vec![0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
            trials: 10,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Directory for reports and fetched facts
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub model: ModelSettings,
    pub generation: GenerationParams,
    pub system_prompt: String,
    pub prompt_style: PromptStyle,
    pub fallback_question: String,
    pub question_rules: Vec<QuestionRule>,
    pub max_concurrency: usize,
    pub sample_size: usize,
    pub sweep: SweepSettings,
}

impl ResolvedConfig {
    /// Directory run reports are written to
    pub fn reports_dir(&self) -> PathBuf {
        self.home.join("reports")
    }

    /// Directory fetched fact files are written to
    pub fn facts_dir(&self) -> PathBuf {
        self.home.join("facts")
    }

    /// Question rules: configured ones first, then the built-in table
    pub fn question_generator(&self) -> QuestionGenerator {
        QuestionGenerator::new(crate::core::questions::builtin_rules(), &self.fallback_question)
            .with_leading_rules(self.question_rules.clone())
    }

    /// Explicit settings handed to the harness
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            model: self.model.name.clone(),
            system_prompt: Some(self.system_prompt.clone()),
            params: self.generation.clone(),
            prompt_style: self.prompt_style.clone(),
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".datecheck").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn parse_prompt_style(section: &PromptSection) -> Result<PromptStyle> {
    match section.style.as_deref().unwrap_or("question") {
        "question" => Ok(PromptStyle::Question),
        "context" => Ok(PromptStyle::Context {
            preamble: section
                .context
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        }),
        other => anyhow::bail!("Unknown prompt style '{}' (expected question or context)", other),
    }
}

/// Merge a config file, environment lookups and defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
    default_home: PathBuf,
) -> Result<ResolvedConfig> {
    let (config_file, raw) = match file {
        Some((path, raw)) => (Some(path), raw),
        None => (None, ConfigFile::default()),
    };

    let home = if let Some(env_home) = env("DATECHECK_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(home), Some(path)) = (raw.home.as_deref(), config_file.as_deref()) {
        let datecheck_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(datecheck_dir, home)
    } else {
        default_home
    };

    let defaults = ModelSettings::default();
    let model = ModelSettings {
        base_url: env("DATECHECK_OLLAMA_URL")
            .or(raw.model.base_url)
            .unwrap_or(defaults.base_url),
        name: env("DATECHECK_MODEL")
            .or(raw.model.name)
            .unwrap_or(defaults.name),
        timeout_seconds: raw.model.timeout_seconds.unwrap_or(defaults.timeout_seconds),
    };

    let gen_defaults = GenerationParams::default();
    let generation = GenerationParams {
        temperature: raw.generation.temperature.unwrap_or(gen_defaults.temperature),
        max_tokens: raw.generation.max_tokens.unwrap_or(gen_defaults.max_tokens),
        seed: raw.generation.seed,
    };
    if !(0.0..=2.0).contains(&generation.temperature) {
        anyhow::bail!("Temperature {} is outside 0.0..=2.0", generation.temperature);
    }

    let sweep_defaults = SweepSettings::default();
    let sweep = SweepSettings {
        temperatures: raw.sweep.temperatures.unwrap_or(sweep_defaults.temperatures),
        trials: raw.sweep.trials.unwrap_or(sweep_defaults.trials),
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        model,
        generation,
        system_prompt: raw
            .generation
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        prompt_style: parse_prompt_style(&raw.prompt)?,
        fallback_question: raw
            .prompt
            .fallback
            .unwrap_or_else(|| DEFAULT_FALLBACK.to_string()),
        question_rules: raw.question_rules,
        max_concurrency: raw.harness.max_concurrency.unwrap_or(1).max(1),
        sample_size: raw.harness.sample_size.unwrap_or(5),
        sweep,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".datecheck");

    let file = match find_config_file() {
        Some(path) => {
            let raw = load_config_file(&path)?;
            Some((path, raw))
        }
        None => None,
    };

    resolve(file, |key| std::env::var(key).ok(), default_home)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
