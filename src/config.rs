use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One repository entry under `[[sources.repositories]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct RepoEntry {
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Per-source overrides; fall back to the `[files]` lists when absent.
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub repositories: Vec<RepoEntry>,
}

/// File selection rules shared by both pipelines.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: Vec::new(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn default_max_size_bytes() -> u64 {
    102_400
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".trainprep-cache")
}

// ── Pretraining ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
pub struct PretrainConfig {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub format: SeparatorConfig,
    pub output: PretrainOutputConfig,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

/// Controls the per-file header interleaved into the concatenated corpus.
#[derive(Debug, Deserialize, Clone)]
pub struct SeparatorConfig {
    /// Template for the header; `{path}` is replaced with the file's
    /// repository-relative path.
    #[serde(default = "default_file_separator")]
    pub file_separator: String,
    #[serde(default = "default_true")]
    pub include_path: bool,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            file_separator: default_file_separator(),
            include_path: default_true(),
        }
    }
}

fn default_file_separator() -> String {
    "# File: {path}\n".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct PretrainOutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    2048
}

fn default_chunk_overlap() -> usize {
    256
}

pub fn load_pretrain_config(path: &Path) -> Result<PretrainConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: PretrainConfig =
        toml::from_str(&content).with_context(|| "Failed to parse pretrain config")?;

    if config.sources.repositories.is_empty() {
        anyhow::bail!("sources.repositories must list at least one repository");
    }
    if config.output.chunk_size == 0 {
        anyhow::bail!("output.chunk_size must be > 0");
    }
    if config.output.chunk_overlap >= config.output.chunk_size {
        anyhow::bail!(
            "output.chunk_overlap ({}) must be smaller than output.chunk_size ({})",
            config.output.chunk_overlap,
            config.output.chunk_size
        );
    }
    if config.files.max_size_bytes == 0 {
        anyhow::bail!("files.max_size_bytes must be > 0");
    }

    Ok(config)
}

// ── Synthesis ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub files: SynthesisFilesConfig,
    #[serde(default)]
    pub format: FormatConfig,
    pub output: SynthesisOutputConfig,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub examples_dir: PathBuf,
}

/// Like [`FilesConfig`] but with code/docs include defaults suited to
/// reference extraction.
#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisFilesConfig {
    #[serde(default = "default_synthesis_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for SynthesisFilesConfig {
    fn default() -> Self {
        Self {
            include: default_synthesis_include(),
            exclude: Vec::new(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

fn default_synthesis_include() -> Vec<String> {
    vec!["**/*.go".to_string(), "**/*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormatConfig {
    #[serde(default)]
    pub system_message: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisOutputConfig {
    pub processed_dir: PathBuf,
    pub splits_dir: PathBuf,
    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,
    #[serde(default = "default_val_ratio")]
    pub val_ratio: f64,
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_train_ratio() -> f64 {
    0.9
}

fn default_val_ratio() -> f64 {
    0.05
}

fn default_test_ratio() -> f64 {
    0.05
}

fn default_seed() -> u64 {
    42
}

pub fn load_synthesis_config(path: &Path) -> Result<SynthesisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: SynthesisConfig =
        toml::from_str(&content).with_context(|| "Failed to parse synthesis config")?;

    let out = &config.output;
    let ratio_sum = out.train_ratio + out.val_ratio + out.test_ratio;
    if (ratio_sum - 1.0).abs() > crate::split::RATIO_TOLERANCE {
        anyhow::bail!(
            "output.train_ratio + val_ratio + test_ratio must sum to 1.0 (got {})",
            ratio_sum
        );
    }
    if config.files.max_size_bytes == 0 {
        anyhow::bail!("files.max_size_bytes must be > 0");
    }

    Ok(config)
}
