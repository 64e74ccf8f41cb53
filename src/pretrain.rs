//! Pretraining corpus pipeline.
//!
//! Extracts every matching text file from the configured repositories,
//! interleaves the optional per-file header, concatenates everything into
//! one corpus, and writes overlapping token chunks as a JSONL dataset
//! (`{"text": ...}` rows) plus a metadata summary.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::chunker::{chunk_text, Tokenizer};
use crate::config::PretrainConfig;
use crate::extract::{ExtractedFile, RepoExtractor};
use crate::path_filter::PathFilter;
use crate::repo_cache::{RepoCache, RepoSource};

/// Summary record persisted next to the dataset.
#[derive(Debug, Serialize)]
pub struct PretrainMetadata {
    pub num_files: usize,
    pub num_chunks: usize,
    pub total_chars: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub repositories: Vec<String>,
}

/// Run the pretraining data pipeline.
///
/// `output_override` replaces the configured output directory when set.
/// Fails if any repository fetch fails or no files survive extraction;
/// per-file skips are silent unless `verbose` is on.
pub fn run_pretrain(
    config: &PretrainConfig,
    cache: RepoCache,
    tokenizer: &dyn Tokenizer,
    output_override: Option<&Path>,
    verbose: bool,
) -> Result<PretrainMetadata> {
    let mut all_files: Vec<ExtractedFile> = Vec::new();

    for repo in &config.sources.repositories {
        println!("Extracting from {}...", repo.url);

        let include = repo.include.as_ref().unwrap_or(&config.files.include);
        let exclude = repo.exclude.as_ref().unwrap_or(&config.files.exclude);
        let filter = PathFilter::new(include, exclude)?;
        let extractor =
            RepoExtractor::new(cache.clone(), filter, config.files.max_size_bytes).verbose(verbose);

        let source = RepoSource::new(&repo.url, &repo.branch);
        let before = all_files.len();
        all_files.extend(extractor.extract(&source)?);
        println!("  extracted {} files", all_files.len() - before);
    }

    println!("Total files extracted: {}", all_files.len());
    if all_files.is_empty() {
        bail!("No files extracted. Check your repository configuration.");
    }

    let full_text = assemble_corpus(
        &all_files,
        &config.format.file_separator,
        config.format.include_path,
    );
    println!("Total text length: {} characters", full_text.chars().count());

    let out_dir = output_override.unwrap_or(&config.output.dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    // Stream chunks straight to the dataset file.
    let dataset_path = out_dir.join("dataset.jsonl");
    let file = std::fs::File::create(&dataset_path)
        .with_context(|| format!("Failed to create {}", dataset_path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    let mut num_chunks = 0usize;
    for chunk in chunk_text(
        tokenizer,
        &full_text,
        config.output.chunk_size,
        config.output.chunk_overlap,
    )? {
        let row = serde_json::json!({ "text": chunk });
        serde_json::to_writer(&mut writer, &row)?;
        writer.write_all(b"\n")?;
        num_chunks += 1;
    }
    writer.flush()?;
    println!("Created {} chunks", num_chunks);
    println!("Saved dataset to {}", dataset_path.display());

    let metadata = PretrainMetadata {
        num_files: all_files.len(),
        num_chunks,
        total_chars: full_text.chars().count(),
        chunk_size: config.output.chunk_size,
        chunk_overlap: config.output.chunk_overlap,
        repositories: config
            .sources
            .repositories
            .iter()
            .map(|r| r.url.clone())
            .collect(),
    };
    let metadata_path = out_dir.join("metadata.json");
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)
        .with_context(|| format!("Failed to write {}", metadata_path.display()))?;
    println!("Saved metadata to {}", metadata_path.display());

    Ok(metadata)
}

/// Join extracted files into one corpus, optionally prefixing each file
/// with the separator template (`{path}` substituted).
fn assemble_corpus(files: &[ExtractedFile], file_separator: &str, include_path: bool) -> String {
    let documents: Vec<String> = files
        .iter()
        .map(|f| {
            if include_path {
                let header = file_separator.replace("{path}", &f.relative_path);
                format!("{}{}", header, f.content)
            } else {
                f.content.clone()
            }
        })
        .collect();
    documents.join("\n")
}
