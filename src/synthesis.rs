//! Supervised fine-tuning data pipeline.
//!
//! Two stages. Configured repositories are extracted and their surviving
//! files persisted under `<processed_dir>/extracted/` for reference.
//! Curated conversation examples are then loaded, formatted (system-turn
//! injection), partitioned into train/validation/test, and persisted as
//! one JSONL file per split.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::config::SynthesisConfig;
use crate::conversation::load_conversations;
use crate::extract::RepoExtractor;
use crate::format::DatasetFormatter;
use crate::path_filter::PathFilter;
use crate::repo_cache::{RepoCache, RepoSource};
use crate::split::split_dataset;

/// Run the synthesis pipeline.
///
/// `output_override` replaces the configured processed directory when set.
/// A missing examples directory is not an error: repository extraction
/// still runs and the splits stage is skipped with a hint.
pub fn run_synthesis(
    config: &SynthesisConfig,
    cache: RepoCache,
    output_override: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let processed_dir = output_override.unwrap_or(&config.output.processed_dir);
    let splits_dir = &config.output.splits_dir;
    std::fs::create_dir_all(processed_dir)
        .with_context(|| format!("Failed to create {}", processed_dir.display()))?;
    std::fs::create_dir_all(splits_dir)
        .with_context(|| format!("Failed to create {}", splits_dir.display()))?;

    for repo in &config.sources.repositories {
        println!("Extracting from {}...", repo.url);

        let include = repo.include.as_ref().unwrap_or(&config.files.include);
        let exclude = repo.exclude.as_ref().unwrap_or(&config.files.exclude);
        let filter = PathFilter::new(include, exclude)?;
        let extractor =
            RepoExtractor::new(cache.clone(), filter, config.files.max_size_bytes).verbose(verbose);

        let extracted_root = processed_dir.join("extracted");
        let mut count = 0usize;
        for file in extractor.extract(&RepoSource::new(&repo.url, &repo.branch))? {
            let out_path = extracted_root.join(&file.relative_path);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&out_path, &file.content)?;
            count += 1;
        }
        println!("  extracted {} files to {}", count, extracted_root.display());
    }

    let examples_dir = &config.input.examples_dir;
    if !examples_dir.exists() {
        println!("No examples directory found at {}", examples_dir.display());
        println!("Create training examples in JSON or JSONL format and place them there.");
        return Ok(());
    }

    println!("Loading examples from {}...", examples_dir.display());
    let conversations = load_conversations(examples_dir)?;
    println!("  loaded {} conversations", conversations.len());

    if !conversations.is_empty() {
        let formatter = DatasetFormatter::new(config.format.system_message.clone());
        let dataset = formatter.format_for_training(&conversations)?;

        let out = &config.output;
        let splits = split_dataset(
            dataset,
            out.train_ratio,
            out.val_ratio,
            out.test_ratio,
            out.seed,
        )?;

        for (name, records) in splits.named() {
            let path = splits_dir.join(format!("{}.jsonl", name));
            write_jsonl(&path, records)?;
            println!(
                "  saved {}: {} examples to {}",
                name,
                records.len(),
                path.display()
            );
        }
    }

    println!("Synthesis complete.");
    Ok(())
}

/// One serialized record per line.
fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;

    #[test]
    fn test_write_jsonl_round_trips_records() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jsonl");
        let records = vec![
            serde_json::json!({"messages": [{"role": "user", "content": "a"}]}),
            serde_json::json!({"messages": [{"role": "user", "content": "b"}]}),
        ];
        write_jsonl(&path, &records).unwrap();

        let convs = load_conversations(&path).unwrap();
        assert_eq!(convs.len(), 2);
        assert_eq!(convs[1].messages[0].content, "b");
        let _: Vec<Conversation> = convs;
    }
}
