use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use trainprep::chunker::ByteTokenizer;
use trainprep::config::{
    FilesConfig, FormatConfig, InputConfig, PretrainConfig, PretrainOutputConfig, RepoEntry,
    SeparatorConfig, SourcesConfig, SynthesisConfig, SynthesisFilesConfig, SynthesisOutputConfig,
};
use trainprep::conversation::Conversation;
use trainprep::pretrain::run_pretrain;
use trainprep::repo_cache::{GitFetcher, RepoCache};
use trainprep::synthesis::run_synthesis;

/// Fetcher double: "clones" by materializing a fixed tree, so the
/// pipelines run without git or network access.
struct TreeFetcher {
    files: Vec<(&'static str, &'static str)>,
}

impl GitFetcher for TreeFetcher {
    fn clone_shallow(&self, _url: &str, _branch: &str, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest.join(".git"))?;
        for (rel, content) in &self.files {
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(())
    }

    fn update(&self, _repo_dir: &Path, _branch: &str) -> Result<()> {
        Ok(())
    }
}

fn test_cache(root: &Path, files: Vec<(&'static str, &'static str)>) -> RepoCache {
    RepoCache::with_fetcher(root, Arc::new(TreeFetcher { files }))
}

fn repo_entry() -> RepoEntry {
    RepoEntry {
        url: "https://github.com/acme/widgets".to_string(),
        branch: "main".to_string(),
        include: None,
        exclude: None,
    }
}

fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn pretrain_config(root: &Path) -> PretrainConfig {
    PretrainConfig {
        sources: SourcesConfig {
            repositories: vec![repo_entry()],
        },
        files: FilesConfig {
            include: vec!["**/*.rs".to_string(), "**/*.md".to_string()],
            exclude: vec!["vendor".to_string()],
            max_size_bytes: 102_400,
        },
        format: SeparatorConfig {
            file_separator: "# File: {path}\n".to_string(),
            include_path: true,
        },
        output: PretrainOutputConfig {
            dir: root.join("out"),
            chunk_size: 64,
            chunk_overlap: 8,
        },
        cache_dir: root.join("cache"),
    }
}

#[test]
fn pretrain_pipeline_writes_dataset_and_metadata() {
    let tmp = TempDir::new().unwrap();
    let config = pretrain_config(tmp.path());
    let cache = test_cache(
        &config.cache_dir,
        vec![
            ("src/lib.rs", "pub fn answer() -> u32 { 42 }\n"),
            ("README.md", "# Widgets\n\nA crate about widgets.\n"),
            ("vendor/dep.rs", "fn vendored() {}\n"),
        ],
    );

    let metadata = run_pretrain(&config, cache, &ByteTokenizer, None, false).unwrap();

    assert_eq!(metadata.num_files, 2);
    assert_eq!(metadata.repositories, vec!["https://github.com/acme/widgets"]);
    assert!(metadata.num_chunks > 0);

    let rows = read_jsonl(&config.output.dir.join("dataset.jsonl"));
    assert_eq!(rows.len(), metadata.num_chunks);
    for row in &rows {
        assert!(row["text"].is_string());
    }
    // The per-file header made it into the corpus.
    let corpus: String = rows
        .iter()
        .map(|r| r["text"].as_str().unwrap())
        .collect();
    assert!(corpus.contains("# File: "));

    let meta_raw = fs::read_to_string(config.output.dir.join("metadata.json")).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&meta_raw).unwrap();
    assert_eq!(meta["num_files"], 2);
    assert_eq!(meta["chunk_size"], 64);
    assert_eq!(meta["chunk_overlap"], 8);
}

#[test]
fn pretrain_pipeline_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    let config = pretrain_config(tmp.path());
    let files = vec![("src/lib.rs", "pub fn answer() -> u32 { 42 }\n")];

    run_pretrain(
        &config,
        test_cache(&config.cache_dir, files.clone()),
        &ByteTokenizer,
        None,
        false,
    )
    .unwrap();
    let first = fs::read_to_string(config.output.dir.join("dataset.jsonl")).unwrap();

    run_pretrain(
        &config,
        test_cache(&config.cache_dir, files),
        &ByteTokenizer,
        None,
        false,
    )
    .unwrap();
    let second = fs::read_to_string(config.output.dir.join("dataset.jsonl")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn pretrain_pipeline_fails_when_nothing_matches() {
    let tmp = TempDir::new().unwrap();
    let mut config = pretrain_config(tmp.path());
    config.files.include = vec!["**/*.nonexistent".to_string()];
    let cache = test_cache(&config.cache_dir, vec![("src/lib.rs", "fn a() {}\n")]);

    let err = run_pretrain(&config, cache, &ByteTokenizer, None, false).unwrap_err();
    assert!(err.to_string().contains("No files extracted"));
}

fn synthesis_config(root: &Path, with_repo: bool) -> SynthesisConfig {
    SynthesisConfig {
        sources: SourcesConfig {
            repositories: if with_repo { vec![repo_entry()] } else { Vec::new() },
        },
        input: InputConfig {
            examples_dir: root.join("examples-data"),
        },
        files: SynthesisFilesConfig {
            include: vec!["**/*.rs".to_string(), "**/*.md".to_string()],
            exclude: Vec::new(),
            max_size_bytes: 102_400,
        },
        format: FormatConfig {
            system_message: Some("You are a coding assistant.".to_string()),
        },
        output: SynthesisOutputConfig {
            processed_dir: root.join("processed"),
            splits_dir: root.join("splits"),
            train_ratio: 0.8,
            val_ratio: 0.1,
            test_ratio: 0.1,
            seed: 42,
        },
        cache_dir: root.join("cache"),
    }
}

fn write_examples(dir: &Path, n: usize) {
    fs::create_dir_all(dir).unwrap();
    let lines: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"messages": [{{"role": "user", "content": "question {i}"}}, {{"role": "assistant", "content": "answer {i}"}}]}}"#
            )
        })
        .collect();
    fs::write(dir.join("examples.jsonl"), lines.join("\n")).unwrap();
}

#[test]
fn synthesis_pipeline_extracts_and_splits() {
    let tmp = TempDir::new().unwrap();
    let config = synthesis_config(tmp.path(), true);
    write_examples(&config.input.examples_dir, 12);
    let cache = test_cache(
        &config.cache_dir,
        vec![("src/lib.rs", "pub fn answer() -> u32 { 42 }\n")],
    );

    run_synthesis(&config, cache, None, false).unwrap();

    // Extracted reference files are persisted under processed_dir.
    let persisted = config
        .output
        .processed_dir
        .join("extracted")
        .join("src/lib.rs");
    assert!(persisted.exists());

    // 12 conversations, ratios (0.8, 0.1, 0.1), seed 42 => 10/1/1.
    let train = read_jsonl(&config.output.splits_dir.join("train.jsonl"));
    let validation = read_jsonl(&config.output.splits_dir.join("validation.jsonl"));
    let test = read_jsonl(&config.output.splits_dir.join("test.jsonl"));
    assert_eq!(train.len(), 10);
    assert_eq!(validation.len(), 1);
    assert_eq!(test.len(), 1);

    // System message was injected ahead of the original turns.
    let first: Conversation = serde_json::from_value(train[0].clone()).unwrap();
    assert_eq!(first.messages.len(), 3);
    assert_eq!(first.messages[0].content, "You are a coding assistant.");
}

#[test]
fn synthesis_split_is_deterministic_across_runs() {
    let tmp = TempDir::new().unwrap();
    let config = synthesis_config(tmp.path(), false);
    write_examples(&config.input.examples_dir, 20);

    run_synthesis(&config, test_cache(&config.cache_dir, Vec::new()), None, false).unwrap();
    let first = fs::read_to_string(config.output.splits_dir.join("train.jsonl")).unwrap();

    run_synthesis(&config, test_cache(&config.cache_dir, Vec::new()), None, false).unwrap();
    let second = fs::read_to_string(config.output.splits_dir.join("train.jsonl")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn synthesis_tiny_dataset_reuses_records() {
    let tmp = TempDir::new().unwrap();
    let config = synthesis_config(tmp.path(), false);
    write_examples(&config.input.examples_dir, 4);

    run_synthesis(&config, test_cache(&config.cache_dir, Vec::new()), None, false).unwrap();

    let train = read_jsonl(&config.output.splits_dir.join("train.jsonl"));
    let validation = read_jsonl(&config.output.splits_dir.join("validation.jsonl"));
    let test = read_jsonl(&config.output.splits_dir.join("test.jsonl"));
    assert_eq!(train.len(), 4);
    assert_eq!(validation.len(), 1);
    assert_eq!(test.len(), 1);
    // Validation and test are views of the same record, drawn from train.
    assert_eq!(validation[0], test[0]);
    assert!(train.contains(&validation[0]));
}

#[test]
fn synthesis_missing_examples_dir_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = synthesis_config(tmp.path(), false);
    // examples_dir deliberately not created.

    run_synthesis(&config, test_cache(&config.cache_dir, Vec::new()), None, false).unwrap();
    assert!(!config.output.splits_dir.join("train.jsonl").exists());
}

#[test]
fn synthesis_malformed_example_line_fails_load() {
    let tmp = TempDir::new().unwrap();
    let config = synthesis_config(tmp.path(), false);
    fs::create_dir_all(&config.input.examples_dir).unwrap();
    fs::write(
        config.input.examples_dir.join("bad.jsonl"),
        "{\"messages\": [{\"role\": \"user\", \"content\": \"ok\"}]}\nnot json at all\n",
    )
    .unwrap();

    assert!(run_synthesis(&config, test_cache(&config.cache_dir, Vec::new()), None, false).is_err());
}
