//! # trainprep
//!
//! A training-corpus preparation pipeline for language-model fine-tuning.
//!
//! trainprep mirrors remote git repositories into a local cache, filters
//! their file trees with include/exclude globs, rejects binary content,
//! and turns the surviving text into two kinds of training data: an
//! overlapping token-chunked pretraining corpus, and supervised
//! fine-tuning splits built from curated conversation examples.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌─────────┐   ┌──────────────┐
//! │ RepoCache │──▶│ Extractor   │──▶│ Chunker │──▶│ dataset.jsonl │
//! │ (git)     │   │ filter+sniff│   └─────────┘   │ metadata.json │
//! └───────────┘   └────────────┘                  └──────────────┘
//!
//! ┌───────────────┐   ┌───────────┐   ┌──────────┐   ┌──────────────┐
//! │ Conversation  │──▶│ Formatter  │──▶│ Splitter │──▶│ {train,      │
//! │ loader (JSON) │   │ sys inject │   │ seeded   │   │  validation, │
//! └───────────────┘   └───────────┘   └──────────┘   │  test}.jsonl │
//!                                                    └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! trainprep pretrain --config ./config/pretrain.toml
//! trainprep synthesize --config ./config/synthesis.toml
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`repo_cache`] | Local git mirror cache |
//! | [`path_filter`] | Include/exclude glob filtering |
//! | [`text_sniff`] | Binary-content heuristic |
//! | [`extract`] | Repository file extraction |
//! | [`chunker`] | Token-window chunking |
//! | [`conversation`] | Conversation types and loading |
//! | [`format`] | Training-record formatting |
//! | [`split`] | Train/validation/test partitioning |
//! | [`pretrain`] | Pretraining corpus pipeline |
//! | [`synthesis`] | SFT splits pipeline |

pub mod chunker;
pub mod config;
pub mod conversation;
pub mod extract;
pub mod format;
pub mod path_filter;
pub mod pretrain;
pub mod repo_cache;
pub mod split;
pub mod synthesis;
pub mod text_sniff;
