//! Core library for kdocs
//!
//! This crate implements the **Functional Core** of the kdocs application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`kdocs_core`** (this crate): Pure transformations over parsed OpenAPI
//!   documents and model catalog records, with zero I/O
//! - **`kdocs`**: Fetching, file I/O, terminal output and exit codes (the
//!   Imperative Shell)
//!
//! Functions here never print or log. Everything they changed or found is
//! handed back in their return values so the shell can report it.
//!
//! # Module Organization
//!
//! - [`walker`]: Depth-first traversal applying fixups to every object node
//! - [`fixups`]: Structural fixups run by the walker (array examples, anyOf
//!   enums, product naming)
//! - [`tags`]: Tag labels and undocumented endpoint pruning
//! - [`normalize`]: The normalizer driver and its targeted fixups
//! - [`check`]: Compatibility report for the documentation importer
//! - [`catalog`]: Model catalog entries for the docs
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use kdocs_core::normalize::{normalize, NormalizerConfig};
//! use serde_json::json;
//!
//! let mut doc = json!({"servers": [{"url": "https://platform.kluster.ai/v1"}]});
//! let report = normalize(&mut doc, &NormalizerConfig::default())?;
//!
//! assert_eq!(report.server_urls, vec!["https://api.kluster.ai/v1"]);
//! ```

pub mod catalog;
pub mod check;
pub mod fixups;
pub mod normalize;
pub mod tags;
pub mod walker;
