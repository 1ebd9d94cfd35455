use std::path::Path;

use crate::prelude::{println, *};
use serde_json::Value;

pub mod check;
pub mod fetch;
pub mod fix;

/// Admin OpenAPI document published by the platform.
pub const DEFAULT_SPEC_URL: &str = "https://api.kluster.ai/v1/admin/openapi.json";

#[derive(Debug, clap::Parser)]
#[command(name = "spec")]
#[command(about = "OpenAPI document operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Normalize a document for the documentation importer
    #[clap(name = "fix")]
    Fix(fix::FixOptions),

    /// Download the raw admin document
    #[clap(name = "fetch")]
    Fetch(fetch::FetchOptions),

    /// Report importer compatibility issues in a document
    #[clap(name = "check")]
    Check(check::CheckOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Request timeout: {}s", global.timeout);
        println!();
    }

    match app.command {
        Commands::Fix(options) => fix::run(options, global).await,
        Commands::Fetch(options) => fetch::run(options, global).await,
        Commands::Check(options) => check::run(options, global).await,
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Parse document text, requiring an object at the root.
pub fn parse_document(text: &str, source: &str) -> Result<Value> {
    let doc: Value =
        serde_json::from_str(text).map_err(|e| eyre!("Failed to parse JSON from {source}: {e}"))?;

    if !doc.is_object() {
        return Err(Error::NotAnObject(source.to_string()).into());
    }

    Ok(doc)
}

pub fn read_document(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.display().to_string()).into());
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read {}: {e}", path.display()))?;

    parse_document(&text, &path.display().to_string())
}

/// Load a document from a local path or an `http(s)://` URL.
pub async fn load_document(input: &str, api_key: Option<&str>, global: &crate::Global) -> Result<Value> {
    if !is_url(input) {
        return read_document(Path::new(input));
    }

    let client = crate::http::client(global.timeout)?;
    let text = crate::http::fetch_text(&client, input, api_key).await?;

    parse_document(&text, input)
}

/// Pretty JSON with a trailing newline.
pub fn render_document(doc: &Value) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(doc).map_err(|e| eyre!("JSON serialization failed: {e}"))?;
    text.push('\n');
    Ok(text)
}

/// Write `contents` to `path`, creating parent directories first.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| eyre!("Failed to create directory {}: {e}", parent.display()))?;
    }

    std::fs::write(path, contents).map_err(|e| eyre!("Failed to write {}: {e}", path.display()))?;
    log::info!("Wrote {} bytes to {}", contents.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://api.kluster.ai/v1/admin/openapi.json"));
        assert!(is_url("http://localhost:8000/openapi.json"));
        assert!(!is_url("spec/kluster_openapi.json"));
    }

    #[test]
    fn test_parse_document_rejects_non_object_root() {
        let err = parse_document("[1, 2]", "inline").unwrap_err();
        assert_eq!(err.to_string(), "Expected a JSON object at the root of inline");
    }

    #[test]
    fn test_parse_document_rejects_invalid_json() {
        let err = parse_document("{not json", "inline").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse JSON from inline"));
    }

    #[test]
    fn test_read_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = read_document(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InputNotFound(_))
        ));
    }

    #[test]
    fn test_write_then_read_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/spec.json");
        let doc = json!({"paths": {}, "openapi": "3.1.0", "info": {"title": "kluster.ai"}});

        write_output(&path, &render_document(&doc).unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let loaded = read_document(&path).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.starts_with("{\n  \"paths\": {},\n  \"openapi\""));
        let keys: Vec<&String> = loaded.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["paths", "openapi", "info"]);
    }

    #[test]
    fn test_large_numbers_survive_a_round_trip() {
        let text = r#"{"maximum": 18446744073709551616, "minimum": -100, "ratio": 0.10}"#;

        let doc = parse_document(text, "inline").unwrap();
        let rendered = render_document(&doc).unwrap();

        assert!(rendered.contains("\"maximum\": 18446744073709551616"));
        assert!(rendered.contains("\"minimum\": -100"));
        assert!(rendered.contains("\"ratio\": 0.10"));
    }

    #[test]
    fn test_render_document_keeps_unicode() {
        let text = render_document(&json!({"description": "Café OpenAI’s API"})).unwrap();
        assert!(text.contains("Café OpenAI’s API"));
    }
}
