use std::path::PathBuf;

use crate::prelude::{println, *};
use colored::Colorize;

use super::{parse_document, write_output, DEFAULT_SPEC_URL};

#[derive(Debug, clap::Args, Clone)]
pub struct FetchOptions {
    /// Where to write the raw document
    #[arg(value_name = "OUTPUT", default_value = "kluster_openapi.json")]
    pub output: PathBuf,

    /// Document URL
    #[arg(long, env = "KDOCS_SPEC_URL", default_value = DEFAULT_SPEC_URL)]
    pub url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "KLUSTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

pub async fn run(options: FetchOptions, global: crate::Global) -> Result<()> {
    let api_key = require_api_key(options.api_key.as_deref())?;

    if global.verbose {
        println!("Fetching {}", options.url);
    }

    let client = crate::http::client(global.timeout)?;
    let body = crate::http::fetch_text(&client, &options.url, Some(api_key)).await?;

    // Only validated; the body is saved exactly as served.
    parse_document(&body, &options.url)?;
    write_output(&options.output, &body)?;

    println!(
        "{} {}",
        "Saved to".green().bold(),
        options.output.display().to_string().cyan()
    );

    Ok(())
}

/// A blank key counts as missing.
fn require_api_key(api_key: Option<&str>) -> Result<&str> {
    match api_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(Error::MissingApiKey.into()),
    }
}
