use crate::prelude::{println, *};

pub mod list;

/// Extended model listing, including names, tags and token limits.
pub const DEFAULT_MODELS_URL: &str = "https://api.kluster.ai/v1/models?extended=true";

#[derive(Debug, clap::Parser)]
#[command(name = "models")]
#[command(about = "Model catalog operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List the models the docs should cover
    #[clap(name = "list")]
    List(list::ListOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Request timeout: {}s", global.timeout);
        println!();
    }

    match app.command {
        Commands::List(options) => list::run(options, global).await,
    }
}
