use crate::prelude::*;
use clap::Parser;

mod error;
mod http;
mod models;
mod prelude;
mod spec;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Prepare the kluster.ai OpenAPI document and model catalog for the docs site"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "KDOCS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// Request timeout in seconds for network fetches.
    #[clap(long, env = "KDOCS_TIMEOUT", global = true, default_value = "30")]
    timeout: u64,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// OpenAPI document operations (fix, fetch, check)
    Spec(crate::spec::App),

    /// Model catalog operations
    Models(crate::models::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Spec(sub_app) => crate::spec::run(sub_app, app.global).await,
        SubCommands::Models(sub_app) => crate::models::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
