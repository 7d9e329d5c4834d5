use clap::Parser;

mod cli;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    iprd_content::logging::init();
    let cli = Cli::parse();
    execute(cli).await
}
