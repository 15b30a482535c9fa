use anyhow::Result;
use clap::Parser;

use greenhouse_planner::cli::Args;
use greenhouse_planner::planner::workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, request) = args.into_parts()?;

    if config.verbose {
        println!(
            "🛠️ Provider: {}, model: {}",
            config.llm.provider, config.llm.model
        );
    }

    workflow::launch(&config, &request).await
}
