use clap::Parser;

use trawler::app::{logging, AppContext};
use trawler::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tasks,
            headed,
            headless,
            results_dir,
            logs_dir,
        } => {
            let mut ctx = AppContext::load(cli.config.as_deref())?;
            let browser = &mut ctx.config.browser;
            if headed {
                browser.headless = false;
            } else if headless {
                browser.headless = true;
            }
            if let Some(dir) = results_dir {
                ctx.config.output.results_dir = dir;
            }
            if let Some(dir) = logs_dir {
                ctx.config.output.logs_dir = dir;
            }
            commands::run_tasks(&ctx, &tasks).await?;
        }
        Commands::Url {
            site,
            keyword,
            filters,
        } => {
            let ctx = AppContext::load(cli.config.as_deref())?;
            commands::print_url(&ctx, site, &keyword, &filters)?;
        }
        Commands::Summary { path } => {
            commands::summarize(&path)?;
        }
    }

    Ok(())
}
