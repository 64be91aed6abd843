pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Site;

#[derive(Parser)]
#[command(name = "trawler")]
#[command(about = "Scrape marketplace search results with a real browser", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/trawler/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every task in a task file, one after another
    Run {
        /// TOML file with one [[tasks]] table per task
        tasks: PathBuf,

        /// Show the browser window
        #[arg(long, conflicts_with = "headless")]
        headed: bool,

        /// Hide the browser window
        #[arg(long)]
        headless: bool,

        /// Directory for <task id>.json result files
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Directory for <task id>.log files
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },
    /// Print the search URL a task would open
    Url {
        #[arg(long, value_enum)]
        site: Site,

        keyword: String,

        /// Word to exclude from results (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },
    /// Print the counts recorded in a result file
    Summary {
        /// Path to a <task id>.json result file
        path: PathBuf,
    },
}
