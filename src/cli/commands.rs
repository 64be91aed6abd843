use std::fmt::Write as _;
use std::path::Path;

use serde::Deserialize;

use crate::app::{AppContext, Result, TrawlerError};
use crate::domain::{Query, Site, Task, TaskResult};
use crate::store::JsonStore;

/// A task list file: one `[[tasks]]` table per task.
#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(default)]
    tasks: Vec<Task>,
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let content = std::fs::read_to_string(path)?;
    parse_tasks(&content)
        .map_err(|e| TrawlerError::Config(format!("{}: {}", path.display(), e)))
}

fn parse_tasks(content: &str) -> std::result::Result<Vec<Task>, toml::de::Error> {
    toml::from_str::<TaskFile>(content).map(|file| file.tasks)
}

pub async fn run_tasks(ctx: &AppContext, path: &Path) -> Result<()> {
    let tasks = load_tasks(path)?;
    if tasks.is_empty() {
        println!("No tasks in {}", path.display());
        return Ok(());
    }

    println!("Running {} tasks...", tasks.len());
    let mut runner = ctx.runner();
    let report = runner.run(tasks).await?;

    for (id, outcome) in &report.outcomes {
        if let Some(result) = report.result(id) {
            println!("  {} [{}]: {}", id, outcome, counts(result));
        }
    }
    println!(
        "Results in {}, logs in {}",
        ctx.config.output.results_dir.display(),
        ctx.config.output.logs_dir.display()
    );
    Ok(())
}

pub fn print_url(ctx: &AppContext, site: Site, keyword: &str, filters: &[String]) -> Result<()> {
    let query = Query {
        keyword: keyword.to_string(),
        filters: filters.to_vec(),
    };
    let url = ctx.registry.get(site)?.search_url(&query)?;
    println!("{}", url);
    Ok(())
}

pub fn summarize(path: &Path) -> Result<()> {
    let result = JsonStore::load(path)?;
    print!("{}", summary(&result));
    Ok(())
}

fn counts(result: &TaskResult) -> String {
    let mut line = format!("{} items", result.num_items());
    if result.num_pages() > 0 {
        let _ = write!(line, ", {} pages", result.num_pages());
    }
    let _ = write!(line, ", {} images", result.num_imgs());
    line
}

fn summary(result: &TaskResult) -> String {
    let task = &result.task;
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", task.id, task.site);
    let _ = writeln!(out, "  query:     {}", task.query.search_text());
    let _ = writeln!(out, "  committed: {}", result.commit_ts);
    let _ = writeln!(out, "  launched:  {}", result.launch_ts);
    let _ = writeln!(out, "  finished:  {}", result.finish_ts);
    let _ = writeln!(out, "  {}", counts(result));
    out
}
