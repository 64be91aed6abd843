use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::{Result, TrawlerError};

/// Marketplaces with a built-in extraction adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Mercari,
    Vinted,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Mercari => write!(f, "mercari"),
            Site::Vinted => write!(f, "vinted"),
        }
    }
}

/// Search text plus words the results must not contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub keyword: String,
    #[serde(default)]
    pub filters: Vec<String>,
}

impl Query {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            filters: Vec::new(),
        }
    }

    pub fn exclude(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// The raw search string: the keyword followed by one `-word` token per
    /// filter word, in order. Blank filters contribute nothing.
    pub fn search_text(&self) -> String {
        let mut text = self.keyword.trim().to_string();
        for word in self.filters.iter().flat_map(|f| f.split_whitespace()) {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push('-');
            text.push_str(word);
        }
        text
    }
}

/// One scraping job. Immutable once handed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub site: Site,
    #[serde(flatten)]
    pub query: Query,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub scrape_item_page: bool,
}

fn default_max_items() -> usize {
    1000
}

fn default_max_pages() -> usize {
    3
}

impl Task {
    pub fn new(id: impl Into<String>, site: Site, query: Query) -> Self {
        Self {
            id: id.into(),
            site,
            query,
            max_items: default_max_items(),
            max_pages: default_max_pages(),
            scrape_item_page: false,
        }
    }

    pub fn with_limits(mut self, max_items: usize, max_pages: usize) -> Self {
        self.max_items = max_items;
        self.max_pages = max_pages;
        self
    }

    pub fn with_item_pages(mut self, scrape_item_page: bool) -> Self {
        self.scrape_item_page = scrape_item_page;
        self
    }
}

/// Checks a single task id: non-empty and usable as a file name, since the
/// result and log files are keyed by it.
pub fn validate_task_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(TrawlerError::Precondition("task id must not be empty".into()));
    }
    if id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(TrawlerError::Precondition(format!(
            "task id '{}' cannot be used as a file name",
            id
        )));
    }
    Ok(())
}

/// Checks the whole submission before any browser session is opened.
pub fn validate_tasks(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::new();
    for task in tasks {
        validate_task_id(&task.id)?;
        if !seen.insert(task.id.as_str()) {
            return Err(TrawlerError::Precondition(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
    }
    Ok(())
}
