use serde::{Deserialize, Serialize};

use crate::domain::{Item, Page, Task, Timestamp};

/// How a site delivers more results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// More items render in place as the page is scrolled.
    Scroll,
    /// Results are split across pages reached through a "next page" control.
    Paged,
}

/// Accumulated items, shaped by the site's pagination model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    Items(Vec<Item>),
    Pages(Vec<Page>),
}

impl Listing {
    pub fn empty(pagination: Pagination) -> Self {
        match pagination {
            Pagination::Scroll => Listing::Items(Vec::new()),
            Pagination::Paged => Listing::Pages(Vec::new()),
        }
    }

    pub fn items(&self) -> Box<dyn Iterator<Item = &Item> + '_> {
        match self {
            Listing::Items(items) => Box::new(items.iter()),
            Listing::Pages(pages) => Box::new(pages.iter().flat_map(|p| p.items.iter())),
        }
    }
}

/// One task's output and its timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: Task,
    pub commit_ts: Timestamp,
    pub launch_ts: Timestamp,
    pub finish_ts: Timestamp,
    #[serde(flatten)]
    pub listing: Listing,
}

impl TaskResult {
    /// A freshly committed result: all three timestamps equal `commit_ts`.
    pub fn committed(task: Task, pagination: Pagination, commit_ts: Timestamp) -> Self {
        Self {
            task,
            commit_ts,
            launch_ts: commit_ts,
            finish_ts: commit_ts,
            listing: Listing::empty(pagination),
        }
    }

    pub fn mark_launched(&mut self) {
        self.launch_ts = Timestamp::now_at_least(self.commit_ts);
        self.finish_ts = self.finish_ts.max(self.launch_ts);
    }

    /// Appends a batch of already-deduplicated items. Page-shaped listings get
    /// a new page even when the batch is empty, so page numbering follows the
    /// pagination steps taken.
    pub fn append(&mut self, batch: Vec<Item>) {
        match &mut self.listing {
            Listing::Items(items) => items.extend(batch),
            Listing::Pages(pages) => {
                let page_idx = pages.len() + 1;
                pages.push(Page::new(page_idx, batch));
            }
        }
    }

    pub fn num_items(&self) -> usize {
        match &self.listing {
            Listing::Items(items) => items.len(),
            Listing::Pages(pages) => pages.iter().map(Page::num_items).sum(),
        }
    }

    pub fn num_pages(&self) -> usize {
        match &self.listing {
            Listing::Items(_) => 0,
            Listing::Pages(pages) => pages.len(),
        }
    }

    pub fn num_imgs(&self) -> usize {
        self.listing.items().map(Item::num_imgs).sum()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.listing.items()
    }
}
