use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, warn, Dispatch};

use crate::app::{logging, Result};
use crate::browser::{BrowserLauncher, BrowserSession};
use crate::config::WaitConfig;
use crate::domain::{Item, Pagination, Task, TaskResult};
use crate::engine::{waiter, DedupIndex, Pacer, RunState};
use crate::sites::{self, SiteAdapter, SiteRegistry};
use crate::store::ResultStore;

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Reached `max_items` or `max_pages`
    Completed,
    /// The site ran out of results before the budget was reached
    Exhausted,
    /// Content never rendered, or the session failed mid-task
    SessionFatal,
    /// No browser session could be opened
    LaunchFailed,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskOutcome::Completed => "completed",
            TaskOutcome::Exhausted => "exhausted",
            TaskOutcome::SessionFatal => "session fatal",
            TaskOutcome::LaunchFailed => "launch failed",
        };
        f.write_str(s)
    }
}

/// Final state of a run plus one outcome per task, in submission order.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub outcomes: Vec<(String, TaskOutcome)>,
}

impl RunReport {
    pub fn outcome(&self, task_id: &str) -> Option<TaskOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == task_id)
            .map(|(_, outcome)| *outcome)
    }

    pub fn result(&self, task_id: &str) -> Option<&TaskResult> {
        self.state.get(task_id)
    }
}

struct TaskLogs {
    dir: PathBuf,
    console: bool,
}

/// Runs scraping tasks one after another, one fresh browser session each.
pub struct TaskRunner<L, S> {
    launcher: L,
    store: S,
    registry: SiteRegistry,
    pacer: Pacer,
    wait: WaitConfig,
    task_logs: Option<TaskLogs>,
}

impl<L: BrowserLauncher, S: ResultStore> TaskRunner<L, S> {
    pub fn new(
        launcher: L,
        store: S,
        registry: SiteRegistry,
        pacer: Pacer,
        wait: WaitConfig,
    ) -> Self {
        Self {
            launcher,
            store,
            registry,
            pacer,
            wait,
            task_logs: None,
        }
    }

    /// Also write each task's log lines to `<dir>/<task id>.log`.
    pub fn with_task_logs(mut self, dir: impl Into<PathBuf>, console: bool) -> Self {
        self.task_logs = Some(TaskLogs {
            dir: dir.into(),
            console,
        });
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commits all tasks, then executes them strictly in order.
    ///
    /// Only an invalid submission is an error; a task whose session fails is
    /// reported through its outcome and the run moves on.
    pub async fn run(&mut self, tasks: Vec<Task>) -> Result<RunReport> {
        let mut state = RunState::commit(tasks, &self.registry)?;
        info!("Committed {} tasks", state.len());

        let mut outcomes = Vec::with_capacity(state.len());
        for id in state.ids().to_vec() {
            let Some(result) = state.get_mut(&id) else {
                continue;
            };

            let outcome = match self.task_dispatch(&id) {
                Some(dispatch) => self.run_task(result).with_subscriber(dispatch).await,
                None => self.run_task(result).await,
            };
            info!("Task {} finished: {}", id, outcome);
            outcomes.push((id, outcome));
        }

        Ok(RunReport { state, outcomes })
    }

    fn task_dispatch(&self, task_id: &str) -> Option<Dispatch> {
        let logs = self.task_logs.as_ref()?;
        match logging::task_dispatch(&logs.dir, task_id, logs.console) {
            Ok(dispatch) => Some(dispatch),
            Err(e) => {
                warn!("No log file for task {}: {}", task_id, e);
                None
            }
        }
    }

    async fn run_task(&mut self, result: &mut TaskResult) -> TaskOutcome {
        let task = result.task.clone();
        let adapter = match self.registry.get(task.site) {
            Ok(adapter) => adapter,
            Err(e) => {
                error!("Task {}: {}", task.id, e);
                return TaskOutcome::SessionFatal;
            }
        };

        result.mark_launched();
        info!(
            "Starting task {} on {}: \"{}\"",
            task.id,
            task.site,
            task.query.search_text()
        );

        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                error!("Could not launch browser for task {}: {}", task.id, e);
                return TaskOutcome::LaunchFailed;
            }
        };

        let outcome = match self
            .drive(adapter.as_ref(), session.as_mut(), &task, result)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Task {} stopped: {}", task.id, e);
                TaskOutcome::SessionFatal
            }
        };

        if let Err(e) = session.quit().await {
            warn!("Browser for task {} did not close cleanly: {}", task.id, e);
        }

        info!(
            "Task {}: {} items, {} pages, {} images",
            task.id,
            result.num_items(),
            result.num_pages(),
            result.num_imgs()
        );
        outcome
    }

    /// The pagination loop: wait, dismiss, extract, checkpoint, then either
    /// stop or advance.
    async fn drive(
        &mut self,
        adapter: &dyn SiteAdapter,
        session: &mut dyn BrowserSession,
        task: &Task,
        result: &mut TaskResult,
    ) -> Result<TaskOutcome> {
        let url = adapter.search_url(&task.query)?;
        info!("Navigating to {}", url);
        session.goto(url.as_str()).await?;

        let poll = self.wait.poll_interval();
        let content_timeout = self.wait.content_timeout(adapter.content_timeout());
        let max_idle_rounds = self.pacer.config().max_idle_rounds;

        let mut dedup = DedupIndex::new();
        let mut idle_rounds = 0;

        loop {
            waiter::wait_for_content(session, adapter.content_selector(), content_timeout, poll)
                .await?;
            waiter::dismiss_interstitials(session, adapter.interstitials(), &mut self.pacer).await;

            self.pacer.settle().await;
            let raw = sites::extract(adapter, session).await?;
            let extracted = raw.len();
            let mut fresh = dedup.observe(raw);
            info!("Extracted {} items, {} new", extracted, fresh.len());

            let visited = if task.scrape_item_page {
                self.visit_item_pages(adapter, session, &mut fresh, content_timeout)
                    .await
            } else {
                Ok(())
            };

            // The batch is kept even when the results page was lost on the way
            // back from an item page.
            let new_items = fresh.len();
            result.append(fresh);
            if let Err(e) = self.store.persist(result) {
                error!("Checkpoint for task {} failed: {}", task.id, e);
            }
            visited?;

            if result.num_items() >= task.max_items {
                info!("Reached {} items (limit {})", result.num_items(), task.max_items);
                return Ok(TaskOutcome::Completed);
            }

            match adapter.pagination() {
                Pagination::Scroll => {
                    idle_rounds = if new_items == 0 { idle_rounds + 1 } else { 0 };
                    if max_idle_rounds > 0 && idle_rounds >= max_idle_rounds {
                        info!("No new items in {} rounds, feed exhausted", idle_rounds);
                        return Ok(TaskOutcome::Exhausted);
                    }

                    for pass in self.pacer.scroll_plan() {
                        tokio::time::sleep(pass.pause).await;
                        session.scroll_by(pass.pixels).await?;
                    }
                }
                Pagination::Paged => {
                    if result.num_pages() >= task.max_pages {
                        info!("Reached {} pages (limit {})", result.num_pages(), task.max_pages);
                        return Ok(TaskOutcome::Completed);
                    }

                    self.pacer.before_page_turn().await;
                    let Some(next) = adapter.next_page_selector() else {
                        return Ok(TaskOutcome::Exhausted);
                    };
                    if !session.is_present(next).await? {
                        info!("No next page after page {}", result.num_pages());
                        return Ok(TaskOutcome::Exhausted);
                    }
                    let cards = adapter.card_selector();
                    if let Some(cards) = cards {
                        if let Err(e) = waiter::mark_stale(session, cards).await {
                            debug!("Could not mark page {}: {}", result.num_pages(), e);
                        }
                    }
                    session.click(next).await?;
                    if let Some(cards) = cards {
                        waiter::wait_for_fresh(session, cards, content_timeout, poll).await;
                    }
                    debug!("Turned to page {}", result.num_pages() + 1);
                }
            }
        }
    }

    /// Opens each item's own page for its full image set, then returns to the
    /// results. An item without a URL, or whose page fails to load or render,
    /// keeps its listing data; a results page that does not come back is fatal.
    async fn visit_item_pages(
        &mut self,
        adapter: &dyn SiteAdapter,
        session: &mut dyn BrowserSession,
        items: &mut [Item],
        content_timeout: Duration,
    ) -> Result<()> {
        let Some(detail_selector) = adapter.detail_content_selector() else {
            debug!("No item page support for this site");
            return Ok(());
        };
        let poll = self.wait.poll_interval();
        let detail_timeout = self.wait.detail_timeout(adapter.detail_timeout());

        for item in items.iter_mut() {
            if item.url.is_empty() {
                warn!("Item {} has no URL, skipping its page", item.id);
                continue;
            }

            if let Err(e) = session.goto(&item.url).await {
                warn!("Could not open item page {}: {}", item.url, e);
                self.return_to_results(adapter, session, content_timeout).await?;
                continue;
            }

            match waiter::wait_for_content(session, detail_selector, detail_timeout, poll).await {
                Ok(()) => match sites::extract_detail(adapter, session).await {
                    Ok(Some(detail)) => {
                        item.apply_detail(detail);
                        debug!("Item {}: {} images", item.id, item.num_imgs());
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Could not read item page {}: {}", item.url, e),
                },
                Err(e) => warn!("Item page {} did not render: {}", item.url, e),
            }

            self.pacer.dwell_on_detail().await;
            session.back().await?;
            waiter::wait_for_content(session, adapter.content_selector(), content_timeout, poll)
                .await?;
        }
        Ok(())
    }

    /// After a failed item navigation the tab may still show the results, or
    /// may have moved; go back only in the latter case.
    async fn return_to_results(
        &mut self,
        adapter: &dyn SiteAdapter,
        session: &mut dyn BrowserSession,
        content_timeout: Duration,
    ) -> Result<()> {
        let poll = self.wait.poll_interval();
        if session.is_present(adapter.content_selector()).await.unwrap_or(false) {
            return Ok(());
        }
        session.back().await?;
        waiter::wait_for_content(session, adapter.content_selector(), content_timeout, poll).await
    }
}
