//! Scripted in-memory browser for engine tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::app::{Result, TrawlerError};
use crate::browser::{BrowserLauncher, BrowserSession};

pub const LISTING_SCRIPT: &str = "fake:listing";
pub const DETAIL_SCRIPT: &str = "fake:detail";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Launch,
    Goto(String),
    Click(String),
    Listing,
    Detail,
    Scroll(u32),
    Back,
    Quit,
    /// Any other script passed to `evaluate`
    Script(String),
}

/// One scripted answer to `is_present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Present,
    Absent,
    /// The driver call itself fails
    Fail,
}

/// What one fake session's page looks like.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// Selectors that are present for the whole session
    pub present: HashSet<String>,
    /// Successive `is_present` answers per selector; the last one repeats.
    /// Takes precedence over `present`.
    pub checks: HashMap<String, VecDeque<Check>>,
    /// URLs whose navigation fails
    pub unreachable: HashSet<String>,
    /// Successive listing extraction results; the last one repeats
    pub batches: VecDeque<Value>,
    pub detail: Value,
}

impl PageScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_present(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn with_checks(mut self, selector: &str, checks: &[Check]) -> Self {
        self.checks
            .insert(selector.to_string(), checks.iter().copied().collect());
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn with_batch(mut self, batch: Value) -> Self {
        self.batches.push_back(batch);
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct FakeSession {
    script: PageScript,
    calls: CallLog,
}

impl FakeSession {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.record(Call::Goto(url.to_string()));
        if self.script.unreachable.contains(url) {
            return Err(TrawlerError::Browser(format!("net::ERR_CONNECTION_RESET at {}", url)));
        }
        Ok(())
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool> {
        let Some(checks) = self.script.checks.get_mut(selector) else {
            return Ok(self.script.present.contains(selector));
        };
        let check = if checks.len() > 1 {
            checks.pop_front()
        } else {
            checks.front().copied()
        };
        match check {
            Some(Check::Present) => Ok(true),
            Some(Check::Absent) | None => Ok(false),
            Some(Check::Fail) => Err(TrawlerError::Browser(
                "Execution context was destroyed".into(),
            )),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        if !self.script.present.contains(selector) {
            return Err(TrawlerError::Browser(format!("Element {} not found", selector)));
        }
        self.record(Call::Click(selector.to_string()));
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        match script {
            LISTING_SCRIPT => {
                self.record(Call::Listing);
                let batch = if self.script.batches.len() > 1 {
                    self.script.batches.pop_front()
                } else {
                    self.script.batches.front().cloned()
                };
                Ok(batch.unwrap_or_else(|| Value::Array(Vec::new())))
            }
            DETAIL_SCRIPT => {
                self.record(Call::Detail);
                Ok(self.script.detail.clone())
            }
            other => {
                self.record(Call::Script(other.to_string()));
                Ok(Value::Null)
            }
        }
    }

    async fn back(&mut self) -> Result<()> {
        self.record(Call::Back);
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.record(Call::Quit);
        Ok(())
    }

    async fn scroll_by(&mut self, pixels: u32) -> Result<()> {
        self.record(Call::Scroll(pixels));
        Ok(())
    }
}

/// Hands out one scripted session per launch, in order.
pub struct FakeLauncher {
    scripts: Mutex<VecDeque<Option<PageScript>>>,
    calls: CallLog,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_session(self, script: PageScript) -> Self {
        self.scripts.lock().unwrap().push_back(Some(script));
        self
    }

    /// The next launch fails as if no browser were installed.
    pub fn with_failed_launch(self) -> Self {
        self.scripts.lock().unwrap().push_back(None);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        self.calls.lock().unwrap().push(Call::Launch);
        let script = self.scripts.lock().unwrap().pop_front().flatten();
        match script {
            Some(script) => Ok(Box::new(FakeSession {
                script,
                calls: self.calls.clone(),
            })),
            None => Err(TrawlerError::Browser("no browser available".into())),
        }
    }
}
