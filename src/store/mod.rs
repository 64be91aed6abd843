pub mod json;

use crate::app::Result;
use crate::domain::{TaskResult, Timestamp};

pub use json::JsonStore;

pub trait ResultStore: Send + Sync {
    /// Write a full snapshot of `result`, replacing any previous one for the
    /// same task id.
    fn write(&self, result: &TaskResult) -> Result<()>;

    /// Checkpoint: refresh `finish_ts` and write the snapshot.
    ///
    /// On failure the in-memory result is left exactly as it was, so
    /// `finish_ts` keeps pointing at the last successful checkpoint.
    fn persist(&self, result: &mut TaskResult) -> Result<()> {
        let finish_ts = Timestamp::now_at_least(result.finish_ts.max(result.launch_ts));
        let previous = std::mem::replace(&mut result.finish_ts, finish_ts);

        if let Err(e) = self.write(result) {
            result.finish_ts = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;
    use crate::app::TrawlerError;

    /// Keeps every snapshot it is asked to write.
    #[derive(Default)]
    pub struct MemoryStore {
        pub snapshots: Mutex<Vec<TaskResult>>,
        fail_writes: Mutex<usize>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// The next `n` writes fail.
        pub fn fail_next(&self, n: usize) {
            *self.fail_writes.lock().unwrap() = n;
        }

        pub fn snapshots_for(&self, task_id: &str) -> Vec<TaskResult> {
            self.snapshots
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.task.id == task_id)
                .cloned()
                .collect()
        }
    }

    impl ResultStore for MemoryStore {
        fn write(&self, result: &TaskResult) -> Result<()> {
            let mut remaining = self.fail_writes.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TrawlerError::Persistence {
                    path: format!("memory/{}.json", result.task.id).into(),
                    source: std::io::Error::other("simulated failure"),
                });
            }
            self.snapshots.lock().unwrap().push(result.clone());
            Ok(())
        }
    }
}
