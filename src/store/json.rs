use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::app::{Result, TrawlerError};
use crate::domain::TaskResult;
use crate::store::ResultStore;

/// One indented JSON file per task: `<dir>/<task id>.json`.
pub struct JsonStore {
    dir: PathBuf,
    dir_ready: OnceLock<()>,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            dir_ready: OnceLock::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, task_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", task_id))
    }

    /// Reads a snapshot previously written by any `JsonStore`.
    pub fn load(path: &Path) -> Result<TaskResult> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir_ready.get().is_some() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| TrawlerError::Persistence {
            path: self.dir.clone(),
            source: e,
        })?;
        let _ = self.dir_ready.set(());
        Ok(())
    }
}

fn to_pretty_json(result: &TaskResult) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    result.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(body)?;
    file.sync_all()
}

impl ResultStore for JsonStore {
    fn write(&self, result: &TaskResult) -> Result<()> {
        self.ensure_dir()?;

        let body = to_pretty_json(result)?;
        let path = self.path_for(&result.task.id);
        let tmp = self.dir.join(format!(".{}.json.tmp", result.task.id));

        let persist_err = |source| TrawlerError::Persistence {
            path: path.clone(),
            source,
        };

        // Write next to the target, then rename over it: readers and crashes
        // only ever see a complete snapshot.
        let written = write_synced(&tmp, &body).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(persist_err(e));
        }

        tracing::debug!(
            "Saved {} items for task {} to {}",
            result.num_items(),
            result.task.id,
            path.display()
        );
        Ok(())
    }
}
