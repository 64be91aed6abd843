use crate::app::error::{Result, TrawlerError};
use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::engine::{Pacer, TaskRunner};
use crate::sites::SiteRegistry;
use crate::store::JsonStore;

pub struct AppContext {
    pub config: Config,
    pub registry: SiteRegistry,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: SiteRegistry::default(),
        }
    }

    /// Reads `~/.config/trawler/config.toml`, or `path` when given.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Config::load_from(p),
            None => Config::load(),
        }
        .map_err(|e| TrawlerError::Config(e.to_string()))?;
        Ok(Self::new(config))
    }

    pub fn launcher(&self) -> ChromeLauncher {
        ChromeLauncher::new(self.config.browser.clone())
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::new(&self.config.output.results_dir)
    }

    /// A runner wired to Chrome and the JSON result directory, logging each
    /// task to its own file.
    pub fn runner(&self) -> TaskRunner<ChromeLauncher, JsonStore> {
        let output = &self.config.output;
        TaskRunner::new(
            self.launcher(),
            self.store(),
            self.registry.clone(),
            Pacer::new(self.config.pacing.clone()),
            self.config.wait.clone(),
        )
        .with_task_logs(&output.logs_dir, output.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Site;

    #[test]
    fn test_store_uses_configured_directory() {
        let mut config = Config::default();
        config.output.results_dir = "out/results".into();
        let ctx = AppContext::new(config);
        assert_eq!(ctx.store().path_for("t1"), std::path::Path::new("out/results/t1.json"));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[browser]\nheadless = true\n").unwrap();

        let ctx = AppContext::load(Some(&path)).unwrap();
        assert!(ctx.config.browser.headless);
        assert!(ctx.registry.get(Site::Vinted).is_ok());
    }

    #[test]
    fn test_load_reports_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pacing]\nsettle = [5.0, 1.0]\n").unwrap();

        let err = AppContext::load(Some(&path)).err().unwrap();
        assert!(matches!(err, TrawlerError::Config(_)));
    }
}
