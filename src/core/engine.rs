use crate::config::environment::Environment;
use crate::domain::ports::{Source, StorageBackend, Transformer};
use crate::utils::error::{Result, Stage};
use crate::utils::monitor::SystemMonitor;

/// Fetch, transform, persist: once per `execute`, in that order.
///
/// Errors are tagged with the stage they came from and returned as-is;
/// nothing is retried.
pub struct IngestEngine<S: Source, T: Transformer, B: StorageBackend> {
    environment: Environment,
    source: S,
    transformer: T,
    storage: B,
    monitor: SystemMonitor,
}

impl<S: Source, T: Transformer, B: StorageBackend> IngestEngine<S, T, B> {
    pub fn new(environment: Environment, source: S, transformer: T, storage: B) -> Self {
        Self::new_with_monitoring(environment, source, transformer, storage, false)
    }

    pub fn new_with_monitoring(
        environment: Environment,
        source: S,
        transformer: T,
        storage: B,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            environment,
            source,
            transformer,
            storage,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn execute(&self) -> Result<()> {
        tracing::info!("Starting ingestion for environment '{}'", self.environment.name());
        self.monitor.log_stats("Start");

        tracing::debug!("Fetching data...");
        let payload = self.source.fetch().map_err(|e| e.at_stage(Stage::Fetch))?;
        tracing::debug!("Fetched a {} payload", payload.kind());
        self.monitor.log_stats("Fetch");

        tracing::debug!("Transforming data...");
        let transformed = self
            .transformer
            .apply(payload)
            .map_err(|e| e.at_stage(Stage::Transform))?;
        self.monitor.log_stats("Transform");

        tracing::debug!("Persisting a {} payload...", transformed.kind());
        self.storage
            .persist(&transformed)
            .map_err(|e| e.at_stage(Stage::Persist))?;
        self.monitor.log_stats("Persist");

        self.monitor.log_final_stats();
        tracing::info!("Ingestion for environment '{}' finished", self.environment.name());
        Ok(())
    }
}
