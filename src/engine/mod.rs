//! Facade & lifecycle.

pub mod scheduler;

use crate::apply::DataSource;
use crate::config::StorageConfig;
use crate::export::XlsxWorkbookWriter;
use crate::hashing::node_identity;
use crate::id::{now_millis, TaskCodeGenerator};
use crate::paths::{ensure_base_path, export_output_path, import_data_path};
use crate::registry::TableRegistry;
use crate::store::{InMemoryTaskStore, TaskStore};
use crate::task::{ExportTask, ImportTask, QueryInfo, Task, TaskHeader};
use scheduler::{Scheduler, WorkbookWriterFactory};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;

const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

struct XlsxWriterFactory;

impl WorkbookWriterFactory for XlsxWriterFactory {
    fn create(&self, output_path: &str) -> Box<dyn crate::export::WorkbookWriter> {
        Box::new(XlsxWorkbookWriter::create(output_path))
    }
}

/// Process-wide engine handle, constructed explicitly rather than
/// reached for as a global — callers hold an `Arc<Engine>` and pass it
/// around instead of a singleton accessor.
pub struct Engine {
    config: StorageConfig,
    registry: Arc<TableRegistry>,
    store: Arc<dyn TaskStore>,
    node_identity: String,
    id_generator: TaskCodeGenerator,
    scheduler: Arc<Scheduler>,
}

impl Engine {
    /// Creates the base directory if missing, derives `node_identity`,
    /// clamps config, builds the store, and starts the two tickers.
    pub async fn initialize(config: StorageConfig, data_source: Arc<dyn DataSource>) -> anyhow::Result<Arc<Self>> {
        let config = config.normalized();
        ensure_base_path(&config.base_path_buf())?;

        let store: Arc<dyn TaskStore> = match config.storage_provider.as_str() {
            "memory" => Arc::new(InMemoryTaskStore::new()),
            other => {
                tracing::warn!(provider = other, "unknown storage provider, falling back to memory");
                Arc::new(InMemoryTaskStore::new())
            }
        };
        store.initialize(&config.base_path).await?;

        let machine_key = System::host_name().unwrap_or_else(|| "unknown-host".to_string());
        let node_identity = node_identity(&machine_key, &config.base_path);

        let registry = Arc::new(TableRegistry::new());
        let writer_factory: Arc<dyn WorkbookWriterFactory> = Arc::new(XlsxWriterFactory);

        let scheduler = Arc::new(Scheduler::new(store.clone(), registry.clone(), data_source, writer_factory, node_identity.clone(), &config));
        scheduler.start(config.expire_millis);

        tracing::info!(node_identity = %node_identity, base_path = %config.base_path, "engine initialized");

        Ok(Arc::new(Self {
            config,
            registry,
            store,
            node_identity,
            id_generator: TaskCodeGenerator::new(),
            scheduler,
        }))
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn node_identity(&self) -> &str {
        &self.node_identity
    }

    pub fn running_count(&self) -> usize {
        self.scheduler.running_count()
    }

    /// Stops the tickers, waits for the running-set to drain (bounded),
    /// then destroys the store.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.scheduler.stop();
        self.scheduler.drain(SHUTDOWN_DRAIN_TIMEOUT).await;
        self.store.destroy().await
    }

    /// Writes an already-generated `.dat` byte stream (produced by
    /// [`RecordGenerator`] elsewhere) to this task's data path and adds an
    /// ImportTask. Returns the zero task-code on failure.
    pub async fn submit_import(&self, mut stream: impl Read, user_code: &str, transactional: bool, timeout: u64) -> u64 {
        let task_code = self.id_generator.next_code();
        let data_path = import_data_path(&self.config.base_path_buf(), task_code);

        let mut buf = Vec::new();
        if let Err(err) = stream.read_to_end(&mut buf) {
            tracing::error!(error = %err, "failed to read import stream");
            return 0;
        }
        if let Err(err) = std::fs::write(&data_path, &buf) {
            tracing::error!(error = %err, "failed to write import data");
            return 0;
        }

        let task = Task::Import(ImportTask {
            header: TaskHeader::new(task_code, user_code, now_millis()),
            data_path: data_path.to_string_lossy().into_owned(),
            transactional,
            timeout,
        });

        if self.store.add_task(task).await {
            task_code
        } else {
            0
        }
    }

    /// Adds an ExportTask running `queries` for `user_code`.
    pub async fn submit_export(&self, user_code: &str, queries: Vec<QueryInfo>, compatibility_mode: bool) -> u64 {
        let task_code = self.id_generator.next_code();
        let output_path = export_output_path(&self.config.base_path_buf(), task_code, compatibility_mode);

        let task = Task::Export(ExportTask {
            header: TaskHeader::new(task_code, user_code, now_millis()),
            compatibility_mode,
            query_list: queries,
            output_path: output_path.to_string_lossy().into_owned(),
        });

        if self.store.add_task(task).await {
            task_code
        } else {
            0
        }
    }

    /// Deletes the task record and its `.dat`/output file. File removal is
    /// best-effort: a missing file is not an error, but any other removal
    /// failure retains the record and returns `false`.
    pub async fn drop_task(&self, user_code: &str, task_code: u64) -> bool {
        let path = match self.store.task_info(user_code, task_code).await {
            Some(Task::Import(task)) => task.data_path,
            Some(Task::Export(task)) => task.output_path,
            None => return false,
        };

        if let Err(err) = std::fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path, error = %err, "failed to remove task artifact, retaining record");
                return false;
            }
        }

        self.store.drop_task(user_code, task_code).await
    }

    pub async fn task_list(&self, user_code: &str, page_no: u32, limit_size: u32) -> Vec<Task> {
        self.store.task_list(user_code, page_no, limit_size).await
    }

    pub async fn task_info(&self, user_code: &str, task_code: u64) -> Option<Task> {
        self.store.task_info(user_code, task_code).await
    }
}
