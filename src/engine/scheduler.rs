//! Cooperative scheduler: two 1 Hz tickers driving the worker pool.

use crate::apply::{ApplyEngine, DataSource};
use crate::config::StorageConfig;
use crate::export::{ExportWorker, WorkbookWriter};
use crate::record::RecordParser;
use crate::registry::TableRegistry;
use crate::store::TaskStore;
use crate::task::Task;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Produces the concrete `WorkbookWriter` an export worker should open for
/// a given output path. Kept as a trait so the scheduler doesn't hard-code
/// a single writer implementation.
pub trait WorkbookWriterFactory: Send + Sync {
    fn create(&self, output_path: &str) -> Box<dyn WorkbookWriter>;
}

/// Bounded set of task codes currently being processed by this node.
#[derive(Default)]
pub struct RunningSet {
    codes: Mutex<HashSet<u64>>,
}

impl RunningSet {
    pub fn len(&self) -> usize {
        self.codes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_insert(&self, task_code: u64) -> bool {
        self.codes.lock().insert(task_code)
    }

    fn remove(&self, task_code: u64) {
        self.codes.lock().remove(&task_code);
    }
}

/// Schedule and expire tickers plus the shared running-set they coordinate.
pub struct Scheduler {
    store: Arc<dyn TaskStore>,
    registry: Arc<TableRegistry>,
    data_source: Arc<dyn DataSource>,
    writer_factory: Arc<dyn WorkbookWriterFactory>,
    node_identity: String,
    thread_limit: usize,
    running: Arc<RunningSet>,
    schedule_busy: Arc<AtomicBool>,
    expire_busy: Arc<AtomicBool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        registry: Arc<TableRegistry>,
        data_source: Arc<dyn DataSource>,
        writer_factory: Arc<dyn WorkbookWriterFactory>,
        node_identity: String,
        config: &StorageConfig,
    ) -> Self {
        Self {
            store,
            registry,
            data_source,
            writer_factory,
            node_identity,
            thread_limit: config.thread_limit.max(1) as usize,
            running: Arc::new(RunningSet::default()),
            schedule_busy: Arc::new(AtomicBool::new(false)),
            expire_busy: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Starts the two 1 Hz tickers as background tokio tasks.
    pub fn start(self: &Arc<Self>, expire_millis: i64) {
        let schedule_self = Arc::clone(self);
        let schedule_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                schedule_self.schedule_tick().await;
            }
        });

        let expire_self = Arc::clone(self);
        let expire_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                expire_self.expire_tick(expire_millis).await;
            }
        });

        self.handles.lock().push(schedule_handle);
        self.handles.lock().push(expire_handle);
    }

    /// Aborts both tickers. Does not forcibly cancel running workers; see
    /// [`Scheduler::drain`].
    pub fn stop(&self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }

    /// Waits for the running-set to empty, bounded by `timeout` — a
    /// graceful drain instead of forced cancellation.
    pub async fn drain(&self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.running.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// One schedule tick: re-entrancy guarded, claims tasks up to
    /// `thread_limit`, spawns a worker per claimed task.
    pub async fn schedule_tick(&self) {
        if self.schedule_busy.swap(true, Ordering::SeqCst) {
            return;
        }

        while self.running.len() < self.thread_limit {
            let task = match self.store.next_task(&self.node_identity).await {
                Some(task) => task,
                None => break,
            };

            let task_code = task.task_code();
            if !self.running.try_insert(task_code) {
                // Duplicate claim observed; treat as end-of-tick.
                break;
            }

            self.spawn_worker(task);
        }

        self.schedule_busy.store(false, Ordering::SeqCst);
    }

    /// One expire tick: re-entrancy guarded, drops FINISHED tasks
    /// past `expire_millis` unless expiry is disabled (`-1`).
    pub async fn expire_tick(&self, expire_millis: i64) {
        if self.expire_busy.swap(true, Ordering::SeqCst) {
            return;
        }
        if expire_millis != -1 {
            self.store.drop_expired(expire_millis).await;
        }
        self.expire_busy.store(false, Ordering::SeqCst);
    }

    fn spawn_worker(&self, task: Task) {
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let data_source = Arc::clone(&self.data_source);
        let writer_factory = Arc::clone(&self.writer_factory);
        let running = Arc::clone(&self.running);
        let node_identity = self.node_identity.clone();
        let task_code = task.task_code();

        tokio::spawn(async move {
            store.process_task(task_code, &node_identity).await;

            let (has_error, error_message) = match &task {
                Task::Import(import_task) => run_import(import_task, &registry, data_source.as_ref()).await,
                Task::Export(export_task) => run_export(export_task, &registry, data_source.as_ref(), writer_factory.as_ref()).await,
            };

            store.finish_task(task_code, has_error, error_message).await;
            running.remove(task_code);
        });
    }
}

async fn run_import(import_task: &crate::task::ImportTask, registry: &TableRegistry, data_source: &dyn DataSource) -> (bool, Option<String>) {
    let mut parser = match RecordParser::open(&import_task.data_path) {
        Ok(parser) => parser,
        Err(err) => return (true, Some(err.to_string())),
    };

    let mut records = Vec::new();
    if let Err(err) = parser.process(registry, |record| records.push(record.clone())) {
        return (true, Some(err.to_string()));
    }

    let apply_engine = ApplyEngine::new(registry, data_source);
    let outcome = apply_engine.apply_all(records, import_task.transactional, import_task.timeout).await;
    (outcome.has_error, outcome.error_message)
}

async fn run_export(
    export_task: &crate::task::ExportTask,
    registry: &TableRegistry,
    data_source: &dyn DataSource,
    writer_factory: &dyn WorkbookWriterFactory,
) -> (bool, Option<String>) {
    let worker = ExportWorker::new(registry, data_source);
    let writer = writer_factory.create(&export_task.output_path);
    match worker.run(export_task, writer).await {
        Ok(()) => (false, None),
        Err(err) => (true, Some(err.to_string())),
    }
}

