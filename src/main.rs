//! `brainctl` — a thin demo CLI exercising the engine facade end-to-end.
//!
//! Wraps `Engine` with an in-process demo `DataSource` so
//! `import`/`export`/`list`/`status` are runnable without wiring up a
//! real relational backend.

use anyhow::Result;
use async_trait::async_trait;
use brain_engine::apply::{DataSource, Isolation};
use brain_engine::config::StorageConfig;
use brain_engine::engine::Engine;
use brain_engine::error::EngineError;
use brain_engine::task::{QueryInfo, Task, TaskStatus};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "brainctl", about = "Demo CLI for the import/export execution engine")]
struct Cli {
    /// Path to a StorageConfig TOML file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved storage configuration.
    Init,
    /// Submit an import task from a local `.dat` file.
    Import {
        file: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        transactional: bool,
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Submit an export task against the in-process demo data source.
    Export {
        user: String,
        tables: Vec<String>,
    },
    /// List tasks owned by a user.
    List { user: String },
    /// Show the status of one task.
    Status { user: String, task_code: u64 },
    /// Drop a task and its associated file.
    Drop { user: String, task_code: u64 },
}

/// In-process demo data source backed by a handful of seeded tables. Lets
/// the `export` subcommand produce a real workbook without an external
/// database.
struct DemoDataSource {
    tables: Mutex<BTreeMap<String, Vec<BTreeMap<String, Value>>>>,
}

impl DemoDataSource {
    fn seeded() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(
            "customers".to_string(),
            vec![
                BTreeMap::from([("id".to_string(), Value::String("1".into())), ("name".to_string(), Value::String("Ada".into()))]),
                BTreeMap::from([("id".to_string(), Value::String("2".into())), ("name".to_string(), Value::String("Grace".into()))]),
            ],
        );
        Self { tables: Mutex::new(tables) }
    }
}

#[async_trait]
impl DataSource for DemoDataSource {
    async fn begin_transactional(&self, _timeout_secs: u64, _isolation: Isolation) -> Result<(), EngineError> {
        Ok(())
    }

    async fn rollback(&self, _error: &EngineError) -> Result<(), EngineError> {
        Ok(())
    }

    async fn end_transactional(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn lock_record(&self, _table_id: &str, _filter: &BTreeMap<String, Value>) -> Result<bool, EngineError> {
        Ok(false)
    }

    async fn insert(&self, _table_id: &str, _data: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        Ok(())
    }

    async fn update(&self, _table_id: &str, _data: &BTreeMap<String, Value>, _filter: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        Ok(())
    }

    async fn delete(&self, _table_id: &str, _filter: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        Ok(())
    }

    async fn query(&self, table_name: &str, _statement: &str) -> Result<Vec<BTreeMap<String, Value>>, EngineError> {
        Ok(self.tables.lock().get(table_name).cloned().unwrap_or_default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("BRAIN_DEBUG").is_ok() || env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "brain_engine=debug".into()))
            .init();
    }

    let cli = Cli::parse();
    let config = StorageConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Init => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Import { file, user, transactional, timeout } => {
            let engine = Engine::initialize(config, Arc::new(DemoDataSource::seeded())).await?;
            brain_engine::msg_info!(brain_engine::libs::messages::Message::EngineInitialized(engine.node_identity().to_string()));
            let stream = std::fs::File::open(&file)?;
            let task_code = engine.submit_import(stream, &user, transactional, timeout).await;
            if task_code == 0 {
                brain_engine::msg_error!(brain_engine::libs::messages::Message::ImportSubmitFailed);
            } else {
                brain_engine::msg_success!(brain_engine::libs::messages::Message::ImportSubmitted(task_code));
            }
        }
        Command::Export { user, tables } => {
            let engine = Engine::initialize(config, Arc::new(DemoDataSource::seeded())).await?;
            let queries = tables
                .into_iter()
                .map(|table_name| QueryInfo { statement: format!("select * from {table_name}"), table_name })
                .collect();
            let task_code = engine.submit_export(&user, queries, false).await;
            brain_engine::msg_success!(brain_engine::libs::messages::Message::ExportSubmitted(task_code));
        }
        Command::List { user } => {
            let engine = Engine::initialize(config, Arc::new(DemoDataSource::seeded())).await?;
            for task in engine.task_list(&user, 1, 20).await {
                print_task(&task);
            }
        }
        Command::Status { user, task_code } => {
            let engine = Engine::initialize(config, Arc::new(DemoDataSource::seeded())).await?;
            match engine.task_info(&user, task_code).await {
                Some(task) => print_task(&task),
                None => brain_engine::msg_error!(brain_engine::libs::messages::Message::TaskNotFound(task_code)),
            }
        }
        Command::Drop { user, task_code } => {
            let engine = Engine::initialize(config, Arc::new(DemoDataSource::seeded())).await?;
            if engine.drop_task(&user, task_code).await {
                brain_engine::msg_success!(brain_engine::libs::messages::Message::TaskDropped(task_code));
            } else {
                brain_engine::msg_error!(brain_engine::libs::messages::Message::TaskDropFailed(task_code));
            }
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    let header = task.header();
    let status = match header.status {
        TaskStatus::Created => "created",
        TaskStatus::Processing => "processing",
        TaskStatus::Finished => "finished",
    };
    let created = chrono::DateTime::from_timestamp_millis(header.create_time)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| header.create_time.to_string());
    println!("{:016x}  {:<9}  {:<7}  created={}  error={}", header.task_code, task.kind(), status, created, header.has_error);
}
