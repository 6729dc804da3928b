//! Task model: a tagged sum over {Import, Export} with a shared header.

use serde::{Deserialize, Serialize};

/// Lifecycle status; transitions are monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Created,
    Processing,
    Finished,
}

/// Fields shared by every task, regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHeader {
    pub task_code: u64,
    pub user_code: String,
    pub create_time: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub status: TaskStatus,
    pub has_error: bool,
    pub error_message: Option<String>,
    /// Owning node identity while claimed; `None` until claimed.
    pub identify_code: Option<String>,
}

impl TaskHeader {
    pub fn new(task_code: u64, user_code: impl Into<String>, now: i64) -> Self {
        Self {
            task_code,
            user_code: user_code.into(),
            create_time: now,
            start_time: None,
            end_time: None,
            status: TaskStatus::Created,
            has_error: false,
            error_message: None,
            identify_code: None,
        }
    }

    /// Appends a line to `error_message`, CRLF-separated.
    pub fn append_error(&mut self, line: &str) {
        match &mut self.error_message {
            Some(existing) => {
                existing.push_str("\r\n");
                existing.push_str(line);
            }
            None => self.error_message = Some(line.to_string()),
        }
    }
}

/// Opaque-to-the-core query description handed to the external data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub table_name: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportTask {
    pub header: TaskHeader,
    pub data_path: String,
    pub transactional: bool,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    pub header: TaskHeader,
    pub compatibility_mode: bool,
    pub query_list: Vec<QueryInfo>,
    pub output_path: String,
}

/// Tagged sum over the two task kinds; the scheduler dispatches on this tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    Import(ImportTask),
    Export(ExportTask),
}

impl Task {
    pub fn header(&self) -> &TaskHeader {
        match self {
            Task::Import(task) => &task.header,
            Task::Export(task) => &task.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut TaskHeader {
        match self {
            Task::Import(task) => &mut task.header,
            Task::Export(task) => &mut task.header,
        }
    }

    pub fn task_code(&self) -> u64 {
        self.header().task_code
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Task::Import(_) => "import",
            Task::Export(_) => "export",
        }
    }
}
