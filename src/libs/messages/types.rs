//! User-facing message catalog for the demo CLI.

use std::fmt;

/// Messages the demo binary can print; kept separate from `tracing` events
/// so CLI output stays readable without `RUST_LOG` set.
pub enum Message {
    ImportSubmitted(u64),
    ImportSubmitFailed,
    ExportSubmitted(u64),
    TaskNotFound(u64),
    TaskDropped(u64),
    TaskDropFailed(u64),
    EngineInitialized(String),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::ImportSubmitted(code) => write!(f, "Import task {code:016x} submitted"),
            Message::ImportSubmitFailed => write!(f, "Failed to submit import task"),
            Message::ExportSubmitted(code) => write!(f, "Export task {code:016x} submitted"),
            Message::TaskNotFound(code) => write!(f, "Task {code:016x} not found"),
            Message::TaskDropped(code) => write!(f, "Task {code:016x} dropped"),
            Message::TaskDropFailed(code) => write!(f, "Failed to drop task {code:016x}"),
            Message::EngineInitialized(node_identity) => write!(f, "Engine initialized, node identity {node_identity}"),
        }
    }
}
