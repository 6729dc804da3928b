//! Centralized message formatting for the demo CLI, trimmed down from the
//! full message catalog this lineage uses for its interactive commands.

pub mod macros;
pub mod types;

pub use types::Message;

pub fn success(msg: Message) -> String {
    format!("✅ {msg}")
}

pub fn error(msg: Message) -> String {
    format!("❌ {msg}")
}

pub fn info(msg: Message) -> String {
    format!("ℹ️  {msg}")
}
