//! Task store: interface and in-memory reference implementation.

pub mod memory;

use crate::task::Task;
use async_trait::async_trait;

pub use memory::InMemoryTaskStore;

/// Contract a task store must satisfy. Implementations are free to
/// choose their own internal concurrency strategy as long as the per-task
/// lifecycle invariants hold.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn initialize(&self, base_path: &str) -> anyhow::Result<()>;
    async fn destroy(&self) -> anyhow::Result<()>;

    /// Rejects duplicates by value equality; returns `true` on success or
    /// if an equal task already exists.
    async fn add_task(&self, task: Task) -> bool;

    /// Transitions CREATED→PROCESSING iff the task is claimed by
    /// `node_identity`. Idempotent.
    async fn process_task(&self, task_code: u64, node_identity: &str);

    /// Resume-preferred claim: returns a task already PROCESSING under
    /// `node_identity` before considering any CREATED task.
    async fn next_task(&self, node_identity: &str) -> Option<Task>;

    async fn finish_task(&self, task_code: u64, has_error: bool, error_message: Option<String>);

    /// Deletes at most one task owned by `user_code` with the given code.
    async fn drop_task(&self, user_code: &str, task_code: u64) -> bool;

    /// Deletes all FINISHED tasks whose `end_time < now + expire_millis`
    /// (an additive cutoff — see `DESIGN.md` for why).
    async fn drop_expired(&self, expire_millis: i64);

    async fn task_list(&self, user_code: &str, page_no: u32, limit_size: u32) -> Vec<Task>;

    async fn task_info(&self, user_code: &str, task_code: u64) -> Option<Task>;
}
