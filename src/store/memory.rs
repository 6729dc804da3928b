//! Single-mutex, single-`Vec` reference task store.
//!
//! All mutating operations acquire the one lock for their entire critical
//! section, so no pointer identity into the list ever escapes the lock.

use super::TaskStore;
use crate::id::now_millis;
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn initialize(&self, _base_path: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn destroy(&self) -> anyhow::Result<()> {
        self.tasks.lock().clear();
        Ok(())
    }

    async fn add_task(&self, task: Task) -> bool {
        let mut tasks = self.tasks.lock();
        if tasks.iter().any(|existing| existing == &task) {
            return true;
        }
        tasks.push(task);
        true
    }

    async fn process_task(&self, task_code: u64, node_identity: &str) {
        let mut tasks = self.tasks.lock();
        if let Some(task) = tasks.iter_mut().find(|t| t.task_code() == task_code) {
            let header = task.header_mut();
            if header.identify_code.as_deref() == Some(node_identity) && header.status == TaskStatus::Created {
                header.status = TaskStatus::Processing;
                header.start_time = Some(now_millis());
            }
        }
    }

    async fn next_task(&self, node_identity: &str) -> Option<Task> {
        let mut tasks = self.tasks.lock();

        // Resume preference: an already-PROCESSING task owned by this node.
        if let Some(task) = tasks
            .iter()
            .find(|t| t.header().status == TaskStatus::Processing && t.header().identify_code.as_deref() == Some(node_identity))
        {
            return Some(task.clone());
        }

        // Otherwise claim the first unclaimed CREATED task.
        if let Some(task) = tasks.iter_mut().find(|t| t.header().status == TaskStatus::Created && t.header().identify_code.is_none()) {
            task.header_mut().identify_code = Some(node_identity.to_string());
            return Some(task.clone());
        }

        None
    }

    async fn finish_task(&self, task_code: u64, has_error: bool, error_message: Option<String>) {
        let mut tasks = self.tasks.lock();
        if let Some(task) = tasks.iter_mut().find(|t| t.task_code() == task_code) {
            let header = task.header_mut();
            if header.status == TaskStatus::Processing {
                header.status = TaskStatus::Finished;
                header.end_time = Some(now_millis());
                header.has_error = has_error;
                header.error_message = error_message;
            }
        }
    }

    async fn drop_task(&self, user_code: &str, task_code: u64) -> bool {
        let mut tasks = self.tasks.lock();
        // Removes at most one match.
        if let Some(position) = tasks.iter().position(|t| t.header().user_code == user_code && t.task_code() == task_code) {
            tasks.remove(position);
            true
        } else {
            false
        }
    }

    async fn drop_expired(&self, expire_millis: i64) {
        let cutoff = now_millis() + expire_millis;
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| {
            let header = t.header();
            !(header.status == TaskStatus::Finished && header.end_time.map(|end| end < cutoff).unwrap_or(false))
        });
    }

    async fn task_list(&self, user_code: &str, page_no: u32, limit_size: u32) -> Vec<Task> {
        let tasks = self.tasks.lock();
        let page_no = page_no.max(1);
        let limit_size = if limit_size == 0 { 20 } else { limit_size };
        let matching: Vec<Task> = tasks.iter().filter(|t| t.header().user_code == user_code).cloned().collect();
        let start = ((page_no - 1) * limit_size) as usize;
        matching.into_iter().skip(start).take(limit_size as usize).collect()
    }

    async fn task_info(&self, user_code: &str, task_code: u64) -> Option<Task> {
        let tasks = self.tasks.lock();
        tasks.iter().find(|t| t.header().user_code == user_code && t.task_code() == task_code).cloned()
    }
}
