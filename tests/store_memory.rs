use brain_engine::store::{InMemoryTaskStore, TaskStore};
use brain_engine::task::{ImportTask, Task, TaskHeader, TaskStatus};

fn import_task(code: u64, user: &str) -> Task {
    Task::Import(ImportTask {
        header: TaskHeader::new(code, user, 0),
        data_path: format!("/tmp/{code}.dat"),
        transactional: false,
        timeout: 0,
    })
}

#[tokio::test]
async fn claim_is_exclusive_across_nodes() {
    let store = InMemoryTaskStore::new();
    store.add_task(import_task(1, "alice")).await;

    let claimed_a = store.next_task("node-a").await.unwrap();
    assert_eq!(claimed_a.header().identify_code.as_deref(), Some("node-a"));

    // Node B must not see the same task as claimable.
    let claimed_b = store.next_task("node-b").await;
    assert!(claimed_b.is_none());
}

#[tokio::test]
async fn resume_preference_returns_processing_task_first() {
    let store = InMemoryTaskStore::new();
    store.add_task(import_task(1, "alice")).await;
    store.add_task(import_task(2, "alice")).await;

    let first = store.next_task("node-a").await.unwrap();
    store.process_task(first.task_code(), "node-a").await;

    let next = store.next_task("node-a").await.unwrap();
    assert_eq!(next.task_code(), first.task_code());
}

#[tokio::test]
async fn monotonic_lifecycle() {
    let store = InMemoryTaskStore::new();
    store.add_task(import_task(1, "alice")).await;
    let claimed = store.next_task("node-a").await.unwrap();
    store.process_task(claimed.task_code(), "node-a").await;
    store.finish_task(claimed.task_code(), false, None).await;

    let info = store.task_info("alice", 1).await.unwrap();
    assert_eq!(info.header().status, TaskStatus::Finished);
    assert!(info.header().start_time.is_some());
    assert!(info.header().end_time.is_some());
}

#[tokio::test]
async fn drop_task_removes_at_most_one() {
    let store = InMemoryTaskStore::new();
    store.add_task(import_task(1, "alice")).await;
    assert!(store.drop_task("alice", 1).await);
    assert!(store.task_info("alice", 1).await.is_none());
    assert!(!store.drop_task("alice", 1).await);
}

#[tokio::test]
async fn add_task_is_idempotent_by_value_equality() {
    let store = InMemoryTaskStore::new();
    assert!(store.add_task(import_task(1, "alice")).await);
    assert!(store.add_task(import_task(1, "alice")).await);
    assert_eq!(store.task_list("alice", 1, 20).await.len(), 1);
}

#[tokio::test]
async fn drop_expired_with_zero_offset_removes_finished_tasks() {
    let store = InMemoryTaskStore::new();
    store.add_task(import_task(1, "alice")).await;
    let claimed = store.next_task("node-a").await.unwrap();
    store.process_task(claimed.task_code(), "node-a").await;
    store.finish_task(claimed.task_code(), false, None).await;

    store.drop_expired(0).await;
    assert!(store.task_info("alice", 1).await.is_none());
}
