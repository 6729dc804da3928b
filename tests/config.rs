use brain_engine::config::StorageConfig;

const DEFAULT_THREAD_LIMIT: i32 = 20;
const DEFAULT_EXPIRE_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

#[test]
fn defaults_are_sane() {
    let config = StorageConfig::default().normalized();
    assert_eq!(config.storage_provider, "memory");
    assert_eq!(config.thread_limit, DEFAULT_THREAD_LIMIT);
    assert_eq!(config.expire_millis, DEFAULT_EXPIRE_MILLIS);
}

#[test]
fn normalized_clamps_invalid_thread_limit() {
    let mut config = StorageConfig::default();
    config.thread_limit = 0;
    let config = config.normalized();
    assert_eq!(config.thread_limit, DEFAULT_THREAD_LIMIT);
}

#[test]
fn normalized_keeps_disabled_expiry() {
    let mut config = StorageConfig::default();
    config.expire_millis = -1;
    let config = config.normalized();
    assert_eq!(config.expire_millis, -1);
}
