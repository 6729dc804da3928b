//! Convenience macros routing CLI messages to `tracing` or plain console
//! output, depending on whether debug logging is enabled.

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("BRAIN_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $crate::libs::messages::success($msg));
        } else {
            println!("{}", $crate::libs::messages::success($msg));
        }
    };
}

#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("{}", $crate::libs::messages::error($msg));
        } else {
            eprintln!("{}", $crate::libs::messages::error($msg));
        }
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $crate::libs::messages::info($msg));
        } else {
            println!("{}", $crate::libs::messages::info($msg));
        }
    };
}
