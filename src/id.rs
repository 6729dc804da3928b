//! Monotonic, time-ordered 64-bit task code generator.
//!
//! Snowflake-style: high bits are milliseconds since a custom epoch, low
//! bits are a per-millisecond sequence, guaranteeing codes issued by one
//! generator are strictly increasing even under a clock that doesn't
//! advance between two calls.

use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const EPOCH_MILLIS: u64 = 1_700_000_000_000;
const SEQUENCE_BITS: u32 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

struct State {
    last_millis: u64,
    sequence: u64,
}

/// Generates unique, monotonically increasing task codes.
pub struct TaskCodeGenerator {
    state: Mutex<State>,
}

impl TaskCodeGenerator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State { last_millis: 0, sequence: 0 }),
        }
    }

    /// Returns the next task code, never repeating and never decreasing.
    pub fn next_code(&self) -> u64 {
        let mut state = self.state.lock();
        let mut now = current_millis();

        if now < state.last_millis {
            // Clock moved backward; keep issuing against the last known time.
            now = state.last_millis;
        }

        if now == state.last_millis {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted within this millisecond; spin to the next one.
                while current_millis() <= now {
                    std::hint::spin_loop();
                }
                now = current_millis();
            }
        } else {
            state.sequence = 0;
        }

        state.last_millis = now;
        ((now - EPOCH_MILLIS) << SEQUENCE_BITS) | state.sequence
    }
}

impl Default for TaskCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn current_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before unix epoch").as_millis() as u64
}

/// Current UTC time in milliseconds, used for all task timing fields.
pub fn now_millis() -> i64 {
    current_millis() as i64
}
