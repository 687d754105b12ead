//! Plan identifier generation

use std::sync::atomic::{AtomicI64, Ordering};

use super::NEW_PLAN_SENTINEL;
use crate::time;

/// Source of fresh plan identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier not handed out before by this generator.
    /// Must never return the `"new"` sentinel.
    fn next_id(&self) -> String;
}

/// Time-derived ids: Unix milliseconds, e.g. `1700000000000`
///
/// Two calls within the same millisecond still get distinct ids; the later
/// one is bumped past the previous value.
#[derive(Debug, Default)]
pub struct MillisIdGenerator {
    last: AtomicI64,
}

impl MillisIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for MillisIdGenerator {
    fn next_id(&self) -> String {
        let now = time::now_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > prev { now } else { prev + 1 };
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Hands out a fixed base id, then `base-2`, `base-3`, ... (for tests and fixtures)
#[derive(Debug)]
pub struct FixedIdGenerator {
    base: String,
    issued: AtomicI64,
}

impl FixedIdGenerator {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        assert_ne!(base, NEW_PLAN_SENTINEL, "sentinel cannot be used as an id");
        Self {
            base,
            issued: AtomicI64::new(0),
        }
    }
}

impl IdGenerator for FixedIdGenerator {
    fn next_id(&self) -> String {
        match self.issued.fetch_add(1, Ordering::Relaxed) {
            0 => self.base.clone(),
            n => format!("{}-{}", self.base, n + 1),
        }
    }
}
