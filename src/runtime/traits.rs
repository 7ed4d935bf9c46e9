//! Trait abstractions for runtime collaborators
//!
//! The transport seam lives in `crate::transport`; the clock is injected
//! here so message timestamps are deterministic under test.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current time for message timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
