/// Clock abstraction for the engine
///
/// Every computation reads "now" through a `Clock` value handed to the
/// `Calendar`. Tests inject a `FixedClock` instead of patching shared state.

use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant, in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
