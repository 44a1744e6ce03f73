use chrono::{DateTime, Utc};

/// Server-side procedures on a single order.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Atomically moves the order to `served` and stamps `served_at`.
    MarkServed,
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    MarkServed { served_at: DateTime<Utc> },
}
