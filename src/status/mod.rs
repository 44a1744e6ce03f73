//! Order status presentation and live tracking.
//!
//! Presentation is a fixed lookup per status. Tracking follows the orders change
//! feed: the last event received wins, nothing is reordered or deduplicated.

mod board;
mod tracker;

pub use board::{apply_to_board, BaristaBoard};
pub use tracker::OrderTracker;

use crate::domain::OrderStatus;

/// How a status is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Steps shown to customers. Cancelled orders only appear on admin lists.
pub const TRACKING_STEPS: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Served,
];

impl OrderStatus {
    pub fn badge(self) -> StatusBadge {
        match self {
            OrderStatus::Pending => StatusBadge { label: "Order received", icon: "clock", color: "yellow" },
            OrderStatus::Preparing => StatusBadge { label: "Preparing", icon: "coffee", color: "blue" },
            OrderStatus::Ready => StatusBadge { label: "Ready", icon: "bell", color: "green" },
            OrderStatus::Served => StatusBadge { label: "Served", icon: "check-circle", color: "gray" },
            OrderStatus::Cancelled => StatusBadge { label: "Cancelled", icon: "x-circle", color: "red" },
        }
    }

    /// Position on the customer progress bar; `None` for cancelled.
    pub fn progress_step(self) -> Option<usize> {
        TRACKING_STEPS.iter().position(|step| *step == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_distinct_badge() {
        let labels: std::collections::HashSet<_> = OrderStatus::ALL.iter().map(|s| s.badge().label).collect();
        assert_eq!(labels.len(), OrderStatus::ALL.len());
        assert_eq!(OrderStatus::Ready.badge().color, "green");
    }

    #[test]
    fn cancelled_is_not_a_tracking_step() {
        assert_eq!(OrderStatus::Pending.progress_step(), Some(0));
        assert_eq!(OrderStatus::Served.progress_step(), Some(3));
        assert_eq!(OrderStatus::Cancelled.progress_step(), None);
    }
}
