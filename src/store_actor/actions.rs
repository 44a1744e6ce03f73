#[derive(Debug, Clone)]
pub enum NotificationAction {
    MarkRead,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationActionResult {
    /// `true` when the notification was unread before.
    MarkRead(bool),
}
