//! Notification port - Local, non-blocking user notices
//!
//! Notices land on the local participant's screen only; nothing here is
//! broadcast or persisted. Implementations must not block.

/// Port for surfacing notices to the local user
pub trait NotificationPort: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}
