//! Storage-independent business rules.

pub mod notification;
pub mod quota;

pub use notification::Notification;
pub use quota::{quota_window, window_start, QuotaSnapshot, QUOTA_WINDOW_HOURS};
