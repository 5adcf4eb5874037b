pub mod google_auth_token;
pub mod notification_job;
pub mod notifier;
pub mod push_message;
pub mod reminder;

pub use notification_job::{notification_job, run_with_timeout};
pub use notifier::{build_notification, NotificationFailure, Notifier, NotifyOutcome, RunSummary};
pub use push_message::PushNotification;
pub use reminder::{ReminderKind, ReminderWindow};
