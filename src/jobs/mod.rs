use tokio::task::JoinHandle;

use self::notification::{notification_job, Notifier};

pub mod notification;

pub fn spawn_all_jobs(notifier: Notifier) -> JoinHandle<()> {
    // spawn job to periodically send out session reminders
    tokio::spawn(async move {
        notification_job(notifier).await;
    })
}
