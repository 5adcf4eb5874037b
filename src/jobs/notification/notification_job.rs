use std::{future::Future, time::Duration};
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::notifier::{Notifier, RunSummary};
use crate::{constants::*, utils::env_or_default};

pub async fn notification_job(notifier: Notifier) {
    tracing::debug!("initializing notification scheduler job");
    // both values are mentioned in seconds
    let period = env_or_default("NOTIFICATION_JOB_INTERVAL_SECS", NOTIFICATION_JOB_INTERVAL);
    let ceiling = env_or_default("NOTIFICATION_RUN_TIMEOUT_SECS", NOTIFICATION_RUN_TIMEOUT);
    let ceiling = Duration::from_secs(ceiling);
    let mut interval = interval(Duration::from_secs(period.max(1)));
    // a slow run delays the next tick instead of causing a burst of runs
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        run_with_timeout(notifier.run(), ceiling).await;
    }
}

/// Drives one notifier run, dropping it when it takes longer than `ceiling`
pub async fn run_with_timeout<F>(run: F, ceiling: Duration) -> Option<RunSummary>
where
    F: Future<Output = RunSummary>,
{
    match timeout(ceiling, run).await {
        Ok(summary) => Some(summary),
        Err(_) => {
            tracing::error!("notification run aborted after {:?}", ceiling);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use mongodb::bson::Document;
    use std::sync::Arc;

    use super::*;

    use mockall_double::double;

    #[double]
    use crate::database::AppDatabase;

    #[double]
    use crate::jobs::notification::push_message::FcmClient;

    #[tokio::test]
    async fn test_run_within_ceiling() {
        let mut db = AppDatabase::default();
        db.expect_find::<Document>()
            .with(always(), always(), always(), always())
            .times(2)
            .returning(|_, _, _, _| Ok(vec![]));
        let notifier = Notifier::new(Arc::new(db), Arc::new(FcmClient::default()));

        let summary = run_with_timeout(notifier.run(), Duration::from_secs(5)).await;
        let summary = summary.unwrap();
        assert_eq!(summary.one_hour_matched, 0);
        assert_eq!(summary.one_day_matched, 0);
    }

    #[tokio::test]
    async fn test_run_past_ceiling_is_aborted() {
        // a run stuck far longer than the ceiling
        let stuck_run = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            RunSummary::default()
        };

        let summary = run_with_timeout(stuck_run, Duration::from_millis(50)).await;
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_run_never_ready_is_aborted() {
        let summary = run_with_timeout(
            std::future::pending::<RunSummary>(),
            Duration::from_millis(20),
        )
        .await;
        assert!(summary.is_none());
    }
}
