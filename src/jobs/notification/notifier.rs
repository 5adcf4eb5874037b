use mongodb::bson::{doc, from_document, oid::ObjectId, Document};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::{
    push_message::PushNotification,
    reminder::{ReminderKind, ReminderWindow},
};
use crate::{
    constants::*,
    models::{Session, User},
    utils::{get_epoch_ts, parse_object_id, AppError},
};

#[cfg(test)]
use mockall_double::double;

#[cfg_attr(test, double)]
use crate::database::AppDatabase;

#[cfg_attr(test, double)]
use super::push_message::FcmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    UserNotFound,
    MissingToken,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub session_id: Option<String>,
    /// None when the notify task itself panicked
    pub kind: Option<ReminderKind>,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub one_hour_matched: usize,
    pub one_day_matched: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failures: Vec<NotificationFailure>,
}

/// Sends the one hour and one day reminders for upcoming sessions
#[derive(Clone)]
pub struct Notifier {
    db: Arc<AppDatabase>,
    fcm: Arc<FcmClient>,
}

impl Notifier {
    pub fn new(db: Arc<AppDatabase>, fcm: Arc<FcmClient>) -> Self {
        Self { db, fcm }
    }

    pub async fn run(&self) -> RunSummary {
        self.run_at(get_epoch_ts()).await
    }

    /// One pass over both reminder windows relative to `now`.
    /// Errors are logged and never returned.
    pub async fn run_at(&self, now: u64) -> RunSummary {
        tracing::debug!("running session reminder job at {now}");
        match self.check_and_notify(now).await {
            Ok(summary) => {
                tracing::info!(
                    "session reminders done. one hour: {}, one day: {}, sent: {}, skipped: {}, failed: {}",
                    summary.one_hour_matched,
                    summary.one_day_matched,
                    summary.sent,
                    summary.skipped,
                    summary.failures.len()
                );
                summary
            }
            Err(e) => {
                tracing::error!("Error in session reminder job => {:?}", e);
                RunSummary::default()
            }
        }
    }

    async fn check_and_notify(&self, now: u64) -> anyhow::Result<RunSummary> {
        let (one_hour_sessions, one_hour_failures) = self
            .find_due_sessions(&ReminderKind::OneHour.window(now))
            .await?;
        let (one_day_sessions, one_day_failures) = self
            .find_due_sessions(&ReminderKind::OneDay.window(now))
            .await?;
        let mut summary = RunSummary {
            one_hour_matched: one_hour_sessions.len() + one_hour_failures.len(),
            one_day_matched: one_day_sessions.len() + one_day_failures.len(),
            ..Default::default()
        };
        summary.failures.extend(one_hour_failures);
        summary.failures.extend(one_day_failures);
        let reminders = one_hour_sessions
            .into_iter()
            .map(|session| (session, ReminderKind::OneHour))
            .chain(
                one_day_sessions
                    .into_iter()
                    .map(|session| (session, ReminderKind::OneDay)),
            )
            .collect::<Vec<_>>();
        self.dispatch(reminders, &mut summary).await;
        Ok(summary)
    }

    /// Sessions of the window which are due, decoded one by one.
    /// A document that does not decode is reported as a failure and skipped.
    async fn find_due_sessions(
        &self,
        window: &ReminderWindow,
    ) -> anyhow::Result<(Vec<Session>, Vec<NotificationFailure>)> {
        let documents = self
            .db
            .find::<Document>(DB_NAME, COLL_SESSIONS, Some(window.filter()), None)
            .await?;
        tracing::debug!("{} sessions due for {} reminder", documents.len(), window.kind);
        let mut sessions = Vec::with_capacity(documents.len());
        let mut failures = vec![];
        for document in documents {
            let session_id = document.get_object_id("_id").ok().map(|oid| oid.to_hex());
            match from_document::<Session>(document) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::error!(
                        "not able to read session. session id: {:?}, kind: {}, error: {}",
                        session_id,
                        window.kind,
                        e
                    );
                    failures.push(NotificationFailure {
                        session_id,
                        kind: Some(window.kind),
                        error: e.into(),
                    });
                }
            }
        }
        Ok((sessions, failures))
    }

    /// Runs notify for every reminder, NOTIFY_BATCH_SIZE at a time.
    /// A failing reminder never cancels the others.
    async fn dispatch(&self, reminders: Vec<(Session, ReminderKind)>, summary: &mut RunSummary) {
        for batch in reminders.chunks(NOTIFY_BATCH_SIZE) {
            let mut set = JoinSet::new();
            for (session, kind) in batch.iter().cloned() {
                let notifier = self.clone();
                set.spawn(async move {
                    let result = notifier.notify(&session, kind).await;
                    (session._id, kind, result)
                });
            }
            while let Some(res) = set.join_next().await {
                match res {
                    Ok((_, _, Ok(NotifyOutcome::Sent))) => summary.sent += 1,
                    Ok((_, _, Ok(_))) => summary.skipped += 1,
                    Ok((session_id, kind, Err(error))) => {
                        summary.failures.push(NotificationFailure {
                            session_id,
                            kind: Some(kind),
                            error,
                        });
                    }
                    Err(e) => {
                        tracing::error!("notify task panicked: {e}");
                        summary.failures.push(NotificationFailure {
                            session_id: None,
                            kind: None,
                            error: e.into(),
                        });
                    }
                }
            }
        }
    }

    /// Push the `kind` reminder of a session to its creator and flag it as sent.
    /// A creator without user record or push token is skipped.
    pub async fn notify(
        &self,
        session: &Session,
        kind: ReminderKind,
    ) -> Result<NotifyOutcome, AppError> {
        let result = self.send_reminder(session, kind).await;
        if let Err(e) = &result {
            tracing::error!(
                "not able to send notification. session id: {:?}, kind: {}, error: {}",
                session._id,
                kind,
                e
            );
        }
        result
    }

    async fn send_reminder(
        &self,
        session: &Session,
        kind: ReminderKind,
    ) -> Result<NotifyOutcome, AppError> {
        // without a parsable _id the flag can not be updated, so do not send at all
        let oid = session_object_id(session)?;
        let filter = doc! {"id": &session.created_by};
        let user = self
            .db
            .find_one::<User>(DB_NAME, COLL_USERS, Some(filter), None)
            .await?;
        let Some(user) = user else {
            tracing::error!("user not found. user id: {}", session.created_by);
            return Ok(NotifyOutcome::UserNotFound);
        };
        let Some(token) = user.push_token() else {
            tracing::error!("fcm token not found. user id: {}", session.created_by);
            return Ok(NotifyOutcome::MissingToken);
        };
        let notification = build_notification(session, kind, token)?;
        self.fcm.send(&notification).await?;
        self.mark_sent(oid, kind).await?;
        tracing::info!(
            "notification sent. session id: {:?}, kind: {}",
            session._id,
            kind
        );
        Ok(NotifyOutcome::Sent)
    }

    async fn mark_sent(&self, oid: ObjectId, kind: ReminderKind) -> anyhow::Result<()> {
        let mut filter = doc! {"_id": oid};
        filter.insert(kind.flag_field(), false);
        let mut fields = Document::new();
        fields.insert(kind.flag_field(), true);
        let update = doc! {"$set": fields};
        let matched = self
            .db
            .update_one(DB_NAME, COLL_SESSIONS, filter, update, None)
            .await?;
        if matched < 1 {
            tracing::warn!("session {oid} was already flagged for {kind} reminder");
        }
        Ok(())
    }
}

fn session_object_id(session: &Session) -> Result<ObjectId, AppError> {
    let id = session
        ._id
        .as_ref()
        .ok_or(AppError::InvalidData("_id not present in session".into()))?;
    parse_object_id(id, "not able to parse session _id")
}

/// Builds the push message reminding about `session`
pub fn build_notification(
    session: &Session,
    kind: ReminderKind,
    token: &str,
) -> anyhow::Result<PushNotification> {
    let notification = PushNotification {
        token: token.to_string(),
        title: PUSH_MESSAGE_TITLE.to_string(),
        body: kind.message_body(&session.title)?,
    };
    Ok(notification)
}
