use mongodb::bson::{doc, Document};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use crate::{constants::*, utils::replace_placeholders};

/// How long before the start of a session a reminder goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    OneHour,
    OneDay,
}

impl ReminderKind {
    /// Session field recording that this reminder was already sent
    pub fn flag_field(&self) -> &'static str {
        match self {
            Self::OneHour => "oneHourNotificationSent",
            Self::OneDay => "oneDayNotificationSent",
        }
    }

    pub fn window(&self, now: u64) -> ReminderWindow {
        ReminderWindow::new(*self, now)
    }

    /// Body of the push message for a session with the given title
    pub fn message_body(&self, session_title: &str) -> anyhow::Result<String> {
        let template = match self {
            Self::OneHour => ONE_HOUR_MESSAGE,
            Self::OneDay => ONE_DAY_MESSAGE,
        };
        let mut options = HashMap::new();
        options.insert("title".to_string(), session_title.to_string());
        replace_placeholders(template, &options)
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::OneHour => write!(f, "oneHour"),
            Self::OneDay => write!(f, "oneDay"),
        }
    }
}

/// Half open time range `(start, end]` in epoch seconds.
/// Sessions starting inside it are due for the reminder of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub kind: ReminderKind,
    pub start: u64,
    pub end: u64,
}

impl ReminderWindow {
    pub fn new(kind: ReminderKind, now: u64) -> Self {
        let (start, end) = match kind {
            ReminderKind::OneHour => (now, now + ONE_HOUR_SECS),
            // starts a full day out, so it covers sessions 1 to 2 days away
            ReminderKind::OneDay => (now + ONE_DAY_SECS, now + 2 * ONE_DAY_SECS),
        };
        Self { kind, start, end }
    }

    pub fn contains(&self, start_time: u64) -> bool {
        start_time > self.start && start_time <= self.end
    }

    /// Filter selecting the sessions of this window which did not get the reminder yet
    pub fn filter(&self) -> Document {
        let mut filter = doc! {
            "startTime": {"$gt": self.start as i64, "$lte": self.end as i64},
        };
        filter.insert(self.kind.flag_field(), false);
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_one_hour_window() {
        let window = ReminderKind::OneHour.window(NOW);
        assert_eq!(window.start, NOW);
        assert_eq!(window.end, NOW + 3600);
        assert_eq!(window.contains(NOW), false);
        assert_eq!(window.contains(NOW + 1), true);
        assert_eq!(window.contains(NOW + 1800), true);
        assert_eq!(window.contains(NOW + 3600), true);
        assert_eq!(window.contains(NOW + 3601), false);
    }

    #[test]
    fn test_one_day_window_is_one_to_two_days_out() {
        let window = ReminderKind::OneDay.window(NOW);
        assert_eq!(window.start, NOW + 86400);
        assert_eq!(window.end, NOW + 172800);
        // exactly one day out sits on the excluded boundary
        assert_eq!(window.contains(NOW + 86400), false);
        assert_eq!(window.contains(NOW + 90000), true);
        assert_eq!(window.contains(NOW + 172800), true);
        assert_eq!(window.contains(NOW + 172801), false);
        assert_eq!(window.contains(NOW + 3600), false);
    }

    #[test]
    fn test_window_filter() {
        let filter = ReminderKind::OneHour.window(NOW).filter();
        let expected = doc! {
            "startTime": {"$gt": NOW as i64, "$lte": (NOW + 3600) as i64},
            "oneHourNotificationSent": false,
        };
        assert_eq!(filter, expected);
        let filter = ReminderKind::OneDay.window(NOW).filter();
        let expected = doc! {
            "startTime": {"$gt": (NOW + 86400) as i64, "$lte": (NOW + 172800) as i64},
            "oneDayNotificationSent": false,
        };
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_message_body() {
        let body = ReminderKind::OneHour.message_body("Curse of Strahd").unwrap();
        assert_eq!(body, "\"Curse of Strahd\" 세션이 1시간 후에 시작됩니다!");
        let body = ReminderKind::OneDay.message_body("Curse of Strahd").unwrap();
        assert_eq!(body, "\"Curse of Strahd\" 세션이 내일 시작됩니다!");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ReminderKind::OneHour.to_string(), "oneHour");
        assert_eq!(ReminderKind::OneDay.to_string(), "oneDay");
    }
}
