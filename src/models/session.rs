use serde::{Deserialize, Serialize};

use crate::utils::deserialize_helper;

/// A booked TRPG session as stored in the sessions collection
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "deserialize_helper")]
    #[serde(default)]
    pub _id: Option<String>,
    pub title: String,

    /// start of the session in epoch seconds
    pub start_time: u64,
    pub created_by: String,

    #[serde(default)]
    pub one_hour_notification_sent: bool,

    #[serde(default)]
    pub one_day_notification_sent: bool,
}
