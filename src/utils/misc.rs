use mongodb::bson::oid::ObjectId;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer};
use std::{
    collections::HashMap,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use super::AppError;

/// Get EPOCH timestamp in seconds
pub fn get_epoch_ts() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        Err(_) => panic!("SystemTime before UNIX EPOCH!"),
    }
}

/// Read an env variable and parse it, falling back to the default
/// when the variable is absent or can not be parsed
pub fn env_or_default<T: FromStr>(key: &str, default: T) -> T {
    let val = std::env::var(key).unwrap_or_default();
    val.trim().parse::<T>().unwrap_or(default)
}

/// Parse the given value as ObjectId
pub fn parse_object_id(id: &str, error_message: &str) -> Result<ObjectId, AppError> {
    let oid = ObjectId::parse_str(id).map_err(|err| {
        tracing::debug!("{:?}", err);
        AppError::InvalidData(error_message.into())
    })?;
    Ok(oid)
}

/// Deserialize helper for ObjectId field
pub fn deserialize_helper<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Option::<ObjectId>::deserialize(deserializer)?;
    match val {
        None => Ok(None),
        Some(val) => Ok(Some(val.to_hex())),
    }
}

/// replace placeholder variables from the template text
/// placeholders are of patters {{variable}}
/// unknown placeholders are kept as they are
pub fn replace_placeholders(s: &str, options: &HashMap<String, String>) -> anyhow::Result<String> {
    let re = Regex::new(r"\{\{(\w+)\}\}")?;
    let replaced = re.replace_all(s, |cap: &Captures| match options.get(&cap[1]) {
        Some(val) => val.to_owned(),
        None => cap[0].to_owned(),
    });

    Ok(replaced.into_owned())
}
