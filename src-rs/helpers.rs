use std::env;

use chrono::{DateTime, Local};
use serde::Serializer;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub type Timestamp = DateTime<Local>;

pub fn now() -> Timestamp {
    Local::now()
}

/// Renders a timestamp as `2023-12-16 12:03:16.341589`.
///
/// Fixed width with zero padding, so string order is chronological order.
pub fn format_time(time: &Timestamp) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn now_string() -> String {
    format_time(&now())
}

pub fn serialize_time<S: Serializer>(time: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(time))
}

pub fn serialize_opt_time<S: Serializer>(
    time: &Option<Timestamp>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.serialize_str(&format_time(time)),
        None => serializer.serialize_none(),
    }
}

/// Absent, empty, `0`, `false` and `null` are false; anything else is true.
pub fn string_to_boolean(value: Option<&str>) -> bool {
    match value {
        None | Some("") | Some("0") => false,
        Some(value) => {
            let lower = value.to_lowercase();
            lower != "false" && lower != "null"
        }
    }
}

/// Same rule for raw JSON values, which may hold a bool, number or string.
pub fn value_to_boolean(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(false, |n| n != 0.0),
        Some(Value::String(text)) => string_to_boolean(Some(text.as_str())),
        Some(_) => true,
    }
}

pub fn env_or(key: &str, fallback: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback.to_string(),
    }
}

pub fn env_bool(key: &str) -> bool {
    string_to_boolean(env::var(key).ok().as_deref())
}
