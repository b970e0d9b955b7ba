//! Wire format for the persisted task collection.
//!
//! # Responsibility
//! - Encode tasks as a JSON array with camelCase fields and ISO-8601
//!   millisecond timestamps.
//! - Decode legacy and hand-edited payloads, repairing what can be repaired.
//!
//! # Invariants
//! - Missing `category` decodes to `none`, missing `order` to `0`.
//! - Records that cannot satisfy the task invariants are dropped, one at a
//!   time; a bad record never discards its neighbours.
//! - Only a payload that is not a JSON array at all fails as a whole.

use crate::model::task::{normalize_title, Task, TaskCategory};
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTask<'a> {
    id: String,
    title: &'a str,
    completed: bool,
    created_at: String,
    category: &'static str,
    order: u64,
}

/// Outcome of decoding a persisted collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTasks {
    pub tasks: Vec<Task>,
    /// Records dropped because they could not be repaired.
    pub skipped: usize,
    /// Records that needed `category` or `order` filled in.
    pub backfilled: usize,
}

/// Serializes tasks in collection order.
pub fn encode_tasks(tasks: &[Task]) -> serde_json::Result<String> {
    let records: Vec<PersistedTask> = tasks
        .iter()
        .map(|task| PersistedTask {
            id: task.id.to_string(),
            title: &task.title,
            completed: task.completed,
            created_at: format_timestamp(&task.created_at),
            category: task.category.as_str(),
            order: task.order,
        })
        .collect();
    serde_json::to_string(&records)
}

/// Parses a persisted collection, repairing or dropping individual records.
///
/// Elements are read field by field, so a wrongly typed field or a
/// non-object element only affects its own record.
///
/// # Errors
/// Returns the parse error when `raw` is not a JSON array.
pub fn decode_tasks(raw: &str, max_title_chars: usize) -> serde_json::Result<DecodedTasks> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let mut decoded = DecodedTasks::default();
    let mut seen = HashSet::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record, max_title_chars) {
            Ok((task, backfilled)) => {
                if !seen.insert(task.id) {
                    warn!(
                        "event=tasks_decode module=store status=skip index={} reason=duplicate_id",
                        index
                    );
                    decoded.skipped += 1;
                    continue;
                }
                if backfilled {
                    decoded.backfilled += 1;
                }
                decoded.tasks.push(task);
            }
            Err(reason) => {
                warn!(
                    "event=tasks_decode module=store status=skip index={} reason={}",
                    index, reason
                );
                decoded.skipped += 1;
            }
        }
    }

    Ok(decoded)
}

fn decode_record(record: Value, max_title_chars: usize) -> Result<(Task, bool), &'static str> {
    let Value::Object(fields) = record else {
        return Err("not_an_object");
    };

    let id = str_field(&fields, "id")
        .and_then(|value| Uuid::parse_str(value).ok())
        .filter(|id| !id.is_nil())
        .ok_or("invalid_id")?;
    let title = str_field(&fields, "title")
        .and_then(|value| normalize_title(value, max_title_chars))
        .ok_or("empty_title")?;
    let created_at = str_field(&fields, "createdAt")
        .and_then(parse_timestamp)
        .ok_or("invalid_created_at")?;

    let category = str_field(&fields, "category").and_then(TaskCategory::parse);
    // Negative, fractional or non-numeric orders fall back to 0.
    let order = fields.get("order").and_then(Value::as_u64);
    let backfilled = category.is_none() || order.is_none();

    let task = Task {
        id,
        title,
        completed: fields
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        category: category.unwrap_or_default(),
        created_at,
        order: order.unwrap_or(0),
    };
    Ok((task, backfilled))
}

fn str_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

/// Formats like JavaScript's `Date.toISOString`: `2026-01-02T03:04:05.678Z`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::{decode_tasks, encode_tasks, format_timestamp, parse_timestamp};
    use crate::model::task::{Task, TaskCategory};

    const ID_A: &str = "11111111-2222-4333-8444-555555555555";
    const ID_B: &str = "66666666-7777-4888-9999-aaaaaaaaaaaa";

    #[test]
    fn encode_uses_camel_case_wire_fields() {
        let task = Task::new("ship it", TaskCategory::Urgent, 2);
        let json: serde_json::Value =
            serde_json::from_str(&encode_tasks(&[task.clone()]).unwrap()).unwrap();

        let record = &json[0];
        assert_eq!(record["id"], task.id.to_string());
        assert_eq!(record["title"], "ship it");
        assert_eq!(record["completed"], false);
        assert_eq!(record["category"], "urgent");
        assert_eq!(record["order"], 2);
        assert!(record["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn decode_backfills_legacy_records() {
        let raw = format!(
            r#"[{{"id":"{ID_A}","title":"old","completed":true,"createdAt":"2024-05-01T10:00:00.000Z"}}]"#
        );
        let decoded = decode_tasks(&raw, 100).unwrap();

        assert_eq!(decoded.tasks.len(), 1);
        assert_eq!(decoded.backfilled, 1);
        let task = &decoded.tasks[0];
        assert_eq!(task.category, TaskCategory::None);
        assert_eq!(task.order, 0);
        assert!(task.completed);
    }

    #[test]
    fn decode_drops_bad_records_and_duplicates_but_keeps_the_rest() {
        let raw = format!(
            r#"[
                {{"id":"{ID_A}","title":"keep","createdAt":"2024-05-01T10:00:00.000Z","category":"work","order":0}},
                {{"id":"{ID_A}","title":"dup","createdAt":"2024-05-01T10:00:00.000Z"}},
                {{"id":"not-a-uuid","title":"bad id","createdAt":"2024-05-01T10:00:00.000Z"}},
                {{"id":"{ID_B}","title":"   ","createdAt":"2024-05-01T10:00:00.000Z"}},
                {{"id":"{ID_B}","title":"no date"}}
            ]"#
        );
        let decoded = decode_tasks(&raw, 100).unwrap();

        assert_eq!(decoded.tasks.len(), 1);
        assert_eq!(decoded.tasks[0].title, "keep");
        assert_eq!(decoded.skipped, 4);
    }

    #[test]
    fn decode_isolates_wrongly_typed_fields_and_non_object_elements() {
        let raw = format!(
            r#"[
                {{"id":"{ID_A}","title":"keep me","createdAt":"2024-05-01T10:00:00.000Z","category":"work","order":3}},
                {{"id":"{ID_B}","title":"odd fields","createdAt":"2024-05-01T10:00:00.000Z","completed":"true","category":7,"order":-1}},
                null,
                42,
                {{"id":12,"title":"numeric id","createdAt":"2024-05-01T10:00:00.000Z"}}
            ]"#
        );
        let decoded = decode_tasks(&raw, 100).unwrap();

        assert_eq!(decoded.tasks.len(), 2);
        assert_eq!(decoded.skipped, 3);
        assert_eq!(decoded.backfilled, 1);

        let kept = &decoded.tasks[0];
        assert_eq!(kept.title, "keep me");
        assert_eq!(kept.order, 3);

        let repaired = &decoded.tasks[1];
        assert_eq!(repaired.title, "odd fields");
        assert!(!repaired.completed);
        assert_eq!(repaired.category, TaskCategory::None);
        assert_eq!(repaired.order, 0);
    }

    #[test]
    fn decode_treats_fractional_order_as_missing() {
        let raw = format!(
            r#"[{{"id":"{ID_A}","title":"half","createdAt":"2024-05-01T10:00:00.000Z","category":"personal","order":1.5}}]"#
        );
        let decoded = decode_tasks(&raw, 100).unwrap();
        assert_eq!(decoded.tasks[0].order, 0);
        assert_eq!(decoded.tasks[0].category, TaskCategory::Personal);
        assert_eq!(decoded.backfilled, 1);
    }

    #[test]
    fn decode_maps_unknown_category_to_none_and_bounds_titles() {
        let raw = format!(
            r#"[{{"id":"{ID_A}","title":"  abcdefgh  ","createdAt":"2024-05-01T10:00:00Z","category":"home","order":4}}]"#
        );
        let decoded = decode_tasks(&raw, 5).unwrap();
        let task = &decoded.tasks[0];
        assert_eq!(task.title, "abcde");
        assert_eq!(task.category, TaskCategory::None);
        assert_eq!(task.order, 4);
        assert_eq!(decoded.backfilled, 1);
    }

    #[test]
    fn decode_rejects_non_array_payloads() {
        assert!(decode_tasks("{\"todos\": []}", 100).is_err());
        assert!(decode_tasks("not json", 100).is_err());
    }

    #[test]
    fn timestamps_keep_millisecond_precision() {
        let parsed = parse_timestamp("2026-02-13T10:00:00.123Z").unwrap();
        assert_eq!(format_timestamp(&parsed), "2026-02-13T10:00:00.123Z");
        assert!(parse_timestamp("yesterday").is_none());
    }
}
