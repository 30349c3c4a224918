//! Cell formatters
//!
//! Datetime columns remember the widest format they have needed so far, so a
//! column never mixes `2013-01-02` with `2013-01-02 10:30`. Widening the
//! remembered format asks the renderer to redraw every row.

use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};
use serde_json::Value;

use crate::column::Column;

/// How a column's cells are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterKind {
    Text,
    Number,
    Date,
    Boolean,
}

/// Datetime display precision, narrowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateFormat {
    Day,
    Minute,
    Second,
    Millisecond,
}

impl DateFormat {
    fn pattern(self) -> &'static str {
        match self {
            DateFormat::Day => "%Y-%m-%d",
            DateFormat::Minute => "%Y-%m-%d %H:%M",
            DateFormat::Second => "%Y-%m-%d %H:%M:%S",
            DateFormat::Millisecond => "%Y-%m-%d %H:%M:%S%.3f",
        }
    }

    /// Narrowest format that loses nothing for this timestamp
    fn required_for(ts: &DateTime<Utc>) -> Self {
        if ts.nanosecond() / 1_000_000 != 0 {
            DateFormat::Millisecond
        } else if ts.second() != 0 {
            DateFormat::Second
        } else if ts.hour() != 0 || ts.minute() != 0 {
            DateFormat::Minute
        } else {
            DateFormat::Day
        }
    }
}

/// Parse a wire datetime (`2013-01-02T00:00:00.000Z`)
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp in milliseconds as a wire datetime
pub fn datetime_to_wire(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format(crate::constants::datetime::WIRE_FORMAT).to_string())
}

/// Text used for matching and distinct-value lists; `None` for nulls
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Formats cells and keeps per-column datetime format memory
#[derive(Debug, Default)]
pub struct CellFormatter {
    date_formats: HashMap<String, DateFormat>,
    invalidate_all: bool,
}

impl CellFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget remembered formats (grid rebuilt)
    pub fn clear(&mut self) {
        self.date_formats.clear();
        self.invalidate_all = false;
    }

    /// Whether a format widened since the last call
    pub fn take_invalidation(&mut self) -> bool {
        std::mem::take(&mut self.invalidate_all)
    }

    pub fn format(&mut self, column: &Column, value: &Value) -> String {
        match column.formatter {
            FormatterKind::Text => match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            FormatterKind::Number => match value {
                Value::Null => "NaN".to_string(),
                other => cell_text(other).unwrap_or_default(),
            },
            FormatterKind::Boolean => match value {
                Value::Bool(true) => "✔".to_string(),
                _ => String::new(),
            },
            FormatterKind::Date => match value {
                Value::String(s) => self.format_date(column.field(), s),
                Value::Null => "NaT".to_string(),
                other => other.to_string(),
            },
        }
    }

    fn format_date(&mut self, field: &str, text: &str) -> String {
        let Some(ts) = parse_datetime(text) else {
            return text.to_string();
        };
        let required = DateFormat::required_for(&ts);
        let format = match self.date_formats.get(field).copied() {
            Some(current) if current >= required => current,
            Some(_) => {
                self.date_formats.insert(field.to_string(), required);
                self.invalidate_all = true;
                required
            }
            None => {
                self.date_formats.insert(field.to_string(), required);
                required
            }
        };
        ts.format(format.pattern()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnKind, ColumnSchema};
    use serde_json::json;

    fn column(kind: ColumnKind) -> Column {
        Column::from_schema(ColumnSchema::new("c", kind, 0), true)
    }

    #[test]
    fn test_null_rendering() {
        let mut fmt = CellFormatter::new();
        assert_eq!(fmt.format(&column(ColumnKind::Number), &Value::Null), "NaN");
        assert_eq!(fmt.format(&column(ColumnKind::Integer), &json!(3)), "3");
        assert_eq!(fmt.format(&column(ColumnKind::Datetime), &Value::Null), "NaT");
        assert_eq!(fmt.format(&column(ColumnKind::String), &json!("foo")), "foo");
        assert_eq!(fmt.format(&column(ColumnKind::Boolean), &json!(true)), "✔");
        assert_eq!(fmt.format(&column(ColumnKind::Boolean), &json!(false)), "");
    }

    #[test]
    fn test_date_format_only_widens() {
        let mut fmt = CellFormatter::new();
        let col = column(ColumnKind::Datetime);

        assert_eq!(fmt.format(&col, &json!("2013-01-02T00:00:00.000Z")), "2013-01-02");
        assert!(!fmt.take_invalidation());

        assert_eq!(
            fmt.format(&col, &json!("2013-01-03T10:30:00.000Z")),
            "2013-01-03 10:30"
        );
        assert!(fmt.take_invalidation());

        // narrower value keeps the wider remembered format
        assert_eq!(
            fmt.format(&col, &json!("2013-01-04T00:00:00.000Z")),
            "2013-01-04 00:00"
        );
        assert!(!fmt.take_invalidation());

        assert_eq!(
            fmt.format(&col, &json!("2013-01-04T00:00:00.250Z")),
            "2013-01-04 00:00:00.250"
        );
    }

    #[test]
    fn test_wire_datetime() {
        assert_eq!(
            datetime_to_wire(1_357_084_800_000).as_deref(),
            Some("2013-01-02T00:00:00.000Z")
        );
        let ts = parse_datetime("2013-01-02T00:00:00.000Z").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_357_084_800_000);
    }
}
