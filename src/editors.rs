//! Client-side cell edit validation
//!
//! An edit is parsed into the wire value before anything is sent. Rejected
//! input never leaves the client.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::column::Column;
use crate::constants::messages;
use crate::error::{GridError, Result};
use crate::format::{cell_text, datetime_to_wire};

/// Editor attached to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Text,
    Integer,
    Float,
    Date,
    Checkbox,
    /// Choice among the column's enum constraint values
    Select,
    /// Index columns: every edit is rejected
    Index,
}

const DATE_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

impl EditorKind {
    /// Validate `input` for `column` and produce the value to send
    pub fn parse(self, column: &Column, input: &str) -> Result<Value> {
        let reject = |message: &str| GridError::InvalidEdit {
            column: column.field().to_string(),
            message: message.to_string(),
        };
        let trimmed = input.trim();

        match self {
            EditorKind::Index => Err(reject(messages::INDEX_NOT_EDITABLE)),
            EditorKind::Text => Ok(Value::String(input.to_string())),
            EditorKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| reject(messages::INVALID_INTEGER)),
            EditorKind::Float => {
                let parsed = trimmed
                    .parse::<f64>()
                    .map_err(|_| reject(messages::INVALID_NUMBER))?;
                serde_json::Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| reject(messages::INVALID_NUMBER))
            }
            EditorKind::Checkbox => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "" => Ok(Value::Bool(false)),
                _ => Err(reject(messages::INVALID_BOOLEAN)),
            },
            EditorKind::Date => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                let ms = parse_date_input(trimmed).ok_or_else(|| reject(messages::INVALID_DATE))?;
                datetime_to_wire(ms)
                    .map(Value::String)
                    .ok_or_else(|| reject(messages::INVALID_DATE))
            }
            EditorKind::Select => column
                .schema
                .enum_values()
                .iter()
                .find(|option| cell_text(option).as_deref() == Some(input))
                .cloned()
                .ok_or_else(|| reject(messages::INVALID_OPTION)),
        }
    }
}

/// Parse `YYYY-MM-DD[ HH:MM[:SS[.sss]]]` as UTC milliseconds
pub fn parse_date_input(text: &str) -> Option<i64> {
    let text = text.trim_end_matches('Z');
    for format in DATE_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnKind, ColumnSchema, Constraints};
    use serde_json::json;

    fn column(kind: ColumnKind) -> Column {
        Column::from_schema(ColumnSchema::new("col", kind, 0), true)
    }

    fn message(err: GridError) -> String {
        err.user_message()
    }

    #[test]
    fn test_integer_editor() {
        let col = column(ColumnKind::Integer);
        assert_eq!(EditorKind::Integer.parse(&col, " 42 ").unwrap(), json!(42));
        let err = EditorKind::Integer.parse(&col, "4.5").unwrap_err();
        assert_eq!(message(err), "Please enter a valid integer");
    }

    #[test]
    fn test_float_editor() {
        let col = column(ColumnKind::Number);
        assert_eq!(EditorKind::Float.parse(&col, "1.25").unwrap(), json!(1.25));
        let err = EditorKind::Float.parse(&col, "abc").unwrap_err();
        assert_eq!(message(err), "Please enter a valid number");
        assert!(EditorKind::Float.parse(&col, "inf").is_err());
    }

    #[test]
    fn test_date_editor() {
        let col = column(ColumnKind::Datetime);
        assert_eq!(
            EditorKind::Date.parse(&col, "2013-01-02").unwrap(),
            json!("2013-01-02T00:00:00.000Z")
        );
        assert_eq!(
            EditorKind::Date.parse(&col, "2013-01-02 10:30").unwrap(),
            json!("2013-01-02T10:30:00.000Z")
        );
        assert_eq!(EditorKind::Date.parse(&col, "").unwrap(), Value::Null);
        assert!(EditorKind::Date.parse(&col, "yesterday").is_err());
    }

    #[test]
    fn test_index_and_select_editors() {
        let index = column(ColumnKind::Integer);
        let err = EditorKind::Index.parse(&index, "3").unwrap_err();
        assert_eq!(message(err), "Editing index columns is not supported");

        let mut schema = ColumnSchema::new("cat", ColumnKind::Any, 0);
        schema.constraints = Some(Constraints {
            values: vec![json!("foo"), json!("bar")],
        });
        let cat = Column::from_schema(schema, true);
        assert_eq!(EditorKind::Select.parse(&cat, "bar").unwrap(), json!("bar"));
        assert!(EditorKind::Select.parse(&cat, "baz").is_err());
    }
}
