//! Row inclusion rules shared by the client filters and the reference host
//!
//! A `Predicate` is derived from a `FilterDescriptor`; both sides evaluate the
//! same code so their results agree.

use std::collections::HashSet;

use serde_json::Value;

use crate::format::{cell_text, parse_datetime};
use crate::protocol::{FilterDescriptor, TextSelected};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No restriction
    Any,
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive UTC millisecond range
    DateRange { min: Option<i64>, max: Option<i64> },
    Exact(bool),
    OneOf(HashSet<String>),
    NoneOf(HashSet<String>),
}

impl Predicate {
    pub fn from_descriptor(descriptor: &FilterDescriptor) -> Self {
        match descriptor {
            FilterDescriptor::Slider { min, max, .. } => {
                if min.is_none() && max.is_none() {
                    Predicate::Any
                } else {
                    Predicate::Range {
                        min: *min,
                        max: *max,
                    }
                }
            }
            FilterDescriptor::Date { min, max, .. } => {
                if min.is_none() && max.is_none() {
                    Predicate::Any
                } else {
                    Predicate::DateRange {
                        min: *min,
                        max: *max,
                    }
                }
            }
            FilterDescriptor::Boolean { selected, .. } => match selected {
                Some(value) => Predicate::Exact(*value),
                None => Predicate::Any,
            },
            FilterDescriptor::Text {
                selected, excluded, ..
            } => match selected {
                Some(TextSelected::All(_)) => match excluded {
                    Some(excluded) if !excluded.is_empty() => {
                        Predicate::NoneOf(excluded.iter().cloned().collect())
                    }
                    _ => Predicate::Any,
                },
                Some(TextSelected::Values(values)) if !values.is_empty() => {
                    Predicate::OneOf(values.iter().cloned().collect())
                }
                _ => Predicate::Any,
            },
        }
    }

    pub fn is_restrictive(&self) -> bool {
        !matches!(self, Predicate::Any)
    }

    /// Nulls fail every restrictive predicate except `NoneOf`.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Range { min, max } => match value.as_f64() {
                Some(v) => min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi),
                None => false,
            },
            Predicate::DateRange { min, max } => match timestamp_ms(value) {
                Some(ts) => min.is_none_or(|lo| ts >= lo) && max.is_none_or(|hi| ts <= hi),
                None => false,
            },
            Predicate::Exact(expected) => value.as_bool() == Some(*expected),
            Predicate::OneOf(values) => {
                cell_text(value).is_some_and(|text| values.contains(&text))
            }
            Predicate::NoneOf(values) => {
                cell_text(value).is_none_or(|text| !values.contains(&text))
            }
        }
    }
}

/// Milliseconds for a datetime cell (wire string or raw number)
pub fn timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_datetime(s).map(|dt| dt.timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SelectAll;
    use serde_json::json;

    #[test]
    fn test_range() {
        let p = Predicate::from_descriptor(&FilterDescriptor::Slider {
            field: "A".into(),
            min: Some(20.0),
            max: None,
        });
        assert!(p.matches(&json!(20)));
        assert!(p.matches(&json!(1e9)));
        assert!(!p.matches(&json!(19.5)));
        assert!(!p.matches(&Value::Null));
    }

    #[test]
    fn test_empty_descriptors_are_unrestricted() {
        let p = Predicate::from_descriptor(&FilterDescriptor::Text {
            field: "E".into(),
            selected: Some(TextSelected::All(SelectAll::All)),
            excluded: Some(vec![]),
        });
        assert_eq!(p, Predicate::Any);
        let p = Predicate::from_descriptor(&FilterDescriptor::Text {
            field: "E".into(),
            selected: Some(TextSelected::Values(vec![])),
            excluded: None,
        });
        assert_eq!(p, Predicate::Any);
        assert!(p.matches(&Value::Null));
    }

    #[test]
    fn test_text_sets() {
        let only = Predicate::from_descriptor(&FilterDescriptor::Text {
            field: "E".into(),
            selected: Some(TextSelected::Values(vec!["foo".into()])),
            excluded: None,
        });
        assert!(only.matches(&json!("foo")));
        assert!(!only.matches(&json!("Foo")));
        assert!(!only.matches(&Value::Null));

        let except = Predicate::from_descriptor(&FilterDescriptor::Text {
            field: "E".into(),
            selected: Some(TextSelected::All(SelectAll::All)),
            excluded: Some(vec!["foo".into()]),
        });
        assert!(!except.matches(&json!("foo")));
        assert!(except.matches(&json!("bar")));
        assert!(except.matches(&Value::Null));
    }

    #[test]
    fn test_exact_and_dates() {
        assert!(Predicate::Exact(true).matches(&json!(true)));
        assert!(!Predicate::Exact(true).matches(&json!(false)));
        assert!(!Predicate::Exact(false).matches(&Value::Null));

        let p = Predicate::DateRange {
            min: Some(1_357_084_800_000),
            max: None,
        };
        assert!(p.matches(&json!("2013-01-02T00:00:00.000Z")));
        assert!(!p.matches(&json!("2013-01-01T23:59:59.999Z")));
    }
}
