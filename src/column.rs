//! Column kinds and the behavior table
//!
//! Every declared column type maps to one formatter, one editor and at most one
//! filter. The mapping is a single exhaustive match so a new kind cannot be
//! added without deciding all three.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editors::EditorKind;
use crate::format::FormatterKind;

/// Declared column type, as it appears in the table schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Integer,
    Number,
    Datetime,
    Boolean,
    /// Categorical column whose values are listed in the schema constraints
    Any,
    Interval,
}

/// Filter implementation selected by a column kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Slider,
    Date,
    Boolean,
}

/// Formatter, editor and filter for one column kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindBehavior {
    pub formatter: FormatterKind,
    pub editor: Option<EditorKind>,
    pub filter: Option<FilterKind>,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 7] = [
        ColumnKind::String,
        ColumnKind::Integer,
        ColumnKind::Number,
        ColumnKind::Datetime,
        ColumnKind::Boolean,
        ColumnKind::Any,
        ColumnKind::Interval,
    ];

    pub const fn behavior(self) -> KindBehavior {
        match self {
            ColumnKind::String => KindBehavior {
                formatter: FormatterKind::Text,
                editor: Some(EditorKind::Text),
                filter: Some(FilterKind::Text),
            },
            ColumnKind::Integer => KindBehavior {
                formatter: FormatterKind::Number,
                editor: Some(EditorKind::Integer),
                filter: Some(FilterKind::Slider),
            },
            ColumnKind::Number => KindBehavior {
                formatter: FormatterKind::Number,
                editor: Some(EditorKind::Float),
                filter: Some(FilterKind::Slider),
            },
            ColumnKind::Datetime => KindBehavior {
                formatter: FormatterKind::Date,
                editor: Some(EditorKind::Date),
                filter: Some(FilterKind::Date),
            },
            ColumnKind::Boolean => KindBehavior {
                formatter: FormatterKind::Boolean,
                editor: Some(EditorKind::Checkbox),
                filter: Some(FilterKind::Boolean),
            },
            ColumnKind::Any => KindBehavior {
                formatter: FormatterKind::Text,
                editor: Some(EditorKind::Select),
                filter: Some(FilterKind::Text),
            },
            ColumnKind::Interval => KindBehavior {
                formatter: FormatterKind::Text,
                editor: None,
                filter: None,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Integer => "integer",
            ColumnKind::Number => "number",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Any => "any",
            ColumnKind::Interval => "interval",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Number)
    }
}

/// Schema constraints carried for categorical columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(rename = "enum", default)]
    pub values: Vec<Value>,
}

fn default_true() -> bool {
    true
}

/// Column description pushed by the host in `draw_table`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub position: usize,
    #[serde(default)]
    pub is_index: bool,
    #[serde(default)]
    pub first_index: bool,
    #[serde(default)]
    pub last_index: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_display_text: Option<String>,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort_asc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, kind: ColumnKind, position: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            is_index: false,
            first_index: false,
            last_index: false,
            index_display_text: None,
            editable: true,
            sortable: true,
            default_sort_asc: None,
            width: None,
            min_width: None,
            max_width: None,
            constraints: None,
        }
    }

    pub fn enum_values(&self) -> &[Value] {
        self.constraints
            .as_ref()
            .map(|c| c.values.as_slice())
            .unwrap_or(&[])
    }
}

/// A grid column as the controller sees it, with its behavior resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub schema: ColumnSchema,
    pub formatter: FormatterKind,
    pub editor: Option<EditorKind>,
    pub filter: Option<FilterKind>,
}

impl Column {
    /// Resolve behavior for a schema entry. Index columns are never filtered
    /// and always get the rejecting index editor.
    pub fn from_schema(schema: ColumnSchema, grid_editable: bool) -> Self {
        let behavior = schema.kind.behavior();
        let (editor, filter) = if schema.is_index {
            (Some(EditorKind::Index), None)
        } else if !schema.editable || !grid_editable {
            (None, behavior.filter)
        } else {
            (behavior.editor, behavior.filter)
        };
        Self {
            formatter: behavior.formatter,
            editor,
            filter,
            schema,
        }
    }

    pub fn field(&self) -> &str {
        &self.schema.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.schema.kind
    }

    pub fn is_index(&self) -> bool {
        self.schema.is_index
    }

    /// Header text
    pub fn display_name(&self) -> &str {
        self.schema
            .index_display_text
            .as_deref()
            .unwrap_or(&self.schema.name)
    }
}

/// Order schema entries for display: index columns first, then by position
pub fn build_columns(mut schema: Vec<ColumnSchema>, grid_editable: bool) -> Vec<Column> {
    schema.sort_by_key(|c| (!c.is_index, c.position));
    schema
        .into_iter()
        .map(|s| Column::from_schema(s, grid_editable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_table() {
        assert_eq!(ColumnKind::Integer.behavior().filter, Some(FilterKind::Slider));
        assert_eq!(ColumnKind::Number.behavior().editor, Some(EditorKind::Float));
        assert_eq!(ColumnKind::Datetime.behavior().filter, Some(FilterKind::Date));
        assert_eq!(ColumnKind::Any.behavior().filter, Some(FilterKind::Text));
        assert_eq!(ColumnKind::Interval.behavior().filter, None);
        assert_eq!(ColumnKind::Interval.behavior().editor, None);
        for kind in ColumnKind::ALL {
            // round trip through the wire name
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_index_columns_first_and_unfiltered() {
        let mut index = ColumnSchema::new("index", ColumnKind::Integer, 0);
        index.is_index = true;
        let a = ColumnSchema::new("A", ColumnKind::String, 2);
        let mut b = ColumnSchema::new("B", ColumnKind::Number, 1);
        b.editable = false;

        let columns = build_columns(vec![a, b, index], true);
        let names: Vec<_> = columns.iter().map(|c| c.field()).collect();
        assert_eq!(names, vec!["index", "B", "A"]);

        assert_eq!(columns[0].filter, None);
        assert_eq!(columns[0].editor, Some(EditorKind::Index));
        assert_eq!(columns[1].editor, None);
        assert_eq!(columns[1].filter, Some(FilterKind::Slider));
        assert_eq!(columns[2].editor, Some(EditorKind::Text));
    }

    #[test]
    fn test_schema_defaults_from_json() {
        let schema: ColumnSchema =
            serde_json::from_str(r#"{"name": "C", "type": "any", "position": 3, "constraints": {"enum": ["x", "y"]}}"#)
                .unwrap();
        assert!(schema.editable);
        assert!(schema.sortable);
        assert!(!schema.is_index);
        assert_eq!(schema.enum_values().len(), 2);
    }
}
