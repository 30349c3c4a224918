//! Wire messages between the grid controller and the host data source
//!
//! Every message is a JSON object with a `type` discriminator. The type strings
//! and payload field names are the contract with the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::column::{ColumnKind, ColumnSchema};

/// One row of cell values keyed by column name
pub type Row = Map<String, Value>;

/// Marker for the text filter's "every value" selection, sent as `"all"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAll {
    All,
}

/// Selected values of a text filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSelected {
    All(SelectAll),
    Values(Vec<String>),
}

/// Serialized filter state for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterDescriptor {
    Slider {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    Date {
        field: String,
        /// Inclusive start, UTC milliseconds
        min: Option<i64>,
        /// Inclusive end, UTC milliseconds (already end-of-day)
        max: Option<i64>,
    },
    Boolean {
        field: String,
        selected: Option<bool>,
    },
    Text {
        field: String,
        #[serde(default)]
        selected: Option<TextSelected>,
        #[serde(default)]
        excluded: Option<Vec<String>>,
    },
}

impl FilterDescriptor {
    pub fn field(&self) -> &str {
        match self {
            FilterDescriptor::Slider { field, .. }
            | FilterDescriptor::Date { field, .. }
            | FilterDescriptor::Boolean { field, .. }
            | FilterDescriptor::Text { field, .. } => field,
        }
    }

    /// Whether this descriptor restricts any rows
    pub fn is_restrictive(&self) -> bool {
        match self {
            FilterDescriptor::Slider { min, max, .. } => min.is_some() || max.is_some(),
            FilterDescriptor::Date { min, max, .. } => min.is_some() || max.is_some(),
            FilterDescriptor::Boolean { selected, .. } => selected.is_some(),
            FilterDescriptor::Text {
                selected, excluded, ..
            } => match selected {
                Some(TextSelected::All(_)) => excluded.as_ref().is_some_and(|e| !e.is_empty()),
                Some(TextSelected::Values(values)) => !values.is_empty(),
                None => false,
            },
        }
    }
}

/// Column statistics pushed in response to `get_column_min_max` and filter paging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_info: Option<FilterDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_range: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_length: Option<usize>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            filter_info: None,
            slider_min: None,
            slider_max: None,
            filter_min: None,
            filter_max: None,
            values: None,
            length: None,
            value_range: None,
            selected_length: None,
        }
    }
}

/// Which client request a host push answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggeredBy {
    ChangeFilter,
    ChangeSort,
    ChangeViewport,
    EditCell,
    AddRow,
    RemoveRow,
}

/// Controller to host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ChangeFilter {
        field: String,
        filter_info: FilterDescriptor,
    },
    ChangeSort {
        sort_field: String,
        sort_ascending: bool,
    },
    ChangeViewport {
        top: usize,
        bottom: usize,
    },
    ChangeViewportFilter {
        field: String,
        top: usize,
        bottom: usize,
    },
    ChangeSelection {
        rows: Vec<usize>,
    },
    EditCell {
        row_index: usize,
        column: String,
        unfiltered_index: Option<Value>,
        value: Value,
    },
    AddRow,
    RemoveRow,
    GetColumnMinMax {
        field: String,
        search_val: Option<String>,
    },
    ShowFilterDropdown {
        field: String,
    },
}

impl ClientMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ClientMessage::ChangeFilter { .. } => "change_filter",
            ClientMessage::ChangeSort { .. } => "change_sort",
            ClientMessage::ChangeViewport { .. } => "change_viewport",
            ClientMessage::ChangeViewportFilter { .. } => "change_viewport_filter",
            ClientMessage::ChangeSelection { .. } => "change_selection",
            ClientMessage::EditCell { .. } => "edit_cell",
            ClientMessage::AddRow => "add_row",
            ClientMessage::RemoveRow => "remove_row",
            ClientMessage::GetColumnMinMax { .. } => "get_column_min_max",
            ClientMessage::ShowFilterDropdown { .. } => "show_filter_dropdown",
        }
    }

    /// Tag the host puts on the push answering this request, if it recomputes
    pub fn triggered_by(&self) -> Option<TriggeredBy> {
        match self {
            ClientMessage::ChangeFilter { .. } => Some(TriggeredBy::ChangeFilter),
            ClientMessage::ChangeSort { .. } => Some(TriggeredBy::ChangeSort),
            ClientMessage::ChangeViewport { .. } => Some(TriggeredBy::ChangeViewport),
            ClientMessage::EditCell { .. } => Some(TriggeredBy::EditCell),
            ClientMessage::AddRow => Some(TriggeredBy::AddRow),
            ClientMessage::RemoveRow => Some(TriggeredBy::RemoveRow),
            ClientMessage::ChangeViewportFilter { .. }
            | ClientMessage::ChangeSelection { .. }
            | ClientMessage::GetColumnMinMax { .. }
            | ClientMessage::ShowFilterDropdown { .. } => None,
        }
    }
}

/// Host to controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    UpdateDataView {
        rows: Vec<Row>,
        df_range: (usize, usize),
        row_count: usize,
        #[serde(default)]
        sort_field: Option<String>,
        #[serde(default = "default_ascending")]
        sort_ascending: bool,
        #[serde(default)]
        triggered_by: Option<TriggeredBy>,
        #[serde(default)]
        scroll_to_row: Option<usize>,
    },
    ColumnMinMaxUpdated {
        field: String,
        col_info: ColumnInfo,
    },
    UpdateDataViewFilter {
        field: String,
        col_info: ColumnInfo,
    },
    ChangeSelection {
        rows: Vec<usize>,
    },
    ShowError {
        error_msg: String,
        #[serde(default)]
        triggered_by: Option<TriggeredBy>,
    },
    DrawTable {
        columns: Vec<ColumnSchema>,
        row_count: usize,
    },
    ChangeGridOption {
        option_name: String,
        option_value: Value,
    },
    ChangeShowToolbar {
        show_toolbar: bool,
    },
}

fn default_ascending() -> bool {
    true
}

impl HostMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostMessage::UpdateDataView { .. } => "update_data_view",
            HostMessage::ColumnMinMaxUpdated { .. } => "column_min_max_updated",
            HostMessage::UpdateDataViewFilter { .. } => "update_data_view_filter",
            HostMessage::ChangeSelection { .. } => "change_selection",
            HostMessage::ShowError { .. } => "show_error",
            HostMessage::DrawTable { .. } => "draw_table",
            HostMessage::ChangeGridOption { .. } => "change_grid_option",
            HostMessage::ChangeShowToolbar { .. } => "change_show_toolbar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_wire_shape() {
        let msg = ClientMessage::ChangeSort {
            sort_field: "A".to_string(),
            sort_ascending: false,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "change_sort", "sort_field": "A", "sort_ascending": false})
        );

        assert_eq!(
            serde_json::to_value(ClientMessage::AddRow).unwrap(),
            json!({"type": "add_row"})
        );

        let msg = ClientMessage::GetColumnMinMax {
            field: "B".to_string(),
            search_val: None,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "get_column_min_max", "field": "B", "search_val": null})
        );
    }

    #[test]
    fn test_text_descriptor_select_all() {
        let desc = FilterDescriptor::Text {
            field: "E".to_string(),
            selected: Some(TextSelected::All(SelectAll::All)),
            excluded: Some(vec![]),
        };
        let value = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            value,
            json!({"type": "text", "field": "E", "selected": "all", "excluded": []})
        );
        let back: FilterDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(back, desc);
        assert!(!desc.is_restrictive());

        let picked: FilterDescriptor = serde_json::from_value(
            json!({"type": "text", "field": "E", "selected": ["foo"], "excluded": null}),
        )
        .unwrap();
        assert!(picked.is_restrictive());
    }

    #[test]
    fn test_host_message_parsing() {
        let msg: HostMessage = serde_json::from_value(json!({
            "type": "update_data_view",
            "rows": [{"index": 0, "A": 1.0}],
            "df_range": [0, 100],
            "row_count": 1,
            "triggered_by": "change_sort",
        }))
        .unwrap();
        match msg {
            HostMessage::UpdateDataView {
                df_range,
                triggered_by,
                sort_ascending,
                ..
            } => {
                assert_eq!(df_range, (0, 100));
                assert_eq!(triggered_by, Some(TriggeredBy::ChangeSort));
                assert!(sort_ascending);
            }
            other => panic!("unexpected {:?}", other),
        }

        let msg: HostMessage = serde_json::from_value(json!({
            "type": "column_min_max_updated",
            "field": "A",
            "col_info": {"name": "A", "type": "number", "slider_min": 0.0, "slider_max": 9.0}
        }))
        .unwrap();
        assert_eq!(msg.type_name(), "column_min_max_updated");
    }
}
