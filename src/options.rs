//! Grid options record
//!
//! A flat set of recognized keys, each independently defaulted. Key names use
//! the camelCase spelling that travels in `change_grid_option` pushes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::layout;
use crate::error::{GridError, Result};

/// Options consumed by the grid controller and renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    pub row_height: f32,
    pub min_visible_rows: usize,
    pub max_visible_rows: usize,
    /// Fixed grid height; overrides the max-visible-rows bound when set
    pub height: Option<f32>,
    pub force_fit_columns: bool,
    pub default_column_width: f32,
    pub filterable: bool,
    pub sortable: bool,
    pub editable: bool,
    pub highlight_selected_cell: bool,
    pub highlight_selected_row: bool,
    pub bold_index: bool,
    pub enable_column_reorder: bool,
    pub auto_edit: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: layout::DEFAULT_ROW_HEIGHT,
            min_visible_rows: layout::DEFAULT_MIN_VISIBLE_ROWS,
            max_visible_rows: layout::DEFAULT_MAX_VISIBLE_ROWS,
            height: None,
            force_fit_columns: true,
            default_column_width: layout::DEFAULT_COLUMN_WIDTH,
            filterable: true,
            sortable: true,
            editable: true,
            highlight_selected_cell: false,
            highlight_selected_row: true,
            bold_index: true,
            enable_column_reorder: false,
            auto_edit: false,
        }
    }
}

impl GridOptions {
    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse options from a JSON object string
    pub fn from_json(text: &str) -> Result<Self> {
        let options: GridOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        if self.row_height <= 0.0 {
            return Err(GridError::Config("rowHeight must be positive".to_string()));
        }
        if self.min_visible_rows > self.max_visible_rows {
            return Err(GridError::Config(format!(
                "minVisibleRows ({}) exceeds maxVisibleRows ({})",
                self.min_visible_rows, self.max_visible_rows
            )));
        }
        Ok(())
    }

    /// Apply a single named option. Returns whether the value changed.
    pub fn set_option(&mut self, name: &str, value: &Value) -> Result<bool> {
        let mut as_json = serde_json::to_value(&*self)?;
        let Some(map) = as_json.as_object_mut() else {
            return Err(GridError::Config("options are not an object".to_string()));
        };
        match map.get(name) {
            None => return Err(GridError::Config(format!("Unknown grid option '{}'", name))),
            Some(current) if current == value => return Ok(false),
            Some(_) => {}
        }
        map.insert(name.to_string(), value.clone());

        let updated: GridOptions = serde_json::from_value(as_json).map_err(|e| {
            GridError::Config(format!("Invalid value for grid option '{}': {}", name, e))
        })?;
        updated.validate()?;
        let changed = updated != *self;
        *self = updated;
        Ok(changed)
    }

    /// Height of the grid viewport for a table of `row_count` rows.
    ///
    /// Returns the height and whether the scrollbar is needed.
    pub fn grid_height(&self, row_count: usize) -> (f32, bool) {
        let row_height = self.row_height;
        let min_height = row_height * self.min_visible_rows as f32;
        let max_height = self
            .height
            .unwrap_or(row_height * (self.max_visible_rows + layout::HEADER_ROWS) as f32);
        let total_row_height = (row_count + 1) as f32 * row_height + 1.0;
        if total_row_height <= max_height {
            (min_height.max(total_row_height), false)
        } else {
            (max_height, true)
        }
    }
}

/// Widget-level settings that sit beside the grid options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub options: GridOptions,
    pub show_toolbar: bool,
    /// Significant digits used when displaying float slider bounds
    pub precision: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            options: GridOptions::default(),
            show_toolbar: false,
            precision: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let options = GridOptions::from_json(r#"{"rowHeight": 30, "sortable": false}"#).unwrap();
        assert_eq!(options.row_height, 30.0);
        assert!(!options.sortable);
        assert_eq!(options.min_visible_rows, 8);
        assert_eq!(options.max_visible_rows, 15);
        assert!(options.force_fit_columns);
        assert!(options.height.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"maxVisibleRows": 20, "boldIndex": false}}"#).unwrap();
        file.flush().unwrap();

        let options = GridOptions::load(file.path()).unwrap();
        assert_eq!(options.max_visible_rows, 20);
        assert!(!options.bold_index);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let err = GridOptions::from_json(r#"{"minVisibleRows": 20, "maxVisibleRows": 10}"#)
            .unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
    }

    #[test]
    fn test_set_option() {
        let mut options = GridOptions::default();
        assert!(options.set_option("forceFitColumns", &json!(false)).unwrap());
        assert!(!options.force_fit_columns);
        assert!(!options.set_option("forceFitColumns", &json!(false)).unwrap());

        assert!(options.set_option("height", &json!(400.0)).unwrap());
        assert_eq!(options.height, Some(400.0));

        let err = options.set_option("noSuchOption", &json!(1)).unwrap_err();
        assert!(matches!(err, GridError::Config(_)));

        let err = options.set_option("rowHeight", &json!("tall")).unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
        assert_eq!(options.row_height, 28.0);
    }

    #[test]
    fn test_grid_height() {
        let options = GridOptions::default();
        // few rows: clamped up to the minimum
        assert_eq!(options.grid_height(2), (28.0 * 8.0, false));
        // fits without scrolling
        assert_eq!(options.grid_height(10), (11.0 * 28.0 + 1.0, false));
        // too many: capped at max_visible + header rows
        assert_eq!(options.grid_height(1000), (28.0 * 17.0, true));

        let fixed = GridOptions {
            height: Some(200.0),
            ..GridOptions::default()
        };
        assert_eq!(fixed.grid_height(1000), (200.0, true));
    }
}
