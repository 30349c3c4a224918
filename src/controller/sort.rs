//! Sort state and the in-progress guard

use crate::column::Column;

/// Header indicator for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    None,
    Spinner,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct SortState {
    field: Option<String>,
    ascending: bool,
    in_progress: bool,
}

impl SortState {
    pub fn new() -> Self {
        Self {
            field: None,
            ascending: true,
            in_progress: false,
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Header clicked. Returns `(field, ascending)` to request, or `None`
    /// while a previous sort is unconfirmed.
    pub fn click(&mut self, column: &Column) -> Option<(String, bool)> {
        if self.in_progress {
            return None;
        }
        if self.field.as_deref() == Some(column.field()) {
            self.ascending = !self.ascending;
        } else {
            self.field = Some(column.field().to_string());
            self.ascending = column.schema.default_sort_asc.unwrap_or(true);
        }
        self.in_progress = true;
        Some((column.field().to_string(), self.ascending))
    }

    /// Host confirmed the order it applied
    pub fn confirm(&mut self, field: Option<String>, ascending: bool) {
        if field.is_some() {
            self.field = field;
        }
        self.ascending = ascending;
        self.in_progress = false;
    }

    pub fn indicator(&self, field: &str) -> SortIndicator {
        if self.field.as_deref() != Some(field) {
            return SortIndicator::None;
        }
        match (self.in_progress, self.ascending) {
            (true, _) => SortIndicator::Spinner,
            (false, true) => SortIndicator::Ascending,
            (false, false) => SortIndicator::Descending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnKind, ColumnSchema};

    fn column(name: &str) -> Column {
        Column::from_schema(ColumnSchema::new(name, ColumnKind::Number, 0), true)
    }

    #[test]
    fn test_toggle_and_guard() {
        let mut sort = SortState::new();
        let a = column("A");
        assert_eq!(sort.click(&a), Some(("A".to_string(), true)));
        assert_eq!(sort.indicator("A"), SortIndicator::Spinner);
        assert_eq!(sort.click(&a), None);

        sort.confirm(Some("A".to_string()), true);
        assert_eq!(sort.indicator("A"), SortIndicator::Ascending);
        assert_eq!(sort.click(&a), Some(("A".to_string(), false)));
        sort.confirm(Some("A".to_string()), false);
        assert_eq!(sort.indicator("A"), SortIndicator::Descending);

        // new column resets to ascending
        assert_eq!(sort.click(&column("B")), Some(("B".to_string(), true)));
        assert_eq!(sort.indicator("A"), SortIndicator::None);
    }

    #[test]
    fn test_default_sort_direction() {
        let mut schema = ColumnSchema::new("D", ColumnKind::Integer, 0);
        schema.default_sort_asc = Some(false);
        let d = Column::from_schema(schema, true);
        let mut sort = SortState::new();
        assert_eq!(sort.click(&d), Some(("D".to_string(), false)));
    }
}
