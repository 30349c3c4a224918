//! Windowed data view
//!
//! The view reports the host's full row count but only holds the rows of the
//! last pushed page. A new page means a new `DataView`; nothing is carried over.

use serde_json::Value;

use crate::protocol::Row;

/// Row window `[top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportRange {
    pub top: usize,
    pub bottom: usize,
}

impl ViewportRange {
    pub fn new(top: usize, bottom: usize) -> Self {
        Self { top, bottom }
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.top && row < self.bottom
    }

    pub fn len(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<(usize, usize)> for ViewportRange {
    fn from((top, bottom): (usize, usize)) -> Self {
        Self { top, bottom }
    }
}

/// What the renderer gets for a row index
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowItem<'a> {
    Loaded { row_index: usize, cells: &'a Row },
    /// Outside the resident window: only the index is known
    Placeholder { row_index: usize },
}

impl<'a> RowItem<'a> {
    pub fn row_index(&self) -> usize {
        match self {
            RowItem::Loaded { row_index, .. } | RowItem::Placeholder { row_index } => *row_index,
        }
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        match self {
            RowItem::Loaded { cells, .. } => cells.get(field),
            RowItem::Placeholder { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, RowItem::Loaded { .. })
    }
}

/// Immutable snapshot of one host page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataView {
    rows: Vec<Row>,
    range: ViewportRange,
    length: usize,
}

impl DataView {
    pub fn new(rows: Vec<Row>, range: impl Into<ViewportRange>, length: usize) -> Self {
        Self {
            rows,
            range: range.into(),
            length,
        }
    }

    /// No resident rows, only a length
    pub fn empty(length: usize) -> Self {
        Self {
            rows: Vec::new(),
            range: ViewportRange::default(),
            length,
        }
    }

    /// Authoritative row count
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn range(&self) -> ViewportRange {
        self.range
    }

    pub fn get_item(&self, row_index: usize) -> RowItem<'_> {
        if self.range.contains(row_index) {
            if let Some(cells) = self.rows.get(row_index - self.range.top) {
                return RowItem::Loaded { row_index, cells };
            }
        }
        RowItem::Placeholder { row_index }
    }
}
