//! Row selection model

use std::collections::BTreeSet;

/// Modifier keys held during a row click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub toggle: bool,
    pub extend: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    rows: BTreeSet<usize>,
    anchor: Option<usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<usize> {
        self.rows.iter().copied().collect()
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Apply a row click. Returns true when the selection changed.
    pub fn click(&mut self, row: usize, modifiers: ClickModifiers) -> bool {
        let before = self.rows.clone();
        match (modifiers.extend, self.anchor) {
            (true, Some(anchor)) => {
                let (lo, hi) = if anchor <= row { (anchor, row) } else { (row, anchor) };
                self.rows.extend(lo..=hi);
            }
            _ if modifiers.toggle => {
                if !self.rows.remove(&row) {
                    self.rows.insert(row);
                }
                self.anchor = Some(row);
            }
            _ => {
                self.rows.clear();
                self.rows.insert(row);
                self.anchor = Some(row);
            }
        }
        self.rows != before
    }

    /// Replace the selection without treating it as a user gesture
    pub fn set(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.rows = rows.into_iter().collect();
        self.anchor = self.rows.iter().next().copied();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.anchor = None;
    }

    /// Selected rows below `limit`, in order
    pub fn rows_below(&self, limit: usize) -> Vec<usize> {
        self.rows.range(..limit).copied().collect()
    }
}
