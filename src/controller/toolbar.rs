//! Add/remove row toolbar state

use crate::constants::messages;
use crate::error::{GridError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOperation {
    Add,
    Remove,
}

impl RowOperation {
    pub fn label(self) -> &'static str {
        match self {
            RowOperation::Add => "Add Row",
            RowOperation::Remove => "Remove Row",
        }
    }

    /// Button text while the operation is pending
    pub fn busy_label(self) -> &'static str {
        match self {
            RowOperation::Add => "Adding...",
            RowOperation::Remove => "Removing...",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            RowOperation::Add => "add a row",
            RowOperation::Remove => "remove a row",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolbarState {
    pub visible: bool,
    /// False while any filter is active
    enabled: bool,
    in_progress: Option<RowOperation>,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self {
            visible: false,
            enabled: true,
            in_progress: None,
        }
    }
}

impl ToolbarState {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn in_progress(&self) -> Option<RowOperation> {
        self.in_progress
    }

    pub fn disabled_reason(&self) -> Option<&'static str> {
        (!self.enabled).then_some(messages::TOOLBAR_DISABLED)
    }

    pub fn set_filter_active(&mut self, active: bool) {
        self.enabled = !active;
    }

    /// Claim the single row-operation slot
    pub fn begin(&mut self, op: RowOperation) -> Result<()> {
        if self.in_progress.is_some() {
            return Err(GridError::RowOperationInProgress {
                requested: op.verb().to_string(),
            });
        }
        self.in_progress = Some(op);
        Ok(())
    }

    /// Return the busy button to idle
    pub fn finish(&mut self) -> Option<RowOperation> {
        self.in_progress.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_visibility_only() {
        let toolbar = ToolbarState::new(true);
        assert!(toolbar.visible);
        assert!(toolbar.enabled());
        assert_eq!(toolbar.in_progress(), None);
        assert!(!ToolbarState::new(false).visible);
    }

    #[test]
    fn test_single_operation() {
        let mut toolbar = ToolbarState::default();
        toolbar.begin(RowOperation::Add).unwrap();
        let err = toolbar.begin(RowOperation::Remove).unwrap_err();
        assert_eq!(err.user_message(), messages::ROW_OP_IN_PROGRESS);
        assert_eq!(toolbar.finish(), Some(RowOperation::Add));
        assert!(toolbar.begin(RowOperation::Remove).is_ok());
    }

    #[test]
    fn test_disabled_by_filter() {
        let mut toolbar = ToolbarState::default();
        toolbar.set_filter_active(true);
        assert!(!toolbar.enabled());
        assert_eq!(
            toolbar.disabled_reason(),
            Some("Not available while there is an active filter")
        );
    }
}
