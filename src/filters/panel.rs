//! The single filter-panel slot
//!
//! At most one panel is open. Opening a panel tears down the previous one.
//! While a panel is open it holds a dismiss subscription on document-level
//! input (escape, outside click); closing the panel drops that subscription.

use tracing::trace;

use crate::constants::messages;

/// What the open panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelContent {
    Controls,
    /// Every value in the column is the same
    DegenerateNotice,
}

impl PanelContent {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            PanelContent::Controls => None,
            PanelContent::DegenerateNotice => Some(messages::DEGENERATE_COLUMN),
        }
    }
}

/// Where a pointer press landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    InsidePanel,
    /// A popup spawned by the panel, such as a date picker calendar
    ChildOverlay,
    Outside,
}

/// Input observed at the document level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    EscapePressed,
    PointerDown(PointerTarget),
}

/// Handle for a registered dismiss listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPanel {
    pub field: String,
    pub content: PanelContent,
    subscription: SubscriptionId,
}

#[derive(Debug, Default)]
pub struct FilterPanelSlot {
    open: Option<OpenPanel>,
    listeners: Vec<SubscriptionId>,
    next_id: u64,
}

impl FilterPanelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&OpenPanel> {
        self.open.as_ref()
    }

    pub fn is_open_for(&self, field: &str) -> bool {
        self.open.as_ref().is_some_and(|p| p.field == field)
    }

    /// Registered dismiss listeners; at most one
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Open a fresh panel for `field`, closing whatever was open
    pub fn show(&mut self, field: &str, content: PanelContent) {
        self.hide();
        let subscription = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push(subscription);
        trace!(field, ?content, "filter panel opened");
        self.open = Some(OpenPanel {
            field: field.to_string(),
            content,
            subscription,
        });
    }

    /// Tear down the open panel. Returns the field it belonged to.
    pub fn hide(&mut self) -> Option<String> {
        let panel = self.open.take()?;
        self.listeners.retain(|id| *id != panel.subscription);
        trace!(field = %panel.field, "filter panel closed");
        Some(panel.field)
    }

    /// Route a document event to the open panel's subscription
    pub fn handle_document_event(&mut self, event: DocumentEvent) -> Option<String> {
        self.open.as_ref()?;
        match event {
            DocumentEvent::EscapePressed | DocumentEvent::PointerDown(PointerTarget::Outside) => {
                self.hide()
            }
            DocumentEvent::PointerDown(_) => None,
        }
    }
}
