//! Viewport request sequencing
//!
//! Scroll notifications are debounced. Only one `change_viewport` may be in
//! flight; a position settled while waiting replaces any earlier queued one and
//! goes out as soon as the outstanding response arrives.

use std::time::Duration;

use tracing::debug;

use crate::constants::{paging, timing};
use crate::data_view::ViewportRange;
use crate::schedule::Debounce;

#[derive(Debug, Clone)]
pub struct ViewportSync {
    timer: Debounce<ViewportRange>,
    /// Last viewport sent to the host
    sent: ViewportRange,
    /// Last settled viewport reported by the renderer
    last_settled: ViewportRange,
    response_expected: bool,
    queued: Option<ViewportRange>,
}

impl Default for ViewportSync {
    fn default() -> Self {
        let (top, bottom) = paging::INITIAL_VIEWPORT;
        let initial = ViewportRange::new(top, bottom);
        Self {
            timer: Debounce::new(timing::VIEWPORT_DEBOUNCE),
            sent: initial,
            last_settled: initial,
            response_expected: false,
            queued: None,
        }
    }
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer scrolled
    pub fn scrolled(&mut self, now: Duration, range: ViewportRange) {
        if self.timer.schedule(now, range) {
            debug!(top = range.top, bottom = range.bottom, "viewport change coalesced");
        }
    }

    /// Returns a viewport to send now, if the debounce settled on a new one
    /// and nothing is in flight
    pub fn poll(&mut self, now: Duration) -> Option<ViewportRange> {
        let range = self.timer.poll(now)?;
        self.last_settled = range;
        if range == self.sent {
            // back where the in-flight request points; nothing newer to send
            self.queued = None;
            return None;
        }
        if self.response_expected {
            debug!(top = range.top, bottom = range.bottom, "viewport request queued");
            self.queued = Some(range);
            None
        } else {
            self.response_expected = true;
            self.sent = range;
            Some(range)
        }
    }

    /// A `change_viewport` response arrived. Returns the queued viewport to
    /// send immediately; in that case the response is stale.
    pub fn on_response(&mut self) -> Option<ViewportRange> {
        match self.queued.take() {
            Some(next) => {
                self.sent = next;
                Some(next)
            }
            None => {
                self.response_expected = false;
                None
            }
        }
    }

    pub fn response_expected(&self) -> bool {
        self.response_expected
    }

    pub fn last_settled(&self) -> ViewportRange {
        self.last_settled
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.timer.is_pending()
    }

    /// Grid rebuilt: drop pending state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
