//! Application-wide constants and default values
//!
//! Timing windows, paging sizes and the user-facing strings shared between the
//! controller, the filters and the reference host.

/// Debounce windows for interactive gestures
pub mod timing {
    use std::time::Duration;

    /// Scroll settling time before a viewport request is issued
    pub const VIEWPORT_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Slider drag settling time before a filter change is committed
    pub const SLIDER_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Search box settling time before the host is asked for matching values
    pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Scroll settling time for a text filter's value list
    pub const FILTER_VIEWPORT_DEBOUNCE: Duration = Duration::from_millis(100);
}

/// Host paging defaults
pub mod paging {
    /// Rows sent either side of the viewport top
    pub const PAGE_SIZE: usize = 100;

    /// Maximum distinct values sent in one text filter page
    pub const MAX_FILTER_VALUES: usize = PAGE_SIZE * 2;

    /// Initial viewport before the renderer reports one
    pub const INITIAL_VIEWPORT: (usize, usize) = (0, PAGE_SIZE);
}

/// Grid layout defaults
pub mod layout {
    /// Default row height in points
    pub const DEFAULT_ROW_HEIGHT: f32 = 28.0;

    /// Default minimum number of rows the viewport shows
    pub const DEFAULT_MIN_VISIBLE_ROWS: usize = 8;

    /// Default maximum number of rows before the grid scrolls
    pub const DEFAULT_MAX_VISIBLE_ROWS: usize = 15;

    /// Extra rows accounted for the header and padding
    pub const HEADER_ROWS: usize = 2;

    /// Default column width in points
    pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

    /// Number of slider steps across a float column's domain
    pub const SLIDER_STEPS: f64 = 200.0;

    /// Row height used inside a text filter's value list
    pub const FILTER_ROW_HEIGHT: f32 = 32.0;

    /// Rows shown in a text filter's value list before it scrolls
    pub const FILTER_VISIBLE_ROWS: usize = 8;
}

/// Date arithmetic
pub mod datetime {
    /// Milliseconds in one UTC day
    pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

    /// Wire format for datetime cells
    pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
}

/// Strings shown to users
pub mod messages {
    pub const DEGENERATE_COLUMN: &str = "All values in the column are the same.  Nothing to filter.";
    pub const TOOLBAR_DISABLED: &str = "Not available while there is an active filter";
    pub const ROW_OP_IN_PROGRESS: &str =
        "Adding/removing row is not available yet because the previous operation is still in progress.";
    pub const INDEX_NOT_EDITABLE: &str = "Editing index columns is not supported";
    pub const INVALID_INTEGER: &str = "Please enter a valid integer";
    pub const INVALID_NUMBER: &str = "Please enter a valid number";
    pub const INVALID_DATE: &str = "Please enter a date as YYYY-MM-DD HH:MM:SS";
    pub const INVALID_BOOLEAN: &str = "Please enter true or false";
    pub const INVALID_OPTION: &str = "Please choose one of the listed values";
    pub const NO_RESULTS: &str = "No results found.";
}

/// Names used for synthetic columns
pub mod naming {
    /// Index column added by the reference host
    pub const INDEX_COLUMN: &str = "index";
}
