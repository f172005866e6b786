//! Responsive layout engine for the TUI.
//!
//! Adapts the layout based on terminal dimensions to ensure usability
//! at various sizes, from minimal (60x12) to full-screen.

use ratatui::layout::Constraint;

// Width breakpoints
const WIDTH_SINGLE_COLUMN: u16 = 70; // Below this: event list only, no detail pane
const WIDTH_NARROW: u16 = 110; // Below this: use tighter column split

// Height breakpoints
const HEIGHT_MINIMAL: u16 = 14; // Below this: event list only
const HEIGHT_COMPACT: u16 = 22; // Below this: hide the detail pane

/// Terminal size classification for layout decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalSize {
    /// Height < 14: header + event list only
    Minimal,
    /// Height 14-22: keep the list, drop the detail pane
    Compact,
    /// Height > 22: full layout
    Normal,
}

/// Computed layout configuration based on terminal dimensions.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Terminal size classification
    pub size: TerminalSize,

    /// Whether to show the detail pane next to the event list
    pub show_detail_pane: bool,

    /// Whether to show the status bar (bottom)
    pub show_status_bar: bool,

    /// Event list column percentage (0-100)
    pub list_pct: u16,

    /// Detail pane column percentage (0-100)
    pub detail_pct: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            size: TerminalSize::Normal,
            show_detail_pane: true,
            show_status_bar: true,
            list_pct: 45,
            detail_pct: 55,
        }
    }
}

impl LayoutConfig {
    /// Column constraints for the list/detail horizontal split.
    #[must_use]
    pub fn col_constraints(&self) -> [Constraint; 2] {
        [
            Constraint::Percentage(self.list_pct),
            Constraint::Percentage(self.detail_pct),
        ]
    }

    /// Override the computed split with a user-adjusted list percentage.
    pub fn apply_split(&mut self, list_pct: u16) {
        self.list_pct = list_pct.clamp(SPLIT_MIN, SPLIT_MAX);
        self.detail_pct = 100 - self.list_pct;
    }
}

// User-adjustable split bounds; keeps both panes readable.
pub const SPLIT_MIN: u16 = 20;
pub const SPLIT_MAX: u16 = 80;
pub const SPLIT_STEP: u16 = 5;

/// Compute layout configuration based on terminal dimensions.
///
/// # Breakpoints
///
/// | Terminal Size | Behavior |
/// |---------------|----------|
/// | Width < 70    | Event list only, detail opens full-screen |
/// | Width 70-110  | Narrow mode: list at 40%, detail at 60% |
/// | Width > 110   | Normal mode: 45/55 split |
/// | Height < 14   | Minimal: header + event list only |
/// | Height 14-22  | Compact: hide detail pane |
/// | Height > 22   | Full layout |
#[must_use]
pub fn compute_layout(width: u16, height: u16) -> LayoutConfig {
    let mut config = LayoutConfig::default();

    // Width breakpoints
    if width < WIDTH_SINGLE_COLUMN {
        config.show_detail_pane = false;
    } else if width <= WIDTH_NARROW {
        config.list_pct = 40;
        config.detail_pct = 60;
    }

    // Height breakpoints
    if height < HEIGHT_MINIMAL {
        config.size = TerminalSize::Minimal;
        config.show_detail_pane = false;
        config.show_status_bar = false;
    } else if height <= HEIGHT_COMPACT {
        config.size = TerminalSize::Compact;
        config.show_detail_pane = false;
    }

    config
}
