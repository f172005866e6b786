//! Event list panel and filter overlay
//!
//! The list renders the store's newest-first snapshot one row per event and
//! keeps its own selection across refreshes, the store stays unaware of the
//! UI. The filter overlay edits a working copy of the ingest filter; nothing
//! reaches the store until it is applied.

use crate::domain::{EventType, Level, TelemetryEvent};
use crate::store::EventFilter;
use crate::tui::theme::{level_marker, CAUTION_AMBER, INFO_DIM, PRIMARY, TEXT};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::rc::Rc;

/// Truncate a string for display, adding "..." if too long
fn truncate_for_display(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

// ============================================================================
// Event list
// ============================================================================

pub struct EventsView {
    events: Vec<Rc<TelemetryEvent>>,
    pub selected_index: usize, // Public for testing
    scroll_offset: usize,
}

impl EventsView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    /// Swap in a fresh store snapshot, keeping the selection where it was
    /// (clamped if the list shrank).
    pub fn refresh(&mut self, events: Vec<Rc<TelemetryEvent>>) {
        self.events = events;
        self.selected_index = self
            .selected_index
            .min(self.events.len().saturating_sub(1));
        self.scroll_offset = self.scroll_offset.min(self.selected_index);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn selected(&self) -> Option<Rc<TelemetryEvent>> {
        self.events.get(self.selected_index).cloned()
    }

    pub fn scroll_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.scroll_offset = self.scroll_offset.min(self.selected_index);
    }

    pub fn scroll_down(&mut self) {
        self.selected_index =
            (self.selected_index + 1).min(self.events.len().saturating_sub(1));
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, capacity: usize) {
        let visible = (area.height as usize).saturating_sub(2).max(1);
        if self.selected_index >= self.scroll_offset + visible {
            self.scroll_offset = self.selected_index.saturating_sub(visible - 1);
        }

        let width = area.width as usize;
        let lines: Vec<Line<'static>> = self
            .events
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible)
            .map(|(index, event)| event_line(event, index == self.selected_index, width))
            .collect();

        let title = format!("[ EVENTS {}/{} ]", self.events.len(), capacity);
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(PRIMARY)),
        );
        f.render_widget(paragraph, area);
    }

    /// Summary card for the selected event, shown next to the list.
    pub fn render_detail(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from("")];

        if let Some(event) = self.selected() {
            let label = Style::default().fg(CAUTION_AMBER).add_modifier(Modifier::BOLD);
            let (marker, marker_color) = level_marker(event.level);

            lines.push(Line::from(vec![
                Span::styled(" Level   ", label),
                Span::styled(marker, Style::default().fg(marker_color)),
                Span::styled(
                    format!(" {}", event.level.as_str()),
                    Style::default().fg(marker_color),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled(" Type    ", label),
                Span::styled(event.event_type.as_str(), Style::default().fg(TEXT)),
            ]));
            lines.push(Line::from(vec![
                Span::styled(" Source  ", label),
                Span::styled(event.source.as_str(), Style::default().fg(TEXT)),
            ]));
            lines.push(Line::from(vec![
                Span::styled(" Time    ", label),
                Span::styled(
                    event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                    Style::default().fg(TEXT),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled(" Id      ", label),
                Span::styled(event.id.0.clone(), Style::default().fg(INFO_DIM)),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(" Message", label)));
            let budget = (area.width as usize).saturating_sub(4).max(8);
            lines.push(Line::from(Span::styled(
                format!(" {}", truncate_for_display(&event.message, budget)),
                Style::default().fg(TEXT),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(" Enter", Style::default().fg(CAUTION_AMBER)),
                Span::styled(" inspect payload", Style::default().fg(INFO_DIM)),
            ]));
        } else {
            lines.push(Line::from(Span::styled(
                " no event selected",
                Style::default().fg(INFO_DIM),
            )));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("[ DETAIL ]")
                .border_style(Style::default().fg(PRIMARY)),
        );
        f.render_widget(paragraph, area);
    }
}

impl Default for EventsView {
    fn default() -> Self {
        Self::new()
    }
}

fn event_line(event: &TelemetryEvent, is_selected: bool, width: usize) -> Line<'static> {
    let (marker, marker_color) = level_marker(event.level);
    let time = event.timestamp.format("%H:%M:%S").to_string();
    let tag = format!("{:<11}", event.event_type.as_str());

    let message_budget = width.saturating_sub(time.len() + marker.len() + tag.len() + 6).max(8);
    let message = truncate_for_display(&event.message, message_budget);

    let message_style = if is_selected {
        Style::default().fg(TEXT).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(TEXT)
    };

    Line::from(vec![
        Span::styled(format!(" {time} "), Style::default().fg(INFO_DIM)),
        Span::styled(marker, Style::default().fg(marker_color)),
        Span::styled(format!(" {tag}"), Style::default().fg(PRIMARY)),
        Span::styled(message, message_style),
    ])
}

// ============================================================================
// Filter overlay
// ============================================================================

const TYPE_ROWS: usize = EventType::ALL.len();
const LEVEL_ROWS: usize = Level::ALL.len();
const FILTER_ROWS: usize = TYPE_ROWS + LEVEL_ROWS;

/// Checkbox editor over both filter dimensions. Checked means "narrow to
/// these"; a dimension with nothing checked shows everything.
pub struct FilterOverlay {
    working: EventFilter,
    cursor: usize,
}

impl FilterOverlay {
    #[must_use]
    pub fn new(current: EventFilter) -> Self {
        Self {
            working: current,
            cursor: 0,
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1).min(FILTER_ROWS - 1);
    }

    /// Toggle the check under the cursor.
    pub fn toggle_cursor(&mut self) {
        if self.cursor < TYPE_ROWS {
            self.working.toggle_type(EventType::ALL[self.cursor]);
        } else {
            self.working.toggle_level(Level::ALL[self.cursor - TYPE_ROWS]);
        }
    }

    /// Back to "show everything".
    pub fn reset(&mut self) {
        self.working = EventFilter::new();
    }

    #[must_use]
    pub fn into_filter(self) -> EventFilter {
        self.working
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let popup_area = super::centered_popup(area, 40, (FILTER_ROWS + 8) as u16);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Show only checked; none checked = all",
                Style::default().fg(INFO_DIM),
            )),
            Line::from(""),
        ];

        for (row, event_type) in EventType::ALL.iter().enumerate() {
            lines.push(self.checkbox_line(
                row,
                event_type.as_str(),
                self.working.has_type(*event_type),
            ));
        }
        lines.push(Line::from(""));
        for (offset, level) in Level::ALL.iter().enumerate() {
            lines.push(self.checkbox_line(
                TYPE_ROWS + offset,
                level.as_str(),
                self.working.has_level(*level),
            ));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  [Space]", Style::default().fg(CAUTION_AMBER)),
            Span::raw(" Toggle  "),
            Span::styled("[A]", Style::default().fg(CAUTION_AMBER)),
            Span::raw(" Show all  "),
            Span::styled("[Enter]", Style::default().fg(CAUTION_AMBER)),
            Span::raw(" Apply  "),
            Span::styled("[Esc]", Style::default().fg(CAUTION_AMBER)),
            Span::raw(" Cancel"),
        ]));

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("[ FILTER: {} ]", self.working.summary()))
                .style(Style::default().bg(ratatui::style::Color::Black).fg(PRIMARY)),
        );

        f.render_widget(Clear, popup_area);
        f.render_widget(widget, popup_area);
    }

    fn checkbox_line(&self, row: usize, name: &str, checked: bool) -> Line<'static> {
        let is_cursor = row == self.cursor;
        let cursor = if is_cursor { "▶ " } else { "  " };
        let checkbox = if checked { "[✓] " } else { "[ ] " };

        let style = if is_cursor {
            Style::default().fg(CAUTION_AMBER).add_modifier(Modifier::REVERSED)
        } else if checked {
            Style::default().fg(PRIMARY)
        } else {
            Style::default().fg(INFO_DIM)
        };

        Line::from(vec![
            Span::raw(format!("  {cursor}")),
            Span::styled(format!("{checkbox}{name}"), style),
        ])
    }
}
