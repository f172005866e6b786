//! # Terminal User Interface (TUI)
//!
//! Interactive terminal UI using `ratatui` for the diagnostics console.
//!
//! ## View Modes
//!
//! - **Events** - Newest-first event list + detail pane (default)
//! - **Inspector** - Flattened value tree of one event's payload
//! - **Filter** - Checkbox overlay editing the ingest filter
//! - **Help** - Overlay with keyboard shortcuts
//!
//! ## Operational Modes
//!
//! - **Live** - Envelopes stream in over a channel (bus bridge or demo feed)
//! - **Replay** - A batch loaded from file, no channel attached
//!
//! ## Sub-Modules
//!
//! - `events` - Event list, detail card, filter overlay
//! - `inspector` - Value tree view
//! - `layout` - Responsive breakpoints
//! - `status` - Bottom status bar
//! - `theme` - Color scheme

// TUI rendering intentionally uses precision-losing casts and long functions for clarity
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::needless_pass_by_value
)]

use anyhow::Result;
use crossbeam_channel::Receiver;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use spyglass_common::RawEnvelope;
use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

pub mod inspector; // Public for embedding hosts
mod events;
mod layout;
mod status;
mod theme;

use crate::ingest::adapt;
use crate::inspect::{FlattenOptions, Value, ValueRef};
use crate::persist::{StateStore, FILTER_KEY, SPLIT_KEY};
use crate::sched::{Scheduler, TaskQueue};
use crate::store::{EventStore, Subscription};
use events::{EventsView, FilterOverlay};
use inspector::InspectorView;
use layout::{compute_layout, SPLIT_MAX, SPLIT_MIN, SPLIT_STEP};
use status::StatusBar;
use theme::{CAUTION_AMBER, INFO_DIM, PRIMARY};

// =============================================================================
// STYLE CONSTANTS
// =============================================================================

/// Pre-computed styles for consistent UI rendering (const fn for zero runtime cost)
const STYLE_HEADING: Style = Style::new().fg(PRIMARY).add_modifier(Modifier::BOLD);
const STYLE_LABEL: Style = Style::new().fg(CAUTION_AMBER).add_modifier(Modifier::BOLD);
const STYLE_DIM: Style = Style::new().fg(INFO_DIM);
const STYLE_KEY: Style = Style::new().fg(CAUTION_AMBER);

// =============================================================================
// VIEW MODES
// =============================================================================

/// Current view mode determines what's displayed and how keys are handled
#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewMode {
    /// Main view: event list + detail pane
    Events,
    /// Full-area value tree of the selected event's payload
    Inspector,
    /// Checkbox overlay for the ingest filter
    Filter,
    /// Help overlay with keyboard shortcuts
    Help,
}

// =============================================================================
// CONSOLE APP
// =============================================================================

/// The console application: one store, one scheduler queue, the views.
///
/// Everything runs on the calling thread. Envelopes produced elsewhere
/// arrive over `ingest_rx` and are adapted and stored inside the loop, so
/// the store never needs locks.
pub struct ConsoleApp {
    store: Rc<EventStore>,
    queue: Rc<TaskQueue>,
    scheduler: Rc<dyn Scheduler>,
    state: Rc<dyn StateStore>,
    ingest_rx: Option<Receiver<RawEnvelope>>,
    max_depth: usize,

    events_view: EventsView,
    inspector: Option<InspectorView>,
    filter_overlay: Option<FilterOverlay>,

    view_mode: ViewMode,
    /// User-adjusted list/detail split; None means the responsive default.
    split_pct: Option<u16>,
    /// Set by the store subscription; cleared when the list refreshes.
    dirty: Rc<Cell<bool>>,
    _store_watch: Subscription,
    should_quit: bool,
}

impl ConsoleApp {
    #[must_use]
    pub fn new(
        store: Rc<EventStore>,
        queue: Rc<TaskQueue>,
        state: Rc<dyn StateStore>,
        ingest_rx: Option<Receiver<RawEnvelope>>,
        max_depth: usize,
    ) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let store_watch = store.subscribe(Box::new(move || flag.set(true)));

        let mut events_view = EventsView::new();
        events_view.refresh(store.get_events());

        let split_pct = state
            .get(SPLIT_KEY)
            .and_then(|s| s.parse::<u16>().ok())
            .filter(|pct| (SPLIT_MIN..=SPLIT_MAX).contains(pct));

        let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
        Self {
            store,
            queue,
            scheduler,
            state,
            ingest_rx,
            max_depth,
            events_view,
            inspector: None,
            filter_overlay: None,
            view_mode: ViewMode::Events,
            split_pct,
            dirty,
            _store_watch: store_watch,
            should_quit: false,
        }
    }

    /// Open the inspector on an arbitrary value, e.g. a document loaded
    /// from file or a demo payload.
    pub fn open_inspector(&mut self, title: impl Into<String>, value: &ValueRef, raw: bool) {
        self.inspector = Some(InspectorView::new(
            title.into(),
            value,
            FlattenOptions::with_depth(self.max_depth),
            raw,
            Rc::clone(&self.scheduler),
        ));
        self.view_mode = ViewMode::Inspector;
    }

    /// Open the inspector on the selected event's payload.
    fn inspect_selected(&mut self) {
        let Some(event) = self.events_view.selected() else {
            return;
        };
        let value = Value::from_json(&event.data);
        let mut title: String = event.message.chars().take(32).collect();
        if title.len() < event.message.len() {
            title.push_str("...");
        }
        self.open_inspector(title, &value, false);
    }

    /// Move the list/detail split and persist the choice.
    fn adjust_split(&mut self, delta: i32) {
        let current = i32::from(self.split_pct.unwrap_or(45));
        let adjusted = (current + delta).clamp(i32::from(SPLIT_MIN), i32::from(SPLIT_MAX)) as u16;
        self.split_pct = Some(adjusted);
        self.state.set(SPLIT_KEY, &adjusted.to_string());
    }

    /// Apply the overlay's filter to the store and persist the selection.
    fn apply_filter(&mut self) {
        let Some(overlay) = self.filter_overlay.take() else {
            return;
        };
        let filter = overlay.into_filter();
        if let Ok(json) = serde_json::to_string(&filter) {
            self.state.set(FILTER_KEY, &json);
        }
        self.store.set_filter(filter);
        self.view_mode = ViewMode::Events;
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match self.view_mode {
            ViewMode::Events => match key {
                KeyCode::Char('q' | 'Q') => self.should_quit = true,
                KeyCode::Up => self.events_view.scroll_up(),
                KeyCode::Down => self.events_view.scroll_down(),
                KeyCode::Enter => self.inspect_selected(),
                KeyCode::Char('f' | 'F') => {
                    self.filter_overlay = Some(FilterOverlay::new(self.store.filter()));
                    self.view_mode = ViewMode::Filter;
                }
                KeyCode::Char('c' | 'C') => self.store.clear(),
                KeyCode::Char('[') => self.adjust_split(-i32::from(SPLIT_STEP)),
                KeyCode::Char(']') => self.adjust_split(i32::from(SPLIT_STEP)),
                KeyCode::Char('?') => self.view_mode = ViewMode::Help,
                _ => {}
            },
            ViewMode::Inspector => match key {
                KeyCode::Esc | KeyCode::Char('q' | 'Q') => {
                    self.inspector = None;
                    self.view_mode = ViewMode::Events;
                }
                KeyCode::Up => {
                    if let Some(view) = &mut self.inspector {
                        view.scroll_up();
                    }
                }
                KeyCode::Down => {
                    if let Some(view) = &mut self.inspector {
                        view.scroll_down();
                    }
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if let Some(view) = &mut self.inspector {
                        view.toggle_selected();
                    }
                }
                _ => {}
            },
            ViewMode::Filter => match key {
                KeyCode::Esc => {
                    self.filter_overlay = None;
                    self.view_mode = ViewMode::Events;
                }
                KeyCode::Up => {
                    if let Some(overlay) = &mut self.filter_overlay {
                        overlay.cursor_up();
                    }
                }
                KeyCode::Down => {
                    if let Some(overlay) = &mut self.filter_overlay {
                        overlay.cursor_down();
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(overlay) = &mut self.filter_overlay {
                        overlay.toggle_cursor();
                    }
                }
                KeyCode::Char('a' | 'A') => {
                    if let Some(overlay) = &mut self.filter_overlay {
                        overlay.reset();
                    }
                }
                KeyCode::Enter => self.apply_filter(),
                _ => {}
            },
            // Any key closes help
            ViewMode::Help => self.view_mode = ViewMode::Events,
        }
    }

    /// One turn of the non-drawing work: ingest, deferred tasks, refresh.
    fn tick(&mut self) {
        if let Some(rx) = &self.ingest_rx {
            while let Ok(envelope) = rx.try_recv() {
                self.store.add(adapt(&envelope));
            }
        }
        self.queue.drain();
        if self.dirty.replace(false) {
            self.events_view.refresh(self.store.get_events());
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame) {
        let mut config = compute_layout(f.area().width, f.area().height);
        if let Some(pct) = self.split_pct {
            config.apply_split(pct);
        }

        let constraints: Vec<Constraint> = if config.show_status_bar {
            vec![Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)]
        } else {
            vec![Constraint::Length(3), Constraint::Min(0)]
        };
        let outer_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        // Header
        let mode_badge = match self.view_mode {
            ViewMode::Events => Span::styled("EVENTS", Style::new().fg(PRIMARY)),
            ViewMode::Inspector => Span::styled("INSPECT", Style::new().fg(CAUTION_AMBER)),
            ViewMode::Filter => Span::styled("FILTER", Style::new().fg(CAUTION_AMBER)),
            ViewMode::Help => Span::styled("HELP", Style::new().fg(INFO_DIM)),
        };
        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled("SPYGLASS", STYLE_HEADING),
            Span::styled(" | ", STYLE_DIM),
            mode_badge,
            Span::styled(" | ", STYLE_DIM),
            Span::styled(format!("{} evts", self.events_view.len()), Style::new().fg(PRIMARY)),
        ])])
        .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(PRIMARY)));
        f.render_widget(header, outer_layout[0]);

        let main_area = outer_layout[1];
        let capacity = self.store.stats().capacity;

        match self.view_mode {
            ViewMode::Events | ViewMode::Filter | ViewMode::Help => {
                if config.show_detail_pane {
                    let cols = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints(config.col_constraints())
                        .split(main_area);
                    self.events_view.render(f, cols[0], capacity);
                    self.events_view.render_detail(f, cols[1]);
                } else {
                    self.events_view.render(f, main_area, capacity);
                }

                if let Some(overlay) = &self.filter_overlay {
                    if self.view_mode == ViewMode::Filter {
                        overlay.render(f, main_area);
                    }
                }
                if self.view_mode == ViewMode::Help {
                    render_help_overlay(f, main_area);
                }
            }
            ViewMode::Inspector => {
                if let Some(view) = &mut self.inspector {
                    view.render(f, main_area);
                }
            }
        }

        // Status bar keybinds
        if config.show_status_bar {
            let keybinds = match self.view_mode {
                ViewMode::Events => Line::from(vec![
                    Span::styled("Q", STYLE_KEY),
                    Span::styled(":Quit ", STYLE_DIM),
                    Span::styled("Enter", STYLE_KEY),
                    Span::styled(":Inspect ", STYLE_DIM),
                    Span::styled("F", STYLE_KEY),
                    Span::styled(":Filter ", STYLE_DIM),
                    Span::styled("C", STYLE_KEY),
                    Span::styled(":Clear ", STYLE_DIM),
                    Span::styled("?", STYLE_KEY),
                    Span::styled(":Help", STYLE_DIM),
                ]),
                ViewMode::Inspector => Line::from(vec![
                    Span::styled("Esc", STYLE_KEY),
                    Span::styled(":Back ", STYLE_DIM),
                    Span::styled("Enter", STYLE_KEY),
                    Span::styled(":Toggle", STYLE_DIM),
                ]),
                ViewMode::Filter => Line::from(vec![
                    Span::styled("Space", STYLE_KEY),
                    Span::styled(":Toggle ", STYLE_DIM),
                    Span::styled("Enter", STYLE_KEY),
                    Span::styled(":Apply ", STYLE_DIM),
                    Span::styled("Esc", STYLE_KEY),
                    Span::styled(":Cancel", STYLE_DIM),
                ]),
                ViewMode::Help => Line::from(vec![
                    Span::styled("Any key", STYLE_KEY),
                    Span::styled(":Close", STYLE_DIM),
                ]),
            };
            let bar = StatusBar::new(
                self.store.stats(),
                self.store.filter().summary(),
                self.ingest_rx.is_some(),
            );
            bar.render(f, outer_layout[2], keybinds);
        }
    }

    /// Run the TUI event loop
    ///
    /// # Errors
    /// Returns an error if terminal setup or rendering fails
    pub fn run(mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        loop {
            self.tick();

            terminal.draw(|f| self.draw(f))?;

            // Handle input
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        // Cleanup terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        Ok(())
    }
}

// =============================================================================
// OVERLAY RENDERERS
// =============================================================================

/// Render the help overlay explaining console concepts and keyboard shortcuts
fn render_help_overlay(f: &mut ratatui::Frame, area: Rect) {
    let popup_area = centered_popup(area, 80, 24);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  What You're Looking At", STYLE_HEADING)),
        Line::from(Span::styled(
            "  spyglass shows telemetry your app's SDK was about to send out:",
            STYLE_DIM,
        )),
        Line::from(Span::styled(
            "  errors, transactions, spans, breadcrumbs, before they leave.",
            STYLE_DIM,
        )),
        Line::from(""),
        Line::from(Span::styled("  How to Read It", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  Events    ", STYLE_LABEL),
            Span::styled("Newest first. [X] error, [!] warning, [-] info.", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  Detail    ", STYLE_LABEL),
            Span::styled("Where the selected event came from and when.", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  Inspector ", STYLE_LABEL),
            Span::styled("The payload as an expandable tree. Cycles stop", STYLE_DIM),
        ]),
        Line::from(Span::styled(
            "            at [Circular] instead of recursing forever.",
            STYLE_DIM,
        )),
        Line::from(""),
        Line::from(Span::styled("  Filtering", STYLE_HEADING)),
        Line::from(Span::styled(
            "  The filter applies at ingest. Events it rejects are dropped",
            STYLE_DIM,
        )),
        Line::from(Span::styled(
            "  for good; widening the filter later will not bring them back.",
            STYLE_DIM,
        )),
        Line::from(""),
        Line::from(Span::styled("  Keys", STYLE_HEADING)),
        Line::from(vec![
            Span::styled("  ↑↓", STYLE_KEY),
            Span::styled(" Select   ", STYLE_DIM),
            Span::styled("Enter", STYLE_KEY),
            Span::styled(" Inspect   ", STYLE_DIM),
            Span::styled("F", STYLE_KEY),
            Span::styled(" Filter   ", STYLE_DIM),
            Span::styled("C", STYLE_KEY),
            Span::styled(" Clear   ", STYLE_DIM),
            Span::styled("Q", STYLE_KEY),
            Span::styled(" Quit", STYLE_DIM),
        ]),
        Line::from(vec![
            Span::styled("  [ ]", STYLE_KEY),
            Span::styled(" Resize list/detail split (remembered)", STYLE_DIM),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", STYLE_DIM)),
    ];

    let help_widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::new().bg(ratatui::style::Color::Black).fg(PRIMARY)),
    );

    f.render_widget(ratatui::widgets::Clear, popup_area);
    f.render_widget(help_widget, popup_area);
}

/// Create a centered popup area with given width percentage and height in lines
fn centered_popup(area: Rect, width_percent: u16, height_lines: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height_lines), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}
