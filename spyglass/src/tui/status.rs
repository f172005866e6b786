use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::{CAUTION_AMBER, INFO_DIM, PRIMARY};
use crate::store::StoreStats;

/// Bottom status bar: store health, filter summary, keybinds.
pub struct StatusBar {
    stats: StoreStats,
    filter_summary: String,
    live_feed: bool,
}

impl StatusBar {
    #[must_use]
    pub fn new(stats: StoreStats, filter_summary: String, live_feed: bool) -> Self {
        Self {
            stats,
            filter_summary,
            live_feed,
        }
    }

    /// Anything worth amber: events being dropped or evicted.
    #[must_use]
    pub fn has_caution(&self) -> bool {
        self.stats.dropped > 0 || self.stats.evicted > 0
    }

    pub fn render(&self, f: &mut Frame, area: Rect, keybinds: Line<'static>) {
        let feed = if self.live_feed {
            Span::styled("[LIVE]", Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD))
        } else {
            Span::styled("[NO FEED]", Style::default().fg(INFO_DIM))
        };

        let mut spans = vec![
            feed,
            Span::styled(
                format!(" {}/{}", self.stats.stored, self.stats.capacity),
                Style::default().fg(PRIMARY),
            ),
        ];
        if self.stats.evicted > 0 {
            spans.push(Span::styled(
                format!(" evicted:{}", self.stats.evicted),
                Style::default().fg(CAUTION_AMBER),
            ));
        }
        if self.stats.dropped > 0 {
            spans.push(Span::styled(
                format!(" dropped:{}", self.stats.dropped),
                Style::default().fg(CAUTION_AMBER),
            ));
        }
        spans.push(Span::styled(
            format!("  filter: {}", self.filter_summary),
            Style::default().fg(INFO_DIM),
        ));
        spans.push(Span::raw("  "));
        spans.extend(keybinds.spans);

        let border_color = if self.has_caution() { CAUTION_AMBER } else { PRIMARY };
        let status = Paragraph::new(vec![Line::from(spans)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
        f.render_widget(status, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(dropped: u64, evicted: u64) -> StoreStats {
        StoreStats {
            stored: 5,
            capacity: 200,
            dropped,
            evicted,
        }
    }

    #[test]
    fn test_clean_store_shows_no_caution() {
        let bar = StatusBar::new(stats(0, 0), "all events".to_string(), true);
        assert!(!bar.has_caution());
    }

    #[test]
    fn test_dropped_or_evicted_raises_caution() {
        assert!(StatusBar::new(stats(3, 0), "all events".to_string(), true).has_caution());
        assert!(StatusBar::new(stats(0, 7), "all events".to_string(), false).has_caution());
    }
}
