//! Value inspector panel
//!
//! Renders one flattened value tree as a scrollable list of rows, one per
//! visible node. Expand/collapse re-runs the flattening pass as a cooperative
//! session on the shared scheduler, so huge or cyclic graphs never stall the
//! input loop; an in-flight pass is cancelled when a newer toggle supersedes
//! it. The first paint flattens synchronously so the view is never empty.

use crate::inspect::{
    flatten_with, ExpansionState, FlatNode, FlattenHandle, FlattenOptions, FlattenSession,
    ValueRef,
};
use crate::sched::{drive_flatten, Scheduler};
use crate::tui::theme::{kind_badge, kind_color, CAUTION_AMBER, INFO_DIM, PRIMARY};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Calculate scroll offset to keep selected item visible
fn visible_scroll_offset(selected: usize, current_offset: usize, visible_count: usize) -> usize {
    if visible_count == 0 {
        return current_offset;
    }
    if selected >= current_offset + visible_count {
        selected.saturating_sub(visible_count - 1)
    } else {
        current_offset.min(selected)
    }
}

pub struct InspectorView {
    title: String,
    root: ValueRef,
    expansion: ExpansionState,
    options: FlattenOptions,
    raw_mode: bool,
    scheduler: Rc<dyn Scheduler>,

    /// Shared with in-flight session completions.
    nodes: Rc<RefCell<Vec<FlatNode>>>,
    /// True while a re-flatten session is queued or running.
    busy: Rc<Cell<bool>>,
    pending: Option<FlattenHandle>,

    pub selected_index: usize, // Public for testing
    scroll_offset: usize,
}

impl InspectorView {
    /// Build the view and flatten the initial window of `value`.
    ///
    /// `raw_mode` drops the panel chrome (border, header, key legend) and
    /// renders nothing but the rows; embedding hosts use it to compose the
    /// tree into their own surfaces.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        value: &ValueRef,
        options: FlattenOptions,
        raw_mode: bool,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let expansion = ExpansionState::new();
        let nodes = flatten_with(value, &expansion, options);
        Self {
            title: title.into(),
            root: Rc::clone(value),
            expansion,
            options,
            raw_mode,
            scheduler,
            nodes: Rc::new(RefCell::new(nodes)),
            busy: Rc::new(Cell::new(false)),
            pending: None,
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.raw_mode
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// The currently selected node, if any.
    #[must_use]
    pub fn selected(&self) -> Option<FlatNode> {
        let nodes = self.nodes.borrow();
        let index = self.selected_index.min(nodes.len().saturating_sub(1));
        nodes.get(index).cloned()
    }

    pub fn scroll_up(&mut self) {
        self.clamp_selection();
        self.selected_index = self.selected_index.saturating_sub(1);
        self.scroll_offset = self.scroll_offset.min(self.selected_index);
    }

    pub fn scroll_down(&mut self) {
        self.clamp_selection();
        let max_index = self.nodes.borrow().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Expand or collapse the selected node. A no-op on leaves and circular
    /// terminals; otherwise the tree re-flattens cooperatively.
    pub fn toggle_selected(&mut self) {
        let Some(node) = self.selected() else { return };
        if !node.expandable {
            return;
        }
        self.expansion.toggle(&node.id);
        self.reflatten();
    }

    /// Start a fresh flatten session for the current expansion state,
    /// cancelling whatever pass it supersedes.
    fn reflatten(&mut self) {
        if let Some(stale) = self.pending.take() {
            stale.cancel();
        }
        let session = FlattenSession::new(&self.root, &self.expansion, self.options);
        let sink = Rc::clone(&self.nodes);
        let busy = Rc::clone(&self.busy);
        busy.set(true);
        self.pending = Some(drive_flatten(&self.scheduler, session, move |nodes| {
            *sink.borrow_mut() = nodes;
            busy.set(false);
        }));
    }

    fn clamp_selection(&mut self) {
        let max_index = self.nodes.borrow().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
        self.scroll_offset = self.scroll_offset.min(self.selected_index);
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        self.clamp_selection();

        if self.raw_mode {
            let rows = self.node_lines(area.height as usize, area.width);
            f.render_widget(Paragraph::new(rows), area);
            return;
        }

        // Borders take 2 rows, header and legend one each.
        let visible = (area.height as usize).saturating_sub(4).max(1);
        let mut lines = vec![self.header_line()];
        lines.extend(self.node_lines(visible, area.width));
        // Pad so the legend sits on the bottom inner row (height minus the
        // two border rows and the legend itself).
        while lines.len() < (area.height as usize).saturating_sub(3) {
            lines.push(Line::from(""));
        }
        lines.push(legend_line());

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("[ INSPECT {} ]", self.title))
                .border_style(Style::default().fg(PRIMARY)),
        );
        f.render_widget(paragraph, area);
    }

    fn header_line(&self) -> Line<'static> {
        let nodes = self.nodes.borrow();
        let state = if self.busy.get() { "  flattening..." } else { "" };
        Line::from(vec![
            Span::styled(
                format!(" {} nodes  depth<={}{state}", nodes.len(), self.options.max_depth),
                Style::default().fg(INFO_DIM),
            ),
        ])
    }

    fn node_lines(&self, visible: usize, width: u16) -> Vec<Line<'static>> {
        let nodes = self.nodes.borrow();
        let scroll_offset = visible_scroll_offset(self.selected_index, self.scroll_offset, visible);

        nodes
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(visible)
            .map(|(index, node)| node_line(node, index == self.selected_index, width))
            .collect()
    }
}

fn node_line(node: &FlatNode, is_selected: bool, width: u16) -> Line<'static> {
    let indent = "  ".repeat(node.depth);
    let glyph = if node.expandable {
        if node.expanded {
            "▾ "
        } else {
            "▸ "
        }
    } else {
        "  "
    };

    let color = kind_color(node.kind);
    let value_style = if is_selected {
        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(color)
    };

    // Keep rows on one line; the display string may hold a long payload.
    let budget = (width as usize)
        .saturating_sub(indent.len() + glyph.len() + node.key.len() + 12)
        .max(8);
    let mut display = node.display.clone();
    if display.chars().count() > budget {
        display = display.chars().take(budget.saturating_sub(3)).collect::<String>() + "...";
    }

    Line::from(vec![
        Span::raw(indent),
        Span::styled(glyph, Style::default().fg(CAUTION_AMBER)),
        Span::styled(format!("{}: ", node.key), Style::default().fg(PRIMARY)),
        Span::styled(display, value_style),
        Span::styled(format!(" [{}]", kind_badge(node.kind)), Style::default().fg(INFO_DIM)),
    ])
}

fn legend_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(" ↑↓", Style::default().fg(CAUTION_AMBER)),
        Span::styled(" Move  ", Style::default().fg(INFO_DIM)),
        Span::styled("Enter", Style::default().fg(CAUTION_AMBER)),
        Span::styled(" Toggle  ", Style::default().fg(INFO_DIM)),
        Span::styled("Esc", Style::default().fg(CAUTION_AMBER)),
        Span::styled(" Back", Style::default().fg(INFO_DIM)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::Value;
    use crate::sched::TaskQueue;

    fn sample() -> ValueRef {
        Value::object([
            ("name", Value::string("spyglass")),
            ("flags", Value::array([Value::boolean(true), Value::boolean(false)])),
        ])
    }

    fn view_with_queue(value: &ValueRef) -> (InspectorView, Rc<TaskQueue>) {
        let queue = Rc::new(TaskQueue::new());
        let scheduler: Rc<dyn Scheduler> = Rc::<TaskQueue>::clone(&queue);
        let view = InspectorView::new(
            "test",
            value,
            FlattenOptions::with_depth(6),
            false,
            scheduler,
        );
        (view, queue)
    }

    fn drain_all(queue: &TaskQueue) {
        let mut turns = 0;
        while !queue.is_idle() {
            queue.drain();
            turns += 1;
            assert!(turns < 100, "scheduler never settled");
        }
    }

    #[test]
    fn test_initial_flatten_is_synchronous() {
        let value = sample();
        let (view, _queue) = view_with_queue(&value);
        assert_eq!(view.node_count(), 3); // root, name, flags (collapsed)
        assert!(!view.is_busy());
        assert_eq!(view.selected().map(|n| n.id), Some("root".to_string()));
    }

    #[test]
    fn test_toggle_root_collapses_after_drain() {
        let value = sample();
        let (mut view, queue) = view_with_queue(&value);

        view.toggle_selected();
        assert!(view.is_busy());
        drain_all(&queue);

        assert!(!view.is_busy());
        assert_eq!(view.node_count(), 1);
    }

    #[test]
    fn test_toggle_leaf_is_a_no_op() {
        let value = sample();
        let (mut view, queue) = view_with_queue(&value);
        view.scroll_down(); // "name", a string leaf

        view.toggle_selected();
        assert!(!view.is_busy());
        assert!(queue.is_idle());
        assert_eq!(view.node_count(), 3);
    }

    #[test]
    fn test_second_toggle_supersedes_first() {
        let value = sample();
        let (mut view, queue) = view_with_queue(&value);

        view.toggle_selected(); // collapse root
        view.toggle_selected(); // re-expand before the first pass ran
        drain_all(&queue);

        // Net effect of collapse+expand is the original tree.
        assert_eq!(view.node_count(), 3);
        assert!(!view.is_busy());
    }

    #[test]
    fn test_selection_clamps_when_tree_shrinks() {
        let value = sample();
        let (mut view, queue) = view_with_queue(&value);
        view.scroll_down();
        view.scroll_down();
        assert_eq!(view.selected_index, 2);

        // Collapse from the root while a deeper row is selected.
        view.selected_index = 0;
        view.toggle_selected();
        view.selected_index = 2;
        drain_all(&queue);

        assert_eq!(view.selected().map(|n| n.id), Some("root".to_string()));
    }

    #[test]
    fn test_expanding_child_adds_its_entries() {
        let value = sample();
        let (mut view, queue) = view_with_queue(&value);
        view.scroll_down();
        view.scroll_down(); // "flags"

        view.toggle_selected();
        drain_all(&queue);

        assert_eq!(view.node_count(), 5);
        let flags_children = view.nodes.borrow().iter().filter(|n| n.depth == 2).count();
        assert_eq!(flags_children, 2);
    }
}
