//! Rendering and mouse hit-testing. Both are pure functions of
//! [`Presenter`] state and the screen size.

use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use todos_core::{PriorityFilter, TaskPriority, TaskStatus};
use todos_store::TaskStore;

use crate::presenter::{Focus, Presenter, Target};

const FOCUSED: Style = Style::new().fg(Color::Cyan);
const PLACEHOLDER: &str = "Describe your task...";

const USAGE: [&str; 6] = [
    "Click a section, or Tab / Shift+Tab, to move between sections",
    "Click a row to select it; the wheel scrolls the table and filter",
    "\u{2191}\u{2193} or k/j            navigate the task list",
    "Enter / Space        toggle the selected task between done/pending",
    "d / Delete           remove the selected task",
    "Ctrl+C, or q outside the input, exits",
];

/// Where each panel sits on a screen of a given size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regions {
    /// Bordered "New" panel.
    pub new_panel: Rect,
    /// Description input inside it.
    pub input: Rect,
    /// Priority selector line.
    pub priority: Rect,
    /// Add button line.
    pub add: Rect,
    /// Bordered filter list.
    pub filter: Rect,
    /// Bordered task table.
    pub table: Rect,
    /// Usage panel, when shown.
    pub usage: Option<Rect>,
    /// Bottom status line.
    pub status: Rect,
}

impl Regions {
    /// Split `area` into panels.
    pub fn new(area: Rect, show_usage: bool) -> Self {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let [left, right] =
            Layout::horizontal([Constraint::Ratio(1, 5), Constraint::Ratio(4, 5)]).areas(main);
        let [new_panel, filter] =
            Layout::vertical([Constraint::Ratio(3, 4), Constraint::Ratio(1, 4)]).areas(left);
        let [input, priority, add] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(Block::bordered().inner(new_panel));

        let (table, usage) = if show_usage {
            let [table, usage] =
                Layout::vertical([Constraint::Percentage(80), Constraint::Percentage(20)]).areas(right);
            (table, Some(usage))
        } else {
            (right, None)
        };

        Self {
            new_panel,
            input,
            priority,
            add,
            filter,
            table,
            usage,
            status,
        }
    }
}

/// Draw the whole screen.
pub fn render<S: TaskStore>(frame: &mut Frame, presenter: &Presenter<S>) {
    let regions = Regions::new(frame.area(), presenter.show_usage());

    render_new_panel(frame, &regions, presenter);
    render_filter(frame, regions.filter, presenter);
    render_table(frame, regions.table, presenter);
    if let Some(usage) = regions.usage {
        render_usage(frame, usage);
    }
    render_status(frame, regions.status, presenter);
}

/// What a pointer at `(column, row)` is over, on a screen of size `area`.
///
/// Row lookups assume the scroll position ratatui picks when a list is
/// drawn with a fresh state: just far enough down to show the selection.
pub fn target_at<S: TaskStore>(
    presenter: &Presenter<S>,
    area: Rect,
    column: u16,
    row: u16,
) -> Option<Target> {
    let regions = Regions::new(area, presenter.show_usage());
    let at = Position::new(column, row);

    if regions.input.contains(at) {
        Some(Target::Input)
    } else if regions.priority.contains(at) {
        Some(Target::Priority(priority_at(column - regions.priority.x)))
    } else if regions.add.contains(at) {
        Some(Target::Add)
    } else if regions.new_panel.contains(at) {
        // The panel border
        Some(Target::Input)
    } else if regions.filter.contains(at) {
        let selected = PriorityFilter::ALL
            .iter()
            .position(|f| *f == presenter.filter())
            .unwrap_or(0);
        let line = line_at(Block::bordered().inner(regions.filter), row, selected);
        Some(Target::Filter(line.and_then(|i| PriorityFilter::ALL.get(i).copied())))
    } else if regions.table.contains(at) {
        let inner = Block::bordered().inner(regions.table);
        // The first inner line is the header
        let body = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let line = line_at(body, row, presenter.selected())
            .filter(|i| *i < presenter.visible().len());
        Some(Target::Table(line))
    } else {
        None
    }
}

/// Index of the item drawn on screen row `row` of a list occupying `body`.
fn line_at(body: Rect, row: u16, selected: usize) -> Option<usize> {
    if row < body.y || row >= body.bottom() {
        return None;
    }
    let height = usize::from(body.height);
    let offset = selected.saturating_sub(height - 1);
    Some(offset + usize::from(row - body.y))
}

/// Option under column `x` of the selector, laid out as in [`priority_selector`].
fn priority_at(x: u16) -> Option<TaskPriority> {
    let mut end = 0;
    for priority in TaskPriority::ALL {
        let width = u16::try_from(priority.as_str().len() + 2).unwrap_or(u16::MAX);
        end += width;
        if x < end {
            return Some(priority);
        }
        // Separator
        end += 1;
        if x < end {
            return None;
        }
    }
    None
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let block = Block::bordered().title(title);
    if focused {
        block.border_style(FOCUSED)
    } else {
        block
    }
}

fn render_new_panel<S: TaskStore>(frame: &mut Frame, regions: &Regions, presenter: &Presenter<S>) {
    let focus = presenter.focus();
    frame.render_widget(panel("New", focus.in_new_panel()), regions.new_panel);
    let Regions {
        input,
        priority: selector,
        add: button,
        ..
    } = *regions;

    let draft = presenter.draft();
    let text = if draft.is_empty() {
        Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::new().add_modifier(Modifier::DIM),
        ))
    } else {
        Paragraph::new(draft).wrap(Wrap { trim: false })
    };
    frame.render_widget(text, input);

    if focus == Focus::Input && input.width > 0 {
        let chars = u16::try_from(draft.chars().count()).unwrap_or(u16::MAX);
        let row = (chars / input.width).min(input.height.saturating_sub(1));
        let col = chars % input.width;
        frame.set_cursor_position((input.x + col, input.y + row));
    }

    frame.render_widget(priority_selector(presenter.priority(), focus == Focus::Priority), selector);

    let add_style = if focus == Focus::Add {
        Style::new().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(" Add ", add_style)).centered()),
        button,
    );
}

fn priority_selector(selected: TaskPriority, focused: bool) -> Paragraph<'static> {
    let mut spans = Vec::with_capacity(TaskPriority::ALL.len() * 2);
    for priority in TaskPriority::ALL {
        let style = if priority == selected {
            let base = Style::new().add_modifier(Modifier::REVERSED | Modifier::BOLD);
            if focused { base.fg(Color::Cyan) } else { base }
        } else {
            Style::new()
        };
        spans.push(Span::styled(format!(" {priority} "), style));
        spans.push(Span::raw(" "));
    }
    Paragraph::new(Line::from(spans))
}

fn render_filter<S: TaskStore>(frame: &mut Frame, area: Rect, presenter: &Presenter<S>) {
    let items: Vec<ListItem> = PriorityFilter::ALL
        .iter()
        .map(|f| ListItem::new(f.label()))
        .collect();
    let selected = PriorityFilter::ALL
        .iter()
        .position(|f| *f == presenter.filter());

    let list = List::new(items)
        .block(panel("Filter", presenter.focus() == Focus::Filter))
        .style(Style::new().add_modifier(Modifier::BOLD))
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Done => Style::new().fg(Color::Green),
        TaskStatus::Pending => Style::new().fg(Color::Red),
    }
}

fn render_table<S: TaskStore>(frame: &mut Frame, area: Rect, presenter: &Presenter<S>) {
    let visible = presenter.visible();
    let title = format!(" {} tasks ({}) ", presenter.filter().label(), visible.len());

    let header = Row::new(["Priority", "Task", "Status"])
        .style(Style::new().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|task| {
            Row::new(vec![
                Cell::from(task.priority.as_str()),
                Cell::from(task.description.as_str()),
                Cell::from(task.status.as_str()).style(status_style(task.status)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(10),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&title, presenter.focus() == Focus::Table))
        .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED | Modifier::BOLD))
        .highlight_symbol(">> ");

    let selected = (!visible.is_empty()).then_some(presenter.selected());
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_usage(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = USAGE.iter().map(|l| Line::from(*l)).collect();
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel("Usage details", false))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_status<S: TaskStore>(frame: &mut Frame, area: Rect, presenter: &Presenter<S>) {
    let Some(status) = presenter.status() else {
        return;
    };
    let style = if status.is_error {
        Style::new().fg(Color::Red)
    } else {
        Style::new().fg(Color::Green)
    };
    frame.render_widget(Paragraph::new(Span::styled(status.text.as_str(), style)), area);
}
