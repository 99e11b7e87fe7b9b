use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Tab, ToastStyle, FILTERS};
use crate::filter::split_highlighted;
use crate::item::{ItemPhase, ItemState};
use crate::list::LoadPhase;
use crate::profile::{ProfileField, ProfileForm};
use crate::task::{Task, TaskPriority, TaskStatus};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3), // filter tabs
            Constraint::Length(3), // search box
            Constraint::Min(0),    // task list / notifications
            Constraint::Length(1), // toast line
            Constraint::Length(1), // bottom bar
        ])
        .split(frame.area());

    draw_filter_tabs(frame, app, chunks[0]);
    draw_search(frame, app, chunks[1]);
    match app.tab {
        Tab::Tasks => draw_list(frame, app, chunks[2]),
        Tab::Notifications => draw_notifications(frame, chunks[2]),
    }
    draw_toast(frame, app, chunks[3]);
    draw_bottom_bar(frame, app, chunks[4]);

    if app.mode == InputMode::Profile {
        draw_profile_modal(frame, &app.profile, frame.area());
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Red,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

fn filter_label(filter: Option<TaskStatus>) -> &'static str {
    match filter {
        None => "All Tasks",
        Some(TaskStatus::Todo) => "To Do Tasks",
        Some(TaskStatus::InProgress) => "In Progress Tasks",
        Some(TaskStatus::Done) => "Completed Tasks",
    }
}

fn empty_state(filter: Option<TaskStatus>) -> (&'static str, &'static str) {
    match filter {
        None => ("No tasks yet", "Create your first task to get started"),
        Some(TaskStatus::Todo) => ("No pending tasks", "All caught up! Great work."),
        Some(TaskStatus::InProgress) => ("No active tasks", "Start working on a task to see it here"),
        Some(TaskStatus::Done) => (
            "No completed tasks",
            "Complete some tasks to see your achievements",
        ),
    }
}

fn draw_filter_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = FILTERS
        .iter()
        .map(|f| Line::from(f.map_or("ALL", |s| s.as_str()).to_uppercase()))
        .collect();
    let selected = FILTERS
        .iter()
        .position(|f| *f == app.status_filter)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title("Task Tracker")
                .borders(Borders::ALL),
        );
    frame.render_widget(tabs, area);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(app.search.clone())];
    if app.mode == InputMode::Search {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    if !app.search.trim().is_empty() {
        let count = app.visible_tasks().len();
        let summary = if count == 1 {
            format!("  — found 1 task matching \"{}\"", app.search.trim())
        } else {
            format!("  — found {} tasks matching \"{}\"", count, app.search.trim())
        };
        spans.push(Span::styled(summary, Style::default().fg(Color::Blue)));
    }
    let border = if app.mode == InputMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("Search (/)")
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(search, area);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.visible_tasks();
    let mut title = format!("{} ({})", filter_label(app.status_filter), visible.len());
    match app.list.phase() {
        LoadPhase::Loading => title.push_str(" — loading…"),
        LoadPhase::Refreshing => title.push_str(" — refreshing…"),
        _ => {}
    }
    let block = Block::default().title(title).borders(Borders::ALL);

    match app.list.phase() {
        LoadPhase::Loading => {
            let body = Paragraph::new("Loading tasks…")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(body, area);
        }
        LoadPhase::Error(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Oops! Something went wrong",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    "press r to try again",
                    Style::default().fg(Color::Blue),
                )),
            ];
            let body = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(body, area);
        }
        LoadPhase::Loaded | LoadPhase::Refreshing if visible.is_empty() => {
            let (title, subtitle) = empty_state(app.status_filter);
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(subtitle),
            ];
            if !app.search.trim().is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Try adjusting your search or filter criteria",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            let body = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(body, area);
        }
        LoadPhase::Loaded | LoadPhase::Refreshing => {
            let items: Vec<ListItem> = visible
                .iter()
                .map(|task| task_row(task, app.items.get(task.id), &app.search))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(app.selected));
            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}

/// One task as a list row, plus detail lines when expanded.
fn task_row<'a>(task: &'a Task, state: ItemState, query: &str) -> ListItem<'a> {
    let mut spans = vec![
        Span::styled(
            task.status.as_str(),
            Style::default()
                .fg(status_color(task.status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - "),
    ];
    spans.extend(emphasized(&task.description, query));

    if task.priority == Some(TaskPriority::High) {
        spans.push(Span::styled(" !high", Style::default().fg(Color::Magenta)));
    }
    if let Some(due) = &task.due_date {
        let style = if task.is_overdue() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" (due {due})"), style));
    }
    match state.phase {
        ItemPhase::Updating => spans.push(Span::styled(
            " [updating…]",
            Style::default().fg(Color::DarkGray),
        )),
        ItemPhase::Deleting => spans.push(Span::styled(
            " [deleting…]",
            Style::default().fg(Color::DarkGray),
        )),
        ItemPhase::Idle => {}
    }
    if state.delete_confirm_pending {
        spans.push(Span::styled(
            "  delete? press d again (esc cancels)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if state.details_expanded {
        if let Some(title) = &task.title {
            lines.push(detail_line("title", emphasized(title, query)));
        }
        if !task.tags.is_empty() {
            let mut tag_spans = Vec::new();
            for (i, tag) in task.tags.iter().enumerate() {
                if i > 0 {
                    tag_spans.push(Span::raw(", "));
                }
                tag_spans.extend(emphasized(tag, query));
            }
            lines.push(detail_line("tags", tag_spans));
        }
        if let Some(assignee) = &task.assignee {
            lines.push(detail_line("assignee", vec![Span::raw(assignee.as_str())]));
        }
        if let Some(notes) = &task.notes {
            lines.push(detail_line("notes", vec![Span::raw(notes.as_str())]));
        }
        if let Some(created) = &task.created_at {
            lines.push(detail_line("created", vec![Span::raw(created.as_str())]));
        }
    }
    ListItem::new(lines)
}

fn detail_line<'a>(label: &'static str, value: Vec<Span<'a>>) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!("    {label}: "),
        Style::default().fg(Color::DarkGray),
    )];
    spans.extend(value);
    Line::from(spans)
}

/// Text with query matches emphasized; presentation only.
fn emphasized<'a>(text: &'a str, query: &str) -> Vec<Span<'a>> {
    split_highlighted(text, query)
        .into_iter()
        .map(|(segment, hit)| {
            if hit {
                Span::styled(segment, Style::default().bg(Color::Yellow).fg(Color::Black))
            } else {
                Span::raw(segment)
            }
        })
        .collect()
}

fn draw_notifications(frame: &mut Frame, area: Rect) {
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No notifications yet",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().title("Notifications").borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn draw_toast(frame: &mut Frame, app: &App, area: Rect) {
    let line = match (&app.toast, app.mode) {
        (Some((message, style)), _) => {
            let color = match style {
                ToastStyle::Success => Color::Green,
                ToastStyle::Error => Color::Red,
            };
            Line::from(Span::styled(message.clone(), Style::default().fg(color)))
        }
        (None, InputMode::NewTask) => Line::from(vec![
            Span::styled("New task: ", Style::default().fg(Color::Blue)),
            Span::raw(app.new_task_input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled("  (enter adds, esc cancels)", Style::default().fg(Color::DarkGray)),
        ]),
        (None, _) => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let tab_style = |active: bool| {
        if active {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let line = Line::from(vec![
        Span::styled(" Tasks ", tab_style(app.tab == Tab::Tasks)),
        Span::styled(" Notifications ", tab_style(app.tab == Tab::Notifications)),
        Span::styled(" Profile(p) ", tab_style(app.mode == InputMode::Profile)),
        Span::styled(
            "  a:add  /:search  ←→:filter  enter:next  d:delete  space:details  r:refresh  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_profile_modal(frame: &mut Frame, form: &ProfileForm, screen: Rect) {
    let area = centered_rect(60, 16, screen);
    frame.render_widget(Clear, area);

    let focused = |field: ProfileField| {
        if form.field == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let country = form.country();

    let mut lines = vec![
        Line::from(Span::styled(
            "Complete your profile information",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Full Name *      ", focused(ProfileField::Name)),
            Span::raw(form.name.clone()),
        ]),
    ];
    if let Some(error) = &form.name_error {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("Country          ", focused(ProfileField::Country)),
        Span::raw(format!("{} {}", country.code, country.name)),
        Span::styled(
            format!("  ({} digits, ←→ changes)", country.digits),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("WhatsApp Number *", focused(ProfileField::Phone)),
        Span::raw(" "),
        Span::raw(form.display_phone()),
    ]));
    if let Some(error) = &form.phone_error {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(Color::Yellow),
        )));
    } else if form.saved {
        lines.push(Line::from(Span::styled(
            "Profile saved successfully!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    } else if let Some(error) = &form.submit_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "tab:next field  enter:save  esc:close",
        Style::default().fg(Color::DarkGray),
    )));

    let modal = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Profile Setup")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(modal, area);
}

fn centered_rect(width: u16, height: u16, screen: Rect) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    }
}
