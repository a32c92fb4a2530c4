use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::calendar::{DayCell, ItemKind};
use crate::model::{format_date, Tone};

use super::app::{AppState, Focus, StatusKind};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_FOCUS: Color = Color::Rgb(180, 156, 92);

const HELP: [(&str, &str); 10] = [
    ("arrows / hjkl", "move the selected day"),
    ("n / p", "next / previous month"),
    ("t", "jump to today"),
    ("tab", "switch between calendar and agenda"),
    ("j / k", "move inside the agenda"),
    ("x", "mark the selected task done"),
    ("r", "reload from the store"),
    ("?", "toggle this help"),
    ("q / esc", "quit"),
    ("ctrl-c", "quit"),
];

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_summary(frame, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);
    render_calendar(frame, app, main[0]);
    render_agenda(frame, app, main[1]);

    render_footer(frame, app, chunks[2]);

    if app.show_help {
        render_help(frame, area);
    }
}

pub(crate) fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Green => Color::Rgb(126, 210, 146),
        Tone::Grey => Color::Rgb(160, 165, 172),
        Tone::Red => COLOR_ERROR,
        Tone::Blue => COLOR_ACCENT,
        Tone::Purple => Color::Rgb(214, 140, 230),
        Tone::Yellow => Color::Rgb(244, 200, 98),
    }
}

fn render_summary(frame: &mut Frame, app: &AppState, area: Rect) {
    let summary = app.summary();
    let metric = |label: &str, value: usize, color: Color| {
        vec![
            Span::styled(format!("{label} "), Style::default().fg(COLOR_MUTED)),
            Span::styled(
                value.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(metric("Total events", summary.total_events, COLOR_TEXT));
    spans.extend(metric("Ongoing", summary.ongoing, tone_color(Tone::Green)));
    spans.extend(metric(
        &format!("Upcoming ({} days)", summary.upcoming_days),
        summary.upcoming,
        COLOR_ACCENT,
    ));
    spans.extend(metric("Overdue tasks", summary.overdue_tasks, COLOR_ERROR));

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(format!(" eventops - {} - today {} ", app.store_label(), format_date(app.today()))),
    );
    frame.render_widget(widget, area);
}

fn render_calendar(frame: &mut Frame, app: &AppState, area: Rect) {
    let grid = match app.grid() {
        Ok(grid) => grid,
        Err(err) => {
            let widget = Paragraph::new(err.to_string())
                .style(Style::default().fg(COLOR_ERROR))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(widget, area);
            return;
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Calendar))
        .title(format!(" {} ", grid.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut rows = vec![Constraint::Length(1)];
    rows.extend(grid.weeks.iter().map(|_| Constraint::Ratio(1, grid.weeks.len() as u32)));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(inner);

    let columns = [Constraint::Ratio(1, 7); 7];
    let header_cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(rows[0]);
    for (name, cell) in DAY_NAMES.iter().zip(header_cells.iter()) {
        let widget = Paragraph::new(Span::styled(
            *name,
            Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(widget, *cell);
    }

    for (week, row) in grid.weeks.iter().zip(rows.iter().skip(1)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(columns)
            .split(*row);
        for (day, cell_area) in week.iter().zip(cells.iter()) {
            render_day(frame, app, day, *cell_area);
        }
    }
}

fn render_day(frame: &mut Frame, app: &AppState, cell: &DayCell, area: Rect) {
    let selected = cell.date == format_date(app.selected);
    let mut header_style = if !cell.in_month {
        Style::default().fg(COLOR_MUTED)
    } else if cell.is_today {
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_TEXT)
    };
    if selected {
        header_style = header_style.add_modifier(Modifier::REVERSED);
    }

    let header = if cell.is_today && cell.in_month {
        format!("{} *", cell.day)
    } else {
        cell.day.to_string()
    };
    let mut lines = vec![Line::from(Span::styled(header, header_style))];
    for item in &cell.items {
        let prefix = match item.kind {
            ItemKind::Event => "",
            ItemKind::Task => "- ",
        };
        lines.push(Line::from(Span::styled(
            format!("{prefix}{}", item.label),
            Style::default().fg(tone_color(item.tone)),
        )));
    }
    if cell.more > 0 {
        lines.push(Line::from(Span::styled(
            format!("+{} more", cell.more),
            Style::default().fg(COLOR_ACCENT),
        )));
    }

    let border = if selected {
        border_style(app.focus == Focus::Calendar)
    } else {
        Style::default().fg(COLOR_MUTED)
    };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT)
            .border_style(border),
    );
    frame.render_widget(widget, area);
}

fn render_agenda(frame: &mut Frame, app: &AppState, area: Rect) {
    let items = app.agenda_items();
    let mut lines = Vec::new();
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing scheduled.",
            Style::default().fg(COLOR_MUTED),
        )));
    }
    for (index, item) in items.iter().enumerate() {
        let kind = match item.kind {
            ItemKind::Event => "event",
            ItemKind::Task => "task ",
        };
        let mut style = Style::default().fg(tone_color(item.tone));
        if index == app.agenda_index && app.focus == Focus::Agenda {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{kind} #{:<4} ", item.id), Style::default().fg(COLOR_MUTED)),
            Span::styled(item.label.clone(), style),
        ]));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::Agenda))
                .title(format!(" Agenda {} ", format_date(app.selected))),
        );
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = match app.status() {
        Some((StatusKind::Error, message)) => {
            Line::from(Span::styled(message.to_string(), Style::default().fg(COLOR_ERROR)))
        }
        Some((StatusKind::Info, message)) => {
            Line::from(Span::styled(message.to_string(), Style::default().fg(COLOR_INFO)))
        }
        None => Line::from(Span::styled(
            "arrows move  n/p month  t today  tab agenda  x done  r reload  ? help  q quit",
            Style::default().fg(COLOR_MUTED),
        )),
    };
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER)),
    );
    frame.render_widget(widget, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = 52_u16.min(area.width);
    let height = (HELP.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:<14}"), Style::default().fg(COLOR_INFO)),
                Span::styled(*action, Style::default().fg(COLOR_TEXT)),
            ])
        })
        .collect();
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BORDER_FOCUS))
                .title(" Keys "),
        ),
        popup,
    );
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(COLOR_BORDER_FOCUS)
    } else {
        Style::default().fg(COLOR_BORDER)
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::context::tests::memory_context;
    use crate::table::tests::MemoryStore;

    fn screen(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    fn memory() -> MemoryStore {
        MemoryStore::default()
            .with_file(
                "data/events.csv",
                "event_id,event_name,location,start_date,end_date,status\n\
                 1,Spring Open,Lisbon,2024-05-15,2024-05-16,Ongoing\n",
            )
            .with_file(
                "data/tasks.csv",
                "task_id,scope,event_id,task_name,due_date,owner,status\n\
                 1,,1,Book hall,2024-05-10,Rui,In progress\n",
            )
    }

    #[test]
    fn draws_month_summary_and_agenda() {
        let memory = memory();
        let app = AppState::new(memory_context(&memory)).unwrap();
        let text = screen(&app);
        assert!(text.contains("May 2024"));
        assert!(text.contains("Overdue tasks 1"));
        assert!(text.contains("15 *"));
        assert!(text.contains("Spring Open"));
        assert!(text.contains("Agenda 2024-05-15"));
    }

    #[test]
    fn help_overlay_lists_keys() {
        let memory = memory();
        let mut app = AppState::new(memory_context(&memory)).unwrap();
        app.show_help = true;
        let text = screen(&app);
        assert!(text.contains("Keys"));
        assert!(text.contains("mark the selected task done"));
    }
}
