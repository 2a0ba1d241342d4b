//! Trainer screen: settings form, results table, score chart and dialogs

use std::path::Path;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row,
        Table, TableState, Wrap,
    },
};

use super::renderer::{BONUS, FOOD, SNAKE_BODY, TEXT};
use crate::game::{ConfigField, GameConfig};
use crate::metrics::GameMetrics;
use crate::results::{ResultRecord, ScoreSeries};

const SETTINGS_WIDTH: u16 = 36;
const CHART_TIME_FORMAT: &str = "%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Dismissable message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Error, title, message)
    }

    fn with_level(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    fn color(&self) -> Color {
        match self.level {
            NoticeLevel::Info => SNAKE_BODY,
            NoticeLevel::Warning => BONUS,
            NoticeLevel::Error => FOOD,
        }
    }
}

/// Modal layer drawn over the trainer screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Notice(Notice),
    ConfirmClear,
    ExportPrompt(String),
}

pub struct TrainerView<'a> {
    pub config: &'a GameConfig,
    pub selected: ConfigField,
    pub records: &'a [ResultRecord],
    pub series: Option<&'a ScoreSeries>,
    pub metrics: &'a GameMetrics,
    pub overlay: &'a Overlay,
    pub results_path: &'a Path,
}

impl TrainerView<'_> {
    pub fn render(&self, frame: &mut Frame, table_state: &mut TableState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "Snake Trainer",
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", self.results_path.display()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(title, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SETTINGS_WIDTH), Constraint::Min(0)])
            .split(rows[1]);

        frame.render_widget(self.render_settings(), columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(columns[1]);

        frame.render_stateful_widget(render_table(self.records), right[0], table_state);
        match self.series {
            Some(series) if !series.is_empty() => {
                frame.render_widget(render_chart(series), right[1]);
            }
            Some(_) => frame.render_widget(empty_chart("No data: play at least one game"), right[1]),
            None => frame.render_widget(empty_chart("Press G to plot score over time"), right[1]),
        }

        frame.render_widget(
            Paragraph::new(self.metrics.format_summary())
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center),
            rows[2],
        );

        self.render_overlay(frame);
    }

    fn render_settings(&self) -> Paragraph<'_> {
        let mut lines = vec![Line::from(Span::styled(
            "Game settings",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))];
        lines.push(Line::from(""));

        for field in ConfigField::ALL {
            let selected = field == self.selected;
            let range = field.range();
            let marker = if selected { "▶ " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{:<16}", field.label()), style),
                Span::styled(format!("{:>3}", field.get(self.config)), style),
                Span::styled(
                    format!("  {}-{}", range.start(), range.end()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        lines.push(Line::from(""));
        for (key, action) in [
            ("Enter", "Start game"),
            ("G", "Show graph"),
            ("E", "Export CSV..."),
            ("C", "Clear results"),
            ("Q", "Quit"),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:>6} "), Style::default().fg(Color::Cyan)),
                Span::raw(action),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↑↓ select  ←→ adjust",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Settings "),
        )
    }

    fn render_overlay(&self, frame: &mut Frame) {
        let (title, color, lines) = match self.overlay {
            Overlay::None => return,
            Overlay::Notice(notice) => (
                notice.title.clone(),
                notice.color(),
                notice
                    .message
                    .lines()
                    .map(|l| Line::from(l.to_string()))
                    .chain([Line::from(""), hint("Enter/Esc to close")])
                    .collect::<Vec<_>>(),
            ),
            Overlay::ConfirmClear => (
                "Clear results".to_string(),
                BONUS,
                vec![
                    Line::from("Delete all results?"),
                    Line::from(""),
                    hint("y to confirm, any other key cancels"),
                ],
            ),
            Overlay::ExportPrompt(input) => (
                "Export CSV".to_string(),
                Color::Cyan,
                vec![
                    Line::from("Destination path:"),
                    Line::from(Span::styled(
                        format!("{input}▏"),
                        Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    hint("Enter to export, Esc to cancel"),
                ],
            ),
        };

        let height = lines.len() as u16 + 2;
        let area = popup_area(frame.area(), 56, height);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color))
                        .title(format!(" {title} ")),
                ),
            area,
        );
    }
}

/// One row per record, in store order
pub fn render_table(records: &[ResultRecord]) -> Table<'static> {
    let header = Row::new(["Date/Time", "Score", "Time (s)", "Level"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = records.iter().map(|record| {
        Row::new([
            Cell::from(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::from(record.score.to_string()),
            Cell::from(format!("{:.2}", record.duration_seconds)),
            Cell::from(record.level.to_string()),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().fg(Color::Cyan))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" Results ({}) ", records.len())),
    )
}

/// Score over time as a line with point markers
pub fn render_chart(series: &ScoreSeries) -> Chart<'_> {
    let datasets = vec![
        Dataset::default()
            .name("score")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SNAKE_BODY))
            .data(series.points()),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(BONUS))
            .data(series.points()),
    ];

    let time_label = |ts: Option<chrono::NaiveDateTime>| {
        Span::raw(
            ts.map(|t| t.format(CHART_TIME_FORMAT).to_string())
                .unwrap_or_default(),
        )
    };
    let [_, y_max] = series.y_bounds();

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Score over time "),
        )
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(Color::Gray))
                .bounds(series.x_bounds())
                .labels(vec![
                    time_label(series.first_timestamp()),
                    time_label(series.last_timestamp()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Score")
                .style(Style::default().fg(Color::Gray))
                .bounds(series.y_bounds())
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{}", y_max as u32)),
                ]),
        )
}

fn empty_chart(message: &str) -> Paragraph<'_> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(BONUS))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Score over time "),
    )
}

fn hint(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use std::time::Duration;

    fn record(minute: u32, score: u32) -> ResultRecord {
        let ts = NaiveDate::from_ymd_opt(2025, 4, 3)
            .unwrap()
            .and_hms_opt(18, minute, 0)
            .unwrap();
        ResultRecord::new(ts, score, Duration::from_millis(12_500), 2)
    }

    fn draw(records: &[ResultRecord], series: Option<&ScoreSeries>, overlay: &Overlay) -> String {
        let config = GameConfig::default();
        let metrics = GameMetrics::from_records(records);
        let path = PathBuf::from("results.csv");
        let view = TrainerView {
            config: &config,
            selected: ConfigField::Rows,
            records,
            series,
            metrics: &metrics,
            overlay,
            results_path: &path,
        };

        let mut terminal = Terminal::new(TestBackend::new(110, 34)).unwrap();
        let mut table_state = TableState::default();
        terminal
            .draw(|frame| view.render(frame, &mut table_state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_table_lists_records() {
        let records = vec![record(1, 3), record(2, 8)];
        let text = draw(&records, None, &Overlay::None);

        assert!(text.contains("Results (2)"));
        assert!(text.contains("2025-04-03 18:01:00"));
        assert!(text.contains("12.50"));
        assert!(text.contains("Press G to plot"));
    }

    #[test]
    fn test_empty_chart_warning() {
        let series = ScoreSeries::from_records(&[]);
        let text = draw(&[], Some(&series), &Overlay::None);
        assert!(text.contains("No data"));
    }

    #[test]
    fn test_chart_with_points() {
        let records = vec![record(1, 3), record(9, 8)];
        let series = ScoreSeries::from_records(&records);
        let text = draw(&records, Some(&series), &Overlay::None);
        assert!(text.contains("Score over time"));
        assert!(text.contains("04-03 18:09"));
    }

    #[test]
    fn test_overlays() {
        let text = draw(&[], None, &Overlay::ConfirmClear);
        assert!(text.contains("Delete all results?"));

        let text = draw(&[], None, &Overlay::ExportPrompt("out.csv".into()));
        assert!(text.contains("out.csv"));

        let notice = Overlay::Notice(Notice::error("Export failed", "permission denied"));
        let text = draw(&[], None, &notice);
        assert!(text.contains("Export failed"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn test_settings_show_values() {
        let text = draw(&[], None, &Overlay::None);
        assert!(text.contains("▶ Rows"));
        assert!(text.contains("Cell size (px)"));
    }
}
