use std::collections::HashMap;
use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::sprites::SpriteSet;
use crate::game::{GameState, Position};
use crate::metrics::format_time;

pub const BACKGROUND: Color = Color::Rgb(40, 48, 63);
pub const GRID: Color = Color::Rgb(55, 66, 85);
pub const SNAKE_HEAD: Color = Color::Rgb(20, 200, 80);
pub const SNAKE_BODY: Color = Color::Rgb(40, 220, 120);
pub const FOOD: Color = Color::Rgb(220, 60, 60);
pub const BONUS: Color = Color::Rgb(255, 200, 40);
pub const TEXT: Color = Color::Rgb(230, 230, 230);

/// Terminal columns per grid cell for a given cell size
pub fn cell_width(cell_size: u32) -> usize {
    (cell_size / 10).clamp(1, 3) as usize
}

pub struct Renderer {
    sprites: SpriteSet,
    cell_width: usize,
}

impl Renderer {
    pub fn new(sprites: SpriteSet, cell_size: u32) -> Self {
        Self {
            sprites,
            cell_width: cell_width(cell_size),
        }
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, elapsed: Duration) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, elapsed), chunks[0]);
        let grid_area = chunks[1];
        match self.fitted_cell_width(state, grid_area.width, grid_area.height) {
            Some(width) => frame.render_widget(self.render_grid(state, width), grid_area),
            None => frame.render_widget(too_small(state, grid_area.width, grid_area.height), grid_area),
        }
        frame.render_widget(self.render_controls(), chunks[2]);
    }

    /// Widest cell (up to the configured width) that shows the whole grid inside its border
    ///
    /// `None` when even one column per cell does not fit.
    fn fitted_cell_width(&self, state: &GameState, width: u16, height: u16) -> Option<usize> {
        let inner_width = usize::from(width.saturating_sub(2));
        let inner_height = usize::from(height.saturating_sub(2));
        let columns = (state.grid_width as usize).max(1);
        if inner_height < state.grid_height as usize {
            return None;
        }
        let fitted = self.cell_width.min(inner_width / columns);
        (fitted > 0).then_some(fitted)
    }

    fn render_grid(&self, state: &GameState, width: usize) -> Paragraph<'_> {
        // Distance from the head for every body cell, 0 = head
        let len = state.snake.len();
        let body: HashMap<Position, usize> = state
            .snake
            .segments()
            .enumerate()
            .map(|(i, &pos)| (pos, len - 1 - i))
            .collect();

        let mut lines = Vec::with_capacity(state.grid_height as usize);
        for y in 0..state.grid_height as i32 {
            let mut spans = Vec::with_capacity(state.grid_width as usize);

            for x in 0..state.grid_width as i32 {
                let pos = Position::new(x, y);

                let cell = if let Some(&distance) = body.get(&pos) {
                    if distance == 0 {
                        cell(self.sprites.head, SNAKE_HEAD, width)
                    } else {
                        cell(self.sprites.body, body_color(distance, len), width)
                    }
                } else if pos == state.food {
                    cell(self.sprites.food, FOOD, width)
                } else if state.bonuses.contains(&pos) {
                    cell(self.sprites.bonus, BONUS, width)
                } else {
                    empty_cell(width)
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(GRID))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, elapsed: Duration) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(TEXT).add_modifier(Modifier::BOLD);
        let text = Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value),
            Span::raw("    "),
            Span::styled("Level: ", label),
            Span::styled(state.level.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}/s", state.speed), Style::default().fg(TEXT)),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(format_time(elapsed), Style::default().fg(TEXT)),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(SpriteSet::solid(), 20)
    }
}

fn cell(glyph: Option<char>, color: Color, width: usize) -> Span<'static> {
    match glyph {
        Some(ch) => Span::styled(
            format!("{ch:<width$}"),
            Style::default()
                .fg(color)
                .bg(BACKGROUND)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(" ".repeat(width), Style::default().bg(color)),
    }
}

fn empty_cell(width: usize) -> Span<'static> {
    Span::styled(
        format!("{:<width$}", '·'),
        Style::default().fg(GRID).bg(BACKGROUND),
    )
}

/// Shown instead of a clipped grid
fn too_small(state: &GameState, width: u16, height: u16) -> Paragraph<'static> {
    let need = format!(
        "Terminal too small: the {}x{} grid needs {}x{}, have {}x{}",
        state.grid_width,
        state.grid_height,
        state.grid_width + 2,
        state.grid_height + 4,
        width,
        height + 2,
    );
    Paragraph::new(vec![
        Line::from(Span::styled(need, Style::default().fg(Color::Red))),
        Line::from("Enlarge the window or lower the grid size"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
}

/// Blend from the head colour next to the head to the body colour at the tail
fn body_color(distance: usize, len: usize) -> Color {
    let ratio = distance as f32 / (len.saturating_sub(1)).max(1) as f32;
    let mix = |head: u8, body: u8| -> u8 {
        (head as f32 * (1.0 - ratio) + body as f32 * ratio).round() as u8
    };
    match (SNAKE_HEAD, SNAKE_BODY) {
        (Color::Rgb(hr, hg, hb), Color::Rgb(br, bg, bb)) => {
            Color::Rgb(mix(hr, br), mix(hg, bg), mix(hb, bb))
        }
        _ => SNAKE_BODY,
    }
}
