use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::rc::Rc;
use std::time::Instant;

use crate::game::{CollisionType, FoodKind, GameOverReport, GameState, Position, Viewport};
use crate::metrics::GameMetrics;

/// Color of every snake segment
pub const SNAKE_COLOR: Color = Color::Green;

/// Terminal columns used by one board cell
const CELL_COLUMNS: u16 = 2;

pub fn food_color(kind: FoodKind) -> Color {
    match kind {
        FoodKind::Growth => Color::Red,
        FoodKind::SpeedBoost => Color::Yellow,
        FoodKind::Invert => Color::Magenta,
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Viewport, in game units, offered by the board area of a frame of this
    /// size. The board is this viewport divided by the cell size.
    pub fn board_viewport(&self, area: Rect, cell_size: u32) -> Viewport {
        let game_area = Self::layout(area)[1];
        let columns = game_area.width.saturating_sub(2) / CELL_COLUMNS;
        let rows = game_area.height.saturating_sub(2);
        Viewport::new(columns as u32 * cell_size, rows as u32 * cell_size)
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        dialog: Option<&GameOverReport>,
        now: Instant,
    ) {
        let chunks = Self::layout(frame.area());

        // Render header with basic stats
        let stats = self.render_stats(state, metrics, now);
        frame.render_widget(stats, chunks[0]);

        let grid = self.render_grid(state);
        frame.render_widget(grid, chunks[1]);

        // Render footer with controls
        let controls = self.render_controls();
        frame.render_widget(controls, chunks[2]);

        if let Some(report) = dialog {
            let popup = centered_rect(46, 8, chunks[1]);
            frame.render_widget(Clear, popup);
            frame.render_widget(self.render_game_over(report), popup);
        }
    }

    fn layout(area: Rect) -> Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(area)
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(state.board.height);

        for y in 0..state.board.height {
            let mut spans = Vec::with_capacity(state.board.width);

            for x in 0..state.board.width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(SNAKE_COLOR)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.is_occupied_by_snake(pos) {
                    Span::styled("■ ", Style::default().fg(SNAKE_COLOR))
                } else if pos == state.food.position {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(food_color(state.food.kind))
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    // Empty cell
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let border_color = if state.paused {
            Color::DarkGray
        } else {
            Color::White
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(border_color))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics, now: Instant) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Length: ", Style::default().fg(Color::Yellow)),
            Span::styled(state.snake.len().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.best_score.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ];

        if let Some(left) = state.speed_timer.remaining(now) {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                format!("BOOST {:.1}s", left.as_secs_f32()),
                Style::default().fg(food_color(FoodKind::SpeedBoost)),
            ));
        }

        if let Some(left) = state.invert_timer.remaining(now) {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                format!("INVERTED {:.1}s", left.as_secs_f32()),
                Style::default().fg(food_color(FoodKind::Invert)),
            ));
        }

        if state.paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, report: &GameOverReport) -> Paragraph<'_> {
        let cause = match report.cause {
            CollisionType::Wall => "You hit the wall",
            CollisionType::SelfCollision => "You bit yourself",
        };

        let text = vec![
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(cause, Style::default().fg(Color::Gray))),
            Line::from(vec![
                Span::styled("Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    report.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  Length: ", Style::default().fg(Color::Yellow)),
                Span::styled(report.length.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to start a new game",
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" to restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

// Rectangle of at most width x height centered in area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
