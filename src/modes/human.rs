use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep_until};

use crate::game::{GameEngine, GameHooks, GameOverReport};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Presentation side of the engine callbacks.
///
/// The game-over message is modal: while it is open no ticks are delivered,
/// which is what makes it blocking from the engine's point of view.
#[derive(Debug, Default)]
struct Presenter {
    ticking: bool,
    restart_ticks: bool,
    dialog: Option<GameOverReport>,
}

impl Presenter {
    fn ticks_enabled(&self) -> bool {
        self.ticking && self.dialog.is_none()
    }
}

impl GameHooks for Presenter {
    fn start_ticks(&mut self) {
        self.ticking = true;
        self.restart_ticks = true;
    }

    fn stop_ticks(&mut self) {
        self.ticking = false;
    }

    fn game_over(&mut self, report: &GameOverReport) {
        self.dialog = Some(*report);
    }
}

pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    presenter: Presenter,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            presenter: Presenter::default(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        if let Err(err) = self.cleanup_terminal(&mut terminal) {
            warn!("terminal cleanup failed: {err:#}");
            if result.is_ok() {
                return Err(err);
            }
        }

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        self.fit_board(terminal)?;
        self.reset_game();

        let mut tick_timer = interval(self.engine.config().tick_interval());

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            if self.presenter.restart_ticks {
                self.presenter.restart_ticks = false;
                tick_timer.reset();
            }

            let expiry = self.engine.next_deadline();
            let wake_at = tokio::time::Instant::from_std(expiry.unwrap_or_else(Instant::now));

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if self.presenter.ticks_enabled() {
                        self.update_game();
                    }
                }

                // Speed boost / inverted controls running out
                _ = sleep_until(wake_at), if expiry.is_some() => {
                    self.engine.expire_modifiers(Instant::now());
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.fit_board(terminal)?;
                    self.metrics.update();
                    let now = Instant::now();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            self.engine.state(),
                            &self.metrics,
                            self.presenter.dialog.as_ref(),
                            now,
                        );
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("quitting after {} games", self.metrics.games_played);
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };

        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return;
        }

        let action = self.input_handler.handle_key_event(key);

        if self.presenter.dialog.is_some() {
            match action {
                KeyAction::Quit => self.should_quit = true,
                _ => self.dismiss_dialog(),
            }
            return;
        }

        match action {
            KeyAction::GameAction(action) => {
                self.engine.on_input(action);
            }
            KeyAction::Restart => {
                self.reset_game();
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        let result = self.engine.on_tick(Instant::now(), &mut self.presenter);

        // Track game over
        if let Some(report) = result.game_over {
            self.metrics.on_game_over(&report);
        }
    }

    fn reset_game(&mut self) {
        self.engine.start_new_game(&mut self.presenter);
        self.metrics.on_game_start();
    }

    fn dismiss_dialog(&mut self) {
        self.presenter.dialog = None;
        self.presenter.restart_ticks = true;
        self.metrics.on_game_start();
    }

    // The board follows the terminal size unless the viewport is pinned
    fn fit_board(&mut self, terminal: &Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        if !self.engine.config().fit_to_terminal {
            return Ok(());
        }

        let size = terminal.size().context("Failed to read terminal size")?;
        let area = Rect::new(0, 0, size.width, size.height);
        let viewport = self
            .renderer
            .board_viewport(area, self.engine.config().cell_size);
        self.engine.set_viewport(viewport);
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
