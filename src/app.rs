//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::game::GameState;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// DAS (Delayed Auto-Shift): delay before movement starts repeating when you
/// hold a key.
const REPEAT_DELAY_MS: u64 = 170;
/// ARR (Auto-Repeat Rate): time between repeated moves while holding.
const REPEAT_INTERVAL_MS: u64 = 50;
/// Event-poll budget per render frame.
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    last_tick: Instant,
    tick_interval: Duration,
    repeat_state: Option<(Action, Instant)>,
    last_repeat_fire: Option<Instant>,
}

fn new_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(config.columns, config.rows, new_rng(config.seed));
        let tick_interval = Duration::from_secs_f64(1.0 / config.tick_rate.max(0.1));
        Ok(Self {
            config,
            theme,
            state,
            screen: Screen::Playing,
            paused: false,
            last_tick: Instant::now(),
            tick_interval,
            repeat_state: None,
            last_repeat_fire: None,
        })
    }

    fn reset_game(&mut self) {
        self.state = GameState::new(
            self.config.columns,
            self.config.rows,
            new_rng(self.config.seed),
        );
        self.screen = Screen::Playing;
        self.paused = false;
        self.last_tick = Instant::now();
        self.repeat_state = None;
        self.last_repeat_fire = None;
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.state.move_piece(-1),
            Action::MoveRight => self.state.move_piece(1),
            Action::Rotate => self.state.rotate_piece(),
            Action::SoftDrop => self.state.drop_piece(),
            Action::HardDrop => {
                self.state.hard_drop();
                self.repeat_state = None;
                self.last_repeat_fire = None;
            }
            Action::Pause | Action::Quit | Action::None => {}
        }
    }

    fn tick_repeat(&mut self) {
        let now = Instant::now();
        let (action, first) = match self.repeat_state {
            Some(s) => s,
            None => return,
        };
        if !matches!(
            action,
            Action::MoveLeft | Action::MoveRight | Action::SoftDrop
        ) {
            return;
        }
        if first.elapsed() < Duration::from_millis(REPEAT_DELAY_MS) {
            return;
        }
        let next =
            self.last_repeat_fire.unwrap_or(first) + Duration::from_millis(REPEAT_INTERVAL_MS);
        if now >= next {
            self.apply_action(action);
            self.last_repeat_fire = Some(now);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
                PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Enhanced keyboard reporting for key Release events; not every
        // terminal supports it, so failure is non-fatal.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    self.screen,
                    self.paused,
                    self.config.cell_size,
                )
            })?;

            if event::poll(Duration::from_millis(FRAME_MS))? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        let action = key_to_action(key);

                        // Only the first Press starts a repeat; Release stops
                        // it. OS auto-repeat presses for the same action are
                        // ignored in favour of our own DAS/ARR timing.
                        if key.kind != KeyEventKind::Press {
                            if key.kind == KeyEventKind::Release
                                && self.repeat_state.map(|(a, _)| a) == Some(action)
                            {
                                self.repeat_state = None;
                                self.last_repeat_fire = None;
                            }
                            continue;
                        }
                        if self.repeat_state.map(|(a, _)| a) == Some(action) {
                            continue;
                        }

                        match self.screen {
                            Screen::Playing => {
                                if action == Action::Quit {
                                    return Ok(());
                                }
                                if action == Action::Pause {
                                    self.paused = !self.paused;
                                    continue;
                                }
                                if self.paused {
                                    continue;
                                }
                                self.apply_action(action);
                                if matches!(
                                    action,
                                    Action::MoveLeft | Action::MoveRight | Action::SoftDrop
                                ) {
                                    self.repeat_state = Some((action, Instant::now()));
                                    self.last_repeat_fire = None;
                                }
                            }
                            Screen::GameOver => {
                                if action == Action::Quit {
                                    return Ok(());
                                }
                                if matches!(key.code, KeyCode::Char('r' | 'R')) {
                                    self.reset_game();
                                }
                            }
                        }
                    }
                }
            }

            if self.screen == Screen::Playing && !self.paused {
                self.tick_repeat();
                // Gravity runs only while the game is live; after that the
                // timer stops and the game-over screen takes over.
                if !self.state.is_game_over() && self.last_tick.elapsed() >= self.tick_interval {
                    self.last_tick = Instant::now();
                    self.state.drop_piece();
                }
                if self.state.is_game_over() {
                    self.screen = Screen::GameOver;
                    self.repeat_state = None;
                    self.last_repeat_fire = None;
                }
            }
        }
    }
}
