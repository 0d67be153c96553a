//! Blockfall — classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Options derived from the CLI: grid size, render scale, timer and RNG.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub columns: u16,
    pub rows: u16,
    pub cell_size: u16,
    pub tick_rate: f64,
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        columns: args.columns,
        rows: args.rows,
        cell_size: args.cell_size,
        tick_rate: args.tick_rate,
        seed: args.seed,
    };
    let mut app = App::new(config, theme)?;
    app.run()
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Stack the falling pieces and clear full rows.",
    long_about = "Blockfall is a terminal rendition of the classic falling-block puzzle.\n\n\
        Pieces fall on a fixed timer; steer and rotate them so completed rows clear. The game \
        ends when a piece locks at the top of the board.\n\n\
        CONTROLS (normal):\n  Left/Right  Move       Up     Rotate     Down   Soft drop\n  Enter/Space Hard drop  P      Pause      Q/Esc  Quit\n\n\
        CONTROLS (vim):\n  h/l         Move       k      Rotate     j      Soft drop\n\n\
        Hold a movement key to keep the piece moving. Use --theme to load a btop-style theme \
        (e.g. onedark.theme)."
)]
pub struct Args {
    /// Playfield width in columns (grid cells).
    #[arg(long, default_value = "10", value_name = "COLS",
          value_parser = clap::value_parser!(u16).range(4..=80))]
    pub columns: u16,

    /// Playfield height in rows (grid cells).
    #[arg(long, default_value = "20", value_name = "ROWS",
          value_parser = clap::value_parser!(u16).range(4..=200))]
    pub rows: u16,

    /// Rendered cell width in terminal columns. Presentation only; game logic
    /// never sees it.
    #[arg(long, default_value = "2", value_name = "N",
          value_parser = clap::value_parser!(u16).range(1..=4))]
    pub cell_size: u16,

    /// Gravity steps per second.
    #[arg(long, default_value = "1.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// RNG seed for a reproducible piece sequence.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the classic
    /// palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
