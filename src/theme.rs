//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece palette and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours (index 0..=6): cyan, purple, red, green, yellow,
    /// orange, blue.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (sidebar, overlays).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic_default()
    }
}

impl Theme {
    /// Hardcoded classic palette: the seven traditional piece colours on a
    /// dark board.
    pub fn classic_default() -> Self {
        Self {
            pieces: [
                parse_hex("#00FFFF").unwrap(), // I - cyan
                parse_hex("#800080").unwrap(), // T - purple
                parse_hex("#FF0000").unwrap(), // Z - red
                parse_hex("#00FF00").unwrap(), // S - green
                parse_hex("#FFFF00").unwrap(), // O - yellow
                parse_hex("#FFA500").unwrap(), // L - orange
                parse_hex("#0000FF").unwrap(), // J - blue
            ],
            bg: parse_hex("#000000").unwrap(),
            div_line: parse_hex("#3F444F").unwrap(),
            main_fg: parse_hex("#ABB2BF").unwrap(),
            title: parse_hex("#E5C07B").unwrap(),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or
    /// `theme[key]='value'`. Falls back to the classic palette if path is
    /// None or the file is missing/invalid. `palette` selects the colour
    /// variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path.filter(|p| p.exists()) {
            Some(path) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(path)?)),
            None => Self::classic_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override piece colours for high-contrast or colorblind variants.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = [
                    parse_hex("#00FFFF").unwrap(), // cyan
                    parse_hex("#FF00FF").unwrap(), // magenta
                    parse_hex("#FF0000").unwrap(), // red
                    parse_hex("#00FF00").unwrap(), // bright green
                    parse_hex("#FFFF00").unwrap(), // yellow
                    parse_hex("#FF8800").unwrap(), // orange
                    parse_hex("#0088FF").unwrap(), // blue
                ];
            }
            crate::Palette::Colorblind => {
                // Tol bright scheme: distinguishable without relying on
                // red/green separation alone.
                self.pieces = [
                    parse_hex("#66CCEE").unwrap(), // cyan
                    parse_hex("#AA3377").unwrap(), // purple
                    parse_hex("#CC3311").unwrap(), // red
                    parse_hex("#009988").unwrap(), // teal
                    parse_hex("#CCBB44").unwrap(), // yellow
                    parse_hex("#EE7733").unwrap(), // orange
                    parse_hex("#0077BB").unwrap(), // blue
                ];
            }
        }
    }

    /// Start from the classic palette and override each slot a btop key
    /// recolours. Unknown or unparsable values leave the slot at its default.
    fn from_map(map: &HashMap<String, String>) -> Self {
        // btop theme keys per palette slot, first match wins.
        const PIECE_KEYS: [&[&str]; 7] = [
            &["hi_fg"],                // cyan
            &["net_box"],              // purple
            &["cpu_end", "temp_end"],  // red
            &["mem_box", "cpu_start"], // green
            &["cpu_mid"],              // yellow
            &["temp_mid"],             // orange
            &["cpu_box"],              // blue
        ];
        let lookup = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| map.get(*key))
                .find_map(|raw| parse_hex(raw).ok())
        };
        let mut theme = Self::classic_default();
        for (slot, keys) in theme.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(color) = lookup(keys) {
                *slot = color;
            }
        }
        for (slot, key) in [
            (&mut theme.bg, "meter_bg"),
            (&mut theme.div_line, "div_line"),
            (&mut theme.main_fg, "main_fg"),
            (&mut theme.title, "title"),
        ] {
            if let Some(color) = lookup(&[key]) {
                *slot = color;
            }
        }
        theme
    }

    /// Piece colour for a palette index (0..7).
    #[inline]
    pub fn piece_color(&self, index: u8) -> Color {
        self.pieces[(index as usize) % self.pieces.len()]
    }
}

/// Collect `theme[key]="value"` (or `'value'`) lines into a key -> value
/// map. Anything else, comments included, is skipped. Quotes are stripped
/// here so later lookups see bare values.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .filter_map(|line| {
            let body = line.trim().strip_prefix("theme[")?;
            let (key, rest) = body.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color. Shorthand
/// digits are widened (F -> FF).
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(hex.to_string());
    let digits_per_channel = match hex.len() {
        6 => 2,
        3 => 1,
        _ => return Err(invalid()),
    };
    let mut channels = [0u8; 3];
    for (slot, chunk) in channels
        .iter_mut()
        .zip(hex.as_bytes().chunks(digits_per_channel))
    {
        let digits = std::str::from_utf8(chunk).map_err(|_| invalid())?;
        let value = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
        *slot = if digits_per_channel == 1 {
            value * 17
        } else {
            value
        };
    }
    Ok(Color::Rgb(channels[0], channels[1], channels[2]))
}
