//! Layout and drawing: playfield, active piece, sidebar, overlays.

use crate::app::Screen;
use crate::game::{Cell, GameState};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

const SIDEBAR_WIDTH: u16 = 22;

/// Playfield size in terminal cells (border included) for the given grid and
/// cell width.
fn board_pixel_size(state: &GameState, cell_size: u16) -> (u16, u16) {
    let cols = state.grid().width() as u16;
    let rows = state.grid().height() as u16;
    (cols * cell_size + 2, rows + 2)
}

/// Draw the current screen: the board and sidebar, plus the pause or
/// game-over overlay when applicable.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    screen: Screen,
    paused: bool,
    cell_size: u16,
) {
    let area = frame.area();
    draw_game(frame, state, theme, area, cell_size);
    match screen {
        Screen::Playing if paused => draw_pause(frame, theme, area),
        Screen::GameOver => draw_game_over(frame, theme, area),
        Screen::Playing => {}
    }
}

/// Board + sidebar, centred in the available area.
fn draw_game(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, cell_size: u16) {
    let (pw, ph) = board_pixel_size(state, cell_size);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    draw_board(frame, state, theme, inner[0], cell_size);
    draw_sidebar(frame, theme, inner[1]);
}

fn draw_board(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, cell_size: u16) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = state.grid();
    let board = Rect {
        x: inner.x,
        y: inner.y,
        width: (grid.width() as u16 * cell_size).min(inner.width),
        height: (grid.height() as u16).min(inner.height),
    };

    let buf = frame.buffer_mut();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let color = match grid.get(x, y) {
                Some(Cell::Block(index)) => theme.piece_color(index),
                _ => theme.bg,
            };
            paint_cell(buf, board, x as u16, y as u16, cell_size, color);
        }
    }

    let piece = state.piece();
    let color = theme.piece_color(piece.color());
    for (dy, row) in piece.mask().iter().enumerate() {
        for (dx, &occupied) in row.iter().enumerate() {
            if !occupied {
                continue;
            }
            let (x, y) = (piece.x + dx as i32, piece.y + dy as i32);
            if x >= 0 && y >= 0 {
                paint_cell(buf, board, x as u16, y as u16, cell_size, color);
            }
        }
    }
}

/// Paint one grid cell as a `cell_size`-wide solid run, clipped to the board.
fn paint_cell(buf: &mut Buffer, board: Rect, x: u16, y: u16, cell_size: u16, color: Color) {
    let ry = board.y + y;
    if ry >= board.y + board.height {
        return;
    }
    for i in 0..cell_size {
        let rx = board.x + x * cell_size + i;
        if rx < board.x + board.width {
            buf[(rx, ry)]
                .set_symbol(" ")
                .set_style(Style::default().bg(color));
        }
    }
}

fn draw_sidebar(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Controls ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let fg = Style::default().fg(theme.main_fg).bg(theme.bg);
    let lines = vec![
        Line::from(Span::styled(" ←/h →/l   move", fg)),
        Line::from(Span::styled(" ↑/k       rotate", fg)),
        Line::from(Span::styled(" ↓/j       soft drop", fg)),
        Line::from(Span::styled(" ⏎/space   hard drop", fg)),
        Line::from(Span::styled(" p         pause", fg)),
        Line::from(Span::styled(" q         quit", fg)),
    ];
    Paragraph::new(lines).render(inner, frame.buffer_mut());
}

fn draw_pause(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_rect(area, 28, 3);
    let p = Paragraph::new(Line::from(Span::styled(
        " Paused (P to resume) ",
        Style::default().fg(theme.title).bg(theme.bg),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_rect(area, 32, 7);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R  Restart    Q  Quit ",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Blockfall ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    }
}
