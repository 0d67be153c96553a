//! Game state: grid, active piece, collision, locking, line clears.

use rand::Rng;
use rand::rngs::StdRng;
use std::collections::VecDeque;

/// The seven classic shapes as row-ordered masks (1 = occupied).
const SHAPES: [&[&[u8]]; 7] = [
    &[&[1, 1, 1, 1]],          // I
    &[&[1, 1, 1], &[0, 1, 0]], // T
    &[&[1, 1, 0], &[0, 1, 1]], // Z
    &[&[0, 1, 1], &[1, 1, 0]], // S
    &[&[1, 1], &[1, 1]],       // O
    &[&[1, 1, 1], &[1, 0, 0]], // L
    &[&[1, 1, 1], &[0, 0, 1]], // J
];

/// Number of colours in the piece palette (indices into `Theme::piece_color`).
pub const PALETTE_COLORS: u8 = 7;

/// Single cell: empty or a locked block with a palette colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Block(u8),
}

/// Occupancy grid. y=0 is the top row; rows are stored `[0..height)`.
/// Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        let rows = (0..h).map(|_| vec![Cell::Empty; w]).collect();
        Self {
            width: w,
            height: h,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        matches!(self.get(x, y), Some(Cell::Block(_)))
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Remove every fully occupied row at once and prepend one empty row per
    /// removal. Surviving rows keep their relative order; the row count never
    /// changes. Returns how many rows were cleared.
    pub fn clear_full_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| row.iter().any(|cell| *cell == Cell::Empty));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        cleared
    }
}

/// Active piece: a row-ordered boolean mask, a palette colour, and the grid
/// coordinate of its bounding box's top-left cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    mask: Vec<Vec<bool>>,
    color: u8,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Draw a shape and a colour, each uniformly at random. The draws are
    /// unrelated, so any shape can appear in any palette colour and
    /// back-to-back repeats are possible.
    pub fn random(x: i32, y: i32, rng: &mut impl Rng) -> Self {
        let shape = SHAPES[rng.gen_range(0..SHAPES.len())];
        let color = rng.gen_range(0..PALETTE_COLORS);
        let mask = shape
            .iter()
            .map(|row| row.iter().map(|&cell| cell != 0).collect())
            .collect();
        Self { mask, color, x, y }
    }

    pub fn mask(&self) -> &[Vec<bool>] {
        &self.mask
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    fn width(&self) -> usize {
        self.mask.first().map_or(0, Vec::len)
    }

    fn height(&self) -> usize {
        self.mask.len()
    }

    /// Grid coordinates of every occupied mask cell at the current anchor.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (px, py) = (self.x, self.y);
        self.mask.iter().enumerate().flat_map(move |(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &occupied)| occupied)
                .map(move |(dx, _)| (px + dx as i32, py + dy as i32))
        })
    }

    /// Rotate the mask 90° clockwise: reverse the row order, then transpose
    /// (`new[i][j] = old[h-1-j][i]`). The reversed-then-transposed order
    /// matters; the other way round gives a mirrored rotation. A fresh mask
    /// with swapped dimensions replaces the old one; the anchor stays put.
    pub fn rotate(&mut self) {
        let h = self.height();
        let w = self.width();
        let mut rotated = vec![vec![false; h]; w];
        for (i, row) in rotated.iter_mut().enumerate() {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = self.mask[h - 1 - j][i];
            }
        }
        self.mask = rotated;
    }
}

/// Whole-game state: the grid, the one active piece, and the terminal flag.
/// Every mutator is a no-op once `game_over` is set.
#[derive(Debug)]
pub struct GameState {
    grid: Grid,
    piece: Piece,
    game_over: bool,
    rng: StdRng,
}

impl GameState {
    pub fn new(columns: u16, rows: u16, mut rng: StdRng) -> Self {
        let grid = Grid::new(columns, rows);
        let piece = Piece::random(spawn_x(columns), 0, &mut rng);
        Self {
            grid,
            piece,
            game_over: false,
            rng,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Would the piece, shifted by `(dx, dy)` from its current anchor, leave
    /// the horizontal bounds, pass the bottom row, or overlap a locked block?
    /// Cells above row 0 are checked against the side walls but not against
    /// grid contents, so a piece may extend above the visible grid without
    /// falsely colliding with the top row. Pure query, no side effects.
    pub fn collides(&self, dx: i32, dy: i32) -> bool {
        let (w, h) = (self.grid.width as i32, self.grid.height as i32);
        self.piece.cells().any(|(x, y)| {
            let (nx, ny) = (x + dx, y + dy);
            nx < 0
                || nx >= w
                || ny >= h
                || (ny >= 0 && self.grid.is_occupied(nx as usize, ny as usize))
        })
    }

    /// Shift the piece horizontally by `dx` columns, or not at all.
    pub fn move_piece(&mut self, dx: i32) {
        if self.game_over {
            return;
        }
        if !self.collides(dx, 0) {
            self.piece.x += dx;
        }
    }

    /// Rotate clockwise in place. If the new orientation doesn't fit, undo it
    /// with three more forward rotations. The piece is never nudged sideways
    /// to make a rotation fit.
    pub fn rotate_piece(&mut self) {
        if self.game_over {
            return;
        }
        self.piece.rotate();
        if self.collides(0, 0) {
            for _ in 0..3 {
                self.piece.rotate();
            }
        }
    }

    /// One gravity step: descend a row, or lock and clear completed lines.
    /// Serves as the timer tick and the soft drop alike.
    pub fn drop_piece(&mut self) {
        if self.game_over {
            return;
        }
        if self.collides(0, 1) {
            self.lock_piece();
            self.grid.clear_full_rows();
        } else {
            self.piece.y += 1;
        }
    }

    /// Fall straight to the lowest free position, then lock and clear. Runs
    /// to completion within the call.
    pub fn hard_drop(&mut self) {
        if self.game_over {
            return;
        }
        while !self.collides(0, 1) {
            self.piece.y += 1;
        }
        self.lock_piece();
        self.grid.clear_full_rows();
    }

    /// Commit the piece's cells into the grid. Locking while still on the
    /// spawn row ends the game; otherwise the next piece is drawn fresh right
    /// away. Cells outside the grid (a piece still poking above row 0) are
    /// dropped rather than written.
    fn lock_piece(&mut self) {
        let color = self.piece.color;
        for (x, y) in self.piece.cells() {
            if x >= 0 && y >= 0 {
                self.grid.set(x as usize, y as usize, Cell::Block(color));
            }
        }
        if self.piece.y <= 0 {
            self.game_over = true;
        } else {
            self.piece = Piece::random(spawn_x(self.grid.width as u16), 0, &mut self.rng);
        }
    }
}

/// Spawn anchor column: horizontally centred on the top row.
fn spawn_x(columns: u16) -> i32 {
    (i32::from(columns) / 2 - 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn mask_from(rows: &[&[u8]]) -> Vec<Vec<bool>> {
        rows.iter()
            .map(|row| row.iter().map(|&cell| cell != 0).collect())
            .collect()
    }

    fn piece_from(rows: &[&[u8]], x: i32, y: i32) -> Piece {
        Piece {
            mask: mask_from(rows),
            color: 2,
            x,
            y,
        }
    }

    fn state_with_piece(columns: u16, rows: u16, piece: Piece) -> GameState {
        let mut state = GameState::new(columns, rows, StdRng::seed_from_u64(7));
        state.piece = piece;
        state
    }

    fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..grid.width() {
            grid.set(x, y, Cell::Block(1));
        }
    }

    fn occupied_cells(grid: &Grid) -> usize {
        (0..grid.height())
            .map(|y| (0..grid.width()).filter(|&x| grid.is_occupied(x, y)).count())
            .sum()
    }

    #[test]
    fn rotation_has_order_four_for_every_shape() {
        for shape in SHAPES {
            let mut piece = piece_from(shape, 0, 0);
            let original = piece.mask.clone();
            for _ in 0..4 {
                piece.rotate();
            }
            assert_eq!(piece.mask, original);
        }
    }

    #[test]
    fn rotation_is_clockwise_not_mirrored() {
        let mut piece = piece_from(&[&[1, 1, 1], &[1, 0, 0]], 0, 0);
        piece.rotate();
        assert_eq!(piece.mask, mask_from(&[&[1, 1], &[0, 1], &[0, 1]]));
    }

    #[test]
    fn rotation_swaps_mask_dimensions_and_keeps_the_anchor() {
        let mut piece = piece_from(&[&[1, 1, 1, 1]], 3, 0);
        piece.rotate();
        assert_eq!((piece.width(), piece.height()), (1, 4));
        assert_eq!((piece.x, piece.y), (3, 0));
    }

    #[test]
    fn four_rotations_through_game_state_restore_the_mask() {
        let piece = piece_from(&[&[1, 1, 1], &[0, 1, 0]], 3, 5);
        let mut state = state_with_piece(10, 20, piece.clone());
        for _ in 0..4 {
            state.rotate_piece();
        }
        assert_eq!(state.piece, piece);
    }

    #[test]
    fn blocked_rotation_reverts_in_place() {
        // Vertical bar against the right wall: the horizontal orientation
        // would cross it, so the rotation must undo completely.
        let piece = piece_from(&[&[1], &[1], &[1], &[1]], 5, 2);
        let mut state = state_with_piece(6, 8, piece.clone());
        state.rotate_piece();
        assert_eq!(state.piece, piece);
    }

    #[test]
    fn collides_is_pure() {
        let mut state = state_with_piece(6, 8, piece_from(&[&[1, 1], &[1, 1]], 2, 3));
        fill_row(&mut state.grid, 7);
        let grid_before = state.grid.clone();
        let piece_before = state.piece.clone();
        assert_eq!(state.collides(0, 1), state.collides(0, 1));
        assert_eq!(state.grid, grid_before);
        assert_eq!(state.piece, piece_before);
    }

    #[test]
    fn move_shifts_fully_or_not_at_all() {
        let mut state = state_with_piece(6, 8, piece_from(&[&[1, 1], &[1, 1]], 2, 3));
        state.move_piece(2);
        assert_eq!((state.piece.x, state.piece.y), (4, 3));
        // Two more columns would cross the right wall.
        state.move_piece(2);
        assert_eq!((state.piece.x, state.piece.y), (4, 3));
        state.move_piece(-4);
        assert_eq!((state.piece.x, state.piece.y), (0, 3));
    }

    #[test]
    fn cells_above_the_grid_skip_occupancy_but_not_walls() {
        let mut state = state_with_piece(6, 8, piece_from(&[&[1, 1], &[1, 1]], 2, -1));
        fill_row(&mut state.grid, 0);
        // The lower half of the piece overlaps the filled top row.
        assert!(state.collides(0, 0));
        // Entirely above the grid: occupancy is exempt, walls are not.
        state.piece = piece_from(&[&[1, 1]], 2, -1);
        assert!(!state.collides(0, 0));
        state.piece = piece_from(&[&[1, 1]], -1, -1);
        assert!(state.collides(0, 0));
    }

    #[test]
    fn gravity_steps_one_row_at_a_time() {
        let mut state = state_with_piece(6, 8, piece_from(&[&[1, 1], &[1, 1]], 2, 0));
        state.drop_piece();
        assert_eq!((state.piece.x, state.piece.y), (2, 1));
    }

    #[test]
    fn clear_full_rows_keeps_row_count_and_survivor_order() {
        let mut grid = Grid::new(4, 6);
        fill_row(&mut grid, 2);
        fill_row(&mut grid, 4);
        grid.set(0, 3, Cell::Block(5));
        grid.set(2, 5, Cell::Block(6));
        assert_eq!(grid.clear_full_rows(), 2);
        assert_eq!((grid.width(), grid.height()), (4, 6));
        // The partial row between the two full ones shifted down by one; the
        // bottom row had no full rows below it and stays where it was.
        assert_eq!(grid.get(0, 4), Some(Cell::Block(5)));
        assert_eq!(grid.get(2, 5), Some(Cell::Block(6)));
        assert_eq!(occupied_cells(&grid), 2);
        for x in 0..4 {
            assert_eq!(grid.get(x, 0), Some(Cell::Empty));
            assert_eq!(grid.get(x, 1), Some(Cell::Empty));
        }
    }

    #[test]
    fn wide_piece_cannot_cross_the_left_wall() {
        let state = state_with_piece(4, 4, piece_from(&[&[1, 1, 1, 1]], 1, 0));
        assert!(state.collides(-2, 0));
        assert!(!state.collides(-1, 0));
    }

    #[test]
    fn filling_the_bottom_gap_clears_exactly_that_row() {
        let mut state = state_with_piece(6, 6, piece_from(&[&[1, 1], &[1, 1]], 2, 0));
        for x in [0, 1, 4, 5] {
            state.grid.set(x, 5, Cell::Block(1));
        }
        state.hard_drop();
        assert_eq!(state.grid.height(), 6);
        // The completed bottom row is gone; only the upper half of the square
        // survives, settled onto the floor.
        for x in 0..6 {
            assert_eq!(state.grid.is_occupied(x, 5), x == 2 || x == 3);
            assert_eq!(state.grid.get(x, 0), Some(Cell::Empty));
        }
        assert_eq!(occupied_cells(&state.grid), 2);
        assert!(!state.is_game_over());
    }

    #[test]
    fn locking_on_the_spawn_row_ends_the_game() {
        let mut state = state_with_piece(5, 4, piece_from(&[&[1, 1, 1, 1]], 0, 0));
        state.grid.set(0, 1, Cell::Block(1));
        let mask_before = state.piece.mask.clone();
        state.drop_piece();
        assert!(state.is_game_over());
        // No replacement piece was drawn.
        assert_eq!(state.piece.mask, mask_before);
        assert!(state.grid.is_occupied(0, 0));
        // Commands after game over leave the state untouched.
        let grid_before = state.grid.clone();
        let piece_before = state.piece.clone();
        state.move_piece(1);
        state.rotate_piece();
        state.drop_piece();
        state.hard_drop();
        assert_eq!(state.grid, grid_before);
        assert_eq!(state.piece, piece_before);
    }

    #[test]
    fn hard_drop_lands_at_the_bottom_of_an_empty_grid() {
        // A height-1 piece ends on the last row (anchor row 19)...
        let mut state = state_with_piece(10, 20, piece_from(&[&[1, 1, 1, 1]], 3, 0));
        state.hard_drop();
        for x in 3..7 {
            assert!(state.grid.is_occupied(x, 19));
        }
        // ...and a height-2 piece one row higher (anchor row 18).
        let mut state = state_with_piece(10, 20, piece_from(&[&[1, 1], &[1, 1]], 4, 0));
        state.hard_drop();
        for y in [18, 19] {
            assert!(state.grid.is_occupied(4, y));
            assert!(state.grid.is_occupied(5, y));
        }
    }

    #[test]
    fn random_pieces_draw_from_the_catalog_and_palette() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            let piece = Piece::random(4, 0, &mut rng);
            assert!(SHAPES.iter().any(|&shape| mask_from(shape) == piece.mask));
            assert!(piece.color < PALETTE_COLORS);
        }
    }

    #[test]
    fn new_game_spawns_at_the_centre_of_the_top_row() {
        let state = GameState::new(10, 20, StdRng::seed_from_u64(1));
        assert_eq!((state.piece.x, state.piece.y), (4, 0));
        assert!(!state.is_game_over());
        assert_eq!(spawn_x(4), 1);
        assert_eq!(spawn_x(1), 0);
    }
}
