use serde::{Deserialize, Serialize};

/// Player-facing state of a tile.
///
/// `Hidden` and `Flagged` toggle between each other, either can become `Revealed`, and `Revealed` is final.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

/// One cell of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    is_mine: bool,
    state: TileState,
    adjacent_mines: u8,
}

impl Tile {
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    pub const fn state(self) -> TileState {
        self.state
    }

    /// Mines among the up to 8 neighbors, meaningful once mines are placed.
    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent_mines
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self.state, TileState::Hidden)
    }

    pub const fn is_unrevealed(self) -> bool {
        matches!(self.state, TileState::Hidden | TileState::Flagged)
    }

    /// What a player may see of this tile, never leaking the mine or count of an unrevealed one.
    pub const fn view(self) -> TileView {
        match (self.state, self.is_mine) {
            (TileState::Hidden, _) => TileView::Hidden,
            (TileState::Flagged, _) => TileView::Flagged,
            (TileState::Revealed, true) => TileView::Mine,
            (TileState::Revealed, false) => TileView::Number(self.adjacent_mines),
        }
    }

    /// Places the mine data, keeping whatever state the player already set.
    pub(crate) fn arm(&mut self, is_mine: bool, adjacent_mines: u8) {
        self.is_mine = is_mine;
        self.adjacent_mines = adjacent_mines;
    }

    pub(crate) fn set_state(&mut self, state: TileState) {
        debug_assert!(
            self.state != TileState::Revealed,
            "revealed tiles never change state"
        );
        self.state = state;
    }
}

/// Read-back value a presentation layer maps to a glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    Hidden,
    Flagged,
    Mine,
    Number(u8),
}

impl TileView {
    // whether the tile is visually closed
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}
