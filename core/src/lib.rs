//! Minesweeper game-state engine: lazy mine placement, flood-fill reveal, flagging, and win/loss detection.

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod tile;
mod types;

const fn default_auto_flag_on_win() -> bool {
    true
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    /// How much of the first revealed area is kept free of mines.
    #[serde(default)]
    pub start_tile: StartTile,
    /// Flag every remaining mine once the game is won.
    #[serde(default = "default_auto_flag_on_win")]
    pub auto_flag_on_win: bool,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
            start_tile: StartTile::SimpleSafe,
            auto_flag_on_win: default_auto_flag_on_win(),
        }
    }

    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(width, height, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked(9, 9, 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked(16, 16, 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked(30, 16, 99)
    }

    pub const fn with_start_tile(mut self, start_tile: StartTile) -> Self {
        self.start_tile = start_tile;
        self
    }

    pub const fn with_auto_flag_on_win(mut self, enabled: bool) -> Self {
        self.auto_flag_on_win = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_shape(self.size(), self.mines)
    }

    /// Board size as `(height, width)`.
    pub const fn size(&self) -> Coord2 {
        (self.height, self.width)
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.height, self.width)
    }
}

/// Largest board accepted, about 2048x2048.
pub const MAX_TILES: CellCount = 1 << 22;

fn validate_shape((height, width): Coord2, mines: CellCount) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(GameError::InvalidConfiguration(
            "board dimensions must be positive",
        ));
    }
    if u64::from(width.unsigned_abs()) * u64::from(height.unsigned_abs()) > u64::from(MAX_TILES) {
        return Err(GameError::InvalidConfiguration("board is too large"));
    }
    if mines >= mult(height, width) {
        return Err(GameError::InvalidConfiguration(
            "mine count must be less than the number of tiles",
        ));
    }
    Ok(())
}

/// Dense row-major mine mask, tile `(row, col)` lives at `row * width + col`.
///
/// Serialized as the bare mask, the mine count is recounted and validated on the way back in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<bool>", into = "Array2<bool>")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Caller guarantees the shape was validated.
    pub(crate) fn from_mine_mask_unchecked(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let layout = Self::from_mine_mask_unchecked(mine_mask);
        validate_shape(layout.size(), layout.mine_count)?;
        Ok(layout)
    }

    /// Builds a layout with mines exactly at `mine_coords`, duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        validate_shape(size, 0)?;
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::OutOfBounds(coords));
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        let (height, width) = self.size();
        GameConfig::new_unchecked(width, height, self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    /// Layout size as `(height, width)`.
    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn safe_tile_count(&self) -> CellCount {
        self.total_tiles().saturating_sub(self.mine_count)
    }

    pub fn total_tiles(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl TryFrom<Array2<bool>> for MineLayout {
    type Error = GameError;

    fn try_from(mine_mask: Array2<bool>) -> Result<Self> {
        Self::from_mine_mask(mine_mask)
    }
}

impl From<MineLayout> for Array2<bool> {
    fn from(layout: MineLayout) -> Self {
        layout.mine_mask
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Coordinates whose tile changed during one operation, in the order they changed.
pub type ChangeSet = SmallVec<[Coord2; 8]>;

/// Result of a mutating operation: what happened plus which tiles need redrawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Update<O> {
    pub outcome: O,
    pub changed: ChangeSet,
}

impl<O> Update<O> {
    pub fn new(outcome: O, changed: ChangeSet) -> Self {
        Self { outcome, changed }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl<O: Default> Update<O> {
    pub fn unchanged() -> Self {
        Self::new(O::default(), ChangeSet::new())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkOutcome {
    #[default]
    NoChange,
    Flagged,
    Unflagged,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Flagged => true,
            Self::Unflagged => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RevealOutcome {
    #[default]
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when revealing several tiles at once
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_non_positive_dimensions() {
        assert!(matches!(
            GameConfig::new(0, 5, 1),
            Err(GameError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            GameConfig::new(5, -1, 1),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn config_rejects_mines_filling_the_board() {
        assert!(matches!(
            GameConfig::new(3, 3, 9),
            Err(GameError::InvalidConfiguration(_))
        ));
        assert!(GameConfig::new(3, 3, 8).is_ok());
        assert!(GameConfig::new(3, 3, 0).is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for config in [
            GameConfig::beginner(),
            GameConfig::intermediate(),
            GameConfig::expert(),
        ] {
            assert_eq!(config.validate(), Ok(()));
        }
        assert_eq!(GameConfig::expert().total_tiles(), 480);
    }

    #[test]
    fn config_deserializes_with_policy_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"width": 8, "height": 4, "mines": 5}"#).unwrap();

        assert_eq!(config.size(), (4, 8));
        assert_eq!(config.start_tile, StartTile::SimpleSafe);
        assert!(config.auto_flag_on_win);
    }

    #[test]
    fn layout_counts_mines_and_neighbors() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2), (0, 0)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.safe_tile_count(), 7);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((0, 2)), 0);
        assert!(layout.contains_mine((2, 2)));
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::OutOfBounds((2, 0)))
        );
    }

    #[test]
    fn layout_rejects_full_board() {
        assert!(matches!(
            MineLayout::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn config_rejects_oversized_boards() {
        assert_eq!(
            GameConfig::new(Coord::MAX, 1, 0),
            Err(GameError::InvalidConfiguration("board is too large"))
        );
        assert!(GameConfig::new(2049, 2048, 1).is_err());
        assert!(GameConfig::new(2048, 2048, 1).is_ok());
    }

    #[test]
    fn layout_serializes_as_mask_and_recounts_mines() {
        let layout = MineLayout::from_mine_coords((1, 3), &[(0, 0)]).unwrap();

        let json = serde_json::to_string(&layout).unwrap();
        let restored: MineLayout = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, layout);
        assert_eq!(restored.mine_count(), 1);
        assert_eq!(restored.safe_tile_count(), 2);
    }

    #[test]
    fn layout_deserialization_rejects_full_board() {
        let json = r#"{"v":1,"dim":[1,2],"data":[true,true]}"#;

        assert!(serde_json::from_str::<MineLayout>(json).is_err());
    }

    #[test]
    fn layout_deserialization_rejects_stale_mine_count() {
        let json = r#"{"mine_mask":{"v":1,"dim":[1,2],"data":[false,false]},"mine_count":5}"#;

        assert!(serde_json::from_str::<MineLayout>(json).is_err());
    }

    #[test]
    fn hit_mine_dominates_merged_outcomes() {
        use RevealOutcome::*;
        assert_eq!(Revealed | HitMine, HitMine);
        assert_eq!(Won | Revealed, Won);
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
