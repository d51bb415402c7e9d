use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    /// Indicates the game has ended and no moves change the board anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game session: the tile grid plus the bookkeeping needed to answer [`Board::status`] in constant time.
///
/// Mines are placed lazily on the first reveal so the opening move is always safe. Operations on flagged, revealed, or
/// finished tiles are silent no-ops; only out-of-bounds coordinates are errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardSnapshot")]
pub struct Board {
    config: GameConfig,
    seed: u64,
    tiles: Array2<Tile>,
    mines_placed: bool,
    revealed_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
}

/// Serialized form of a [`Board`] as read back; counters are rebuilt from the tiles.
#[derive(Deserialize)]
struct BoardSnapshot {
    config: GameConfig,
    seed: u64,
    tiles: Array2<Tile>,
    mines_placed: bool,
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = GameError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self> {
        let BoardSnapshot {
            config,
            seed,
            tiles,
            mines_placed,
        } = snapshot;
        config.validate()?;

        let (height, width) = config.size();
        if tiles.dim() != (height as usize, width as usize) {
            return Err(GameError::InvalidConfiguration(
                "tile grid does not match the board size",
            ));
        }

        let layout = MineLayout::from_mine_mask(tiles.map(|tile| tile.is_mine()))?;
        let expected_mines = if mines_placed { config.mines } else { 0 };
        if layout.mine_count() != expected_mines {
            return Err(GameError::InvalidConfiguration(
                "mine count does not match the tiles",
            ));
        }

        let mut revealed_count = 0;
        let mut flagged_count = 0;
        let mut triggered_mine = None;
        for ((row, col), tile) in tiles.indexed_iter() {
            let coords = (row as Coord, col as Coord);
            if tile.adjacent_mines() != layout.adjacent_mine_count(coords) {
                return Err(GameError::InvalidConfiguration(
                    "adjacent mine counts do not match the mines",
                ));
            }
            match (tile.state(), tile.is_mine()) {
                (TileState::Revealed, true) if triggered_mine.is_none() => {
                    triggered_mine = Some(coords)
                }
                (TileState::Revealed, true) => {
                    return Err(GameError::InvalidConfiguration(
                        "more than one mine is revealed",
                    ));
                }
                (TileState::Revealed, false) => revealed_count += 1,
                (TileState::Flagged, _) => flagged_count += 1,
                (TileState::Hidden, _) => {}
            }
        }

        if !mines_placed && revealed_count > 0 {
            return Err(GameError::InvalidConfiguration(
                "tiles are revealed before mines were placed",
            ));
        }

        Ok(Self {
            config,
            seed,
            tiles,
            mines_placed,
            revealed_count,
            flagged_count,
            triggered_mine,
        })
    }
}

impl Board {
    /// New board with a random seed, no mines are placed until the first reveal.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Same as [`Board::new`], mine placement is reproducible for a given seed and first move.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            seed,
            tiles: Array2::default(config.size().to_nd_index()),
            mines_placed: false,
            revealed_count: 0,
            flagged_count: 0,
            triggered_mine: None,
        })
    }

    /// Board with mines already in place, the first reveal gets no protection.
    pub fn from_layout(layout: MineLayout) -> Self {
        let mut board = Self {
            config: layout.game_config(),
            seed: 0,
            tiles: Array2::default(layout.size().to_nd_index()),
            mines_placed: false,
            revealed_count: 0,
            flagged_count: 0,
            triggered_mine: None,
        };
        board.arm(&layout);
        board
    }

    pub fn with_auto_flag_on_win(mut self, enabled: bool) -> Self {
        self.config.auto_flag_on_win = enabled;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current status, derived from the board rather than stored.
    pub fn status(&self) -> GameStatus {
        if self.triggered_mine.is_some() {
            GameStatus::Lost
        } else if self.revealed_count == self.safe_tile_count() {
            GameStatus::Won
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_finished()
    }

    /// Board size as `(height, width)`.
    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn width(&self) -> Coord {
        self.config.width
    }

    pub fn height(&self) -> Coord {
        self.config.height
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// How many mines have not been flagged yet, negative when there are more flags than mines
    pub fn mines_left(&self) -> i64 {
        i64::from(self.config.mines) - i64::from(self.flagged_count)
    }

    pub fn flag_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Revealed safe tiles, a revealed mine is not counted.
    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn tile(&self, coords: Coord2) -> Result<Tile> {
        let coords = self.validate_coords(coords)?;
        Ok(self.tiles[coords.to_nd_index()])
    }

    pub fn view(&self, coords: Coord2) -> Result<TileView> {
        self.tile(coords).map(Tile::view)
    }

    /// Every tile's view in row-major order, matching a flat grid of widgets.
    pub fn iter_views(&self) -> impl Iterator<Item = (Coord2, TileView)> + '_ {
        self.tiles
            .indexed_iter()
            .map(|((row, col), tile)| ((row as Coord, col as Coord), tile.view()))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    /// Flip a tile between hidden and flagged.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Update<MarkOutcome>> {
        let coords = self.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(Update::unchanged());
        }

        let outcome = match self.tiles[coords.to_nd_index()].state() {
            TileState::Hidden => {
                self.set_state(coords, TileState::Flagged);
                self.flagged_count += 1;
                MarkOutcome::Flagged
            }
            TileState::Flagged => {
                self.set_state(coords, TileState::Hidden);
                self.flagged_count -= 1;
                MarkOutcome::Unflagged
            }
            TileState::Revealed => return Ok(Update::unchanged()),
        };
        Ok(Update::new(outcome, ChangeSet::from_slice(&[coords])))
    }

    /// Flag every hidden neighbor of a revealed number when they can only be mines.
    pub fn chord_flag(&mut self, coords: Coord2) -> Result<Update<MarkOutcome>> {
        let coords = self.validate_coords(coords)?;
        let tile = self.tiles[coords.to_nd_index()];
        if self.is_finished() || tile.state() != TileState::Revealed {
            return Ok(Update::unchanged());
        }

        let count = tile.adjacent_mines();
        if count == 0 || count != self.count_neighbors(coords, Tile::is_unrevealed) {
            return Ok(Update::unchanged());
        }

        let mut changed = ChangeSet::new();
        for pos in self.tiles.iter_neighbors(coords) {
            if self.tiles[pos.to_nd_index()].is_hidden() {
                self.set_state(pos, TileState::Flagged);
                self.flagged_count += 1;
                changed.push(pos);
            }
        }

        let outcome = if changed.is_empty() {
            MarkOutcome::NoChange
        } else {
            MarkOutcome::Flagged
        };
        Ok(Update::new(outcome, changed))
    }

    /// Reveal a hidden tile, flood-filling from it when it has no adjacent mines.
    pub fn reveal(&mut self, coords: Coord2) -> Result<Update<RevealOutcome>> {
        let coords = self.validate_coords(coords)?;
        if self.is_finished() || !self.tiles[coords.to_nd_index()].is_hidden() {
            return Ok(Update::unchanged());
        }

        self.place_mines(coords);
        let mut changed = ChangeSet::new();
        let outcome = self.reveal_single_tile(coords, &mut changed);
        Ok(Update::new(outcome, changed))
    }

    /// Reveal all hidden neighbors of a revealed number once enough of them are flagged, otherwise a plain reveal.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<Update<RevealOutcome>> {
        let coords = self.validate_coords(coords)?;
        let tile = self.tiles[coords.to_nd_index()];
        if self.is_finished() {
            return Ok(Update::unchanged());
        }

        match tile.state() {
            TileState::Revealed
                if tile.adjacent_mines() > 0
                    && tile.adjacent_mines()
                        == self.count_neighbors(coords, |t| t.state() == TileState::Flagged) =>
            {
                let mut changed = ChangeSet::new();
                let mut outcome = RevealOutcome::NoChange;
                for pos in self.tiles.iter_neighbors(coords) {
                    if self.is_finished() {
                        break;
                    }
                    if self.tiles[pos.to_nd_index()].is_hidden() {
                        outcome = outcome | self.reveal_single_tile(pos, &mut changed);
                    }
                }
                Ok(Update::new(outcome, changed))
            }
            TileState::Revealed => Ok(Update::unchanged()),
            _ => self.reveal(coords),
        }
    }

    /// Places mines on the first reveal, keeping `start` safe.
    fn place_mines(&mut self, start: Coord2) {
        if self.mines_placed {
            return;
        }
        let layout = RandomMinefieldGenerator::new(self.seed, start, self.config.start_tile)
            .generate(&self.config);
        self.arm(&layout);
    }

    fn arm(&mut self, layout: &MineLayout) {
        for ((row, col), tile) in self.tiles.indexed_iter_mut() {
            let coords = (row as Coord, col as Coord);
            tile.arm(
                layout.contains_mine(coords),
                layout.adjacent_mine_count(coords),
            );
        }
        self.mines_placed = true;
        log::debug!(
            "Placed {} mines on {}x{}",
            layout.mine_count(),
            self.config.width,
            self.config.height
        );
    }

    /// Reveals one hidden tile, flood-fills from zero tiles, and settles a win or loss.
    fn reveal_single_tile(&mut self, coords: Coord2, changed: &mut ChangeSet) -> RevealOutcome {
        let tile = self.tiles[coords.to_nd_index()];
        if !tile.is_hidden() {
            return RevealOutcome::NoChange;
        }

        if tile.is_mine() {
            self.set_state(coords, TileState::Revealed);
            self.triggered_mine = Some(coords);
            changed.push(coords);
            log::debug!("Hit mine at {:?}, game lost", coords);
            return RevealOutcome::HitMine;
        }

        // a tile turning revealed is its own visited marker
        let mut frontier = vec![coords];
        while let Some(pos) = frontier.pop() {
            let visit = self.tiles[pos.to_nd_index()];
            if !visit.is_hidden() || visit.is_mine() {
                continue;
            }

            self.set_state(pos, TileState::Revealed);
            self.revealed_count += 1;
            changed.push(pos);
            log::trace!(
                "Revealed tile at {:?}, mine count: {}",
                pos,
                visit.adjacent_mines()
            );

            if visit.adjacent_mines() == 0 {
                frontier.extend(
                    self.tiles
                        .iter_neighbors(pos)
                        .filter(|&next| self.tiles[next.to_nd_index()].is_hidden()),
                );
            }
        }

        if self.status() == GameStatus::Won {
            self.finish_won(changed);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn finish_won(&mut self, changed: &mut ChangeSet) {
        log::debug!("All {} safe tiles revealed, game won", self.revealed_count);
        if !self.config.auto_flag_on_win {
            return;
        }

        let mut auto_flagged = Vec::new();
        for ((row, col), tile) in self.tiles.indexed_iter() {
            if tile.is_mine() && tile.is_hidden() {
                auto_flagged.push((row as Coord, col as Coord));
            }
        }
        for coords in auto_flagged {
            self.set_state(coords, TileState::Flagged);
            self.flagged_count += 1;
            changed.push(coords);
        }
    }

    fn set_state(&mut self, coords: Coord2, state: TileState) {
        self.tiles[coords.to_nd_index()].set_state(state);
    }

    fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(Tile) -> bool) -> u8 {
        self.tiles
            .iter_neighbors(coords)
            .filter(|&pos| predicate(self.tiles[pos.to_nd_index()]))
            .count() as u8
    }

    fn safe_tile_count(&self) -> CellCount {
        self.config.total_tiles() - self.config.mines
    }
}
