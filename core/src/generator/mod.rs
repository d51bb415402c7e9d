use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout;
}

/// How much of the first revealed area is guaranteed to be mine free.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartTile {
    /// Only the first revealed tile is safe.
    #[default]
    SimpleSafe,
    /// The first revealed tile and all its neighbors are safe, so the game opens with a flood fill.
    AlwaysZero,
}
