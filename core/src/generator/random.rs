use rand::prelude::*;
use rand::seq::index;

use super::*;

/// Generation strategy that keeps the starting tile (and optionally its neighbors) free of mines, but other than that
/// is purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }

    /// Tiles that must stay free of mines, never more than the board can spare.
    fn excluded_tiles(&self, config: &GameConfig) -> Vec<Coord2> {
        let size = config.size();
        let total_tiles = config.total_tiles();
        let mut excluded = vec![self.start];

        if self.start_tile == StartTile::AlwaysZero {
            excluded.extend(NeighborIter::new(self.start, size));
            if config.mines.saturating_add(excluded.len() as CellCount) > total_tiles {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                excluded.truncate(1);
            }
        }

        excluded
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout {
        let size = config.size();
        let (_, width) = size;
        let excluded = self.excluded_tiles(config);

        let candidates: Vec<usize> = (0..config.total_tiles() as usize)
            .filter(|&i| {
                let coords = ((i / width as usize) as Coord, (i % width as usize) as Coord);
                !excluded.contains(&coords)
            })
            .collect();

        let wanted = config.mines as usize;
        if wanted > candidates.len() {
            log::warn!(
                "Minefield already full, requested {} mines but only {} tiles are free",
                wanted,
                candidates.len()
            );
        }
        let amount = wanted.min(candidates.len());

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        {
            let tiles = mine_mask
                .as_slice_mut()
                .expect("freshly allocated arrays use the standard layout");
            for picked in index::sample(&mut rng, candidates.len(), amount).into_iter() {
                tiles[candidates[picked]] = true;
            }
        }

        let layout = MineLayout::from_mine_mask_unchecked(mine_mask);
        log::debug!(
            "Generated {} mines on {}x{} avoiding {:?} ({:?})",
            layout.mine_count(),
            config.width,
            config.height,
            self.start,
            self.start_tile
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(config: GameConfig, seed: u64, start: Coord2, start_tile: StartTile) -> MineLayout {
        RandomMinefieldGenerator::new(seed, start, start_tile).generate(&config)
    }

    #[test]
    fn places_exact_mine_count() {
        for seed in 0..20 {
            let layout = generate(GameConfig::intermediate(), seed, (3, 7), StartTile::SimpleSafe);
            assert_eq!(layout.mine_count(), 40);
            assert_eq!(layout.size(), (16, 16));
        }
    }

    #[test]
    fn start_tile_is_never_a_mine() {
        let config = GameConfig::new(4, 4, 15).unwrap();
        for seed in 0..50 {
            let start = ((seed % 4) as Coord, (seed / 4 % 4) as Coord);
            let layout = generate(config, seed, start, StartTile::SimpleSafe);
            assert!(!layout.contains_mine(start));
            assert_eq!(layout.mine_count(), 15);
        }
    }

    #[test]
    fn always_zero_clears_the_neighborhood() {
        for seed in 0..20 {
            let layout = generate(GameConfig::beginner(), seed, (4, 4), StartTile::AlwaysZero);
            assert!(!layout.contains_mine((4, 4)));
            assert_eq!(layout.adjacent_mine_count((4, 4)), 0);
            assert_eq!(layout.mine_count(), 10);
        }
    }

    #[test]
    fn always_zero_falls_back_when_crowded() {
        let config = GameConfig::new(3, 3, 7).unwrap();
        let layout = generate(config, 7, (1, 1), StartTile::AlwaysZero);

        assert!(!layout.contains_mine((1, 1)));
        assert_eq!(layout.mine_count(), 7);
    }

    #[test]
    fn same_seed_same_layout() {
        let a = generate(GameConfig::expert(), 42, (0, 0), StartTile::SimpleSafe);
        let b = generate(GameConfig::expert(), 42, (0, 0), StartTile::SimpleSafe);
        assert_eq!(a, b);
    }

    #[test]
    fn two_tile_board_puts_mine_on_the_other_tile() {
        let config = GameConfig::new(2, 1, 1).unwrap();
        let layout = generate(config, 1, (0, 0), StartTile::SimpleSafe);

        assert!(layout.contains_mine((0, 1)));
        assert!(!layout.contains_mine((0, 0)));
    }
}
