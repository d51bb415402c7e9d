use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sweeper_core::{Board, GameConfig, StartTile};

fn first_click(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_click");
    let presets = [
        ("beginner", GameConfig::beginner()),
        ("intermediate", GameConfig::intermediate()),
        ("expert", GameConfig::expert()),
    ];

    for (name, config) in presets {
        let config = config.with_start_tile(StartTile::AlwaysZero);
        let center = (config.height / 2, config.width / 2);
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let mut board = Board::with_seed(config, seed).expect("preset is valid");
                black_box(board.reveal(black_box(center)).expect("center is on the board"))
            });
        });
    }
    group.finish();
}

fn open_board(c: &mut Criterion) {
    let config = GameConfig::new(256, 256, 0).expect("empty board is valid");

    c.bench_function("open_board_256", |b| {
        b.iter(|| {
            let mut board = Board::with_seed(config, 1).expect("config is valid");
            black_box(board.reveal((0, 0)).expect("origin is on the board"))
        });
    });
}

criterion_group!(benches, first_click, open_board);
criterion_main!(benches);
