/*
  Haliax, a Tak engine.
  Copyright (C) 2022 The Haliax Authors (see AUTHORS.md file)

  Haliax is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Haliax is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Benchmarks for move generation and perft.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haliax::base::{legal_moves, perft::perft, tps, MoveList, Position};

/// Measure raw move generation over a handful of mid-game shapes.
fn bench_movegen(c: &mut Criterion) {
    let positions: Vec<Position> = [
        tps::START_TPS,
        tps::WALL_LOCKED_TPS,
        tps::CRUSH_READY_TPS,
        tps::TALL_STACK_TPS,
    ]
    .iter()
    .map(|s| Position::from_tps(s).unwrap())
    .collect();

    c.bench_function("movegen_named_positions", |b| {
        let mut moves = MoveList::new();
        b.iter(|| {
            for pos in &positions {
                moves.clear();
                legal_moves(black_box(pos), &mut moves);
                black_box(moves.len());
            }
        });
    });
}

/// Measure the full make/undo/movegen cycle through a shallow perft.
fn bench_perft(c: &mut Criterion) {
    c.bench_function("perft_3_start", |b| {
        b.iter(|| assert_eq!(perft(black_box(tps::START_TPS), 3), 132_720));
    });
}

criterion_group!(benches, bench_movegen, bench_perft);
criterion_main!(benches);
