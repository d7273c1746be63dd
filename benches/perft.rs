use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kagero::board::{Board, START_FEN};
use kagero::movegen;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

fn perft_at(fen: &str, depth: u32) -> u64 {
    let mut board = Board::from_fen(fen).expect("bench fen parses");
    movegen::perft(&mut board, depth)
}

fn perft_benchmarks(c: &mut Criterion) {
    kagero::init();

    let mut group = c.benchmark_group("perft");
    group.sample_size(10);

    group.bench_function("startpos_depth_3", |b| {
        b.iter(|| perft_at(black_box(START_FEN), black_box(3)))
    });
    group.bench_function("startpos_depth_4", |b| {
        b.iter(|| perft_at(black_box(START_FEN), black_box(4)))
    });
    group.bench_function("kiwipete_depth_3", |b| {
        b.iter(|| perft_at(black_box(KIWIPETE), black_box(3)))
    });
    group.bench_function("endgame_depth_4", |b| {
        b.iter(|| perft_at(black_box(ENDGAME), black_box(4)))
    });

    group.finish();
}

criterion_group!(benches, perft_benchmarks);
criterion_main!(benches);
