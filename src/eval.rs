//! Static evaluation: classical tapered terms blended with the NNUE oracle.
//!
//! Midgame/endgame pairs are packed into one i32 (endgame in the high half)
//! and interpolated by a 0..=256 phase where 0 is full material and 256 is a
//! bare-king endgame. Pawn-structure terms are cached under a pawn-only
//! Zobrist key; whole evaluations are memoized in a direct-mapped cache.

use crate::attacks;
use crate::bitboard::*;
use crate::board::Board;
use crate::moves::Move;
use crate::nnue;

pub const INFINITY: i32 = 30_000;
pub const MATE_SCORE: i32 = 29_000;
pub const MATE_THRESHOLD: i32 = 28_000;

pub const TEMPO: i32 = 14;

/// Scalar piece values for exchange arithmetic (SEE, pruning margins).
pub const SEE_VALUES: [i32; PIECE_COUNT] = [100, 320, 330, 500, 900, 20_000];
pub const QUEEN_VALUE: i32 = SEE_VALUES[Piece::Queen.index()];
pub const PAWN_VALUE: i32 = SEE_VALUES[Piece::Pawn.index()];

// ============================================================
// Packed midgame/endgame scores
// ============================================================

/// Pack a (midgame, endgame) pair into one i32.
pub const fn s(mg: i32, eg: i32) -> i32 {
    (eg << 16).wrapping_add(mg)
}

#[inline]
pub fn mg_part(score: i32) -> i32 {
    score as u16 as i16 as i32
}

#[inline]
pub fn eg_part(score: i32) -> i32 {
    ((score.wrapping_add(0x8000) as u32) >> 16) as u16 as i16 as i32
}

/// Interpolate a packed score at `phase` (0 = opening, 256 = endgame).
#[inline]
pub fn interpolate(score: i32, phase: i32) -> i32 {
    (mg_part(score) * (256 - phase) + eg_part(score) * phase) / 256
}

// ============================================================
// Material and piece-square tables (white perspective)
// ============================================================

const MATERIAL: [i32; PIECE_COUNT] = [
    s(100, 125),
    s(320, 295),
    s(330, 320),
    s(500, 540),
    s(930, 950),
    s(0, 0),
];

#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
    s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0),
    s( -2,  2), s(  2,  2), s( -4,  2), s( -9,  0), s( -9,  0), s( -4,  2), s(  2,  2), s( -2,  2),
    s( -3,  0), s(  0,  1), s( -2,  0), s(  1,  0), s(  1,  0), s( -2,  0), s(  0,  1), s( -3,  0),
    s( -3,  4), s(  2,  4), s(  7,  2), s( 14,  0), s( 14,  0), s(  7,  2), s(  2,  4), s( -3,  4),
    s(  4,  9), s(  9,  9), s( 15,  6), s( 24,  3), s( 24,  3), s( 15,  6), s(  9,  9), s(  4,  9),
    s(  6, 20), s( 13, 20), s( 19, 15), s( 29, 11), s( 29, 11), s( 19, 15), s( 13, 20), s(  6, 20),
    s( 11, 42), s( 16, 42), s( 21, 37), s( 31, 31), s( 31, 31), s( 21, 37), s( 16, 42), s( 11, 42),
    s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0),
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    s(-52,-32), s(-31,-21), s(-21,-16), s(-16,-11), s(-16,-11), s(-21,-16), s(-31,-21), s(-52,-32),
    s(-31,-21), s(-11, -6), s(  0,  0), s(  6,  6), s(  6,  6), s(  0,  0), s(-11, -6), s(-31,-21),
    s(-21,-11), s(  6,  6), s( 16, 11), s( 21, 16), s( 21, 16), s( 16, 11), s(  6,  6), s(-21,-11),
    s(-11, -6), s( 11, 11), s( 21, 16), s( 27, 21), s( 27, 21), s( 21, 16), s( 11, 11), s(-11, -6),
    s(-11, -6), s( 11, 11), s( 21, 16), s( 27, 21), s( 27, 21), s( 21, 16), s( 11, 11), s(-11, -6),
    s(-21,-11), s(  6,  6), s( 16, 11), s( 21, 16), s( 21, 16), s( 16, 11), s(  6,  6), s(-21,-11),
    s(-31,-21), s(-11, -6), s(  0,  0), s(  6,  6), s(  6,  6), s(  0,  0), s(-11, -6), s(-31,-21),
    s(-52,-32), s(-31,-21), s(-21,-16), s(-16,-11), s(-16,-11), s(-21,-16), s(-31,-21), s(-52,-32),
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    s(-11,-11), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11,-11),
    s( -6, -6), s(  6,  0), s(  3,  0), s(  6,  0), s(  6,  0), s(  3,  0), s(  6,  0), s( -6, -6),
    s( -6, -6), s(  6,  0), s( 11,  6), s(  9,  6), s(  9,  6), s( 11,  6), s(  6,  0), s( -6, -6),
    s( -6,  0), s(  3,  6), s(  9, 11), s( 13, 11), s( 13, 11), s(  9, 11), s(  3,  6), s( -6,  0),
    s( -6,  0), s(  6,  6), s( 11, 11), s( 13, 11), s( 13, 11), s( 11, 11), s(  6,  6), s( -6,  0),
    s( -6, -6), s( 11,  0), s( 11,  6), s(  6,  6), s(  6,  6), s( 11,  6), s( 11,  0), s( -6, -6),
    s( -6, -6), s(  9,  0), s(  3,  0), s(  3,  0), s(  3,  0), s(  3,  0), s(  9,  0), s( -6, -6),
    s(-11,-11), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11, -6), s(-11,-11),
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
    s( -3,  0), s(  0,  0), s(  4,  0), s(  7,  0), s(  7,  0), s(  4,  0), s(  0,  0), s( -3,  0),
    s( -6,  0), s( -3,  0), s(  0,  0), s(  3,  0), s(  3,  0), s(  0,  0), s( -3,  0), s( -6,  0),
    s( -6,  0), s( -3,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s( -3,  0), s( -6,  0),
    s( -6,  0), s( -3,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s( -3,  0), s( -6,  0),
    s( -6,  0), s( -3,  0), s(  0,  6), s(  0,  6), s(  0,  6), s(  0,  6), s( -3,  0), s( -6,  0),
    s(  0,  0), s(  3,  0), s(  6,  6), s(  9,  6), s(  9,  6), s(  6,  6), s(  3,  0), s(  0,  0),
    s( 11, 11), s( 13, 11), s( 16, 11), s( 19, 11), s( 19, 11), s( 16, 11), s( 13, 11), s( 11, 11),
    s(  6,  6), s(  6,  6), s(  6, 11), s(  6, 11), s(  6, 11), s(  6, 11), s(  6,  6), s(  6,  6),
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    s(-16,-21), s(-11,-11), s( -6, -6), s(  0,  0), s(  0,  0), s( -6, -6), s(-11,-11), s(-16,-21),
    s(-11,-11), s( -3, -6), s(  3,  0), s(  3,  0), s(  3,  0), s(  3,  0), s( -3, -6), s(-11,-11),
    s( -6, -6), s(  3,  0), s(  6,  6), s(  6,  6), s(  6,  6), s(  6,  6), s(  3,  0), s( -6, -6),
    s(  0,  0), s(  3,  6), s(  6, 11), s(  9, 11), s(  9, 11), s(  6, 11), s(  3,  6), s(  0,  0),
    s( -3,  0), s(  3,  6), s(  6, 11), s(  9, 11), s(  9, 11), s(  6, 11), s(  3,  6), s( -3,  0),
    s( -6, -6), s(  0,  0), s(  6,  6), s(  3,  6), s(  3,  6), s(  6,  6), s(  0,  0), s( -6, -6),
    s(-11,-11), s( -6, -6), s( -3,  0), s( -3,  0), s( -3,  0), s( -3,  0), s( -6, -6), s(-11,-11),
    s(-16,-21), s(-11,-11), s( -6, -6), s( -6,  0), s( -6,  0), s( -6, -6), s(-11,-11), s(-16,-21),
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
    s( 21,-52), s( 31,-31), s( 11,-21), s( -6,-21), s( -6,-21), s( 11,-21), s( 31,-31), s( 21,-52),
    s( 21,-31), s( 21,-16), s(  0,-11), s(-11,-11), s(-11,-11), s(  0,-11), s( 21,-16), s( 21,-31),
    s(-11,-21), s(-16,-11), s(-21,  0), s(-27, 11), s(-27, 11), s(-21,  0), s(-16,-11), s(-11,-21),
    s(-27,-16), s(-31, -6), s(-37, 11), s(-42, 21), s(-42, 21), s(-37, 11), s(-31, -6), s(-27,-16),
    s(-42,-16), s(-47, -6), s(-52, 11), s(-57, 21), s(-57, 21), s(-52, 11), s(-47, -6), s(-42,-16),
    s(-37,-21), s(-42,-11), s(-52,  0), s(-57, 11), s(-57, 11), s(-52,  0), s(-42,-11), s(-37,-21),
    s(-27,-31), s(-37,-16), s(-47,-11), s(-52,-11), s(-52,-11), s(-47,-11), s(-37,-16), s(-27,-31),
    s(-21,-52), s(-31,-31), s(-42,-21), s(-52,-21), s(-52,-21), s(-42,-21), s(-31,-31), s(-21,-52),
];

const PST: [&[i32; 64]; PIECE_COUNT] = [
    &PAWN_PST,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_PST,
];

const BISHOP_PAIR: i32 = s(32, 52);
const ROOK_OPEN_FILE: i32 = s(22, 14);
const ROOK_SEMI_OPEN_FILE: i32 = s(11, 8);

const DOUBLED_PAWN: i32 = s(-8, -14);
const ISOLATED_PAWN: i32 = s(-12, -16);
const CONNECTED_PAWN: i32 = s(7, 6);

const PASSED_BONUS: [i32; 8] = [
    s(0, 0),
    s(5, 12),
    s(8, 18),
    s(14, 30),
    s(26, 52),
    s(44, 86),
    s(70, 130),
    s(0, 0),
];

// ============================================================
// Game phase
// ============================================================

const PHASE_WEIGHTS: [i32; PIECE_COUNT] = [0, 1, 1, 2, 4, 0];
const PHASE_TOTAL: i32 = 24;

/// 0 = full material (opening), 256 = bare kings (endgame).
pub fn phase(board: &Board) -> i32 {
    let mut remaining = 0;
    for color in 0..COLOR_COUNT {
        for piece in 1..PIECE_COUNT - 1 {
            remaining += popcount(board.pieces[color][piece]) as i32 * PHASE_WEIGHTS[piece];
        }
    }
    (PHASE_TOTAL - remaining.min(PHASE_TOTAL)) * 256 / PHASE_TOTAL
}

// ============================================================
// Evaluation state (per search thread, passed explicitly)
// ============================================================

const PAWN_TABLE_SIZE: usize = 8192;
const EVAL_CACHE_SIZE: usize = 32_768;

#[derive(Clone, Copy, Default)]
struct PawnEntry {
    key: u64,
    score: i32,
    passed: [Bitboard; 2],
}

#[derive(Clone, Copy, Default)]
struct CacheSlot {
    key: u64,
    score: i32,
}

/// Caches and tuning knobs owned by one search thread.
pub struct EvalState {
    pawn_table: Vec<PawnEntry>,
    cache: Vec<CacheSlot>,
    pub contempt: i32,
}

impl EvalState {
    pub fn new(contempt: i32) -> Self {
        EvalState {
            pawn_table: vec![PawnEntry::default(); PAWN_TABLE_SIZE],
            cache: vec![CacheSlot::default(); EVAL_CACHE_SIZE],
            contempt,
        }
    }
}

// ============================================================
// Main evaluation
// ============================================================

/// Centipawn score from the perspective of the side to move.
pub fn evaluate(board: &Board, state: &mut EvalState) -> i32 {
    let slot = (board.hash as usize) & (EVAL_CACHE_SIZE - 1);
    if state.cache[slot].key == board.hash && board.hash != 0 {
        return state.cache[slot].score;
    }

    let game_phase = phase(board);

    // Everything below accumulates from white's point of view.
    let mut score = 0i32;

    for color in 0..COLOR_COUNT {
        let sign = if color == 0 { 1 } else { -1 };
        for piece in 0..PIECE_COUNT {
            for sq in Bits(board.pieces[color][piece]) {
                let pst_sq = if color == 0 { sq } else { sq ^ 56 };
                score += sign * (MATERIAL[piece] + PST[piece][pst_sq as usize]);
            }
        }
        if popcount(board.pieces[color][Piece::Bishop.index()]) >= 2 {
            score += sign * BISHOP_PAIR;
        }
    }

    let pawns = pawn_structure(board, state);
    score += pawns.score;
    score += passed_pawn_advance(board, &pawns.passed);
    score += rooks_on_files(board);
    score += mobility(board);
    score += king_safety(board);

    let mut classical = interpolate(score, game_phase);
    if board.side == Color::Black {
        classical = -classical;
    }

    // Blend with the NNUE oracle; its weight rises as material comes off.
    let mut value = match nnue::evaluate(board) {
        Some(net) => {
            let w = 112 + game_phase / 2; // 112..=240 of 256
            (net * w + classical * (256 - w)) / 256
        }
        None => classical,
    };

    value += TEMPO;
    value += state.contempt * (256 - game_phase) / 256;

    state.cache[slot] = CacheSlot { key: board.hash, score: value };
    value
}

/// Contempt-adjusted draw score from the mover's perspective.
pub fn draw_score(board: &Board, state: &EvalState) -> i32 {
    -(state.contempt * (256 - phase(board)) / 256)
}

struct PawnEval {
    score: i32,
    passed: [Bitboard; 2],
}

fn pawn_structure(board: &Board, state: &mut EvalState) -> PawnEval {
    let key = board.pawn_key();
    let slot = (key as usize) & (PAWN_TABLE_SIZE - 1);
    let entry = &state.pawn_table[slot];
    if entry.key == key && key != 0 {
        return PawnEval { score: entry.score, passed: entry.passed };
    }

    let mut score = 0i32;
    let mut passed = [EMPTY; 2];

    for color in 0..COLOR_COUNT {
        let us = Color::from_index(color);
        let sign = if color == 0 { 1 } else { -1 };
        let ours = board.pieces[color][Piece::Pawn.index()];
        let theirs = board.pieces[color ^ 1][Piece::Pawn.index()];

        for sq in Bits(ours) {
            let file = file_of(sq) as usize;

            if popcount(ours & FILES[file]) > 1 {
                score += sign * DOUBLED_PAWN;
            }

            let adjacent = match file {
                0 => FILES[1],
                7 => FILES[6],
                f => FILES[f - 1] | FILES[f + 1],
            };
            if ours & adjacent == 0 {
                score += sign * ISOLATED_PAWN;
            } else {
                // Supported or phalanx: a friendly pawn beside or diagonally behind.
                let support = attacks::pawn_attacks(sq, us.flip()) | (east(square_bb(sq)) | west(square_bb(sq)));
                if ours & support != 0 {
                    score += sign * CONNECTED_PAWN;
                }
            }

            if theirs & passed_pawn_span(sq, us) == 0 {
                passed[color] |= square_bb(sq);
            }
        }
    }

    state.pawn_table[slot] = PawnEntry { key, score, passed };
    PawnEval { score, passed }
}

/// Rank bonuses plus king proximity for passed pawns. Kept outside the pawn
/// cache because it depends on king placement.
fn passed_pawn_advance(board: &Board, passed: &[Bitboard; 2]) -> i32 {
    let mut score = 0i32;
    for color in 0..COLOR_COUNT {
        let us = Color::from_index(color);
        let sign = if color == 0 { 1 } else { -1 };
        let our_king = board.king_sq(us);
        let their_king = board.king_sq(us.flip());

        for sq in Bits(passed[color]) {
            let rank = relative_rank(sq, us) as usize;
            score += sign * PASSED_BONUS[rank];

            let stop = match us {
                Color::White => (sq + 8).min(63),
                Color::Black => sq.saturating_sub(8),
            };
            let eg = 6 * distance(their_king, stop) as i32 - 4 * distance(our_king, stop) as i32;
            score += sign * s(0, eg);
        }
    }
    score
}

fn rooks_on_files(board: &Board) -> i32 {
    let mut score = 0i32;
    for color in 0..COLOR_COUNT {
        let sign = if color == 0 { 1 } else { -1 };
        let ours = board.pieces[color][Piece::Pawn.index()];
        let theirs = board.pieces[color ^ 1][Piece::Pawn.index()];
        for sq in Bits(board.pieces[color][Piece::Rook.index()]) {
            let file = FILES[file_of(sq) as usize];
            if ours & file == 0 {
                score += sign
                    * if theirs & file == 0 {
                        ROOK_OPEN_FILE
                    } else {
                        ROOK_SEMI_OPEN_FILE
                    };
            }
        }
    }
    score
}

fn mobility(board: &Board) -> i32 {
    let mut score = 0i32;
    let occ = board.all_occupancy;
    for color in 0..COLOR_COUNT {
        let sign = if color == 0 { 1 } else { -1 };
        let ours = board.occupancy[color];
        let p = &board.pieces[color];

        for sq in Bits(p[Piece::Knight.index()]) {
            let n = popcount(attacks::knight_attacks(sq) & !ours) as i32;
            score += sign * (n - 4) * s(3, 3);
        }
        for sq in Bits(p[Piece::Bishop.index()]) {
            let n = popcount(attacks::bishop_attacks(sq, occ) & !ours) as i32;
            score += sign * (n - 6) * s(4, 3);
        }
        for sq in Bits(p[Piece::Rook.index()]) {
            let n = popcount(attacks::rook_attacks(sq, occ) & !ours) as i32;
            score += sign * (n - 7) * s(2, 4);
        }
        for sq in Bits(p[Piece::Queen.index()]) {
            let n = popcount(attacks::queen_attacks(sq, occ) & !ours) as i32;
            score += sign * (n - 14) * s(1, 2);
        }
    }
    score
}

fn king_safety(board: &Board) -> i32 {
    let mut score = 0i32;
    for color in 0..COLOR_COUNT {
        let us = Color::from_index(color);
        let sign = if color == 0 { 1 } else { -1 };
        let ksq = board.king_sq(us);
        let kfile = file_of(ksq) as usize;
        let ours = board.pieces[color][Piece::Pawn.index()];
        let theirs_all = board.pieces[color ^ 1];

        // Pawn shield for a castled or corner king.
        if kfile <= 2 || kfile >= 5 {
            let span = kfile.saturating_sub(1)..=(kfile + 1).min(7);
            let shield_ranks = match us {
                Color::White => RANK_2 | RANK_3,
                Color::Black => RANK_6 | RANK_7,
            };
            for f in span {
                if ours & FILES[f] & shield_ranks != 0 {
                    score += sign * s(11, 0);
                } else {
                    score -= sign * s(16, 0);
                    // A fully open file beside the king is worse still.
                    if (ours | theirs_all[Piece::Pawn.index()]) & FILES[f] == 0 {
                        score -= sign * s(10, 4);
                    }
                }
            }
        }

        // Attacker-weighted danger over the king zone.
        let zone = attacks::king_attacks(ksq) | square_bb(ksq);
        let occ = board.all_occupancy;
        let mut units = 0i32;
        for sq in Bits(theirs_all[Piece::Knight.index()]) {
            if attacks::knight_attacks(sq) & zone != 0 {
                units += 2;
            }
        }
        for sq in Bits(theirs_all[Piece::Bishop.index()]) {
            if attacks::bishop_attacks(sq, occ) & zone != 0 {
                units += 2;
            }
        }
        for sq in Bits(theirs_all[Piece::Rook.index()]) {
            if attacks::rook_attacks(sq, occ) & zone != 0 {
                units += 3;
            }
        }
        for sq in Bits(theirs_all[Piece::Queen.index()]) {
            if attacks::queen_attacks(sq, occ) & zone != 0 {
                units += 5;
            }
        }
        let danger = (units * units * 3 / 2).min(560);
        score -= sign * s(danger, danger / 3);
    }
    score
}

/// Position complexity for time allocation: imbalance plus activity spread.
pub fn complexity(board: &Board) -> i32 {
    let imbalance = (board.non_pawn_material(Color::White)
        - board.non_pawn_material(Color::Black))
    .abs();
    let pawn_spread = (popcount(board.pieces[0][Piece::Pawn.index()]) as i32
        - popcount(board.pieces[1][Piece::Pawn.index()]) as i32)
        .abs()
        * 60;
    let mob = mg_part(mobility(board)).abs();
    let danger = mg_part(king_safety(board)).abs();
    imbalance / 2 + pawn_spread + mob * 2 + danger
}

// ============================================================
// Static exchange evaluation
// ============================================================

/// Net material outcome of the capture sequence opened by `m`, with both
/// sides recapturing least-valuable-attacker first and x-ray attackers
/// joining as front pieces vacate.
pub fn see(board: &Board, m: Move) -> i32 {
    if !m.is_capture() {
        return 0;
    }

    let from = m.from_sq();
    let to = m.to_sq();

    let mut gain = [0i32; 32];
    let mut depth = 0usize;

    gain[0] = m
        .captured()
        .map(|p| SEE_VALUES[p.index()])
        .unwrap_or(0);
    if let Some(promo) = m.promotion() {
        gain[0] += SEE_VALUES[promo.index()] - PAWN_VALUE;
    }

    let mut on_target = match m.promotion() {
        Some(promo) => SEE_VALUES[promo.index()],
        None => SEE_VALUES[m.piece().index()],
    };

    let mut occ = board.all_occupancy ^ square_bb(from);
    if m.is_en_passant() {
        let cap_sq = match board.side {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        occ ^= square_bb(cap_sq);
    }

    let mut side = board.side.flip();
    loop {
        depth += 1;
        if depth >= gain.len() {
            break;
        }
        let Some((attacker_sq, attacker)) = least_valuable_attacker(board, to, side, occ) else {
            break;
        };

        gain[depth] = on_target - gain[depth - 1];
        if (-gain[depth - 1]).max(gain[depth]) < 0 {
            break;
        }

        on_target = SEE_VALUES[attacker.index()];
        occ ^= square_bb(attacker_sq);
        side = side.flip();
    }

    while depth > 1 {
        depth -= 1;
        gain[depth - 1] = -((-gain[depth - 1]).max(gain[depth]));
    }
    gain[0]
}

#[inline]
pub fn see_ge(board: &Board, m: Move, threshold: i32) -> bool {
    see(board, m) >= threshold
}

fn least_valuable_attacker(
    board: &Board,
    sq: u8,
    side: Color,
    occ: Bitboard,
) -> Option<(u8, Piece)> {
    let p = &board.pieces[side.index()];

    let pawns = attacks::pawn_attacks(sq, side.flip()) & p[Piece::Pawn.index()] & occ;
    if pawns != 0 {
        return Some((lsb(pawns), Piece::Pawn));
    }
    let knights = attacks::knight_attacks(sq) & p[Piece::Knight.index()] & occ;
    if knights != 0 {
        return Some((lsb(knights), Piece::Knight));
    }
    let diag = attacks::bishop_attacks(sq, occ);
    let bishops = diag & p[Piece::Bishop.index()] & occ;
    if bishops != 0 {
        return Some((lsb(bishops), Piece::Bishop));
    }
    let straight = attacks::rook_attacks(sq, occ);
    let rooks = straight & p[Piece::Rook.index()] & occ;
    if rooks != 0 {
        return Some((lsb(rooks), Piece::Rook));
    }
    let queens = (diag | straight) & p[Piece::Queen.index()] & occ;
    if queens != 0 {
        return Some((lsb(queens), Piece::Queen));
    }
    let kings = attacks::king_attacks(sq) & p[Piece::King.index()] & occ;
    if kings != 0 {
        return Some((lsb(kings), Piece::King));
    }
    None
}

/// Most-valuable-victim / least-valuable-attacker ordering score.
#[inline]
pub fn mvv_lva(m: Move) -> i32 {
    match m.captured() {
        Some(victim) => SEE_VALUES[victim.index()] * 10 - SEE_VALUES[m.piece().index()] / 10,
        None => 0,
    }
}

// ============================================================
// Mate score helpers
// ============================================================

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_THRESHOLD
}

/// Full moves until mate, signed toward the winning side.
pub fn mate_in(score: i32) -> i32 {
    if score > MATE_THRESHOLD {
        (MATE_SCORE - score + 1) / 2
    } else if score < -MATE_THRESHOLD {
        -(MATE_SCORE + score + 1) / 2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;
    use crate::zobrist;

    fn setup() {
        zobrist::init();
        attacks::init();
    }

    #[test]
    fn packed_score_round_trip() {
        for (mg, eg) in [(0, 0), (5, -7), (-300, 250), (999, 999), (-999, -999)] {
            let packed = s(mg, eg);
            assert_eq!(mg_part(packed), mg);
            assert_eq!(eg_part(packed), eg);
        }
        // Packed arithmetic distributes over both halves.
        let a = s(10, -20);
        let b = s(-3, 5);
        assert_eq!(mg_part(a + b), 7);
        assert_eq!(eg_part(a + b), -15);
        assert_eq!(mg_part(a * 3), 30);
        assert_eq!(eg_part(a * 3), -60);
    }

    #[test]
    fn phase_ranges() {
        setup();
        assert_eq!(phase(&Board::start_pos()), 0);
        let bare = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        assert_eq!(phase(&bare), 256);
    }

    #[test]
    fn start_position_is_balanced() {
        setup();
        let board = Board::start_pos();
        let mut state = EvalState::new(0);
        let score = evaluate(&board, &mut state);
        assert!(score.abs() < 60, "start eval should be near zero, got {score}");
    }

    #[test]
    fn extra_queen_wins_the_eval() {
        setup();
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let mut state = EvalState::new(0);
        // White to move, up a queen.
        assert!(evaluate(&board, &mut state) > 400);
        // Same position from black's perspective.
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert!(evaluate(&board, &mut state) < -400);
    }

    #[test]
    fn eval_cache_is_consistent() {
        setup();
        let board = Board::start_pos();
        let mut state = EvalState::new(0);
        let first = evaluate(&board, &mut state);
        let second = evaluate(&board, &mut state);
        assert_eq!(first, second);
    }

    #[test]
    fn contempt_shifts_draw_score() {
        setup();
        let board = Board::start_pos();
        let state = EvalState::new(20);
        assert!(draw_score(&board, &state) < 0, "draws look bad for the optimist");
        let state = EvalState::new(0);
        assert_eq!(draw_score(&board, &state), 0);
    }

    fn find_move(board: &Board, text: &str) -> Move {
        movegen::resolve_move(board, text).unwrap()
    }

    #[test]
    fn see_undefended_pawn() {
        setup();
        let board = Board::from_fen("k7/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(see(&board, find_move(&board, "e4d5")), PAWN_VALUE);
    }

    #[test]
    fn see_defended_pawn_trade() {
        setup();
        let board = Board::from_fen("k7/8/4p3/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(see(&board, find_move(&board, "e4d5")), 0);
    }

    #[test]
    fn see_knight_takes_defended_pawn_loses() {
        setup();
        let board = Board::from_fen("k7/8/4p3/3p4/8/2N5/8/4K3 w - - 0 1").unwrap();
        assert!(see(&board, find_move(&board, "c3d5")) < 0);
    }

    #[test]
    fn see_xray_battery_wins() {
        setup();
        // Doubled white rooks against a defended rook on e7: Rxe7 Rxe7 Rxe7
        // only works because the back rook joins through the vacated square.
        let board = Board::from_fen("4r2k/4r3/8/8/8/8/4R3/4R2K w - - 0 1").unwrap();
        assert_eq!(see(&board, find_move(&board, "e2e7")), SEE_VALUES[Piece::Rook.index()]);
    }

    #[test]
    fn see_queen_grabs_poisoned_pawn() {
        setup();
        let board = Board::from_fen("k7/8/4p3/3p4/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(see(&board, find_move(&board, "d1d5")) < 0);
    }

    #[test]
    fn see_ignores_quiet_moves() {
        setup();
        let board = Board::start_pos();
        assert_eq!(see(&board, find_move(&board, "e2e4")), 0);
    }

    #[test]
    fn mvv_lva_prefers_big_victims_and_small_attackers() {
        setup();
        // Pawn takes queen should outrank queen takes pawn.
        let pxq = Move::new_capture(sq::E4, sq::D5, crate::moves::FLAG_CAPTURE, Piece::Pawn, Piece::Queen);
        let qxp = Move::new_capture(sq::E4, sq::D5, crate::moves::FLAG_CAPTURE, Piece::Queen, Piece::Pawn);
        assert!(mvv_lva(pxq) > mvv_lva(qxp));
    }

    #[test]
    fn mate_helpers() {
        assert!(is_mate_score(MATE_SCORE - 3));
        assert!(is_mate_score(-(MATE_SCORE - 5)));
        assert!(!is_mate_score(500));
        assert_eq!(mate_in(MATE_SCORE - 1), 1);
        assert_eq!(mate_in(MATE_SCORE - 3), 2);
        assert_eq!(mate_in(-(MATE_SCORE - 2)), -1);
    }

    #[test]
    fn complexity_grows_with_imbalance() {
        setup();
        let quiet = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let sharp =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert!(complexity(&sharp) > complexity(&quiet));
    }
}
