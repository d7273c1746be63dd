//! Precomputed attack tables, built once at startup:
//! - knight/king delta tables and per-color pawn attack tables
//! - magic-bitboard multiply-shift lookup for bishop and rook attacks
//! - `between`/`line` ray tables used for pin and check-evasion masks
//!
//! Magic multipliers are regenerated here by seeded random trial instead of
//! being copied from a published table; each candidate is verified to map
//! every relevant occupancy subset without a destructive collision.

use crate::bitboard::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

struct Magic {
    mask: Bitboard,
    factor: u64,
    shift: u8,
    offset: usize,
}

struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    between: Vec<Bitboard>, // [64 * 64], exclusive of endpoints
    line: Vec<Bitboard>,    // [64 * 64], full line through both squares
    bishop_magics: Vec<Magic>,
    rook_magics: Vec<Magic>,
    bishop_table: Vec<Bitboard>,
    rook_table: Vec<Bitboard>,
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Build all tables. Must run once before any lookup.
pub fn init() {
    TABLES.get_or_init(build);
}

#[inline]
fn tables() -> &'static AttackTables {
    TABLES.get().expect("attacks::init() must run before lookups")
}

fn build() -> AttackTables {
    let mut rng = StdRng::seed_from_u64(0xA2C5_6A93_17E4_0F01);
    let (bishop_magics, bishop_table) = build_slider(&mut rng, false);
    let (rook_magics, rook_table) = build_slider(&mut rng, true);
    let (between, line) = build_rays();
    AttackTables {
        knight: build_knight(),
        king: build_king(),
        pawn: build_pawn(),
        between,
        line,
        bishop_magics,
        rook_magics,
        bishop_table,
        rook_table,
    }
}

// ============================================================
// Leaper tables
// ============================================================

fn build_knight() -> [Bitboard; 64] {
    let mut out = [0u64; 64];
    for s in 0..64u8 {
        let bb = square_bb(s);
        out[s as usize] = (bb << 17) & NOT_FILE_A
            | (bb << 15) & NOT_FILE_H
            | (bb << 10) & NOT_FILE_AB
            | (bb << 6) & NOT_FILE_GH
            | (bb >> 6) & NOT_FILE_AB
            | (bb >> 10) & NOT_FILE_GH
            | (bb >> 15) & NOT_FILE_A
            | (bb >> 17) & NOT_FILE_H;
    }
    out
}

fn build_king() -> [Bitboard; 64] {
    let mut out = [0u64; 64];
    for s in 0..64u8 {
        let bb = square_bb(s);
        out[s as usize] = north(bb)
            | south(bb)
            | east(bb)
            | west(bb)
            | north_east(bb)
            | north_west(bb)
            | south_east(bb)
            | south_west(bb);
    }
    out
}

fn build_pawn() -> [[Bitboard; 64]; 2] {
    let mut out = [[0u64; 64]; 2];
    for s in 0..64u8 {
        let bb = square_bb(s);
        out[Color::White.index()][s as usize] = north_east(bb) | north_west(bb);
        out[Color::Black.index()][s as usize] = south_east(bb) | south_west(bb);
    }
    out
}

// ============================================================
// Slow ray scans (table construction and verification only)
// ============================================================

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn ray_attacks(sq: u8, occ: Bitboard, dirs: &[(i8, i8); 4]) -> Bitboard {
    let mut attacks = EMPTY;
    let (r0, f0) = (rank_of(sq) as i8, file_of(sq) as i8);
    for &(dr, df) in dirs {
        let (mut r, mut f) = (r0 + dr, f0 + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let s = make_square(f as u8, r as u8);
            attacks |= square_bb(s);
            if occ & square_bb(s) != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Relevant occupancy mask: rays from `sq` with board edges stripped.
fn relevant_mask(sq: u8, dirs: &[(i8, i8); 4]) -> Bitboard {
    let mut mask = EMPTY;
    let (r0, f0) = (rank_of(sq) as i8, file_of(sq) as i8);
    for &(dr, df) in dirs {
        let (mut r, mut f) = (r0 + dr, f0 + df);
        loop {
            let (nr, nf) = (r + dr, f + df);
            if !(0..8).contains(&nr) && dr != 0 || !(0..8).contains(&nf) && df != 0 {
                break;
            }
            if !(0..8).contains(&r) || !(0..8).contains(&f) {
                break;
            }
            mask |= square_bb(make_square(f as u8, r as u8));
            r = nr;
            f = nf;
        }
    }
    mask
}

/// All subsets of `mask` via the carry-rippler walk.
fn subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut out = Vec::with_capacity(1 << popcount(mask));
    let mut sub: Bitboard = 0;
    loop {
        out.push(sub);
        sub = sub.wrapping_sub(mask) & mask;
        if sub == 0 {
            break;
        }
    }
    out
}

// ============================================================
// Magic construction
// ============================================================

/// Find a multiplier that maps every occupancy subset of `mask` into a
/// `1 << bits` table without destructive collisions.
fn find_magic(
    rng: &mut StdRng,
    sq: u8,
    mask: Bitboard,
    bits: u32,
    dirs: &[(i8, i8); 4],
) -> (u64, Vec<Bitboard>) {
    let occs = subsets(mask);
    let refs: Vec<Bitboard> = occs.iter().map(|&o| ray_attacks(sq, o, dirs)).collect();
    let size = 1usize << bits;
    let shift = 64 - bits;

    loop {
        // Sparse candidates converge far faster than uniform ones.
        let factor = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.wrapping_mul(factor) >> 56).count_ones() < 6 {
            continue;
        }

        let mut table = vec![EMPTY; size];
        let mut used = vec![false; size];
        let mut ok = true;
        for (occ, attack) in occs.iter().zip(refs.iter()) {
            let idx = (occ.wrapping_mul(factor) >> shift) as usize;
            if !used[idx] {
                used[idx] = true;
                table[idx] = *attack;
            } else if table[idx] != *attack {
                ok = false;
                break;
            }
        }
        if ok {
            return (factor, table);
        }
    }
}

fn build_slider(rng: &mut StdRng, rook: bool) -> (Vec<Magic>, Vec<Bitboard>) {
    let dirs = if rook { &ROOK_DIRS } else { &BISHOP_DIRS };
    let mut magics = Vec::with_capacity(64);
    let mut table = Vec::new();

    for sq in 0..64u8 {
        let mask = relevant_mask(sq, dirs);
        let bits = popcount(mask);
        let (factor, sub_table) = find_magic(rng, sq, mask, bits, dirs);
        magics.push(Magic {
            mask,
            factor,
            shift: (64 - bits) as u8,
            offset: table.len(),
        });
        table.extend_from_slice(&sub_table);
    }

    (magics, table)
}

// ============================================================
// Ray tables
// ============================================================

fn build_rays() -> (Vec<Bitboard>, Vec<Bitboard>) {
    let mut between = vec![EMPTY; 64 * 64];
    let mut line = vec![EMPTY; 64 * 64];
    for a in 0..64u8 {
        for b in 0..64u8 {
            if a == b {
                continue;
            }
            for dirs in [&BISHOP_DIRS, &ROOK_DIRS] {
                if ray_attacks(a, EMPTY, dirs) & square_bb(b) != 0 {
                    between[a as usize * 64 + b as usize] =
                        ray_attacks(a, square_bb(b), dirs) & ray_attacks(b, square_bb(a), dirs);
                    line[a as usize * 64 + b as usize] = (ray_attacks(a, EMPTY, dirs)
                        & ray_attacks(b, EMPTY, dirs))
                        | square_bb(a)
                        | square_bb(b);
                }
            }
        }
    }
    (between, line)
}

// ============================================================
// Lookups
// ============================================================

#[inline]
pub fn knight_attacks(sq: u8) -> Bitboard {
    tables().knight[sq as usize]
}

#[inline]
pub fn king_attacks(sq: u8) -> Bitboard {
    tables().king[sq as usize]
}

/// Squares a pawn of `color` standing on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: u8, color: Color) -> Bitboard {
    tables().pawn[color.index()][sq as usize]
}

#[inline]
pub fn bishop_attacks(sq: u8, occ: Bitboard) -> Bitboard {
    let t = tables();
    let m = &t.bishop_magics[sq as usize];
    let idx = ((occ & m.mask).wrapping_mul(m.factor) >> m.shift) as usize;
    t.bishop_table[m.offset + idx]
}

#[inline]
pub fn rook_attacks(sq: u8, occ: Bitboard) -> Bitboard {
    let t = tables();
    let m = &t.rook_magics[sq as usize];
    let idx = ((occ & m.mask).wrapping_mul(m.factor) >> m.shift) as usize;
    t.rook_table[m.offset + idx]
}

#[inline]
pub fn queen_attacks(sq: u8, occ: Bitboard) -> Bitboard {
    bishop_attacks(sq, occ) | rook_attacks(sq, occ)
}

/// Slider dispatch used by generic callers.
#[inline]
pub fn slider_attacks(piece: Piece, sq: u8, occ: Bitboard) -> Bitboard {
    match piece {
        Piece::Bishop => bishop_attacks(sq, occ),
        Piece::Rook => rook_attacks(sq, occ),
        Piece::Queen => queen_attacks(sq, occ),
        _ => unreachable!("not a slider: {:?}", piece),
    }
}

/// Squares strictly between `a` and `b`, or empty if they share no line.
#[inline]
pub fn between(a: u8, b: u8) -> Bitboard {
    tables().between[a as usize * 64 + b as usize]
}

/// The full line through `a` and `b` (both included), or empty.
#[inline]
pub fn line(a: u8, b: u8) -> Bitboard {
    tables().line[a as usize * 64 + b as usize]
}

/// Are `a`, `b`, `c` collinear on a rank, file, or diagonal?
#[inline]
pub fn aligned(a: u8, b: u8, c: u8) -> bool {
    line(a, b) & square_bb(c) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn setup() {
        init();
    }

    #[test]
    fn leaper_counts() {
        setup();
        assert_eq!(popcount(knight_attacks(sq::E4)), 8);
        assert_eq!(popcount(knight_attacks(sq::A1)), 2);
        assert_eq!(popcount(king_attacks(sq::E4)), 8);
        assert_eq!(popcount(king_attacks(sq::A1)), 3);
        assert_eq!(popcount(pawn_attacks(sq::E4, Color::White)), 2);
        assert_eq!(popcount(pawn_attacks(sq::A2, Color::White)), 1);
        assert_eq!(pawn_attacks(sq::E4, Color::White) & square_bb(sq::D5), square_bb(sq::D5));
    }

    #[test]
    fn slider_counts_on_empty_board() {
        setup();
        assert_eq!(popcount(bishop_attacks(sq::E4, EMPTY)), 13);
        assert_eq!(popcount(rook_attacks(sq::E4, EMPTY)), 14);
        assert_eq!(popcount(queen_attacks(sq::E4, EMPTY)), 27);
    }

    #[test]
    fn magics_match_ray_scan() {
        setup();
        // Random occupancies across random squares: the magic lookup must
        // agree with the slow scan exactly, with no cross-square aliasing.
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let sq = rng.gen_range(0..64u8);
            let occ: Bitboard = rng.gen::<u64>() & rng.gen::<u64>();
            assert_eq!(bishop_attacks(sq, occ), ray_attacks(sq, occ, &BISHOP_DIRS));
            assert_eq!(rook_attacks(sq, occ), ray_attacks(sq, occ, &ROOK_DIRS));
        }
    }

    #[test]
    fn blockers_cut_rays() {
        setup();
        let occ = square_bb(sq::E5);
        let r = rook_attacks(sq::E1, occ);
        assert!(r & square_bb(sq::E5) != 0, "blocker square is attacked");
        assert!(r & square_bb(sq::E7) == 0, "squares past the blocker are not");
    }

    #[test]
    fn between_and_line() {
        setup();
        assert_eq!(popcount(between(sq::A1, sq::H8)), 6);
        assert_eq!(between(sq::A1, sq::B1), 0);
        assert_eq!(between(sq::A1, sq::B8), 0, "no shared line");
        assert!(line(sq::A1, sq::H8) & square_bb(sq::D4) != 0);
        assert!(aligned(sq::E1, sq::E8, sq::E4));
        assert!(!aligned(sq::E1, sq::D4, sq::H8));
    }
}
