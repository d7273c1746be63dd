//! Syzygy endgame tablebase probing. The tablebase is an oracle: when a
//! position is covered it returns an exact result, and every failure mode
//! (no tables loaded, too many pieces, castling rights, probe error) simply
//! yields `None` so the search carries on unassisted.

use crate::bitboard::popcount;
use crate::board::Board;
use crate::eval::MATE_THRESHOLD;
use crate::movegen;
use crate::moves::Move;

use shakmaty::{fen::Fen, CastlingMode, Chess};
use shakmaty_syzygy::{AmbiguousWdl, Tablebase as SyzygyTablebase};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static SYZYGY: OnceLock<Mutex<SyzygyTablebase<Chess>>> = OnceLock::new();
static MAX_PIECES: OnceLock<u32> = OnceLock::new();

/// Load tablebase files from a list of directories separated by `:` or `;`.
/// Reports what it found on the UCI info channel; never fails the engine.
pub fn init(paths: &str) {
    let mut tablebase = SyzygyTablebase::new();
    let mut total = 0usize;

    for path in paths.split([':', ';']) {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        if !Path::new(path).exists() {
            eprintln!("info string syzygy path not found: {}", path);
            continue;
        }
        match tablebase.add_directory(path) {
            Ok(count) => {
                total += count;
                eprintln!("info string loaded {} tablebase files from {}", count, path);
            }
            Err(err) => {
                eprintln!("info string tablebase error in {}: {}", path, err);
            }
        }
    }

    if total > 0 {
        let max = tablebase.max_pieces() as u32;
        eprintln!("info string syzygy ready, up to {} pieces", max);
        let _ = MAX_PIECES.set(max);
    } else {
        let _ = MAX_PIECES.set(0);
    }
    let _ = SYZYGY.set(Mutex::new(tablebase));
}

pub fn available() -> bool {
    max_pieces() > 0
}

pub fn max_pieces() -> u32 {
    *MAX_PIECES.get().unwrap_or(&0)
}

/// WDL probe mapped into the search's score space: wins sit below real mate
/// scores, losses mirror them, draws are zero. `None` when the oracle
/// cannot answer.
pub fn probe(board: &Board, ply: usize) -> Option<i32> {
    if !available() {
        return None;
    }
    if popcount(board.all_occupancy) > max_pieces() {
        return None;
    }
    // Tables assume no castling rights remain.
    if board.castling != 0 {
        return None;
    }

    let position = to_shakmaty(board)?;
    let tablebase = SYZYGY.get()?.lock().ok()?;
    let wdl = tablebase.probe_wdl(&position).ok()?;

    let tb_win = MATE_THRESHOLD - 512 - ply as i32;
    Some(match wdl {
        AmbiguousWdl::Win | AmbiguousWdl::MaybeWin => tb_win,
        AmbiguousWdl::Loss | AmbiguousWdl::MaybeLoss => -tb_win,
        // Cursed wins and blessed losses are draws under the 50-move rule.
        AmbiguousWdl::Draw | AmbiguousWdl::CursedWin | AmbiguousWdl::BlessedLoss => 0,
    })
}

/// Root probe: the tablebase's DTZ-optimal move resolved against the legal
/// move list, with its score. A covered root position needs no search at
/// all; `None` hands control back to the normal search path.
pub fn probe_root(board: &Board) -> Option<(Move, i32)> {
    if !available() {
        return None;
    }
    if popcount(board.all_occupancy) > max_pieces() || board.castling != 0 {
        return None;
    }

    let position = to_shakmaty(board)?;
    let (text, score) = {
        let tablebase = SYZYGY.get()?.lock().ok()?;
        let (best, dtz) = tablebase.best_move(&position).ok()??;
        let plies = dtz.ignore_rounding().0;
        let score = if plies > 0 {
            MATE_THRESHOLD - 512 - plies.min(255)
        } else if plies < 0 {
            -(MATE_THRESHOLD - 512) - plies.max(-255)
        } else {
            0
        };
        (best.to_uci(CastlingMode::Standard).to_string(), score)
    };
    let m = movegen::resolve_move(board, &text).ok()?;
    Some((m, score))
}

/// Round-trip through FEN: simplest reliable bridge between the engine's
/// bitboards and shakmaty's position type.
fn to_shakmaty(board: &Board) -> Option<Chess> {
    let fen: Fen = board.to_fen().parse().ok()?;
    fen.into_position(CastlingMode::Standard).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attacks, zobrist};

    fn setup() {
        zobrist::init();
        attacks::init();
    }

    #[test]
    fn degrades_gracefully_without_tables() {
        setup();
        // No tablebase files in the test environment.
        let board = Board::from_fen("8/8/8/8/8/2k5/2p5/2K5 w - - 0 1").unwrap();
        if !available() {
            assert_eq!(probe(&board, 0), None);
        }
    }

    #[test]
    fn shakmaty_bridge_accepts_legal_positions() {
        setup();
        let board = Board::from_fen("8/8/8/8/8/2k5/2p5/2K5 w - - 0 1").unwrap();
        assert!(to_shakmaty(&board).is_some());
        let board = Board::start_pos();
        assert!(to_shakmaty(&board).is_some());
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        setup();
        init("/nonexistent/syzygy/path");
        // Still unavailable, still no panic.
        let board = Board::from_fen("8/8/8/8/8/2k5/2p5/2K5 w - - 0 1").unwrap();
        assert_eq!(probe(&board, 0), None);
        assert!(probe_root(&board).is_none());
    }
}
