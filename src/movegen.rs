//! Legal move generation. Moves that would leave the mover's king in check
//! never appear in the output list:
//! - double check restricts generation to king moves,
//! - single check restricts non-king moves to the evasion mask (capture the
//!   checker or block a sliding checker's ray),
//! - pinned pieces only move along the ray joining them to their king,
//! - en passant simulates the two vacated pawn squares against sliders,
//! - castling verifies rights, empty span, and an unattacked king transit.

use crate::attacks;
use crate::bitboard::*;
use crate::board::*;
use crate::moves::*;

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenMode {
    All,
    /// Captures plus queen promotions, for quiescence search.
    Captures,
}

pub fn generate(board: &Board) -> MoveList {
    generate_mode(board, GenMode::All)
}

pub fn generate_captures(board: &Board) -> MoveList {
    generate_mode(board, GenMode::Captures)
}

fn generate_mode(board: &Board, mode: GenMode) -> MoveList {
    let mut list = MoveList::new();
    let us = board.side;
    let them = us.flip();
    let ksq = board.king_sq(us);
    let our_occ = board.occupancy[us.index()];
    let their_occ = board.occupancy[them.index()];
    let all_occ = board.all_occupancy;
    let caps_only = mode == GenMode::Captures;

    let checkers = board.checkers();

    // King moves are tested against attacks with the king lifted off the
    // board, so a slider's ray extends through its current square.
    let occ_no_king = all_occ ^ square_bb(ksq);
    let mut king_targets = attacks::king_attacks(ksq) & !our_occ;
    if caps_only {
        king_targets &= their_occ;
    }
    for to in Bits(king_targets) {
        if board.attackers_to(to, them, occ_no_king) != 0 {
            continue;
        }
        match board.piece_on(to, them) {
            Some(victim) => list.push(Move::new_capture(ksq, to, FLAG_CAPTURE, Piece::King, victim)),
            None => list.push(Move::new(ksq, to, FLAG_QUIET, Piece::King)),
        }
    }

    if popcount(checkers) >= 2 {
        return list;
    }

    // Evasion masks: where non-king moves may capture or land.
    let (capture_mask, push_mask) = if checkers != 0 {
        (checkers, attacks::between(ksq, lsb(checkers)))
    } else {
        (FULL, FULL)
    };

    // Pieces pinned to our king by an enemy slider.
    let enemy = &board.pieces[them.index()];
    let snipers = attacks::bishop_attacks(ksq, EMPTY)
        & (enemy[Piece::Bishop.index()] | enemy[Piece::Queen.index()])
        | attacks::rook_attacks(ksq, EMPTY)
            & (enemy[Piece::Rook.index()] | enemy[Piece::Queen.index()]);
    let mut pinned = EMPTY;
    for sniper in Bits(snipers) {
        let blockers = attacks::between(ksq, sniper) & all_occ;
        if popcount(blockers) == 1 && blockers & our_occ != 0 {
            pinned |= blockers;
        }
    }
    let pin_ray = |from: u8| -> Bitboard {
        if pinned & square_bb(from) != 0 {
            attacks::line(ksq, from)
        } else {
            FULL
        }
    };

    let mine = &board.pieces[us.index()];

    // Knights: a pinned knight can never stay on its pin ray.
    for from in Bits(mine[Piece::Knight.index()] & !pinned) {
        let att = attacks::knight_attacks(from) & !our_occ;
        push_piece_moves(&mut list, board, Piece::Knight, from, att, capture_mask, push_mask, them, caps_only);
    }

    for piece in [Piece::Bishop, Piece::Rook, Piece::Queen] {
        for from in Bits(mine[piece.index()]) {
            let att = attacks::slider_attacks(piece, from, all_occ) & !our_occ & pin_ray(from);
            push_piece_moves(&mut list, board, piece, from, att, capture_mask, push_mask, them, caps_only);
        }
    }

    // Pawns: per-pawn loop so the pin ray applies uniformly to pushes,
    // captures, promotions, and en passant.
    let (up, promo_rank_from): (i8, u8) = match us {
        Color::White => (8, 6),
        Color::Black => (-8, 1),
    };
    for from in Bits(mine[Piece::Pawn.index()]) {
        let allowed = pin_ray(from);
        let promoting = rank_of(from) == promo_rank_from;

        // Single and double pushes.
        let one = (from as i8 + up) as u8;
        if all_occ & square_bb(one) == 0 {
            if square_bb(one) & push_mask & allowed != 0 {
                if promoting {
                    push_promotions(&mut list, from, one, None, caps_only);
                } else if !caps_only {
                    list.push(Move::new(from, one, FLAG_QUIET, Piece::Pawn));
                }
            }
            if relative_rank(from, us) == 1 && !caps_only {
                let two = (one as i8 + up) as u8;
                if all_occ & square_bb(two) == 0 && square_bb(two) & push_mask & allowed != 0 {
                    list.push(Move::new(from, two, FLAG_DOUBLE_PAWN, Piece::Pawn));
                }
            }
        }

        // Captures.
        let att = attacks::pawn_attacks(from, us) & their_occ & capture_mask & allowed;
        for to in Bits(att) {
            let victim = board.piece_on(to, them).expect("capture target occupied");
            if promoting {
                push_promotions(&mut list, from, to, Some(victim), caps_only);
            } else {
                list.push(Move::new_capture(from, to, FLAG_CAPTURE, Piece::Pawn, victim));
            }
        }

        // En passant, with the discovered-check-through-the-gap test: lift
        // both pawns, land ours on the target, and scan sliders at the king.
        if let Some(ep) = board.ep_square {
            if attacks::pawn_attacks(from, us) & square_bb(ep) != 0 {
                let cap_sq = (ep as i8 - up) as u8;
                let resolves_check = checkers == 0
                    || square_bb(cap_sq) & capture_mask != 0
                    || square_bb(ep) & push_mask != 0;
                if resolves_check && allowed & square_bb(ep) != 0 {
                    let occ_after =
                        (all_occ ^ square_bb(from) ^ square_bb(cap_sq)) | square_bb(ep);
                    let exposed = attacks::rook_attacks(ksq, occ_after)
                        & (enemy[Piece::Rook.index()] | enemy[Piece::Queen.index()])
                        | attacks::bishop_attacks(ksq, occ_after)
                            & (enemy[Piece::Bishop.index()] | enemy[Piece::Queen.index()]);
                    if exposed == 0 {
                        list.push(Move::new(from, ep, FLAG_EP_CAPTURE, Piece::Pawn));
                    }
                }
            }
        }
    }

    // Castling: never while in check, never into or through attacks.
    if checkers == 0 && !caps_only {
        let rights = board.castling;
        let clear = |squares: Bitboard| all_occ & squares == 0;
        let safe = |squares: &[u8]| squares.iter().all(|&s| !board.is_square_attacked(s, them));
        match us {
            Color::White => {
                if rights & WK_CASTLE != 0
                    && clear(square_bb(sq::F1) | square_bb(sq::G1))
                    && safe(&[sq::F1, sq::G1])
                {
                    list.push(Move::new(sq::E1, sq::G1, FLAG_KING_CASTLE, Piece::King));
                }
                if rights & WQ_CASTLE != 0
                    && clear(square_bb(sq::B1) | square_bb(sq::C1) | square_bb(sq::D1))
                    && safe(&[sq::D1, sq::C1])
                {
                    list.push(Move::new(sq::E1, sq::C1, FLAG_QUEEN_CASTLE, Piece::King));
                }
            }
            Color::Black => {
                if rights & BK_CASTLE != 0
                    && clear(square_bb(sq::F8) | square_bb(sq::G8))
                    && safe(&[sq::F8, sq::G8])
                {
                    list.push(Move::new(sq::E8, sq::G8, FLAG_KING_CASTLE, Piece::King));
                }
                if rights & BQ_CASTLE != 0
                    && clear(square_bb(sq::B8) | square_bb(sq::C8) | square_bb(sq::D8))
                    && safe(&[sq::D8, sq::C8])
                {
                    list.push(Move::new(sq::E8, sq::C8, FLAG_QUEEN_CASTLE, Piece::King));
                }
            }
        }
    }

    list
}

#[allow(clippy::too_many_arguments)]
fn push_piece_moves(
    list: &mut MoveList,
    board: &Board,
    piece: Piece,
    from: u8,
    attacks: Bitboard,
    capture_mask: Bitboard,
    push_mask: Bitboard,
    them: Color,
    caps_only: bool,
) {
    let their_occ = board.occupancy[them.index()];
    for to in Bits(attacks & their_occ & capture_mask) {
        let victim = board.piece_on(to, them).expect("capture target occupied");
        list.push(Move::new_capture(from, to, FLAG_CAPTURE, piece, victim));
    }
    if !caps_only {
        for to in Bits(attacks & !their_occ & push_mask) {
            list.push(Move::new(from, to, FLAG_QUIET, piece));
        }
    }
}

fn push_promotions(list: &mut MoveList, from: u8, to: u8, victim: Option<Piece>, queen_only: bool) {
    let promos: &[u32] = if queen_only && victim.is_none() {
        &[0b0011]
    } else {
        &[0b0011, 0b0010, 0b0001, 0b0000]
    };
    for &p in promos {
        match victim {
            Some(v) => list.push(Move::new_capture(
                from,
                to,
                FLAG_PROMO | FLAG_CAPTURE | p,
                Piece::Pawn,
                v,
            )),
            None => list.push(Move::new(from, to, FLAG_PROMO | p, Piece::Pawn)),
        }
    }
}

/// Resolve long algebraic move text against the legal moves of `board`.
pub fn resolve_move(board: &Board, text: &str) -> Result<Move, InvalidMoveError> {
    let (from, to, promo) = parse_long_algebraic(text)?;
    generate(board)
        .into_iter()
        .find(|m| m.from_sq() == from && m.to_sq() == to && m.promotion() == promo)
        .ok_or_else(|| InvalidMoveError::NotLegal(text.to_string()))
}

/// Count leaf nodes of the full legal move tree to `depth`.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for m in moves {
        board.make_move(m);
        nodes += perft(board, depth - 1);
        board.unmake_move(m);
    }
    nodes
}

/// Perft with a per-root-move breakdown, for debugging discrepancies.
pub fn perft_divide(board: &mut Board, depth: u32) -> u64 {
    let mut total = 0;
    for m in generate(board) {
        board.make_move(m);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.unmake_move(m);
        println!("{}: {}", m, nodes);
        total += nodes;
    }
    println!("\nTotal: {}", total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist;

    fn setup() {
        zobrist::init();
        attacks::init();
    }

    #[test]
    fn twenty_moves_from_start() {
        setup();
        let board = Board::start_pos();
        assert_eq!(generate(&board).len(), 20);
    }

    #[test]
    fn perft_start_position() {
        setup();
        let mut board = Board::start_pos();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8_902);
        assert_eq!(perft(&mut board, 4), 197_281);
    }

    #[test]
    fn perft_kiwipete() {
        setup();
        let mut board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&mut board, 1), 48);
        assert_eq!(perft(&mut board, 2), 2_039);
        assert_eq!(perft(&mut board, 3), 97_862);
    }

    #[test]
    fn perft_endgame_pins() {
        setup();
        let mut board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut board, 1), 14);
        assert_eq!(perft(&mut board, 2), 191);
        assert_eq!(perft(&mut board, 3), 2_812);
        assert_eq!(perft(&mut board, 4), 43_238);
    }

    #[test]
    fn perft_promotion_heavy() {
        setup();
        let mut board = Board::from_fen(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&mut board, 1), 6);
        assert_eq!(perft(&mut board, 2), 264);
        assert_eq!(perft(&mut board, 3), 9_467);
    }

    #[test]
    fn perft_talkchess_position() {
        setup();
        let mut board = Board::from_fen(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        )
        .unwrap();
        assert_eq!(perft(&mut board, 1), 44);
        assert_eq!(perft(&mut board, 2), 1_486);
        assert_eq!(perft(&mut board, 3), 62_379);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        setup();
        // Knight on f6 and rook on e1 both check the king on e8.
        let board = Board::from_fen("4k3/8/5N2/8/8/8/8/4R2K b - - 0 1").unwrap();
        let moves = generate(&board);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece() == Piece::King));
    }

    #[test]
    fn single_check_block_or_capture() {
        setup();
        // Rook on e8 checks the king on e1; Be5 blocks the ray.
        let board = Board::from_fen("4r2k/8/8/8/8/2B5/8/R3K3 w - - 0 1").unwrap();
        let moves = generate(&board);
        for m in &moves {
            if m.piece() == Piece::King {
                continue;
            }
            let resolves = m.to_sq() == sq::E8
                || attacks::between(sq::E1, sq::E8) & square_bb(m.to_sq()) != 0;
            assert!(resolves, "{m} neither blocks nor captures the checker");
        }
        assert!(moves.iter().any(|m| m.piece() == Piece::Bishop));
    }

    #[test]
    fn pinned_piece_stays_on_the_ray() {
        setup();
        // White rook on e4 is pinned by the rook on e8.
        let board = Board::from_fen("4r2k/8/8/8/4R3/8/8/4K3 w - - 0 1").unwrap();
        let moves = generate(&board);
        for m in moves.iter().filter(|m| m.piece() == Piece::Rook) {
            assert_eq!(file_of(m.to_sq()), 4, "pinned rook left the e-file: {m}");
        }
    }

    #[test]
    fn en_passant_discovered_rank_check() {
        setup();
        // After ...d7d5, exd6 would lift both pawns off rank 5 and expose
        // the white king to the rook on h5.
        let board = Board::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        let moves = generate(&board);
        assert!(
            moves.iter().all(|m| !m.is_en_passant()),
            "en passant must be rejected here"
        );
    }

    #[test]
    fn en_passant_normally_legal() {
        setup();
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/8/2pP4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 2")
                .unwrap();
        // c4xd3 must be generated for black.
        assert!(generate(&board).iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn castling_both_sides() {
        setup();
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = generate(&board);
        assert!(moves.iter().any(|m| m.flags() == FLAG_KING_CASTLE));
        assert!(moves.iter().any(|m| m.flags() == FLAG_QUEEN_CASTLE));

        // Kingside castle lands king g1, rook f1.
        let mut board = board;
        let castle = moves.iter().copied().find(|m| m.flags() == FLAG_KING_CASTLE).unwrap();
        board.make_move(castle);
        assert_eq!(board.king_sq(Color::White), sq::G1);
        assert!(board.pieces[Color::White.index()][Piece::Rook.index()] & square_bb(sq::F1) != 0);
    }

    #[test]
    fn castling_blocked_by_attack_on_transit() {
        setup();
        // Black rook on f8 covers f1: kingside transit is attacked.
        let board = Board::from_fen("5r2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = generate(&board);
        assert!(moves.iter().all(|m| m.flags() != FLAG_KING_CASTLE));
        assert!(moves.iter().any(|m| m.flags() == FLAG_QUEEN_CASTLE));
    }

    #[test]
    fn checkmate_has_no_moves() {
        setup();
        // Back-rank mate: black king h8, white queen g7 defended by king g6.
        let board = Board::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(board.in_check());
        assert!(generate(&board).is_empty());
    }

    #[test]
    fn stalemate_has_no_moves_but_no_check() {
        setup();
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.in_check());
        assert!(generate(&board).is_empty());
    }

    #[test]
    fn captures_mode_is_a_subset() {
        setup();
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = generate(&board);
        let caps = generate_captures(&board);
        assert!(!caps.is_empty());
        for m in &caps {
            assert!(m.is_capture() || m.promotion() == Some(Piece::Queen));
            assert!(all.iter().any(|a| a.0 == m.0), "{m} missing from full list");
        }
    }

    #[test]
    fn resolve_move_round_trip() {
        setup();
        let board = Board::start_pos();
        let m = resolve_move(&board, "e2e4").unwrap();
        assert_eq!(m.to_uci(), "e2e4");
        assert!(m.is_double_pawn());
        assert!(matches!(
            resolve_move(&board, "e2e5"),
            Err(InvalidMoveError::NotLegal(_))
        ));
        assert!(matches!(
            resolve_move(&board, "zzzz"),
            Err(InvalidMoveError::BadSquare(_))
        ));
    }
}
