//! Board state: per-piece bitboards with incremental Zobrist hashing and an
//! undo stack. All mutation goes through `make_move`/`unmake_move` and the
//! null-move pair; `movegen` only hands these functions legal moves.

use crate::attacks;
use crate::bitboard::*;
use crate::moves::*;
use crate::zobrist;
use thiserror::Error;

pub const WK_CASTLE: u8 = 0b0001;
pub const WQ_CASTLE: u8 = 0b0010;
pub const BK_CASTLE: u8 = 0b0100;
pub const BQ_CASTLE: u8 = 0b1000;
pub const ALL_CASTLES: u8 = 0b1111;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("FEN needs at least 4 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid piece character {0:?}")]
    BadPiece(char),
    #[error("rank {0} does not describe exactly 8 files")]
    BadRank(u8),
    #[error("invalid side to move {0:?}")]
    BadSide(String),
    #[error("invalid castling character {0:?}")]
    BadCastling(char),
    #[error("invalid en passant square {0:?}")]
    BadEnPassant(String),
    #[error("side {0:?} must have exactly one king")]
    KingCount(&'static str),
}

/// State restored by `unmake_move`; owned by the matching make call.
#[derive(Clone, Copy)]
pub struct UndoInfo {
    pub hash: u64,
    pub castling: u8,
    pub ep_square: Option<u8>,
    pub halfmove: u16,
    pub captured: Option<Piece>,
}

#[derive(Clone)]
pub struct Board {
    /// pieces[color][piece]
    pub pieces: [[Bitboard; PIECE_COUNT]; COLOR_COUNT],
    pub occupancy: [Bitboard; COLOR_COUNT],
    pub all_occupancy: Bitboard,

    pub side: Color,
    pub castling: u8,
    pub ep_square: Option<u8>,
    pub halfmove: u16,
    pub fullmove: u16,

    pub hash: u64,
    pub history: Vec<UndoInfo>,
}

impl Board {
    pub fn empty() -> Self {
        Board {
            pieces: [[EMPTY; PIECE_COUNT]; COLOR_COUNT],
            occupancy: [EMPTY; COLOR_COUNT],
            all_occupancy: EMPTY,
            side: Color::White,
            castling: 0,
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
            hash: 0,
            history: Vec::with_capacity(256),
        }
    }

    pub fn start_pos() -> Self {
        Self::from_fen(START_FEN).expect("start FEN is valid")
    }

    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ParseError::FieldCount(parts.len()));
        }

        let mut rank: i8 = 7;
        let mut file: i8 = 0;
        for ch in parts[0].chars() {
            match ch {
                '/' => {
                    if file != 8 {
                        return Err(ParseError::BadRank(rank as u8));
                    }
                    rank -= 1;
                    file = 0;
                    if rank < 0 {
                        return Err(ParseError::BadRank(0));
                    }
                }
                '1'..='8' => {
                    file += ch.to_digit(10).unwrap() as i8;
                    if file > 8 {
                        return Err(ParseError::BadRank(rank as u8));
                    }
                }
                _ => {
                    if file >= 8 {
                        return Err(ParseError::BadRank(rank as u8));
                    }
                    let color = if ch.is_uppercase() { Color::White } else { Color::Black };
                    let piece = Piece::from_char(ch).ok_or(ParseError::BadPiece(ch))?;
                    board.put_piece(piece, color, make_square(file as u8, rank as u8));
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err(ParseError::BadRank(rank.max(0) as u8));
        }

        board.side = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ParseError::BadSide(other.to_string())),
        };

        if parts[2] != "-" {
            for ch in parts[2].chars() {
                board.castling |= match ch {
                    'K' => WK_CASTLE,
                    'Q' => WQ_CASTLE,
                    'k' => BK_CASTLE,
                    'q' => BQ_CASTLE,
                    _ => return Err(ParseError::BadCastling(ch)),
                };
            }
        }

        board.ep_square = if parts[3] == "-" {
            None
        } else {
            Some(
                parse_square(parts[3])
                    .ok_or_else(|| ParseError::BadEnPassant(parts[3].to_string()))?,
            )
        };

        board.halfmove = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        board.fullmove = parts.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
            if popcount(board.pieces[color.index()][Piece::King.index()]) != 1 {
                return Err(ParseError::KingCount(name));
            }
        }

        board.hash = board.compute_hash();
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(make_square(file, rank)) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            for (bit, ch) in [
                (WK_CASTLE, 'K'),
                (WQ_CASTLE, 'Q'),
                (BK_CASTLE, 'k'),
                (BQ_CASTLE, 'q'),
            ] {
                if self.castling & bit != 0 {
                    fen.push(ch);
                }
            }
        }

        fen.push(' ');
        match self.ep_square {
            Some(s) => fen.push_str(square_name(s)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove, self.fullmove));
        fen
    }

    // ============================================================
    // Piece placement primitives
    // ============================================================

    #[inline]
    pub fn put_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        let bb = square_bb(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupancy[color.index()] |= bb;
        self.all_occupancy |= bb;
    }

    #[inline]
    pub fn remove_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        let bb = square_bb(sq);
        self.pieces[color.index()][piece.index()] &= !bb;
        self.occupancy[color.index()] &= !bb;
        self.all_occupancy &= !bb;
    }

    #[inline]
    pub fn shift_piece(&mut self, piece: Piece, color: Color, from: u8, to: u8) {
        let mask = square_bb(from) | square_bb(to);
        self.pieces[color.index()][piece.index()] ^= mask;
        self.occupancy[color.index()] ^= mask;
        self.all_occupancy ^= mask;
    }

    pub fn piece_at(&self, sq: u8) -> Option<(Piece, Color)> {
        for color in [Color::White, Color::Black] {
            if let Some(piece) = self.piece_on(sq, color) {
                return Some((piece, color));
            }
        }
        None
    }

    pub fn piece_on(&self, sq: u8, color: Color) -> Option<Piece> {
        let bb = square_bb(sq);
        if self.occupancy[color.index()] & bb == 0 {
            return None;
        }
        Piece::ALL
            .iter()
            .copied()
            .find(|p| self.pieces[color.index()][p.index()] & bb != 0)
    }

    #[inline]
    pub fn king_sq(&self, color: Color) -> u8 {
        lsb(self.pieces[color.index()][Piece::King.index()])
    }

    /// Non-pawn, non-king material of `color` in centipawns. Gates null-move
    /// pruning in zugzwang-prone endgames.
    pub fn non_pawn_material(&self, color: Color) -> i32 {
        let p = &self.pieces[color.index()];
        popcount(p[Piece::Knight.index()]) as i32 * 320
            + popcount(p[Piece::Bishop.index()]) as i32 * 330
            + popcount(p[Piece::Rook.index()]) as i32 * 500
            + popcount(p[Piece::Queen.index()]) as i32 * 900
    }

    // ============================================================
    // Hashing
    // ============================================================

    /// Full recomputation; the incremental hash must always agree.
    pub fn compute_hash(&self) -> u64 {
        let keys = zobrist::keys();
        let mut h: u64 = 0;

        for color in 0..COLOR_COUNT {
            for piece in 0..PIECE_COUNT {
                for s in Bits(self.pieces[color][piece]) {
                    h ^= keys.piece[color][piece][s as usize];
                }
            }
        }
        h ^= keys.castling[self.castling as usize];
        if let Some(ep) = self.ep_square {
            h ^= keys.en_passant[file_of(ep) as usize];
        }
        if self.side == Color::Black {
            h ^= keys.side;
        }
        h
    }

    /// Hash over pawn placement only, for the evaluator's pawn cache.
    pub fn pawn_key(&self) -> u64 {
        let keys = zobrist::keys();
        let mut h: u64 = 0;
        for color in 0..COLOR_COUNT {
            for s in Bits(self.pieces[color][Piece::Pawn.index()]) {
                h ^= keys.piece[color][Piece::Pawn.index()][s as usize];
            }
        }
        h
    }

    // ============================================================
    // Make / unmake
    // ============================================================

    /// Castling rights surviving a move touching each square.
    const CASTLE_MASK: [u8; 64] = {
        let mut mask = [ALL_CASTLES; 64];
        mask[sq::A1 as usize] &= !WQ_CASTLE;
        mask[sq::E1 as usize] &= !(WK_CASTLE | WQ_CASTLE);
        mask[sq::H1 as usize] &= !WK_CASTLE;
        mask[sq::A8 as usize] &= !BQ_CASTLE;
        mask[sq::E8 as usize] &= !(BK_CASTLE | BQ_CASTLE);
        mask[sq::H8 as usize] &= !BK_CASTLE;
        mask
    };

    /// Apply a legal move. The caller must only pass moves produced by
    /// `movegen::generate` (or resolved through it).
    pub fn make_move(&mut self, m: Move) {
        let keys = zobrist::keys();
        let us = self.side;
        let them = us.flip();
        let from = m.from_sq();
        let to = m.to_sq();
        let piece = m.piece();

        self.history.push(UndoInfo {
            hash: self.hash,
            castling: self.castling,
            ep_square: self.ep_square,
            halfmove: self.halfmove,
            captured: m.captured(),
        });

        if let Some(ep) = self.ep_square {
            self.hash ^= keys.en_passant[file_of(ep) as usize];
        }
        self.ep_square = None;
        self.hash ^= keys.castling[self.castling as usize];
        self.halfmove += 1;

        match m.flags() {
            FLAG_QUIET | FLAG_DOUBLE_PAWN => {
                self.shift_piece(piece, us, from, to);
                self.hash ^= keys.piece[us.index()][piece.index()][from as usize];
                self.hash ^= keys.piece[us.index()][piece.index()][to as usize];
                if piece == Piece::Pawn {
                    self.halfmove = 0;
                }
                if m.is_double_pawn() {
                    let ep = if us == Color::White { from + 8 } else { from - 8 };
                    self.ep_square = Some(ep);
                    self.hash ^= keys.en_passant[file_of(ep) as usize];
                }
            }
            FLAG_KING_CASTLE | FLAG_QUEEN_CASTLE => {
                self.shift_piece(Piece::King, us, from, to);
                self.hash ^= keys.piece[us.index()][Piece::King.index()][from as usize];
                self.hash ^= keys.piece[us.index()][Piece::King.index()][to as usize];
                let (rf, rt) = m.rook_squares(us).expect("castle move");
                self.shift_piece(Piece::Rook, us, rf, rt);
                self.hash ^= keys.piece[us.index()][Piece::Rook.index()][rf as usize];
                self.hash ^= keys.piece[us.index()][Piece::Rook.index()][rt as usize];
            }
            FLAG_EP_CAPTURE => {
                let cap_sq = if us == Color::White { to - 8 } else { to + 8 };
                self.remove_piece(Piece::Pawn, them, cap_sq);
                self.hash ^= keys.piece[them.index()][Piece::Pawn.index()][cap_sq as usize];
                self.shift_piece(Piece::Pawn, us, from, to);
                self.hash ^= keys.piece[us.index()][Piece::Pawn.index()][from as usize];
                self.hash ^= keys.piece[us.index()][Piece::Pawn.index()][to as usize];
                self.halfmove = 0;
            }
            _ => {
                // Plain captures and every promotion variant.
                if m.is_capture() && !m.is_en_passant() {
                    let victim = m.captured().expect("capture flag set");
                    self.remove_piece(victim, them, to);
                    self.hash ^= keys.piece[them.index()][victim.index()][to as usize];
                    self.halfmove = 0;
                }
                if let Some(promo) = m.promotion() {
                    self.remove_piece(Piece::Pawn, us, from);
                    self.hash ^= keys.piece[us.index()][Piece::Pawn.index()][from as usize];
                    self.put_piece(promo, us, to);
                    self.hash ^= keys.piece[us.index()][promo.index()][to as usize];
                    self.halfmove = 0;
                } else {
                    self.shift_piece(piece, us, from, to);
                    self.hash ^= keys.piece[us.index()][piece.index()][from as usize];
                    self.hash ^= keys.piece[us.index()][piece.index()][to as usize];
                }
            }
        }

        self.castling &= Self::CASTLE_MASK[from as usize] & Self::CASTLE_MASK[to as usize];
        self.hash ^= keys.castling[self.castling as usize];

        self.side = them;
        self.hash ^= keys.side;
        if us == Color::Black {
            self.fullmove += 1;
        }

        debug_assert!(self.check_invariants());
    }

    /// Invert `make_move`, restoring the prior state bit for bit.
    pub fn unmake_move(&mut self, m: Move) {
        let undo = self.history.pop().expect("unmake without make");

        self.side = self.side.flip();
        let us = self.side;
        let them = us.flip();
        if us == Color::Black {
            self.fullmove -= 1;
        }

        let from = m.from_sq();
        let to = m.to_sq();

        match m.flags() {
            FLAG_QUIET | FLAG_DOUBLE_PAWN => {
                self.shift_piece(m.piece(), us, to, from);
            }
            FLAG_KING_CASTLE | FLAG_QUEEN_CASTLE => {
                self.shift_piece(Piece::King, us, to, from);
                let (rf, rt) = m.rook_squares(us).expect("castle move");
                self.shift_piece(Piece::Rook, us, rt, rf);
            }
            FLAG_EP_CAPTURE => {
                self.shift_piece(Piece::Pawn, us, to, from);
                let cap_sq = if us == Color::White { to - 8 } else { to + 8 };
                self.put_piece(Piece::Pawn, them, cap_sq);
            }
            _ => {
                if let Some(promo) = m.promotion() {
                    self.remove_piece(promo, us, to);
                    self.put_piece(Piece::Pawn, us, from);
                } else {
                    self.shift_piece(m.piece(), us, to, from);
                }
                if m.is_capture() {
                    self.put_piece(undo.captured.expect("capture flag set"), them, to);
                }
            }
        }

        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.halfmove = undo.halfmove;
        self.hash = undo.hash;

        debug_assert!(self.check_invariants());
    }

    /// Pass the turn. Used by null-move pruning.
    pub fn make_null_move(&mut self) {
        let keys = zobrist::keys();
        self.history.push(UndoInfo {
            hash: self.hash,
            castling: self.castling,
            ep_square: self.ep_square,
            halfmove: self.halfmove,
            captured: None,
        });
        if let Some(ep) = self.ep_square {
            self.hash ^= keys.en_passant[file_of(ep) as usize];
        }
        self.ep_square = None;
        self.side = self.side.flip();
        self.hash ^= keys.side;
    }

    pub fn unmake_null_move(&mut self) {
        let undo = self.history.pop().expect("unmake without make");
        self.side = self.side.flip();
        self.ep_square = undo.ep_square;
        self.halfmove = undo.halfmove;
        self.hash = undo.hash;
    }

    // ============================================================
    // Attack queries
    // ============================================================

    /// All pieces of `by` attacking `sq` under occupancy `occ`.
    pub fn attackers_to(&self, sq: u8, by: Color, occ: Bitboard) -> Bitboard {
        let p = &self.pieces[by.index()];
        attacks::pawn_attacks(sq, by.flip()) & p[Piece::Pawn.index()]
            | attacks::knight_attacks(sq) & p[Piece::Knight.index()]
            | attacks::king_attacks(sq) & p[Piece::King.index()]
            | attacks::bishop_attacks(sq, occ)
                & (p[Piece::Bishop.index()] | p[Piece::Queen.index()])
            | attacks::rook_attacks(sq, occ) & (p[Piece::Rook.index()] | p[Piece::Queen.index()])
    }

    #[inline]
    pub fn is_square_attacked(&self, sq: u8, by: Color) -> bool {
        self.attackers_to(sq, by, self.all_occupancy) != 0
    }

    /// Enemy pieces currently giving check.
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.attackers_to(self.king_sq(self.side), self.side.flip(), self.all_occupancy)
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers() != 0
    }

    // ============================================================
    // Draw detection
    // ============================================================

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove >= 100
    }

    /// Has the current position occurred before within the reversible-move
    /// window? Twofold inside the search tree is scored as a draw.
    pub fn is_repetition(&self) -> bool {
        let window = (self.halfmove as usize).min(self.history.len());
        self.history
            .iter()
            .rev()
            .take(window)
            .skip(1)
            .step_by(2)
            .any(|u| u.hash == self.hash)
    }

    // ============================================================
    // Debug checks
    // ============================================================

    /// Structural invariants, asserted in debug builds after each mutation.
    pub fn check_invariants(&self) -> bool {
        let mut union = EMPTY;
        for color in 0..COLOR_COUNT {
            let mut side_union = EMPTY;
            for piece in 0..PIECE_COUNT {
                let bb = self.pieces[color][piece];
                if side_union & bb != 0 {
                    return false;
                }
                side_union |= bb;
            }
            if side_union != self.occupancy[color] {
                return false;
            }
            if popcount(self.pieces[color][Piece::King.index()]) != 1 {
                return false;
            }
            union |= side_union;
        }
        if self.occupancy[0] & self.occupancy[1] != 0 {
            return false;
        }
        if union != self.all_occupancy {
            return false;
        }
        self.hash == self.compute_hash()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            out.push_str(&format!("  {} ", rank + 1));
            for file in 0..8 {
                match self.piece_at(make_square(file, rank)) {
                    Some((piece, color)) => out.push(piece.to_char(color)),
                    None => out.push('.'),
                }
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("    a b c d e f g h\n");
        out.push_str(&format!("  FEN: {}\n  Hash: 0x{:016X}\n", self.to_fen(), self.hash));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;

    fn setup() {
        zobrist::init();
        attacks::init();
    }

    #[test]
    fn start_position_layout() {
        setup();
        let board = Board::start_pos();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(popcount(board.all_occupancy), 32);
        assert_eq!(board.king_sq(Color::White), sq::E1);
        assert_eq!(board.king_sq(Color::Black), sq::E8);
        assert!(board.check_invariants());
    }

    #[test]
    fn fen_round_trip() {
        setup();
        let fens = [
            START_FEN,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "8/8/8/8/8/8/8/4K2k w - - 0 1",
        ];
        for fen in fens {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen, "round trip failed for {fen}");
        }
    }

    #[test]
    fn fen_rejects_garbage() {
        setup();
        assert!(matches!(
            Board::from_fen("only three fields"),
            Err(ParseError::FieldCount(3))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1"),
            Err(ParseError::BadPiece('X'))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(ParseError::BadSide(_))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KZkq - 0 1"),
            Err(ParseError::BadCastling('Z'))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1"),
            Err(ParseError::BadEnPassant(_))
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(ParseError::KingCount("black"))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(ParseError::BadRank(_))
        ));
    }

    #[test]
    fn incremental_hash_matches_recomputation() {
        setup();
        let board = Board::start_pos();
        assert_eq!(board.hash, board.compute_hash());
    }

    #[test]
    fn make_unmake_restores_everything() {
        setup();
        let fens = [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/ppp1pppp/8/8/2pP4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 2",
        ];
        for fen in fens {
            let mut board = Board::from_fen(fen).unwrap();
            let before_fen = board.to_fen();
            let before_hash = board.hash;
            for m in movegen::generate(&board) {
                board.make_move(m);
                assert_eq!(board.hash, board.compute_hash(), "after {m} in {fen}");
                board.unmake_move(m);
                assert_eq!(board.hash, before_hash, "hash after unmake {m} in {fen}");
                assert_eq!(board.to_fen(), before_fen, "state after unmake {m} in {fen}");
            }
        }
    }

    #[test]
    fn null_move_round_trip() {
        setup();
        let mut board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        let hash = board.hash;
        board.make_null_move();
        assert_eq!(board.side, Color::White);
        assert_eq!(board.ep_square, None);
        assert_eq!(board.hash, board.compute_hash());
        board.unmake_null_move();
        assert_eq!(board.hash, hash);
        assert_eq!(board.side, Color::Black);
    }

    #[test]
    fn repetition_detection() {
        setup();
        let mut board = Board::start_pos();
        let to_move = |b: &Board, text: &str| movegen::resolve_move(b, text).unwrap();
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = to_move(&board, text);
            board.make_move(m);
        }
        // Back to the starting position with both sides having shuffled.
        assert!(board.is_repetition());
    }

    #[test]
    fn fifty_move_clock() {
        setup();
        let board =
            Board::from_fen("8/8/8/8/8/8/8/K6k w - - 100 80").unwrap();
        assert!(board.is_fifty_move_draw());
    }
}
