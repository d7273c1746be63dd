//! Opening book: a static weighted move list keyed by position hash.
//!
//! The file format is one entry per line:
//!
//! ```text
//! <piece placement> <side> <castling> <ep> <move> <weight>
//! rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 40
//! ```
//!
//! A missing file or an unparsable line degrades to "no book move"; the
//! book is a convenience, never a requirement.

use crate::board::Board;
use crate::movegen;
use crate::moves::Move;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct Book {
    entries: HashMap<u64, Vec<(String, u32)>>,
    rng: StdRng,
}

impl Book {
    pub fn empty() -> Self {
        Book {
            entries: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Read a book file. Lines that do not parse are skipped with a note on
    /// the info channel; a missing file yields an empty book.
    pub fn load(path: &Path) -> Self {
        let mut book = Book::empty();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("info string no opening book at {}: {}", path.display(), err);
                return book;
            }
        };

        let mut skipped = 0usize;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if book.add_line(line).is_none() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            eprintln!("info string opening book: skipped {} bad lines", skipped);
        }
        eprintln!("info string opening book: {} positions", book.entries.len());
        book
    }

    fn add_line(&mut self, line: &str) -> Option<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return None;
        }
        let fen = format!("{} {} {} {} 0 1", fields[0], fields[1], fields[2], fields[3]);
        let board = Board::from_fen(&fen).ok()?;
        let weight: u32 = fields[5].parse().ok()?;
        // The move is validated lazily at probe time against the live
        // position; store it as written.
        self.entries
            .entry(board.hash)
            .or_default()
            .push((fields[4].to_string(), weight.max(1)));
        Some(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted-random book move for `board`, if the position is known and
    /// the stored move is legal.
    pub fn probe(&mut self, board: &Board) -> Option<Move> {
        let candidates = self.entries.get(&board.hash)?;
        let legal: Vec<(Move, u32)> = candidates
            .iter()
            .filter_map(|(text, weight)| {
                movegen::resolve_move(board, text).ok().map(|m| (m, *weight))
            })
            .collect();
        if legal.is_empty() {
            return None;
        }

        let total: u32 = legal.iter().map(|(_, w)| w).sum();
        let mut roll = self.rng.gen_range(0..total);
        for (m, weight) in &legal {
            if roll < *weight {
                return Some(*m);
            }
            roll -= weight;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attacks, zobrist};

    fn setup() {
        zobrist::init();
        attacks::init();
    }

    fn book_from(lines: &str) -> Book {
        let mut book = Book::empty();
        for line in lines.lines() {
            let line = line.trim();
            if !line.is_empty() {
                let _ = book.add_line(line);
            }
        }
        book
    }

    #[test]
    fn probes_known_position() {
        setup();
        let mut book = book_from(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 60
             rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - d2d4 40",
        );
        let board = Board::start_pos();
        let m = book.probe(&board).expect("book covers the start position");
        assert!(m.to_uci() == "e2e4" || m.to_uci() == "d2d4");
    }

    #[test]
    fn unknown_position_returns_none() {
        setup();
        let mut book = book_from(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 60",
        );
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(book.probe(&board), None);
    }

    #[test]
    fn illegal_book_moves_are_filtered() {
        setup();
        let mut book = book_from(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e5 100",
        );
        let board = Board::start_pos();
        assert_eq!(book.probe(&board), None, "e2e5 is not legal from the start");
    }

    #[test]
    fn bad_lines_are_skipped_not_fatal() {
        setup();
        let book = book_from(
            "this is not a book line
             rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 notanumber
             rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 10",
        );
        assert_eq!(book.entries.len(), 1);
    }

    #[test]
    fn missing_file_yields_empty_book() {
        setup();
        let book = Book::load(Path::new("/nonexistent/book.txt"));
        assert!(book.is_empty());
    }
}
