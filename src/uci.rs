//! UCI protocol loop. Thin glue: commands are parsed here and handed to the
//! search, which runs on its own thread so `stop` stays responsive.

use crate::board::Board;
use crate::book::Book;
use crate::eval::{self, EvalState};
use crate::movegen;
use crate::nnue;
use crate::search::{self, SearchSettings};
use crate::tablebase;
use crate::time::{GoParams, TimeManager};
use crate::tt::TranspositionTable;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

const ENGINE_NAME: &str = "Kagero";
const ENGINE_AUTHOR: &str = "Kagero Team";

struct Engine {
    board: Board,
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    settings: SearchSettings,
    book: Book,
    own_book: bool,
    searcher: Option<JoinHandle<()>>,
}

impl Engine {
    fn new() -> Self {
        Engine {
            board: Board::start_pos(),
            tt: Arc::new(TranspositionTable::new(64)),
            stop: Arc::new(AtomicBool::new(false)),
            settings: SearchSettings::default(),
            book: Book::empty(),
            own_book: false,
            searcher: None,
        }
    }

    fn halt_search(&mut self) {
        if let Some(handle) = self.searcher.take() {
            self.stop.store(true, Ordering::Relaxed);
            let _ = handle.join();
            // The searcher may have finished before the store above; leave
            // the flag clear either way so the next search starts cleanly.
            self.stop.store(false, Ordering::Relaxed);
        }
    }
}

pub fn run() {
    let stdin = io::stdin();
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else { continue };

        match command {
            "uci" => {
                println!("id name {}", ENGINE_NAME);
                println!("id author {}", ENGINE_AUTHOR);
                println!("option name Hash type spin default 64 min 1 max 4096");
                println!("option name Threads type spin default 1 min 1 max 64");
                println!("option name Contempt type spin default 0 min -200 max 200");
                println!("option name SyzygyPath type string default <empty>");
                println!("option name OwnBook type check default false");
                println!("option name BookFile type string default <empty>");
                println!("option name EvalFile type string default <empty>");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.halt_search();
                engine.board = Board::start_pos();
                engine.tt.new_generation();
            }
            "position" => {
                engine.halt_search();
                parse_position(&tokens, &mut engine.board);
            }
            "go" => {
                engine.halt_search();
                go(&mut engine, &tokens);
            }
            "stop" => engine.halt_search(),
            "setoption" => {
                engine.halt_search();
                parse_setoption(&tokens, &mut engine);
            }
            "quit" => {
                engine.halt_search();
                break;
            }
            "d" | "display" => print!("{}", engine.board.render()),
            "eval" => {
                let mut state = EvalState::new(engine.settings.contempt);
                println!("eval: {} cp (side to move)", eval::evaluate(&engine.board, &mut state));
            }
            "perft" => {
                if let Some(depth) = tokens.get(1).and_then(|t| t.parse().ok()) {
                    let start = std::time::Instant::now();
                    let nodes = movegen::perft_divide(&mut engine.board, depth);
                    let ms = start.elapsed().as_millis().max(1) as u64;
                    println!("nodes {} time {}ms nps {}", nodes, ms, nodes * 1000 / ms);
                }
            }
            "bench" => bench(&mut engine),
            // Unknown commands are ignored, per protocol.
            _ => {}
        }
    }
    engine.halt_search();
}

fn go(engine: &mut Engine, tokens: &[&str]) {
    let params = parse_go(tokens);

    if !params.infinite {
        if engine.own_book {
            if let Some(book_move) = engine.book.probe(&engine.board) {
                println!("bestmove {}", book_move);
                return;
            }
        }
        // A tablebase-covered root position is already solved.
        if let Some((tb_move, score)) = tablebase::probe_root(&engine.board) {
            println!("info depth 1 score cp {} pv {}", score, tb_move);
            println!("bestmove {}", tb_move);
            return;
        }
    }

    let tm = Arc::new(TimeManager::new(&params, &engine.board));
    let board = engine.board.clone();
    let tt = engine.tt.clone();
    let stop = engine.stop.clone();
    let settings = engine.settings.clone();

    engine.searcher = Some(std::thread::spawn(move || {
        let result = search::run(&board, tt, tm, stop, &settings, true);
        if result.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", result.best_move);
        }
    }));
}

fn parse_position(tokens: &[&str], board: &mut Board) {
    let mut idx = 1;
    match tokens.get(idx) {
        Some(&"startpos") => {
            *board = Board::start_pos();
            idx += 1;
        }
        Some(&"fen") => {
            idx += 1;
            let mut fields = Vec::new();
            while idx < tokens.len() && tokens[idx] != "moves" {
                fields.push(tokens[idx]);
                idx += 1;
            }
            match Board::from_fen(&fields.join(" ")) {
                Ok(parsed) => *board = parsed,
                Err(err) => {
                    eprintln!("info string bad fen: {}", err);
                    return;
                }
            }
        }
        _ => return,
    }

    if tokens.get(idx) == Some(&"moves") {
        for text in &tokens[idx + 1..] {
            match movegen::resolve_move(board, text) {
                Ok(m) => board.make_move(m),
                Err(err) => {
                    // Never apply an unrecognized move, nor anything after it.
                    eprintln!("info string {}", err);
                    break;
                }
            }
        }
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let number = |i: usize| tokens.get(i + 1).and_then(|t| t.parse::<u64>().ok());
    for (i, &token) in tokens.iter().enumerate() {
        match token {
            "wtime" => params.wtime = number(i),
            "btime" => params.btime = number(i),
            "winc" => params.winc = number(i),
            "binc" => params.binc = number(i),
            "movestogo" => params.movestogo = number(i),
            "depth" => params.depth = number(i).map(|d| d as i32),
            "nodes" => params.nodes = number(i),
            "movetime" => params.movetime = number(i),
            "infinite" => params.infinite = true,
            _ => {}
        }
    }
    params
}

fn parse_setoption(tokens: &[&str], engine: &mut Engine) {
    let mut name = String::new();
    let mut value = String::new();
    let mut target: Option<&mut String> = None;
    for &token in &tokens[1..] {
        match token {
            "name" => target = Some(&mut name),
            "value" => target = Some(&mut value),
            _ => {
                if let Some(buf) = target.as_deref_mut() {
                    if !buf.is_empty() {
                        buf.push(' ');
                    }
                    buf.push_str(token);
                }
            }
        }
    }

    match name.to_lowercase().as_str() {
        "hash" => {
            if let Ok(mb) = value.parse::<usize>() {
                engine.tt = Arc::new(TranspositionTable::new(mb.clamp(1, 4096)));
            }
        }
        "threads" => {
            if let Ok(threads) = value.parse::<usize>() {
                engine.settings.threads = threads.clamp(1, 64);
            }
        }
        "contempt" => {
            if let Ok(contempt) = value.parse::<i32>() {
                engine.settings.contempt = contempt.clamp(-200, 200);
            }
        }
        "syzygypath" => {
            if !value.is_empty() && value != "<empty>" {
                tablebase::init(&value);
            }
        }
        "ownbook" => engine.own_book = value.eq_ignore_ascii_case("true"),
        "bookfile" => {
            if !value.is_empty() && value != "<empty>" {
                engine.book = Book::load(Path::new(&value));
            }
        }
        "evalfile" => {
            if !value.is_empty() && value != "<empty>" {
                if let Err(err) = nnue::load(Some(Path::new(&value))) {
                    eprintln!("info string could not load network: {}", err);
                } else {
                    eprintln!("info string network loaded from {}", value);
                }
            }
        }
        _ => {}
    }
}

/// Fixed-position node-count benchmark, reachable as a console command.
fn bench(engine: &mut Engine) {
    let positions = [
        crate::board::START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ];

    let mut total_nodes = 0u64;
    let start = std::time::Instant::now();
    for fen in positions {
        let board = Board::from_fen(fen).expect("bench position parses");
        let tm = Arc::new(TimeManager::new(
            &GoParams { depth: Some(6), ..GoParams::default() },
            &board,
        ));
        let result = search::run(
            &board,
            engine.tt.clone(),
            tm,
            engine.stop.clone(),
            &engine.settings,
            false,
        );
        total_nodes += result.nodes;
    }
    let ms = start.elapsed().as_millis().max(1) as u64;
    println!("bench: {} nodes {} ms {} nps", total_nodes, ms, total_nodes * 1000 / ms);
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
    fn parse_go_time_controls() {
        let tokens: Vec<&str> =
            "go wtime 300000 btime 280000 winc 2000 binc 2000 movestogo 40".split_whitespace().collect();
        let params = parse_go(&tokens);
        assert_eq!(params.wtime, Some(300_000));
        assert_eq!(params.btime, Some(280_000));
        assert_eq!(params.winc, Some(2_000));
        assert_eq!(params.movestogo, Some(40));
        assert!(!params.infinite);

        let tokens: Vec<&str> = "go depth 9".split_whitespace().collect();
        assert_eq!(parse_go(&tokens).depth, Some(9));

        let tokens: Vec<&str> = "go infinite".split_whitespace().collect();
        assert!(parse_go(&tokens).infinite);

        let tokens: Vec<&str> = "go movetime 1500 nodes 5000".split_whitespace().collect();
        let params = parse_go(&tokens);
        assert_eq!(params.movetime, Some(1_500));
        assert_eq!(params.nodes, Some(5_000));
    }

    #[test]
    fn parse_position_startpos_and_moves() {
        setup();
        let mut board = Board::start_pos();
        let tokens: Vec<&str> =
            "position startpos moves e2e4 e7e5".split_whitespace().collect();
        parse_position(&tokens, &mut board);
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn parse_position_fen_form() {
        setup();
        let mut board = Board::start_pos();
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let line = format!("position fen {}", fen);
        let tokens: Vec<&str> = line.split_whitespace().collect();
        parse_position(&tokens, &mut board);
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn invalid_move_stops_application() {
        setup();
        let mut board = Board::start_pos();
        let tokens: Vec<&str> =
            "position startpos moves e2e4 e7e9 d2d4".split_whitespace().collect();
        parse_position(&tokens, &mut board);
        // e2e4 applied, the rest dropped.
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn setoption_updates_settings() {
        setup();
        let mut engine = Engine::new();
        let tokens: Vec<&str> =
            "setoption name Threads value 4".split_whitespace().collect();
        parse_setoption(&tokens, &mut engine);
        assert_eq!(engine.settings.threads, 4);

        let tokens: Vec<&str> =
            "setoption name Contempt value 35".split_whitespace().collect();
        parse_setoption(&tokens, &mut engine);
        assert_eq!(engine.settings.contempt, 35);

        let tokens: Vec<&str> =
            "setoption name OwnBook value true".split_whitespace().collect();
        parse_setoption(&tokens, &mut engine);
        assert!(engine.own_book);
    }
}
