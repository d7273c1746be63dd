//! Time management: turn a clock state into a budget and a stopping policy.
//!
//! The budget starts from `time / expected-moves-remaining + 0.8 * increment`
//! and is scaled up for middlegame positions, material imbalance, and
//! position complexity. `panic_ms` is the smaller soft limit consulted
//! between iterations once a depth-1 result exists; the full budget is the
//! hard in-search limit.

use crate::bitboard::popcount;
use crate::board::Board;
use crate::eval;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub infinite: bool,
}

pub struct TimeManager {
    start: Instant,
    /// Hard limit checked inside the search.
    budget_ms: u64,
    /// Soft limit checked between iterations.
    panic_ms: u64,
    node_cap: u64,
    pub max_depth: i32,
    infinite: bool,
}

pub const MAX_DEPTH: i32 = 64;

impl TimeManager {
    pub fn new(params: &GoParams, board: &Board) -> Self {
        let max_depth = params.depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH);

        if params.infinite {
            return TimeManager {
                start: Instant::now(),
                budget_ms: u64::MAX,
                panic_ms: u64::MAX,
                node_cap: params.nodes.unwrap_or(u64::MAX),
                max_depth,
                infinite: true,
            };
        }

        if let Some(movetime) = params.movetime {
            return TimeManager {
                start: Instant::now(),
                budget_ms: movetime.saturating_sub(25).max(1),
                panic_ms: movetime.saturating_sub(25).max(1),
                node_cap: params.nodes.unwrap_or(u64::MAX),
                max_depth,
                infinite: false,
            };
        }

        let (time_left, increment) = match board.side {
            crate::bitboard::Color::White => {
                (params.wtime.unwrap_or(0), params.winc.unwrap_or(0))
            }
            crate::bitboard::Color::Black => {
                (params.btime.unwrap_or(0), params.binc.unwrap_or(0))
            }
        };

        if time_left == 0 {
            // Depth- or node-limited search with no clock.
            return TimeManager {
                start: Instant::now(),
                budget_ms: u64::MAX,
                panic_ms: u64::MAX,
                node_cap: params.nodes.unwrap_or(u64::MAX),
                max_depth,
                infinite: params.depth.is_none() && params.nodes.is_none(),
            };
        }

        let piece_count = popcount(board.all_occupancy) as u64;
        let expected_moves = params.movestogo.unwrap_or(match piece_count {
            25.. => 35,
            15..=24 => 25,
            _ => 20,
        });

        let base = time_left / expected_moves.max(1) + increment * 4 / 5;

        // Middlegame positions deserve the most thought.
        let phase_factor = match piece_count {
            27.. => 0.75,
            15..=26 => 1.25,
            _ => 0.95,
        };

        let imbalance = (board.non_pawn_material(crate::bitboard::Color::White)
            - board.non_pawn_material(crate::bitboard::Color::Black))
        .unsigned_abs() as f64;
        let imbalance_factor = 1.0 + (imbalance.min(400.0) / 1600.0);

        let complexity = eval::complexity(board) as f64;
        let complexity_factor = 1.0 + (complexity.min(600.0) / 2400.0);

        let mut budget = (base as f64 * phase_factor * imbalance_factor * complexity_factor) as u64;

        // Never bank more than a quarter of the clock on one move, and keep
        // a flag-safety reserve.
        budget = budget.min(time_left / 4).max(30);
        let reserve = (time_left / 100).clamp(10, 100);
        budget = budget.saturating_sub(reserve).max(20);

        // Node cap keyed to the time control: bullet games cannot afford
        // runaway subtree counts even when the clock check misfires.
        let node_cap = params.nodes.unwrap_or(if time_left < 60_000 {
            40_000_000
        } else {
            400_000_000
        });

        TimeManager {
            start: Instant::now(),
            budget_ms: budget,
            panic_ms: (budget * 3 / 5).max(10),
            node_cap,
            max_depth,
            infinite: false,
        }
    }

    /// A manager that never stops on its own; the stop flag rules.
    pub fn infinite() -> Self {
        TimeManager::new(&GoParams { infinite: true, ..GoParams::default() }, &Board::start_pos())
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Hard stop, polled inside the search at node-count intervals.
    #[inline]
    pub fn out_of_time(&self, nodes: u64) -> bool {
        if nodes > self.node_cap {
            return true;
        }
        if self.infinite {
            return false;
        }
        self.elapsed_ms() >= self.budget_ms
    }

    /// Decide whether to begin another iteration. `drops` counts sharp score
    /// falls between completed iterations; `stable_iterations` counts
    /// consecutive iterations with the same best move and a steady score.
    pub fn should_stop(
        &self,
        depth: i32,
        _score: i32,
        nodes: u64,
        drops: u32,
        stable_iterations: u32,
    ) -> bool {
        if depth >= self.max_depth {
            return true;
        }
        if nodes > self.node_cap {
            return true;
        }
        if self.infinite {
            return false;
        }

        let elapsed = self.elapsed_ms();
        if elapsed >= self.budget_ms {
            return true;
        }
        // Once a depth-1 result exists the soft limit applies.
        if depth > 1 && elapsed >= self.panic_ms {
            return true;
        }
        // The score collapsed twice and a real share of the budget is gone:
        // accept what we have rather than thrash.
        if drops >= 2 && elapsed * 3 >= self.budget_ms {
            return true;
        }
        // Nothing has changed for several iterations past half the budget.
        if stable_iterations >= 4 && elapsed * 2 >= self.budget_ms {
            return true;
        }
        false
    }
}
