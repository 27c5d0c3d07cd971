use crate::board::Board;
use crate::moves::execute::{make_move, undo_move};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_all_moves, move_exists};
use crate::moves::square_control::in_check;
use crate::moves::types::{Move, MoveList};
use crate::search::eval::evaluate;
use std::time::{Duration, Instant};
use tracing::debug;

/// Initial alpha/beta bound; above every reachable score.
pub const INFINITY: i32 = 32_000;
/// Mate scores count down from here by the ply the mate occurs at, so
/// shorter mates score higher. Larger than any static evaluation.
pub const MATE: i32 = 31_000;
pub const MAX_SEARCH_DEPTH: usize = 64;

/// Poll the clock once per this many nodes.
const CHECKUP_MASK: u64 = 2047;

/// Per-search bookkeeping: limits, counters, the cooperative stop flag
/// and the move-ordering statistics.
pub struct SearchInfo {
    pub start_time: Instant,
    pub time_limit: Option<Duration>,
    pub max_depth: i32,
    pub nodes: u64,
    /// Set externally or by the clock; the search unwinds cleanly and
    /// discards the in-flight iteration.
    pub stopped: bool,
    /// Beta cutoffs, and those where the first legal move caused them.
    /// Their ratio measures move-ordering quality.
    pub fail_high: f64,
    pub fail_high_first: f64,
}

impl SearchInfo {
    pub fn new(max_depth: i32) -> Self {
        SearchInfo {
            start_time: Instant::now(),
            time_limit: None,
            max_depth,
            nodes: 0,
            stopped: false,
            fail_high: 0.0,
            fail_high_first: 0.0,
        }
    }

    pub fn with_time_limit(max_depth: i32, limit: Duration) -> Self {
        let mut info = SearchInfo::new(max_depth);
        info.time_limit = Some(limit);
        info
    }

    fn reset(&mut self) {
        self.start_time = Instant::now();
        self.nodes = 0;
        self.stopped = false;
        self.fail_high = 0.0;
        self.fail_high_first = 0.0;
    }

    #[inline(always)]
    fn checkup(&mut self) {
        if let Some(limit) = self.time_limit
            && self.start_time.elapsed() >= limit
        {
            self.stopped = true;
        }
    }

    /// Fraction of beta cutoffs produced by the first legal move; 1.0
    /// means the ordering was perfect wherever it mattered.
    pub fn ordering(&self) -> f64 {
        if self.fail_high > 0.0 {
            self.fail_high_first / self.fail_high
        } else {
            1.0
        }
    }
}

/// Negamax alpha-beta. Returns a score from the perspective of the side
/// to move; `ply` is the distance from the search root.
pub fn alpha_beta(
    board: &mut Board,
    tables: &MagicTables,
    info: &mut SearchInfo,
    mut alpha: i32,
    beta: i32,
    depth: i32,
    ply: i32,
) -> i32 {
    debug_assert!(alpha < beta);

    if depth <= 0 {
        info.nodes += 1;
        return evaluate(board);
    }

    if info.nodes & CHECKUP_MASK == 0 {
        info.checkup();
    }
    info.nodes += 1;

    if board.is_repetition() || board.halfmove_clock >= 100 {
        return 0;
    }

    if ply as usize >= MAX_SEARCH_DEPTH {
        return evaluate(board);
    }

    let mut list = MoveList::new();
    generate_all_moves(board, tables, &mut list);

    let old_alpha = alpha;
    let mut best_move = Move::NONE;
    let mut legal = 0u32;

    for &mv in list.iter() {
        if !make_move(board, tables, mv) {
            continue;
        }
        legal += 1;
        let score = -alpha_beta(board, tables, info, -beta, -alpha, depth - 1, ply + 1);
        undo_move(board);

        if info.stopped {
            // abandon the iteration; every make above has been unwound
            return 0;
        }

        if score >= beta {
            info.fail_high += 1.0;
            if legal == 1 {
                info.fail_high_first += 1.0;
            }
            return beta;
        }
        if score > alpha {
            alpha = score;
            best_move = mv;
        }
    }

    if legal == 0 {
        return if in_check(board, board.side_to_move, tables) {
            // mated here; prefer the shortest mate
            -MATE + ply
        } else {
            0 // stalemate
        };
    }

    if alpha != old_alpha {
        board.pv_table.store(board.zobrist, best_move);
    }

    alpha
}

/// Walk the PV table from the current position, validating each probed
/// move against the generator before trusting it (entries may have been
/// overwritten by colliding positions). The board is restored before
/// returning.
pub fn probe_pv_line(board: &mut Board, tables: &MagicTables, depth: i32) -> MoveList {
    let mut line = MoveList::new();

    while let Some(mv) = board.pv_table.probe(board.zobrist) {
        if line.len() >= depth.min(MAX_SEARCH_DEPTH as i32) as usize {
            break;
        }
        if !move_exists(board, tables, mv) {
            break;
        }
        let made = make_move(board, tables, mv);
        debug_assert!(made, "move_exists vetted this move");
        line.push(mv);
    }

    for _ in 0..line.len() {
        undo_move(board);
    }
    line
}

/// The table's best move for the current position, if it has one.
pub fn probe_pv(board: &Board) -> Option<Move> {
    board.pv_table.probe(board.zobrist)
}

/// Iterative deepening driver. Searches depth 1, 2, .. max_depth,
/// reporting each completed depth, and returns the best score and move
/// of the deepest completed iteration.
pub fn search_position(
    board: &mut Board,
    tables: &MagicTables,
    info: &mut SearchInfo,
) -> (i32, Option<Move>) {
    info.reset();
    board.pv_table.clear();

    let mut best_score = -INFINITY;
    let mut best_move = None;

    for depth in 1..=info.max_depth {
        let score = alpha_beta(board, tables, info, -INFINITY, INFINITY, depth, 0);

        if info.stopped {
            break; // this depth is incomplete; keep the previous result
        }

        best_score = score;
        let pv = probe_pv_line(board, tables, depth);
        if let Some(&first) = pv.first() {
            best_move = Some(first);
        }

        let pv_string: Vec<String> = pv.iter().map(|m| m.to_uci()).collect();
        let elapsed = info.start_time.elapsed().as_millis();
        println!(
            "info depth {} score {} nodes {} time {} ordering {:.2} pv {}",
            depth,
            format_score(score),
            info.nodes,
            elapsed,
            info.ordering(),
            pv_string.join(" ")
        );
        debug!(
            depth,
            score,
            nodes = info.nodes,
            ordering = info.ordering(),
            pv = %pv_string.join(" "),
            "completed depth"
        );

        // a forced mate cannot improve with more depth
        if score.abs() > MATE - MAX_SEARCH_DEPTH as i32 {
            break;
        }
    }

    (best_score, best_move)
}

/// UCI-style score rendering: centipawns, or moves-to-mate when the
/// score is inside the mate window.
fn format_score(score: i32) -> String {
    if score.abs() > MATE - MAX_SEARCH_DEPTH as i32 {
        let plies = MATE - score.abs();
        let moves = (plies + 1) / 2;
        if score > 0 {
            format!("mate {}", moves)
        } else {
            format!("mate -{}", moves)
        }
    } else {
        format!("cp {}", score)
    }
}
