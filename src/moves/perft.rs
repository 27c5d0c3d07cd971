use crate::board::Board;
use crate::moves::execute::{make_move, undo_move};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_all_moves;
use crate::moves::square_control::in_check;
use crate::moves::types::MoveList;
use tracing::{debug, instrument};

const MAX_PERFT_DEPTH: usize = 16;

/// Per-kind totals for the final ply of a perft run, comparable against
/// the published breakdown tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        PerftCounters::default()
    }

    pub fn add(&mut self, other: &PerftCounters) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.ep_captures += other.ep_captures;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
    }
}

fn perft_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    buffers: &mut [MoveList],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    generate_all_moves(board, tables, &mut buffers[ply]);

    let count = buffers[ply].len();
    let mut nodes = 0;
    for i in 0..count {
        let mv = buffers[ply][i];
        if !make_move(board, tables, mv) {
            continue; // pseudo-legal only; the king was left in check
        }
        nodes += perft_recursive(board, tables, depth - 1, ply + 1, buffers);
        undo_move(board);
    }
    nodes
}

/// Count leaf nodes of the full move tree to `depth`. The reference
/// correctness check for generation and make/unmake together.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    assert!(
        (depth as usize) < MAX_PERFT_DEPTH,
        "perft depth {} exceeds the buffer stack",
        depth
    );
    let mut buffers: [MoveList; MAX_PERFT_DEPTH] = std::array::from_fn(|_| MoveList::new());
    perft_recursive(board, tables, depth, 0, &mut buffers)
}

/// Perft with per-root-move subtotals, printed one per line. The handy
/// form for diffing against another engine when a total disagrees.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft_divide(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    assert!(
        depth >= 1 && (depth as usize) < MAX_PERFT_DEPTH,
        "perft_divide depth {} out of range",
        depth
    );
    let mut buffers: [MoveList; MAX_PERFT_DEPTH] = std::array::from_fn(|_| MoveList::new());

    let mut roots = MoveList::new();
    generate_all_moves(board, tables, &mut roots);

    let mut total = 0;
    for &mv in roots.iter() {
        if !make_move(board, tables, mv) {
            continue;
        }
        let nodes = perft_recursive(board, tables, depth - 1, 1, &mut buffers);
        undo_move(board);
        debug!(%mv, nodes, "divide: root move subtotal");
        println!("{}: {}", mv, nodes);
        total += nodes;
    }
    println!("Total: {}", total);
    total
}

fn perft_count_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    out: &mut PerftCounters,
    buffers: &mut [MoveList],
) {
    generate_all_moves(board, tables, &mut buffers[ply]);

    let count = buffers[ply].len();
    for i in 0..count {
        let mv = buffers[ply][i];
        if !make_move(board, tables, mv) {
            continue;
        }

        if depth == 1 {
            // final ply: tag the move and the resulting position
            out.nodes += 1;
            if mv.is_capture() {
                out.captures += 1;
            }
            if mv.is_en_passant() {
                out.captures += 1;
                out.ep_captures += 1;
            }
            if mv.is_castle() {
                out.castles += 1;
            }
            if mv.is_promotion() {
                out.promotions += 1;
            }
            if in_check(board, board.side_to_move, tables) {
                out.checks += 1;
                let mut replies = MoveList::new();
                generate_all_moves(board, tables, &mut replies);
                let any_legal = replies.iter().any(|&reply| {
                    if make_move(board, tables, reply) {
                        undo_move(board);
                        true
                    } else {
                        false
                    }
                });
                if !any_legal {
                    out.checkmates += 1;
                }
            }
        } else {
            perft_count_recursive(board, tables, depth - 1, ply + 1, out, buffers);
        }

        undo_move(board);
    }
}

/// Perft with the per-kind breakdown of the final ply: captures, en
/// passant, castles, promotions, checks and checkmates.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft_count_with_breakdown(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
) -> PerftCounters {
    assert!(
        depth >= 1 && (depth as usize) < MAX_PERFT_DEPTH,
        "perft breakdown depth {} out of range",
        depth
    );
    let mut buffers: [MoveList; MAX_PERFT_DEPTH] = std::array::from_fn(|_| MoveList::new());
    let mut out = PerftCounters::zero();
    perft_count_recursive(board, tables, depth, 0, &mut out, &mut buffers);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;

    #[test]
    fn perft_zero_is_one() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, load_magic_tables(), 0), 1);
    }

    #[test]
    fn perft_leaves_the_board_untouched() {
        let tables = load_magic_tables();
        let mut board = Board::new();
        let before = board.clone();
        let _ = perft(&mut board, tables, 3);
        assert_eq!(board, before);
    }

    #[test]
    fn divide_sums_to_perft() {
        let tables = load_magic_tables();
        let mut board = Board::new();
        let divided = perft_divide(&mut board, tables, 2);
        let plain = perft(&mut board, tables, 2);
        assert_eq!(divided, plain);
    }

    #[test]
    fn breakdown_nodes_match_plain_perft() {
        let tables = load_magic_tables();
        let mut board = Board::new();
        let breakdown = perft_count_with_breakdown(&mut board, tables, 3);
        assert_eq!(breakdown.nodes, perft(&mut board, tables, 3));
        assert_eq!(breakdown.captures, 34);
        assert_eq!(breakdown.checks, 12);
        assert_eq!(breakdown.checkmates, 0);
    }

    #[test]
    fn counters_accumulate() {
        let mut a = PerftCounters::zero();
        let b = PerftCounters {
            nodes: 3,
            captures: 1,
            ..PerftCounters::zero()
        };
        a.add(&b);
        a.add(&b);
        assert_eq!(a.nodes, 6);
        assert_eq!(a.captures, 2);
    }
}
