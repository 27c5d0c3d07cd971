use peregrine::board::Board;
use peregrine::moves::execute::{make_move, undo_move};
use peregrine::moves::magic::MagicTables;
use peregrine::moves::magic::loader::load_magic_tables;
use peregrine::moves::movegen::generate_all_moves;
use peregrine::moves::square_control::in_check;
use peregrine::moves::types::MoveList;
use peregrine::search::eval::evaluate;
use peregrine::search::search::{
    INFINITY, MATE, SearchInfo, alpha_beta, probe_pv_line, search_position,
};
use std::str::FromStr;
use std::time::Duration;

#[test]
fn stalemate_scores_zero_with_no_best_move() {
    let tables = load_magic_tables();
    let mut board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut info = SearchInfo::new(4);

    let (score, best) = search_position(&mut board, tables, &mut info);
    assert_eq!(score, 0);
    assert_eq!(best, None);
}

#[test]
fn mate_in_one_is_found_with_the_right_score_and_pv() {
    let tables = load_magic_tables();
    let mut board = Board::from_str("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let mut info = SearchInfo::new(3);

    let (score, best) = search_position(&mut board, tables, &mut info);
    assert_eq!(score, MATE - 1, "mate delivered at search ply 1");
    assert_eq!(best.expect("a best move").to_uci(), "a1a8");
}

#[test]
fn mate_in_two_prefers_the_shorter_ladder() {
    let tables = load_magic_tables();
    // two rooks roll the king up the board: 1.Rb7+ Kd8/f8 2.Ra8#
    let mut board = Board::from_str("4k3/8/8/8/8/8/RR6/4K3 w - - 0 1").unwrap();
    let mut info = SearchInfo::new(5);

    let (score, best) = search_position(&mut board, tables, &mut info);
    assert_eq!(score, MATE - 3, "mate delivered at search ply 3");
    assert!(best.is_some());
}

#[test]
fn mated_side_sees_the_negated_mate_score() {
    let tables = load_magic_tables();
    // black to move, about to be mated however it plays
    let mut board = Board::from_str("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    let mut info = SearchInfo::new(3);
    let (score, _) = search_position(&mut board, tables, &mut info);
    assert_eq!(score, -MATE, "mated on the spot scores -MATE + 0");
}

#[test]
fn fifty_move_rule_draws_the_search() {
    let tables = load_magic_tables();
    // white is a queen up, but the clock already reads 100
    let mut board = Board::from_str("4k3/8/8/8/8/8/8/Q3K3 w - - 100 80").unwrap();
    let mut info = SearchInfo::new(4);
    let (score, _) = search_position(&mut board, tables, &mut info);
    assert_eq!(score, 0);
}

#[test]
fn search_leaves_the_board_exactly_as_it_found_it() {
    let tables = load_magic_tables();
    let mut board =
        Board::from_str("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let before = board.clone();
    let mut info = SearchInfo::new(4);
    let _ = search_position(&mut board, tables, &mut info);
    assert_eq!(board, before);
}

#[test]
fn pv_line_is_playable_from_the_root() {
    let tables = load_magic_tables();
    let mut board = Board::new();
    let mut info = SearchInfo::new(4);
    let _ = search_position(&mut board, tables, &mut info);

    let pv = probe_pv_line(&mut board, tables, 4);
    assert!(!pv.is_empty(), "a completed search must leave a PV");

    // every PV move must be legal in sequence
    let mut made = 0;
    for &mv in pv.iter() {
        assert!(make_move(&mut board, tables, mv), "PV move {mv} illegal");
        made += 1;
    }
    for _ in 0..made {
        undo_move(&mut board);
    }
}

#[test]
fn search_wins_a_hanging_queen() {
    let tables = load_magic_tables();
    // the white queen on d4 hangs to the black queen on d8
    let mut board = Board::from_str("3qk3/8/8/8/3Q4/8/8/3K4 b - - 0 1").unwrap();
    let mut info = SearchInfo::new(3);
    let (score, best) = search_position(&mut board, tables, &mut info);
    assert!(score > 700, "winning the queen should dominate, got {score}");
    assert_eq!(best.unwrap().to_uci(), "d8d4");
}

#[test]
fn search_respects_the_stop_flag_immediately() {
    let tables = load_magic_tables();
    let mut board = Board::new();
    // a zero time budget stops the very first checkup
    let mut info = SearchInfo::with_time_limit(12, Duration::from_millis(0));
    let (_, best) = search_position(&mut board, tables, &mut info);
    // no completed iteration: no best move, and the board is untouched
    assert!(best.is_none());
    assert_eq!(board, Board::new());
}

#[test]
fn timed_search_finishes_near_its_budget() {
    let tables = load_magic_tables();
    let mut board = Board::new();
    let mut info = SearchInfo::with_time_limit(64, Duration::from_millis(150));
    let start = std::time::Instant::now();
    let _ = search_position(&mut board, tables, &mut info);
    // generous ceiling: the poll happens every 2048 nodes
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(board, Board::new());
}

// ---------------------------------------------------------------------
// Negamax cross-check: a plain, pruning-free minimax must agree with
// alpha-beta at full width.
// ---------------------------------------------------------------------

fn minimax(
    board: &mut Board,
    tables: &MagicTables,
    depth: i32,
    ply: i32,
) -> i32 {
    if depth == 0 {
        return evaluate(board);
    }
    if board.is_repetition() || board.halfmove_clock >= 100 {
        return 0;
    }

    let mut list = MoveList::new();
    generate_all_moves(board, tables, &mut list);

    let mut best = -INFINITY;
    let mut legal = 0;
    for &mv in list.iter() {
        if !make_move(board, tables, mv) {
            continue;
        }
        legal += 1;
        let score = -minimax(board, tables, depth - 1, ply + 1);
        undo_move(board);
        if score > best {
            best = score;
        }
    }

    if legal == 0 {
        return if in_check(board, board.side_to_move, tables) {
            -MATE + ply
        } else {
            0
        };
    }
    best
}

#[test]
fn alpha_beta_equals_minimax_at_full_width() {
    let tables = load_magic_tables();
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
        "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
        "3qk3/8/8/8/3Q4/8/8/3K4 b - - 0 1",
    ];
    for fen in fens {
        for depth in 1..=3 {
            let mut board = Board::from_str(fen).unwrap();
            let expected = minimax(&mut board, tables, depth, 0);

            let mut board = Board::from_str(fen).unwrap();
            let mut info = SearchInfo::new(depth);
            let got = alpha_beta(&mut board, tables, &mut info, -INFINITY, INFINITY, depth, 0);

            assert_eq!(got, expected, "disagreement at depth {depth} on {fen}");
        }
    }
}

#[test]
fn fail_high_statistics_accumulate() {
    let tables = load_magic_tables();
    let mut board =
        Board::from_str("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let mut info = SearchInfo::new(4);
    let _ = search_position(&mut board, tables, &mut info);
    assert!(info.nodes > 0);
    assert!(info.fail_high > 0.0, "a real middlegame search produces cutoffs");
    assert!(info.fail_high_first <= info.fail_high);
    let ratio = info.ordering();
    assert!((0.0..=1.0).contains(&ratio));
}
