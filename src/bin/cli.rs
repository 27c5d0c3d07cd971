use indicatif::{ProgressBar, ProgressStyle};
use peregrine::board::Board;
use peregrine::logger::init_logging;
use peregrine::moves::execute::{make_move, undo_move};
use peregrine::moves::magic::loader::{MAGIC_SEED, load_magic_tables, write_magic_tables};
use peregrine::moves::magic::precompute::{MagicTableSeed, generate_magic_tables_with_progress};
use peregrine::moves::movegen::{generate_all_moves, parse_move};
use peregrine::moves::perft::{perft, perft_divide};
use peregrine::moves::square_control::in_check;
use peregrine::moves::types::MoveList;
use peregrine::search::eval::evaluate;
use peregrine::search::search::{SearchInfo, search_position};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

fn main() {
    init_logging("logs/peregrine.log", "info");
    peregrine::initialize_tables();
    let tables = load_magic_tables();

    let mut board = Board::new();
    println!("peregrine ready. 'help' lists commands.");

    let stdin = io::stdin();
    let mut out = io::stdout();

    loop {
        print!("> ");
        let _ = out.flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "quit" | "q" => break,
            "help" => print_help(),
            "new" => {
                board = Board::new();
                print_board(&board);
            }
            "fen" => {
                if parts.len() == 1 {
                    println!("{}", board.to_fen());
                } else {
                    let fen = parts[1..].join(" ");
                    match board.set_fen(&fen) {
                        Ok(()) => print_board(&board),
                        Err(e) => println!("bad FEN: {}", e),
                    }
                }
            }
            "d" | "display" => print_board(&board),
            "moves" => {
                let mut list = MoveList::new();
                generate_all_moves(&board, tables, &mut list);
                let mut legal = Vec::new();
                for &mv in list.iter() {
                    if make_move(&mut board, tables, mv) {
                        undo_move(&mut board);
                        legal.push(mv.to_uci());
                    }
                }
                println!("{} legal: {}", legal.len(), legal.join(" "));
            }
            "t" | "undo" => {
                if board.ply == 0 {
                    println!("nothing to take back");
                } else {
                    undo_move(&mut board);
                    print_board(&board);
                }
            }
            "eval" => println!("static eval: {} cp", evaluate(&board)),
            "perft" if parts.len() == 2 => match parts[1].parse::<u32>() {
                Ok(depth) => {
                    let start = Instant::now();
                    let nodes = perft(&mut board, tables, depth);
                    let secs = start.elapsed().as_secs_f64();
                    println!(
                        "perft({}) = {} in {:.3}s ({:.0} nps)",
                        depth,
                        nodes,
                        secs,
                        nodes as f64 / secs.max(1e-9)
                    );
                }
                Err(_) => println!("usage: perft <depth>"),
            },
            "divide" if parts.len() == 2 => match parts[1].parse::<u32>() {
                Ok(depth) if depth >= 1 => {
                    perft_divide(&mut board, tables, depth);
                }
                _ => println!("usage: divide <depth>"),
            },
            "search" | "go" => {
                let mut depth = 6;
                let mut movetime = None;
                let mut i = 1;
                while i < parts.len() {
                    match parts[i] {
                        "depth" if i + 1 < parts.len() => {
                            depth = parts[i + 1].parse().unwrap_or(depth);
                            i += 2;
                        }
                        "movetime" if i + 1 < parts.len() => {
                            movetime = parts[i + 1].parse::<u64>().ok().map(Duration::from_millis);
                            i += 2;
                        }
                        bare => {
                            // a bare number means depth
                            if let Ok(d) = bare.parse() {
                                depth = d;
                            }
                            i += 1;
                        }
                    }
                }
                let mut info = match movetime {
                    Some(limit) => SearchInfo::with_time_limit(depth, limit),
                    None => SearchInfo::new(depth),
                };
                let (score, best) = search_position(&mut board, tables, &mut info);
                match best {
                    Some(mv) => println!("bestmove {} (score cp {})", mv, score),
                    None => println!("no legal moves"),
                }
            }
            "tables" if parts.len() == 2 => regenerate_tables(parts[1]),
            _ => {
                // anything else is tried as a move string, e.g. e2e4, a7a8q
                match parse_move(&mut board, tables, parts[0]) {
                    Some(mv) => {
                        make_move(&mut board, tables, mv);
                        if board.is_repetition() {
                            println!("(repetition)");
                        }
                        print_board(&board);
                        report_game_state(&mut board, tables);
                    }
                    None => println!("invalid move or command: {}", parts[0]),
                }
            }
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  <move>            play a move (e2e4, a7a8q)");
    println!("  t | undo          take back the last move");
    println!("  new               reset to the start position");
    println!("  fen [FEN]         print or set the position");
    println!("  d | display       draw the board");
    println!("  moves             list legal moves");
    println!("  eval              static evaluation");
    println!("  perft <d>         count leaf nodes to depth d");
    println!("  divide <d>        perft with per-move subtotals");
    println!("  search [depth N] [movetime MS]");
    println!("  tables <path>     regenerate magic tables and save them");
    println!("  quit");
}

fn print_board(board: &Board) {
    println!("{}", board.diagram());
    println!("fen {}", board.to_fen());
}

fn report_game_state(board: &mut Board, tables: &'static peregrine::moves::magic::MagicTables) {
    let mut list = MoveList::new();
    generate_all_moves(board, tables, &mut list);
    let any_legal = list.iter().any(|&mv| {
        if make_move(board, tables, mv) {
            undo_move(board);
            true
        } else {
            false
        }
    });
    if !any_legal {
        if in_check(board, board.side_to_move, tables) {
            println!("checkmate");
        } else {
            println!("stalemate");
        }
    } else if board.halfmove_clock >= 100 {
        println!("draw by the fifty-move rule");
    }
}

fn regenerate_tables(path: &str) {
    let bar = ProgressBar::new(128);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .expect("static progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message("finding magics");

    match generate_magic_tables_with_progress(MagicTableSeed::Fixed(MAGIC_SEED), |done| {
        bar.set_position(done as u64);
    }) {
        Ok(tables) => {
            bar.finish_with_message("done");
            match write_magic_tables(&tables, Path::new(path)) {
                Ok(()) => println!("magic tables written to {}", path),
                Err(e) => println!("could not write tables: {}", e),
            }
        }
        Err(e) => {
            bar.abandon();
            println!("generation failed: {}", e);
        }
    }
}
