use crate::board::castle_bits::CASTLE_PERMS;
use crate::board::{Board, Color, MAX_GAME_MOVES, Piece};
use crate::hash::zobrist::zobrist_keys;
use crate::moves::magic::MagicTables;
use crate::moves::square_control::is_attacked;
use crate::moves::types::{Move, Undo};
use crate::square::Square;

/// Apply `mv` to the board, maintaining every piece of incremental state
/// and pushing one undo record. Returns false and reverts everything if
/// the move leaves the mover's own king attacked; pseudo-legal input is
/// expected, full legality is decided here.
pub fn make_move(board: &mut Board, tables: &MagicTables, mv: Move) -> bool {
    let keys = zobrist_keys();
    let color = board.side_to_move;
    let from = mv.from().index() as usize;
    let to = mv.to().index() as usize;

    let Some((moving_color, piece)) = board.piece_at(mv.from()) else {
        panic!("make_move from empty square {}", mv.from());
    };
    debug_assert_eq!(moving_color, color, "moving the wrong side's piece");

    // 1. snapshot for unmake
    assert!(board.history.len() < MAX_GAME_MOVES, "history stack overflow");
    board.history.push(Undo {
        mv,
        castling_rights: board.castling_rights,
        halfmove_clock: board.halfmove_clock,
        en_passant: board.en_passant,
        zobrist: board.zobrist,
    });
    board.ply += 1;

    // 2. the old en passant square dies with any move
    if let Some(ep) = board.en_passant.take() {
        board.zobrist ^= keys.en_passant_key(ep.index() as usize);
    }

    // 3. fifty-move clock
    if mv.is_capture() || mv.is_en_passant() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }

    // 4. castle rights; the mask table folds king moves, rook moves and
    //    rook captures into one AND
    board.zobrist ^= keys.castle_key(board.castling_rights);
    board.castling_rights &= CASTLE_PERMS[from] & CASTLE_PERMS[to];
    board.zobrist ^= keys.castle_key(board.castling_rights);

    // 5. flag-specific board surgery
    if mv.is_en_passant() {
        // the captured pawn sits behind the target square
        let captured_sq = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        board.clear_piece(captured_sq);
    } else if mv.is_capture() {
        board.clear_piece(to);
    }

    if mv.is_promotion()
        && let Some((promo_color, promo)) = mv.promoted()
    {
        debug_assert_eq!(piece, Piece::Pawn, "only pawns promote");
        debug_assert_eq!(promo_color, color);
        // swap the pawn for the promoted piece in place; the general move
        // step below then carries it to the target square
        board.clear_piece(from);
        board.add_piece(promo_color, promo, from);
    }

    if mv.is_castle() {
        match to {
            6 => board.move_piece(7, 5),    // white O-O:   h1 -> f1
            2 => board.move_piece(0, 3),    // white O-O-O: a1 -> d1
            62 => board.move_piece(63, 61), // black O-O:   h8 -> f8
            58 => board.move_piece(56, 59), // black O-O-O: a8 -> d8
            _ => unreachable!("castle to non-castling square {}", to),
        }
    }

    if mv.is_pawn_start() {
        let mid = (from + to) / 2;
        board.en_passant = Some(Square::from_index(mid as u8));
        board.zobrist ^= keys.en_passant_key(mid);
    }

    // 6. the moving piece itself
    board.move_piece(from, to);

    // 7. hand the move over
    board.zobrist ^= keys.side_to_move;
    board.side_to_move = color.opposite();

    // 8. king safety decides legality
    if is_attacked(
        board,
        board.pieces(Piece::King, color),
        board.side_to_move,
        tables,
    ) {
        undo_move(board);
        return false;
    }

    #[cfg(debug_assertions)]
    board.assert_hash();
    true
}

/// Reverse the most recent `make_move`. Calling this on a board with an
/// empty history is a programmer error.
pub fn undo_move(board: &mut Board) {
    let Some(undo) = board.history.pop() else {
        panic!("undo_move with no move to undo");
    };
    board.ply -= 1;

    board.side_to_move = board.side_to_move.opposite();
    let color = board.side_to_move;
    let mv = undo.mv;
    let from = mv.from().index() as usize;
    let to = mv.to().index() as usize;

    board.move_piece(to, from);

    if mv.is_en_passant() {
        let captured_sq = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        board.add_piece(color.opposite(), Piece::Pawn, captured_sq);
    } else if mv.is_capture()
        && let Some((captured_color, captured)) = mv.captured()
    {
        board.add_piece(captured_color, captured, to);
    }

    if mv.is_promotion() {
        // the promoted piece just moved back to `from`; demote it
        board.clear_piece(from);
        board.add_piece(color, Piece::Pawn, from);
    }

    if mv.is_castle() {
        match to {
            6 => board.move_piece(5, 7),
            2 => board.move_piece(3, 0),
            62 => board.move_piece(61, 63),
            58 => board.move_piece(59, 56),
            _ => unreachable!("castle to non-castling square {}", to),
        }
    }

    // clocks, rights, en passant and the key restore straight from the
    // snapshot; the piece updates above already rebalanced the material
    board.castling_rights = undo.castling_rights;
    board.halfmove_clock = undo.halfmove_clock;
    board.en_passant = undo.en_passant;
    board.zobrist = undo.zobrist;

    #[cfg(debug_assertions)]
    board.assert_hash();
}
