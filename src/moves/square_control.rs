use crate::bitboard::BitboardExt;
use crate::board::{Board, Color, Piece};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::magic::MagicTables;
use crate::moves::pawn::{
    black_pawn_attacks_left, black_pawn_attacks_right, white_pawn_attacks_left,
    white_pawn_attacks_right,
};
use crate::utils::pop_lsb;

/// The union of every square attacked by `side`, sliders evaluated over
/// the current combined occupancy. Read-only.
pub fn attacks_by(board: &Board, side: Color, tables: &MagicTables) -> u64 {
    let mut attacks = 0u64;

    let king = board.pieces(Piece::King, side);
    if king != 0 {
        attacks |= KING_ATTACKS[king.lsb() as usize];
    }

    let pawns = board.pieces(Piece::Pawn, side);
    attacks |= match side {
        Color::White => white_pawn_attacks_left(pawns) | white_pawn_attacks_right(pawns),
        Color::Black => black_pawn_attacks_left(pawns) | black_pawn_attacks_right(pawns),
    };

    let mut knights = board.pieces(Piece::Knight, side);
    while knights != 0 {
        attacks |= KNIGHT_ATTACKS[pop_lsb(&mut knights) as usize];
    }

    let occupied = board.occupied();

    let mut bishops = board.pieces(Piece::Bishop, side);
    while bishops != 0 {
        attacks |= tables.bishop.get_attacks(pop_lsb(&mut bishops) as usize, occupied);
    }

    let mut rooks = board.pieces(Piece::Rook, side);
    while rooks != 0 {
        attacks |= tables.rook.get_attacks(pop_lsb(&mut rooks) as usize, occupied);
    }

    let mut queens = board.pieces(Piece::Queen, side);
    while queens != 0 {
        attacks |= tables.queen_attacks(pop_lsb(&mut queens) as usize, occupied);
    }

    attacks
}

/// True iff any piece of `by_side` attacks any square in `squares`. Used
/// for castling legality (three king-path squares at once) and the
/// post-move king-safety check. Does not mutate the board.
#[inline]
pub fn is_attacked(board: &Board, squares: u64, by_side: Color, tables: &MagicTables) -> bool {
    attacks_by(board, by_side, tables) & squares != 0
}

#[inline(always)]
pub fn in_check(board: &Board, side: Color, tables: &MagicTables) -> bool {
    is_attacked(
        board,
        board.pieces(Piece::King, side),
        side.opposite(),
        tables,
    )
}
