use crate::board::{Board, Color, Piece};
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed so every build hashes identically.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// The process-wide Zobrist key registry. Read-only after initialization.
pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// XOR-ed into the key when Black is to move.
    pub side_to_move: u64,
    /// Indexed by the full 4-bit castle-rights mask.
    pub castling: [u64; 16],
    /// Indexed by square; only ranks 3 and 6 occur in play.
    pub en_passant: [u64; 64],
}

impl ZobristKeys {
    #[inline(always)]
    pub fn piece_key(&self, color: Color, piece: Piece, sq: usize) -> u64 {
        self.piece[color as usize][piece as usize][sq]
    }

    #[inline(always)]
    pub fn castle_key(&self, rights: u8) -> u64 {
        self.castling[(rights & 0xF) as usize]
    }

    #[inline(always)]
    pub fn en_passant_key(&self, sq: usize) -> u64 {
        self.en_passant[sq]
    }
}

/// Global keys, initialized on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 16],
        en_passant: [0u64; 64],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    for rights in 0..16 {
        keys.castling[rights] = non_zero(&mut rng);
    }
    for sq in 0..64 {
        keys.en_passant[sq] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}

/// Full recompute from board state. The incrementally maintained key must
/// equal this at all times.
pub fn generate_key(board: &Board) -> u64 {
    let keys = zobrist_keys();
    let mut key: u64 = 0;

    const COLORS: [Color; 2] = [Color::White, Color::Black];
    const PIECES: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];
    for &c in &COLORS {
        for &p in &PIECES {
            let mut bb = board.pieces(p, c);
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                key ^= keys.piece_key(c, p, sq);
                bb &= bb - 1;
            }
        }
    }

    if board.side_to_move == Color::Black {
        key ^= keys.side_to_move;
    }

    key ^= keys.castle_key(board.castling_rights);

    if let Some(ep) = board.en_passant {
        key ^= keys.en_passant_key(ep.index() as usize);
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        let a = generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED));
        let b = generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED));
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.piece[1][3][42], b.piece[1][3][42]);
        assert_eq!(a.castling, b.castling);
        assert_eq!(a.en_passant[20], b.en_passant[20]);
    }

    #[test]
    fn keys_are_nonzero_and_distinct_in_sample() {
        let keys = zobrist_keys();
        assert_ne!(keys.side_to_move, 0);
        for rights in 0..16usize {
            assert_ne!(keys.castling[rights], 0);
        }
        // Not a full pairwise check, just a sanity sample.
        assert_ne!(keys.piece[0][0][0], keys.piece[0][0][1]);
        assert_ne!(keys.piece[0][0][0], keys.piece[1][0][0]);
        assert_ne!(keys.en_passant[16], keys.en_passant[40]);
    }
}
