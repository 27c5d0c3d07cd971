/// Underlying bit type for castling rights.
pub type CastleBits = u8;

pub const CASTLE_WK: CastleBits = 0b0001;
pub const CASTLE_WQ: CastleBits = 0b0010;
pub const CASTLE_BK: CastleBits = 0b0100;
pub const CASTLE_BQ: CastleBits = 0b1000;

pub const CASTLE_ALL: CastleBits = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;

/// Per-square castle-permission masks. After any move,
///
/// `rights &= CASTLE_PERMS[from] & CASTLE_PERMS[to]`
///
/// keeps the rights current without separate handling for king moves,
/// rook moves and rook captures: every square except the six king/rook
/// home squares maps to 0xF (no effect), and the home squares clear the
/// rights that die with a piece leaving or being captured there.
pub const CASTLE_PERMS: [CastleBits; 64] = {
    let mut table = [CASTLE_ALL; 64];
    table[0] = CASTLE_ALL & !CASTLE_WQ; // a1
    table[4] = CASTLE_ALL & !(CASTLE_WK | CASTLE_WQ); // e1
    table[7] = CASTLE_ALL & !CASTLE_WK; // h1
    table[56] = CASTLE_ALL & !CASTLE_BQ; // a8
    table[60] = CASTLE_ALL & !(CASTLE_BK | CASTLE_BQ); // e8
    table[63] = CASTLE_ALL & !CASTLE_BK; // h8
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_bits_single_and_disjoint() {
        assert_eq!(CASTLE_WK.count_ones(), 1);
        assert_eq!(CASTLE_WQ.count_ones(), 1);
        assert_eq!(CASTLE_BK.count_ones(), 1);
        assert_eq!(CASTLE_BQ.count_ones(), 1);
        assert_eq!(CASTLE_ALL.count_ones(), 4);
    }

    #[test]
    fn perm_masks_match_home_squares() {
        assert_eq!(CASTLE_PERMS[0], 0xD); // a1 rook
        assert_eq!(CASTLE_PERMS[4], 0xC); // e1 king
        assert_eq!(CASTLE_PERMS[7], 0xE); // h1 rook
        assert_eq!(CASTLE_PERMS[56], 0x7); // a8 rook
        assert_eq!(CASTLE_PERMS[60], 0x3); // e8 king
        assert_eq!(CASTLE_PERMS[63], 0xB); // h8 rook
        for sq in 0..64 {
            match sq {
                0 | 4 | 7 | 56 | 60 | 63 => {}
                _ => assert_eq!(CASTLE_PERMS[sq], 0xF, "square {}", sq),
            }
        }
    }
}
