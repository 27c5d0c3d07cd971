use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, EMPTY_SQ, Piece};
use crate::hash::zobrist::generate_key;
use crate::square::Square;

impl Board {
    /// Wipe all position state, keeping the PV table allocation.
    fn reset(&mut self) {
        self.piece_bb = [[0u64; 6]; 2];
        self.occ_white = 0;
        self.occ_black = 0;
        self.occ_all = 0;
        self.piece_on_sq = [EMPTY_SQ; 64];
        self.side_to_move = Color::White;
        self.castling_rights = 0;
        self.en_passant = None;
        self.halfmove_clock = 0;
        self.fullmove_number = 1;
        self.ply = 0;
        self.zobrist = 0;
        self.material = [0; 2];
        self.history.clear();
    }

    /// Set the board to the position described by a six-field FEN string.
    ///
    /// On failure the board is left in its reset (empty) state and the
    /// error names the offending field. Halfmove clocks of 100 and above
    /// are accepted; the fifty-move draw is the search's concern, not the
    /// parser's.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        self.reset();

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(format!("FEN must have 6 fields, found {}", fields.len()));
        }

        // 1) piece layout, ranks 8 -> 1
        let mut placements: Vec<(u8, Color, Piece)> = Vec::with_capacity(32);
        let mut rank: i32 = 7;
        let mut file: i32 = 0;
        for c in fields[0].chars() {
            match c {
                '/' => {
                    if file != 8 {
                        return Err(format!("rank {} has {} files", rank + 1, file));
                    }
                    rank -= 1;
                    file = 0;
                    if rank < 0 {
                        return Err("too many ranks in layout".into());
                    }
                }
                '1'..='8' => {
                    file += c as i32 - '0' as i32;
                    if file > 8 {
                        return Err(format!("rank {} overflows", rank + 1));
                    }
                }
                _ => {
                    let Some(&Some((piece, color))) = CHAR_TO_PC.get(c as usize) else {
                        return Err(format!("invalid layout character {:?}", c));
                    };
                    if file > 7 {
                        return Err(format!("rank {} overflows", rank + 1));
                    }
                    placements.push(((rank * 8 + file) as u8, color, piece));
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err("layout does not cover 8 ranks".into());
        }

        // 2) side to move
        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("active color must be 'w' or 'b', found {:?}", other)),
        };

        // 3) castling rights
        let mut rights: u8 = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(format!("invalid castling character {:?}", c)),
                };
            }
        }

        // 4) en passant target
        let en_passant = if fields[3] == "-" {
            None
        } else {
            let sq: Square = fields[3]
                .parse()
                .map_err(|e| format!("invalid en passant square: {}", e))?;
            let expected_rank = match side {
                Color::White => 5, // black just double-pushed onto rank 6
                Color::Black => 2, // white just double-pushed onto rank 3
            };
            if sq.rank() != expected_rank {
                return Err(format!(
                    "en passant square {} on wrong rank for side {:?}",
                    sq, side
                ));
            }
            Some(sq)
        };

        // 5) halfmove clock: any non-negative value, including 100+
        let halfmove_clock: u32 = fields[4]
            .parse()
            .map_err(|_| format!("invalid halfmove clock {:?}", fields[4]))?;

        // 6) fullmove number
        let fullmove_number: u32 = fields[5]
            .parse()
            .map_err(|_| format!("invalid fullmove number {:?}", fields[5]))?;
        if fullmove_number < 1 {
            return Err("fullmove number must be >= 1".into());
        }

        // All fields parsed; commit.
        for &(sq, color, piece) in &placements {
            if self.piece_on_sq[sq as usize] != EMPTY_SQ {
                self.reset();
                return Err(format!("square {} occupied twice", Square::from_index(sq)));
            }
            self.add_piece(color, piece, sq as usize);
        }
        self.side_to_move = side;
        self.castling_rights = rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.zobrist = generate_key(self);

        if let Err(msg) = self.validate() {
            self.reset();
            return Err(msg);
        }
        Ok(())
    }

    /// Render the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let val = self.piece_on_sq[(rank * 8 + file) as usize];
                if val == EMPTY_SQ {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    fen.push((b'0' + empty) as char);
                    empty = 0;
                }
                let color = (val >> 3) & 1;
                let piece = val & 0b111;
                fen.push(PC_TO_CHAR[(color * 6 + piece) as usize]);
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.has_castling(CASTLE_WK) {
                fen.push('K');
            }
            if self.has_castling(CASTLE_WQ) {
                fen.push('Q');
            }
            if self.has_castling(CASTLE_BK) {
                fen.push('k');
            }
            if self.has_castling(CASTLE_BQ) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}
