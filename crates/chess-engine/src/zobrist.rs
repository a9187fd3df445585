//! Zobrist hashing keys.
//!
//! A position's hash is the XOR of:
//! - one key per (piece, square) pair on the board
//! - the side key when Black is to move
//! - the key for the current castling-rights combination
//! - the en-passant file key whenever an en-passant square is set
//!
//! Keys come from a fixed-seed xorshift generator so hashes are identical
//! across runs and threads.

use chess_core::{CastlingRights, Color, Piece, Square};

pub struct ZobristKeys {
    /// `[piece.index()][square]`
    pub pieces: [[u64; 64]; 12],
    pub black_to_move: u64,
    /// One key per castling-rights bit pattern.
    pub castling: [u64; 16],
    /// Indexed by the en-passant square's file.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    pub const fn new() -> Self {
        const fn next(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = Self::SEED;
        let mut pieces = [[0u64; 64]; 12];
        let mut piece = 0;
        while piece < 12 {
            let mut square = 0;
            while square < 64 {
                state = next(state);
                pieces[piece][square] = state;
                square += 1;
            }
            piece += 1;
        }

        state = next(state);
        let black_to_move = state;

        let mut base = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = next(state);
            base[i] = state;
            i += 1;
        }
        // Each combination is the XOR of its individual flags' keys.
        let mut castling = [0u64; 16];
        let mut combo = 0;
        while combo < 16 {
            let mut bit = 0;
            while bit < 4 {
                if combo & (1 << bit) != 0 {
                    castling[combo] ^= base[bit];
                }
                bit += 1;
            }
            combo += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut file = 0;
        while file < 8 {
            state = next(state);
            en_passant[file] = state;
            file += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[piece.index()][sq.idx()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.bits() as usize & 0xF]
    }

    #[inline]
    pub fn en_passant(&self, ep: Option<Square>) -> u64 {
        match ep {
            Some(sq) => self.en_passant[sq.file() as usize],
            None => 0,
        }
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
