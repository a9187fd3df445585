//! Castling-rights bitmask.

use crate::{Color, Square};
use std::fmt;

/// Castling side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wing {
    King,
    Queen,
}

/// Four castling flags: each color times each wing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    /// Raw 4-bit mask, usable as a 0-15 table index.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The single flag for a color and wing.
    #[inline]
    pub const fn flag(color: Color, wing: Wing) -> u8 {
        match (color, wing) {
            (Color::White, Wing::King) => Self::WHITE_KINGSIDE,
            (Color::White, Wing::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, Wing::King) => Self::BLACK_KINGSIDE,
            (Color::Black, Wing::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, wing: Wing) -> bool {
        self.0 & Self::flag(color, wing) != 0
    }

    /// Rights left after a piece moves from `from` to `to`.
    ///
    /// Touching a king's home square drops both of that color's rights;
    /// touching a rook's home square (moving it or capturing on it) drops
    /// that wing. Rights never grow here.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & Self::keep_mask(from) & Self::keep_mask(to))
    }

    const fn keep_mask(sq: Square) -> u8 {
        match sq.index() {
            0 => !Self::WHITE_QUEENSIDE,
            4 => !(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
            7 => !Self::WHITE_KINGSIDE,
            56 => !Self::BLACK_QUEENSIDE,
            60 => !(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
            63 => !Self::BLACK_KINGSIDE,
            _ => 0xFF,
        }
    }

    /// Parses the FEN castling field (`KQkq`, subsets, or `-`).
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let flag = match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            };
            if rights.0 & flag != 0 {
                return None;
            }
            rights.0 |= flag;
        }
        Some(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
