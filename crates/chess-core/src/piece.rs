//! Piece kinds and the packed piece tag.

use crate::Color;
use std::fmt;

/// The six kinds of chess pieces.
///
/// Discriminants start at 1 so that a packed [`Piece`] is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    King = 5,
    Queen = 6,
}

impl PieceKind {
    /// All kinds in discriminant order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::King,
        PieceKind::Queen,
    ];

    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Dense 0-5 index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Decodes the low four bits of a piece tag.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x0F {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Knight),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Rook),
            5 => Some(PieceKind::King),
            6 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Lowercase letter used in FEN and coordinate promotion suffixes.
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
        }
    }

    /// Parses a piece letter in either case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Bishops, rooks and queens.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::King => "King",
            PieceKind::Queen => "Queen",
        };
        f.write_str(name)
    }
}

/// A colored piece packed into five bits.
///
/// Bits 0-3 hold the [`PieceKind`], bit 4 is set for Black. An empty square
/// is never represented by a `Piece`; callers use `Option<Piece>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    const COLOR_BIT: u8 = 0x10;

    /// All twelve pieces, White first, in [`Piece::index`] order.
    pub const ALL: [Piece; 12] = {
        let mut all = [Piece(1); 12];
        let mut i = 0;
        while i < 12 {
            let kind = (i % 6) as u8 + 1;
            let color = if i < 6 { 0 } else { Piece::COLOR_BIT };
            all[i] = Piece(kind | color);
            i += 1;
        }
        all
    };

    /// Packs a kind and a color.
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        let color_bit = match color {
            Color::White => 0,
            Color::Black => Self::COLOR_BIT,
        };
        Piece(kind as u8 | color_bit)
    }

    /// Decodes a raw five-bit tag; zero and unknown kinds yield `None`.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !0x1F != 0 {
            return None;
        }
        match PieceKind::from_bits(bits) {
            Some(_) => Some(Piece(bits)),
            None => None,
        }
    }

    /// The raw five-bit tag.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn kind(self) -> PieceKind {
        match PieceKind::from_bits(self.0) {
            Some(kind) => kind,
            None => unreachable!(),
        }
    }

    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & Self::COLOR_BIT == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Dense 0-11 index: `color * 6 + kind.index()`.
    #[inline]
    pub const fn index(self) -> usize {
        self.color().index() * 6 + self.kind().index()
    }

    /// FEN letter, uppercase for White.
    pub const fn to_fen_char(self) -> char {
        let c = self.kind().to_char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN letter; case selects the color.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceKind::from_char(c) {
            Some(kind) => Some(Piece::new(kind, color)),
            None => None,
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({} {})", self.color(), self.kind())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trips_kind_and_color() {
        for color in Color::BOTH {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, color);
                assert_eq!(piece.kind(), kind);
                assert_eq!(piece.color(), color);
                assert_ne!(piece.bits() & 0x0F, 0);
                assert_eq!(Piece::from_bits(piece.bits()), Some(piece));
            }
        }
    }

    #[test]
    fn all_matches_index_order() {
        for (i, piece) in Piece::ALL.iter().enumerate() {
            assert_eq!(piece.index(), i);
        }
        assert_eq!(Piece::ALL[0], Piece::new(PieceKind::Pawn, Color::White));
        assert_eq!(Piece::ALL[11], Piece::new(PieceKind::Queen, Color::Black));
    }

    #[test]
    fn black_bit_is_bit_four() {
        let black_rook = Piece::new(PieceKind::Rook, Color::Black);
        assert_eq!(black_rook.bits(), 0x10 | 4);
    }

    #[test]
    fn fen_letters() {
        assert_eq!(
            Piece::from_fen_char('Q'),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        assert_eq!(
            Piece::from_fen_char('n'),
            Some(Piece::new(PieceKind::Knight, Color::Black))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
        assert_eq!(Piece::new(PieceKind::King, Color::White).to_fen_char(), 'K');
    }

    #[test]
    fn invalid_tags_rejected() {
        assert_eq!(Piece::from_bits(0), None);
        assert_eq!(Piece::from_bits(0x10), None);
        assert_eq!(Piece::from_bits(7), None);
        assert_eq!(Piece::from_bits(0x21), None);
    }

    #[test]
    fn sliders() {
        assert!(PieceKind::Queen.is_slider());
        assert!(PieceKind::Bishop.is_slider());
        assert!(!PieceKind::Knight.is_slider());
        assert!(!PieceKind::King.is_slider());
    }
}
