//! Packed move representation.

use crate::{Piece, PieceKind, Square};
use std::fmt;

/// A chess move packed into 32 bits.
///
/// | bits  | field                                  |
/// |-------|----------------------------------------|
/// | 0-5   | from square                            |
/// | 6-11  | to square                              |
/// | 12-16 | moved piece tag                        |
/// | 17-21 | captured piece tag (0 = none)          |
/// | 22-26 | promotion piece tag (0 = none)         |
/// | 27    | castle                                 |
/// | 28    | en passant                             |
/// | 29    | pawn double push                       |
/// | 30    | capture resolved                       |
///
/// The all-zero value is [`Move::NULL`]. Because a moved piece tag is never
/// zero, no real move collides with it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u32);

impl Move {
    const TO_SHIFT: u32 = 6;
    const PIECE_SHIFT: u32 = 12;
    const CAPTURED_SHIFT: u32 = 17;
    const PROMOTION_SHIFT: u32 = 22;
    const TAG_MASK: u32 = 0x1F;

    const CASTLE: u32 = 1 << 27;
    const EN_PASSANT: u32 = 1 << 28;
    const DOUBLE_PUSH: u32 = 1 << 29;
    const RESOLVED: u32 = 1 << 30;

    /// "No move".
    pub const NULL: Move = Move(0);

    /// A quiet move whose capture status is known (nothing captured).
    #[inline]
    pub const fn new(from: Square, to: Square, piece: Piece) -> Self {
        Move(
            from.index() as u32
                | (to.index() as u32) << Self::TO_SHIFT
                | (piece.bits() as u32) << Self::PIECE_SHIFT
                | Self::RESOLVED,
        )
    }

    /// A move that captures `victim` on the destination square.
    #[inline]
    pub const fn capture(from: Square, to: Square, piece: Piece, victim: Piece) -> Self {
        Move(Self::new(from, to, piece).0 | (victim.bits() as u32) << Self::CAPTURED_SHIFT)
    }

    /// A move whose capture has not been looked up yet.
    ///
    /// [`Move::is_capture_resolved`] is false; whoever applies it must
    /// inspect the destination square.
    #[inline]
    pub const fn unresolved(from: Square, to: Square, piece: Piece) -> Self {
        Move(Self::new(from, to, piece).0 & !Self::RESOLVED)
    }

    #[inline]
    pub const fn castle(from: Square, to: Square, king: Piece) -> Self {
        Move(Self::new(from, to, king).0 | Self::CASTLE)
    }

    #[inline]
    pub const fn en_passant(from: Square, to: Square, pawn: Piece, victim: Piece) -> Self {
        Move(Self::capture(from, to, pawn, victim).0 | Self::EN_PASSANT)
    }

    #[inline]
    pub const fn double_push(from: Square, to: Square, pawn: Piece) -> Self {
        Move(Self::new(from, to, pawn).0 | Self::DOUBLE_PUSH)
    }

    /// Returns this move promoting to `kind` (same color as the mover).
    #[inline]
    pub const fn with_promotion(self, kind: PieceKind) -> Self {
        let promoted = Piece::new(kind, self.piece().color());
        Move(
            (self.0 & !(Self::TAG_MASK << Self::PROMOTION_SHIFT))
                | (promoted.bits() as u32) << Self::PROMOTION_SHIFT,
        )
    }

    /// Returns this move with its capture resolved to `victim`.
    #[inline]
    pub const fn with_captured(self, victim: Option<Piece>) -> Self {
        let bits = match victim {
            Some(p) => p.bits() as u32,
            None => 0,
        };
        Move(
            (self.0 & !(Self::TAG_MASK << Self::CAPTURED_SHIFT))
                | bits << Self::CAPTURED_SHIFT
                | Self::RESOLVED,
        )
    }

    /// Rebuilds a move from its packed bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Move(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::at((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::at(((self.0 >> Self::TO_SHIFT) & 0x3F) as u8)
    }

    /// The moving piece.
    ///
    /// # Panics
    ///
    /// On [`Move::NULL`].
    #[inline]
    pub const fn piece(self) -> Piece {
        match Piece::from_bits(((self.0 >> Self::PIECE_SHIFT) & Self::TAG_MASK) as u8) {
            Some(p) => p,
            None => panic!("null move has no piece"),
        }
    }

    #[inline]
    pub const fn captured(self) -> Option<Piece> {
        Piece::from_bits(((self.0 >> Self::CAPTURED_SHIFT) & Self::TAG_MASK) as u8)
    }

    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        Piece::from_bits(((self.0 >> Self::PROMOTION_SHIFT) & Self::TAG_MASK) as u8)
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        (self.0 >> Self::CAPTURED_SHIFT) & Self::TAG_MASK != 0
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        (self.0 >> Self::PROMOTION_SHIFT) & Self::TAG_MASK != 0
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.0 & Self::CASTLE != 0
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.0 & Self::DOUBLE_PUSH != 0
    }

    /// True when [`Move::captured`] is authoritative.
    #[inline]
    pub const fn is_capture_resolved(self) -> bool {
        self.0 & Self::RESOLVED != 0
    }

    /// Neither a capture nor a promotion.
    #[inline]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// Long algebraic (coordinate) notation, e.g. `e2e4`, `e7e8q`, `0000`.
    pub fn to_uci(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        let mut s = String::with_capacity(5);
        s.push_str(&self.from().to_algebraic());
        s.push_str(&self.to().to_algebraic());
        if let Some(p) = self.promotion() {
            s.push(p.kind().to_char());
        }
        s
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Coordinate notation split into its parts, before it is matched against
/// a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl CoordinateMove {
    /// Parses 4-5 characters such as `g1f3` or `e7e8q`.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c)? {
                PieceKind::Pawn | PieceKind::King => return None,
                kind => Some(kind),
            },
        };
        Some(CoordinateMove {
            from,
            to,
            promotion,
        })
    }

    /// True if `m` has the same squares and promotion.
    pub fn matches(&self, m: Move) -> bool {
        m.from() == self.from
            && m.to() == self.to
            && m.promotion().map(|p| p.kind()) == self.promotion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn quiet_move_fields() {
        let knight = Piece::new(PieceKind::Knight, Color::White);
        let m = Move::new(sq("g1"), sq("f3"), knight);
        assert_eq!(m.from(), sq("g1"));
        assert_eq!(m.to(), sq("f3"));
        assert_eq!(m.piece(), knight);
        assert_eq!(m.captured(), None);
        assert!(m.is_quiet());
        assert!(m.is_capture_resolved());
        assert!(!m.is_null());
    }

    #[test]
    fn capture_with_promotion() {
        let pawn = Piece::new(PieceKind::Pawn, Color::Black);
        let rook = Piece::new(PieceKind::Rook, Color::White);
        let m = Move::capture(sq("b2"), sq("a1"), pawn, rook).with_promotion(PieceKind::Queen);
        assert_eq!(m.captured(), Some(rook));
        assert_eq!(m.promotion(), Some(Piece::new(PieceKind::Queen, Color::Black)));
        assert!(m.is_capture());
        assert!(m.is_promotion());
        assert_eq!(m.to_uci(), "b2a1q");
    }

    #[test]
    fn special_flags() {
        let king = Piece::new(PieceKind::King, Color::White);
        let castle = Move::castle(Square::E1, Square::G1, king);
        assert!(castle.is_castle());
        assert!(!castle.is_en_passant());

        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        let victim = Piece::new(PieceKind::Pawn, Color::Black);
        let ep = Move::en_passant(sq("e5"), sq("d6"), pawn, victim);
        assert!(ep.is_en_passant());
        assert!(ep.is_capture());

        let push = Move::double_push(sq("e2"), sq("e4"), pawn);
        assert!(push.is_double_push());
        assert!(push.is_quiet());
    }

    #[test]
    fn resolution_flag() {
        let rook = Piece::new(PieceKind::Rook, Color::White);
        let m = Move::unresolved(Square::A1, Square::A8, rook);
        assert!(!m.is_capture_resolved());
        let resolved = m.with_captured(Some(Piece::new(PieceKind::Rook, Color::Black)));
        assert!(resolved.is_capture_resolved());
        assert!(resolved.is_capture());
    }

    #[test]
    fn equality_is_bitwise() {
        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        let a = Move::new(sq("a2"), sq("a3"), pawn);
        assert_eq!(a, Move::from_bits(a.bits()));
        assert_ne!(a, Move::double_push(sq("a2"), sq("a3"), pawn));
    }

    #[test]
    fn null_move() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::NULL.to_uci(), "0000");
        assert_eq!(Move::default(), Move::NULL);
    }

    #[test]
    fn coordinate_parsing() {
        let c = CoordinateMove::parse("e7e8q").unwrap();
        assert_eq!(c.from, sq("e7"));
        assert_eq!(c.to, sq("e8"));
        assert_eq!(c.promotion, Some(PieceKind::Queen));

        assert_eq!(CoordinateMove::parse("e2e4").unwrap().promotion, None);
        assert!(CoordinateMove::parse("e7e8k").is_none());
        assert!(CoordinateMove::parse("e7e8x").is_none());
        assert!(CoordinateMove::parse("e2").is_none());
        assert!(CoordinateMove::parse("e2e4qq").is_none());
        assert!(CoordinateMove::parse("i2e4").is_none());
    }

    #[test]
    fn coordinate_matching() {
        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        let m = Move::new(sq("a7"), sq("a8"), pawn).with_promotion(PieceKind::Knight);
        assert!(CoordinateMove::parse("a7a8n").unwrap().matches(m));
        assert!(!CoordinateMove::parse("a7a8q").unwrap().matches(m));
        assert!(!CoordinateMove::parse("a7a8").unwrap().matches(m));
    }
}
