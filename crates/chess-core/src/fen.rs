//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{CastlingRights, Color, Piece, PieceKind, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: '{0}'")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: '{0}'")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: '{0}'")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: '{0}'")]
    InvalidFullmoveNumber(String),

    #[error("{0} must have exactly one king, found {1}")]
    KingCount(Color, u32),

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("en passant square {0} does not follow a double pawn push")]
    ImpossibleEnPassant(Square),

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Color),
}

/// A parsed and validated FEN record.
///
/// Holds a mailbox view of the board; the engine converts it into its own
/// bitboard representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Contents of each square, indexed a1 = 0 .. h8 = 63.
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a six-field FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::InvalidFieldCount(fields.len()));
        }

        let board = Self::parse_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = CastlingRights::from_fen(fields[2])
            .ok_or_else(|| FenError::InvalidCastlingRights(fields[2].to_string()))?;

        let en_passant = Self::parse_en_passant(fields[3])?;
        if let Some(sq) = en_passant {
            Self::check_en_passant(&board, side_to_move, sq)?;
        }

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(fields[4].to_string()))?;

        let fullmove_number = fields[5]
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(fields[5].to_string()))?;

        Ok(Fen {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(placement: &str) -> Result<[Option<Piece>; 64], FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = [None; 64];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file < 8 {
                        board[Square::new(file, rank).idx()] = Some(piece);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} does not describe 8 squares",
                    rank + 1
                )));
            }
        }

        for color in Color::BOTH {
            let king = Piece::new(PieceKind::King, color);
            let kings = board.iter().filter(|p| **p == Some(king)).count() as u32;
            if kings != 1 {
                return Err(FenError::KingCount(color, kings));
            }
        }

        for rank in [0, 7] {
            for file in 0..8 {
                let sq = Square::new(file, rank);
                if board[sq.idx()].is_some_and(|p| p.kind() == PieceKind::Pawn) {
                    return Err(FenError::PawnOnBackRank(sq));
                }
            }
        }

        Ok(board)
    }

    /// The target must be empty, on the rank the opponent's pawn just
    /// skipped, with that pawn standing directly beyond it.
    fn check_en_passant(
        board: &[Option<Piece>; 64],
        side_to_move: Color,
        sq: Square,
    ) -> Result<(), FenError> {
        let mover = !side_to_move;
        let skipped_rank = match mover {
            Color::White => 2,
            Color::Black => 5,
        };
        let pawn = sq
            .offset(mover.pawn_step())
            .and_then(|behind| board[behind.idx()]);
        if sq.rank() != skipped_rank
            || board[sq.idx()].is_some()
            || pawn != Some(Piece::new(PieceKind::Pawn, mover))
        {
            return Err(FenError::ImpossibleEnPassant(sq));
        }
        Ok(())
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(field) {
            Some(sq) if sq.rank() == 2 || sq.rank() == 5 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }

    /// The piece-placement field alone.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(64);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[Square::new(file, rank).idx()] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement(),
            self.side_to_move.to_fen_char(),
            self.castling,
            self.en_passant
                .map(|sq| sq.to_algebraic())
                .unwrap_or_else(|| "-".to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
