//! Chess position evaluation types.

use chess_core::Color;
use std::fmt;

/// Represents a chess position evaluation.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found). UCI engines report scores
/// from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn evaluation (positive = side to move is better)
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated)
    Mate(i32),
}

impl Evaluation {
    /// Builds an evaluation from the `score cp` or `score mate` values of a
    /// UCI info line. A mate score wins when both are present.
    pub fn from_uci_score(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(moves)) => Some(Evaluation::Mate(moves)),
            (Some(cp), None) => Some(Evaluation::Centipawns(cp)),
            (None, None) => None,
        }
    }

    /// Returns the same evaluation seen from the other side.
    pub fn negate(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(moves) => Evaluation::Mate(-moves),
        }
    }

    /// Converts a side-to-move score into White's point of view.
    pub fn for_white(self, side_to_move: Color) -> Self {
        match side_to_move {
            Color::White => self,
            Color::Black => self.negate(),
        }
    }

    /// Returns true if this is a forced mate score.
    pub fn is_mate(self) -> bool {
        matches!(self, Evaluation::Mate(_))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let sign = if *cp < 0 { "-" } else { "+" };
                let abs = cp.unsigned_abs();
                write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
            }
            Evaluation::Mate(moves) => write!(f, "#{}", moves),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_uci_score() {
        assert_eq!(
            Evaluation::from_uci_score(Some(35), None),
            Some(Evaluation::Centipawns(35))
        );
        assert_eq!(
            Evaluation::from_uci_score(None, Some(-2)),
            Some(Evaluation::Mate(-2))
        );
        assert_eq!(
            Evaluation::from_uci_score(Some(10), Some(3)),
            Some(Evaluation::Mate(3))
        );
        assert_eq!(Evaluation::from_uci_score(None, None), None);
    }

    #[test]
    fn display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(0).to_string(), "+0.00");
        assert_eq!(Evaluation::Centipawns(-150).to_string(), "-1.50");
        assert_eq!(Evaluation::Centipawns(1234).to_string(), "+12.34");
        assert_eq!(Evaluation::Mate(3).to_string(), "#3");
        assert_eq!(Evaluation::Mate(-2).to_string(), "#-2");
    }

    #[test]
    fn perspective() {
        let eval = Evaluation::Centipawns(80);
        assert_eq!(eval.for_white(Color::White), eval);
        assert_eq!(eval.for_white(Color::Black), Evaluation::Centipawns(-80));
        assert_eq!(
            Evaluation::Mate(4).for_white(Color::Black),
            Evaluation::Mate(-4)
        );
        assert!(Evaluation::Mate(1).is_mate());
        assert!(!eval.is_mate());
    }
}
