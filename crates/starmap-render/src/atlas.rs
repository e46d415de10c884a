//! Sprite sheet coordinates.
//!
//! Material and matmod sheets hold one 16 px wide column per variant. Inside
//! a column the 8x8 tile body sits at `(4, 12)` and the 4x4 edge pieces
//! surround it. Platform sheets hold one 24 px wide column per variant with
//! three 8x8 pieces side by side.

use crate::plan::Rect;

/// Width of one variant column in a material or matmod sheet.
pub const VARIANT_COLUMN: u32 = 16;
/// Width of one variant column in a platform sheet.
pub const PLATFORM_COLUMN: u32 = 24;

/// Full 8x8 tile body for variant `index`.
pub fn base(index: u32) -> Rect {
    Rect::new(index * VARIANT_COLUMN + 4, 12, 8, 8)
}

/// Matmod overlay covering the whole tile.
pub fn modifier(index: u32) -> Rect {
    base(index)
}

/// The 8x4 strip of a matmod sprite that sticks out above its tile.
pub fn overflow(index: u32) -> Rect {
    Rect::new(index * VARIANT_COLUMN + 4, 8, 8, 4)
}

/// Platform pieces, chosen from the left and right neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformPiece {
    /// Both sides differ from the platform.
    Isolated,
    /// Only the right side differs.
    RightEnd,
    Span,
}

impl PlatformPiece {
    pub fn select(left_differs: bool, right_differs: bool) -> Self {
        match (left_differs, right_differs) {
            (true, true) => Self::Isolated,
            (false, true) => Self::RightEnd,
            _ => Self::Span,
        }
    }

    fn slot(self) -> u32 {
        match self {
            Self::Isolated => 0,
            Self::RightEnd => 1,
            Self::Span => 2,
        }
    }
}

pub fn platform(index: u32, piece: PlatformPiece) -> Rect {
    Rect::new(index * PLATFORM_COLUMN + piece.slot() * 8, 0, 8, 8)
}

/// The four 4x4 corners of a tile, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
        Quadrant::BottomLeft,
    ];

    /// Offset of the quadrant inside the 8x8 cell.
    pub const fn dest(self) -> (u8, u8) {
        match self {
            Self::TopLeft => (0, 0),
            Self::TopRight => (4, 0),
            Self::BottomRight => (4, 4),
            Self::BottomLeft => (0, 4),
        }
    }

    /// Piece used when the vertical and horizontal neighbors are the same material.
    pub fn shared_corner(self, index: u32) -> Rect {
        let (x, y) = match self {
            Self::TopLeft => (0, 0),
            Self::TopRight => (4, 0),
            Self::BottomRight => (4, 4),
            Self::BottomLeft => (0, 4),
        };
        Rect::new(index * VARIANT_COLUMN + x, y, 4, 4)
    }

    /// Piece of the top or bottom neighbor.
    pub fn vertical_piece(self, index: u32) -> Rect {
        let (x, y) = match self {
            Self::TopLeft => (4, 20),
            Self::TopRight => (8, 20),
            Self::BottomRight => (8, 8),
            Self::BottomLeft => (4, 8),
        };
        Rect::new(index * VARIANT_COLUMN + x, y, 4, 4)
    }

    /// Piece of the left or right neighbor.
    pub fn horizontal_piece(self, index: u32) -> Rect {
        let (x, y) = match self {
            Self::TopLeft => (12, 12),
            Self::TopRight => (0, 12),
            Self::BottomRight => (0, 16),
            Self::BottomLeft => (12, 16),
        };
        Rect::new(index * VARIANT_COLUMN + x, y, 4, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pieces_stay_inside_their_column() {
        for index in 0..4 {
            let left = index * VARIANT_COLUMN;
            for q in Quadrant::ALL {
                for rect in [
                    q.shared_corner(index),
                    q.vertical_piece(index),
                    q.horizontal_piece(index),
                ] {
                    assert!(rect.x >= left && rect.x + rect.width as u32 <= left + VARIANT_COLUMN);
                    assert_eq!((rect.width, rect.height), (4, 4));
                }
            }
            let b = base(index);
            assert_eq!((b.x - left, b.y, b.width, b.height), (4, 12, 8, 8));
        }
    }

    #[test]
    fn platform_piece_selection() {
        assert_eq!(PlatformPiece::select(true, true), PlatformPiece::Isolated);
        assert_eq!(PlatformPiece::select(false, true), PlatformPiece::RightEnd);
        assert_eq!(PlatformPiece::select(false, false), PlatformPiece::Span);
        assert_eq!(PlatformPiece::select(true, false), PlatformPiece::Span);
        assert_eq!(platform(2, PlatformPiece::Span), Rect::new(64, 0, 8, 8));
    }

    #[test]
    fn overflow_sits_above_body() {
        let body = base(1);
        let strip = overflow(1);
        assert_eq!(strip.x, body.x);
        assert_eq!(strip.y + strip.height as u32, body.y);
    }
}
