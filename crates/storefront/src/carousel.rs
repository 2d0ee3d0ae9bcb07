//! Hero carousel index arithmetic.
//!
//! The carousel is rendered server-side; navigation and autoplay requests
//! carry the currently displayed index and receive the slide at the wrapped
//! neighbor index. Wrapping is total: any in-range index has a next and a
//! previous slide.

/// Direction of a carousel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Parse from the query-string form used by the carousel fragment.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "next" => Some(Self::Next),
            "prev" => Some(Self::Prev),
            _ => None,
        }
    }
}

/// The wrapped index one step from `current` in `direction`, for a carousel
/// of `len` slides.
///
/// Out-of-range `current` values are clamped into range first, so a stale
/// index from a client outlives a shrinking slide set without panicking.
/// Returns 0 for an empty carousel.
#[must_use]
pub fn step(current: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    let current = current.min(len - 1);
    match direction {
        Direction::Next => {
            if current + 1 == len {
                0
            } else {
                current + 1
            }
        }
        Direction::Prev => {
            if current == 0 {
                len - 1
            } else {
                current - 1
            }
        }
    }
}

/// Clamp a directly selected index (dot navigation) into range.
#[must_use]
pub fn select(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_advances_and_wraps() {
        assert_eq!(step(0, 3, Direction::Next), 1);
        assert_eq!(step(1, 3, Direction::Next), 2);
        assert_eq!(step(2, 3, Direction::Next), 0);
    }

    #[test]
    fn test_prev_retreats_and_wraps() {
        assert_eq!(step(2, 3, Direction::Prev), 1);
        assert_eq!(step(1, 3, Direction::Prev), 0);
        assert_eq!(step(0, 3, Direction::Prev), 2);
    }

    #[test]
    fn test_next_then_prev_is_identity() {
        for i in 0..5 {
            let there = step(i, 5, Direction::Next);
            assert_eq!(step(there, 5, Direction::Prev), i);
        }
    }

    #[test]
    fn test_single_slide_always_zero() {
        assert_eq!(step(0, 1, Direction::Next), 0);
        assert_eq!(step(0, 1, Direction::Prev), 0);
    }

    #[test]
    fn test_empty_carousel_is_zero() {
        assert_eq!(step(0, 0, Direction::Next), 0);
        assert_eq!(step(7, 0, Direction::Prev), 0);
        assert_eq!(select(3, 0), 0);
    }

    #[test]
    fn test_stale_index_is_clamped() {
        // Client last saw 5 slides, the set shrank to 2
        assert_eq!(step(4, 2, Direction::Next), 0);
        assert_eq!(step(4, 2, Direction::Prev), 0);
        assert_eq!(select(4, 2), 1);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("next"), Some(Direction::Next));
        assert_eq!(Direction::parse("prev"), Some(Direction::Prev));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
