use std::fmt;

/// The number of marks in a rating.
pub const SCALE: usize = 5;

/// One position in a star rating.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn symbol(self) -> char {
        match self {
            Star::Full => '★',
            Star::Half => '⯪',
            Star::Empty => '☆',
        }
    }
}

/// Computes the marks for a rating. Position `i` (counting from 1) is
/// full when `rating >= i`, half when `i - 0.5 <= rating < i` and empty
/// otherwise. Any `f64` is accepted; NaN gives five empty marks.
pub fn stars(rating: f64) -> [Star; SCALE] {
    let mut marks = [Star::Empty; SCALE];

    for (i, mark) in marks.iter_mut().enumerate() {
        let position = (i + 1) as f64;

        *mark = if rating >= position {
            Star::Full
        } else if rating >= position - 0.5 {
            Star::Half
        } else {
            Star::Empty
        };
    }

    marks
}

/// The marks for a rating, printable.
pub struct Stars(pub [Star; SCALE]);

impl Stars {
    pub fn for_rating(rating: f64) -> Self {
        Stars(stars(rating))
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|s| write!(f, "{}", s.symbol()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{stars, Star, Stars};

    fn counts(marks: &[Star]) -> (usize, usize, usize) {
        let count = |kind| marks.iter().filter(|&&m| m == kind).count();

        (count(Star::Full), count(Star::Half), count(Star::Empty))
    }

    #[test]
    fn three_and_a_half() {
        assert_eq!(
            stars(3.5),
            [Star::Full, Star::Full, Star::Full, Star::Half, Star::Empty]
        );
        assert_eq!(Stars::for_rating(3.5).to_string(), "★★★⯪☆");
    }

    #[test]
    fn every_valid_rating() {
        for halves in 2..=10u32 {
            let rating = f64::from(halves) / 2.0;
            let full = (halves / 2) as usize;
            let half = (halves % 2) as usize;

            assert_eq!(
                counts(&stars(rating)),
                (full, half, 5 - full - half),
                "rating {}",
                rating
            );
        }
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(counts(&stars(f64::NAN)), (0, 0, 5));
        assert_eq!(counts(&stars(-3.0)), (0, 0, 5));
        assert_eq!(counts(&stars(0.5)), (0, 1, 4));
        assert_eq!(counts(&stars(f64::INFINITY)), (5, 0, 0));
        assert_eq!(counts(&stars(3.7)), (3, 1, 1));
    }

    proptest! {
        #[test]
        fn marks_never_increase(rating in proptest::num::f64::ANY) {
            let marks = stars(rating);
            let rank = |m: &Star| match m {
                Star::Full => 2,
                Star::Half => 1,
                Star::Empty => 0,
            };

            prop_assert!(marks.windows(2).all(|w| rank(&w[0]) >= rank(&w[1])));
            prop_assert!(counts(&marks).1 <= 1);
        }
    }
}
