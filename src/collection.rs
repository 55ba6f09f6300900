use std::collections::HashSet;
use std::ops::Deref;

use crate::errors::{CorruptionError, ReviewError};
use crate::review::{Review, ReviewId};

/// Every review, newest first.
///
/// The only mutation is [`ReviewCollection::prepend`]; once a review is
/// in, its position relative to the others never changes and no two
/// reviews share an ID.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewCollection {
    reviews: Vec<Review>,
}

impl ReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from stored reviews, already ordered newest
    /// first.
    pub(crate) fn from_stored(reviews: Vec<Review>) -> Result<Self, CorruptionError> {
        let mut seen = HashSet::with_capacity(reviews.len());

        for review in &reviews {
            if !seen.insert(review.id()) {
                return Err(CorruptionError::DuplicateId(review.id().to_string()));
            }
        }

        Ok(ReviewCollection { reviews })
    }

    /// Puts a review at the front.
    pub fn prepend(&mut self, review: Review) -> Result<&Review, ReviewError> {
        if self.contains(review.id()) {
            return Err(ReviewError::DuplicateId(review.id().to_string()));
        }

        self.reviews.insert(0, review);

        Ok(&self.reviews[0])
    }

    pub fn contains(&self, id: &ReviewId) -> bool {
        self.reviews.iter().any(|r| r.id() == id)
    }

    pub fn find(&self, id: &ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id() == id)
    }
}

impl Deref for ReviewCollection {
    type Target = [Review];

    fn deref(&self) -> &[Review] {
        &self.reviews
    }
}

impl<'a> IntoIterator for &'a ReviewCollection {
    type Item = &'a Review;
    type IntoIter = std::slice::Iter<'a, Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}
