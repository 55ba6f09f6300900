use std::fmt::Write;

use time::format_description::FormatItem;
use time::macros::format_description;

use crate::review::{ImageSource, Review};
use crate::stars::Stars;

/// Shown in place of the cards when there are no reviews.
pub const EMPTY_JOURNAL: &str = "No reviews yet. Be the first to add one!";

const CARD_DATE: &[FormatItem<'_>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Renders one review as a plain-text card.
pub fn render_card(review: &Review) -> String {
    let mut card = String::new();

    // writing to a String can't fail
    let _ = writeln!(card, "{} [{}]", review.name(), review.drink_type());

    if !review.nickname().is_empty() {
        let _ = writeln!(card, "by {}", review.nickname());
    }

    let rating = review.rating();
    let _ = writeln!(card, "{} {}", Stars::for_rating(rating.value()), rating);

    if !review.notes().is_empty() {
        let _ = writeln!(card, "{}", review.notes());
    }

    let _ = writeln!(card, "photo: {}", describe_image(review));

    let date = review
        .date()
        .format(CARD_DATE)
        .unwrap_or_else(|_| review.date_str().to_owned());
    let _ = write!(card, "{}", date);

    card
}

/// Renders every review, newest first, separated by blank lines.
pub fn render_journal(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return EMPTY_JOURNAL.to_owned();
    }

    reviews
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn describe_image(review: &Review) -> String {
    match review.image_url().source() {
        ImageSource::Embedded { media_type } if media_type.is_empty() => "embedded".to_owned(),
        ImageSource::Embedded { media_type } => format!("embedded {}", media_type),
        ImageSource::Remote(url) => url.to_string(),
        ImageSource::Relative(path) => path,
    }
}
