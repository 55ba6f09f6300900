use std::convert::TryFrom;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};
use url::Url;

use crate::errors::{Field, ReviewError};
use crate::normalization;

/// The nickname given to reviews stored before nicknames existed.
pub const ANONYMOUS: &str = "Anonymous";

/// A single tasting review.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// The ID of the review.
    pub(crate) id: ReviewId,

    /// The name of the drink.
    pub(crate) name: String,

    /// The name of the reviewer.
    pub(crate) nickname: String,

    /// The kind of drink.
    #[serde(rename = "type")]
    pub(crate) drink_type: DrinkType,

    /// The rating given.
    pub(crate) rating: Rating,

    /// Free-form tasting notes. May be empty.
    pub(crate) notes: String,

    /// The photo, either embedded as a `data:` URI or referenced.
    pub(crate) image_url: ImageRef,

    /// The date and time it was created.
    pub(crate) date: ReviewDate,
}

impl Review {
    pub(crate) fn create(id: ReviewId, date: OffsetDateTime, submission: NewReview) -> Self {
        let NewReview {
            name,
            nickname,
            drink_type,
            rating,
            notes,
            image_url,
        } = submission;

        Review {
            id,
            name,
            nickname,
            drink_type,
            rating,
            notes,
            image_url,
            date: ReviewDate::stamp(date),
        }
    }

    pub fn id(&self) -> &ReviewId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn drink_type(&self) -> DrinkType {
        self.drink_type
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn image_url(&self) -> &ImageRef {
        &self.image_url
    }

    pub fn date(&self) -> OffsetDateTime {
        self.date.datetime()
    }

    /// The creation date exactly as it is stored.
    pub fn date_str(&self) -> &str {
        self.date.as_str()
    }
}

/// A review as submitted, before it's given an ID and a date.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// The name of the drink.
    #[serde(deserialize_with = "normalization::deserialize")]
    pub name: String,

    /// The name of the reviewer.
    #[serde(deserialize_with = "normalization::deserialize")]
    pub nickname: String,

    /// The kind of drink.
    #[serde(rename = "type")]
    pub drink_type: DrinkType,

    /// The rating given.
    pub rating: Rating,

    /// Free-form tasting notes.
    #[serde(default)]
    pub notes: String,

    /// The already-encoded photo.
    pub image_url: ImageRef,
}

impl NewReview {
    /// Normalizes the free-text fields and checks the result.
    ///
    /// A missing image is reported on its own, ahead of any other
    /// problem; everything else is collected into a single
    /// [`ReviewError::Invalid`].
    pub fn validate(self) -> Result<Self, ReviewError> {
        let image_url = ImageRef::new(self.image_url.as_str().trim());

        if image_url.is_empty() {
            return Err(ReviewError::MissingImage);
        }

        let normalized = NewReview {
            name: normalization::normalize_name(&self.name),
            nickname: normalization::normalize_name(&self.nickname),
            notes: self.notes.trim().to_owned(),
            image_url,
            ..self
        };

        let mut fields = vec![];

        if normalized.name.is_empty() {
            fields.push(Field::Name);
        }

        if normalized.nickname.is_empty() {
            fields.push(Field::Nickname);
        }

        if !normalized.rating.is_valid() {
            fields.push(Field::Rating);
        }

        if fields.is_empty() {
            Ok(normalized)
        } else {
            Err(ReviewError::Invalid { fields })
        }
    }
}

/// The ID of a review: the creation time in Unix milliseconds.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        ReviewId(id.into())
    }

    /// Derives an ID from a timestamp.
    pub fn from_millis(millis: i128) -> Self {
        ReviewId(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RFC 3339 creation date that keeps the text it was read from, so
/// stored dates are written back unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReviewDate {
    text: String,
    datetime: OffsetDateTime,
}

impl ReviewDate {
    /// Stamps an instant in UTC, to the millisecond.
    pub fn stamp(at: OffsetDateTime) -> Self {
        let at = at.to_offset(UtcOffset::UTC);
        let datetime = at - Duration::nanoseconds(i64::from(at.nanosecond() % 1_000_000));

        let text = format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            datetime.year(),
            u8::from(datetime.month()),
            datetime.day(),
            datetime.hour(),
            datetime.minute(),
            datetime.second(),
            datetime.millisecond(),
        );

        ReviewDate { text, datetime }
    }

    pub fn parse(text: impl Into<String>) -> Result<Self, time::error::Parse> {
        let text = text.into();
        let datetime = OffsetDateTime::parse(&text, &Rfc3339)?;

        Ok(ReviewDate { text, datetime })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn datetime(&self) -> OffsetDateTime {
        self.datetime
    }
}

impl fmt::Display for ReviewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for ReviewDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ReviewDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        ReviewDate::parse(text).map_err(de::Error::custom)
    }
}

/// The kind of drink reviewed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrinkType {
    Wine,
    Beer,
    Spirits,
    Cocktail,
    Other,
}

impl DrinkType {
    pub const ALL: [DrinkType; 5] = [
        DrinkType::Wine,
        DrinkType::Beer,
        DrinkType::Spirits,
        DrinkType::Cocktail,
        DrinkType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DrinkType::Wine => "wine",
            DrinkType::Beer => "beer",
            DrinkType::Spirits => "spirits",
            DrinkType::Cocktail => "cocktail",
            DrinkType::Other => "other",
        }
    }
}

impl Default for DrinkType {
    fn default() -> Self {
        DrinkType::Wine
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DrinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrinkType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown drink type {:?}", s))
    }
}

/// A star rating between 1 and 5 in steps of one half.
///
/// Stored ratings are kept as they are, even outside that domain;
/// only new submissions are checked.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;

    /// Wraps a value without checking it.
    pub fn new(value: f64) -> Self {
        Rating(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this is one of the nine half-steps from 1 to 5.
    pub fn is_valid(self) -> bool {
        let doubled = self.0 * 2.0;

        (Self::MIN..=Self::MAX).contains(&self.0) && doubled.fract() == 0.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating(Self::MAX)
    }
}

impl TryFrom<f64> for Rating {
    type Error = ReviewError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let rating = Rating(value);

        if rating.is_valid() {
            Ok(rating)
        } else {
            Err(ReviewError::Invalid {
                fields: vec![Field::Rating],
            })
        }
    }
}

/// Whole ratings are written as integers, the way browsers write them.
impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}/5", self.0)
    }
}

/// A reference to a review's photo. Either a `data:` URI embedding the
/// image or a reference to an image elsewhere; never decoded here.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ImageRef(String);

/// What an [`ImageRef`] points at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageSource {
    /// An image embedded in the reference, with its declared media type.
    Embedded { media_type: String },

    /// An absolute URL.
    Remote(Url),

    /// Anything else, such as a path relative to the page.
    Relative(String),
}

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        ImageRef(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    pub fn source(&self) -> ImageSource {
        match Url::parse(&self.0) {
            Ok(url) if url.scheme() == "data" => {
                let media_type = url
                    .path()
                    .split(|c| c == ';' || c == ',')
                    .next()
                    .unwrap_or_default()
                    .to_owned();

                ImageSource::Embedded { media_type }
            }
            Ok(url) => ImageSource::Remote(url),
            Err(_) => ImageSource::Relative(self.0.clone()),
        }
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        ImageRef(s)
    }
}
