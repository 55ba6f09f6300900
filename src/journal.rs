use std::fmt;

use log::{info, o, warn, Logger};
use time::OffsetDateTime;

use crate::collection::ReviewCollection;
use crate::errors::ReviewError;
use crate::persistence::ReviewStorage;
use crate::review::{NewReview, Review, ReviewId};

/// Something the user should hear about that doesn't stop them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// The stored reviews couldn't be read and were set aside.
    Corrupt { reason: String },

    /// The storage medium couldn't be read at all.
    Unreadable { reason: String },

    /// The latest change is only in memory.
    NotSaved { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Corrupt { reason } => {
                write!(f, "Saved reviews could not be read and were ignored ({})", reason)
            }
            Notice::Unreadable { reason } => {
                write!(f, "Saved reviews are unavailable ({})", reason)
            }
            Notice::NotSaved { reason } => write!(f, "Changes may not be saved ({})", reason),
        }
    }
}

/// One user's reviews for the lifetime of a session.
///
/// The in-memory collection is authoritative; storage is written after
/// every change and read only when opening. A stored value that couldn't
/// be loaded is set aside before the first write replaces it.
pub struct Journal {
    reviews: ReviewCollection,
    storage: ReviewStorage,
    notices: Vec<Notice>,
    logger: Logger,
    unread: bool,
}

impl Journal {
    /// Loads the stored reviews. Start-up never fails: unreadable data
    /// leaves an empty journal and a [`Notice`], and nothing is written
    /// back until the first submission.
    pub fn open(storage: ReviewStorage, logger: &Logger) -> Self {
        let logger = logger.new(o!("storage_key" => storage.key().to_owned()));
        let mut notices = vec![];
        let mut unread = false;

        let reviews = match storage.load() {
            Ok(reviews) => reviews,
            Err(e) => {
                let reason = describe(&e);
                warn!(logger, "Could not load reviews; starting empty"; "error" => %reason);
                unread = true;

                notices.push(match e {
                    ReviewError::Corrupt { .. } => Notice::Corrupt { reason },
                    _ => Notice::Unreadable { reason },
                });

                ReviewCollection::new()
            }
        };

        Journal {
            reviews,
            storage,
            notices,
            logger,
            unread,
        }
    }

    pub fn reviews(&self) -> &ReviewCollection {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn find(&self, id: &ReviewId) -> Option<&Review> {
        self.reviews.find(id)
    }

    /// Drains the notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Records a new review at the front of the journal and saves.
    pub fn submit(&mut self, submission: NewReview) -> Result<&Review, ReviewError> {
        self.submit_at(submission, OffsetDateTime::now_utc())
    }

    pub(crate) fn submit_at(
        &mut self,
        submission: NewReview,
        now: OffsetDateTime,
    ) -> Result<&Review, ReviewError> {
        let submission = submission.validate()?;
        let id = self.next_id(now);
        let logger = self.logger.new(o!("id" => id.to_string()));

        let review = Review::create(id, now, submission);
        self.reviews.prepend(review)?;

        info!(logger, "Added review"; "count" => self.reviews.len());

        let saved = self
            .keep_unread_value()
            .and_then(|()| self.storage.save(&self.reviews));

        if let Err(e) = saved {
            let reason = describe(&e);
            warn!(logger, "Could not save reviews"; "error" => %reason);
            self.notices.push(Notice::NotSaved { reason });
        }

        Ok(&self.reviews[0])
    }

    /// Sets aside the value that couldn't be loaded, once. Until that
    /// succeeds nothing is saved over it.
    fn keep_unread_value(&mut self) -> Result<(), ReviewError> {
        if self.unread {
            if let Some(backup) = self.storage.set_aside()? {
                info!(self.logger, "Kept unreadable reviews"; "backup_key" => backup);
            }

            self.unread = false;
        }

        Ok(())
    }

    /// The creation time in milliseconds, moved forward past any ID
    /// already taken.
    fn next_id(&self, now: OffsetDateTime) -> ReviewId {
        let mut millis = now.unix_timestamp_nanos() / 1_000_000;

        loop {
            let id = ReviewId::from_millis(millis);

            if !self.reviews.contains(&id) {
                return id;
            }

            millis += 1;
        }
    }
}

/// Renders an error along with its sources.
fn describe(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();

    while let Some(s) = source {
        message.push_str(": ");
        message.push_str(&s.to_string());
        source = s.source();
    }

    message
}
