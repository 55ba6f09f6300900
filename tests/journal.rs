use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use vino::config::Config;
use vino::environment::Environment;
use vino::errors::{ReviewError, StoreError};
use vino::journal::{Journal, Notice};
use vino::persistence::{ReviewStorage, DEFAULT_KEY};
use vino::review::{DrinkType, ImageRef, NewReview, Rating, ANONYMOUS};
use vino::store::mock::MockStore;
use vino::store::{FileStore, Store};

fn open(store: Arc<dyn Store>) -> Journal {
    let logger = log::discard_logger();

    Journal::open(ReviewStorage::new(store, DEFAULT_KEY, &logger), &logger)
}

fn submission(name: &str, drink_type: DrinkType, rating: f64) -> NewReview {
    NewReview {
        name: name.to_owned(),
        nickname: "Sam".to_owned(),
        drink_type,
        rating: Rating::new(rating),
        notes: "Smooth".to_owned(),
        image_url: ImageRef::new("data:image/png;base64,AAA="),
    }
}

#[test]
fn submitting_prepends_and_saves() {
    let store = Arc::new(MockStore::new());
    let mut journal = open(store.clone());

    assert!(journal.is_empty());
    assert_eq!(store.writes(), 0, "opening an empty store writes nothing");

    let prior_id = journal
        .submit(submission("Pilsner", DrinkType::Beer, 3.0))
        .expect("submit pilsner")
        .id()
        .clone();

    let review = journal
        .submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submit malbec");

    assert_eq!(review.drink_type(), DrinkType::Wine);
    assert_eq!(review.rating().value(), 4.5);
    assert!(!review.id().as_str().is_empty());
    assert_ne!(review.id(), &prior_id);
    assert!(review.date().unix_timestamp() > 0);

    assert_eq!(journal.len(), 2);
    assert_eq!(journal.reviews()[0].name(), "Malbec");
    assert_eq!(journal.reviews()[1].name(), "Pilsner");
    assert_eq!(store.writes(), 2, "one full write per submission");
    assert!(journal.take_notices().is_empty());
}

#[test]
fn missing_image_is_rejected() {
    let store = Arc::new(MockStore::new());
    let mut journal = open(store.clone());
    journal
        .submit(submission("Pilsner", DrinkType::Beer, 3.0))
        .expect("submit pilsner");

    let mut review = submission("Malbec", DrinkType::Wine, 4.5);
    review.image_url = ImageRef::new("");

    assert!(matches!(journal.submit(review), Err(ReviewError::MissingImage)));
    assert_eq!(journal.len(), 1);
    assert_eq!(store.writes(), 1);
}

#[test]
fn saved_reviews_load_unchanged() {
    let store: Arc<dyn Store> = Arc::new(MockStore::new());
    let mut journal = open(store.clone());

    for (i, drink_type) in DrinkType::ALL.iter().enumerate() {
        journal
            .submit(submission(&format!("Drink {}", i), *drink_type, 1.0 + i as f64))
            .expect("submit review");
    }

    let reopened = open(store);

    assert_eq!(reopened.reviews(), journal.reviews());
}

#[test]
fn legacy_reviews_get_a_nickname() {
    let stored = json!([
        {
            "id": "1714560000001",
            "name": "Old Fashioned",
            "nickname": "Dad",
            "type": "cocktail",
            "rating": 5,
            "notes": "",
            "imageUrl": "data:image/jpeg;base64,/9j/",
            "date": "2024-05-01T10:40:00.001Z"
        },
        {
            "id": "1714560000000",
            "name": "Rioja",
            "type": "wine",
            "rating": 3.5,
            "notes": "Oaky",
            "imageUrl": "data:image/jpeg;base64,/9j/",
            "date": "2024-05-01T10:40:00.000Z"
        }
    ]);
    let store = Arc::new(MockStore::with_item(DEFAULT_KEY, stored.to_string()));

    let mut journal = open(store.clone());

    assert_eq!(journal.reviews()[0].nickname(), "Dad");
    assert_eq!(journal.reviews()[1].nickname(), ANONYMOUS);
    assert!(journal.take_notices().is_empty());
    assert_eq!(store.writes(), 0, "migration happens on load, not on write");
}

#[test]
fn corrupt_storage_starts_empty_without_overwriting() {
    let store = Arc::new(MockStore::with_item(DEFAULT_KEY, "{\"reviews\": 12"));

    let mut journal = open(store.clone());

    assert!(journal.is_empty());
    assert!(matches!(
        journal.take_notices().as_slice(),
        [Notice::Corrupt { .. }]
    ));
    assert_eq!(
        store.get_item(DEFAULT_KEY).expect("read store"),
        Some("{\"reviews\": 12".to_owned())
    );
}

#[test]
fn versioned_reviews_without_nicknames_keep_their_neighbours() {
    let stored = json!({
        "version": 2,
        "reviews": [
            {
                "id": "2",
                "name": "Keep",
                "nickname": "Sam",
                "type": "wine",
                "rating": 4,
                "notes": "",
                "imageUrl": "data:image/jpeg;base64,/9j/",
                "date": "2024-05-01T10:40:00.001Z"
            },
            {
                "id": "1",
                "name": "Nameless",
                "type": "beer",
                "rating": 3,
                "notes": "",
                "imageUrl": "data:image/jpeg;base64,/9j/",
                "date": "2024-05-01T10:40:00.000Z"
            }
        ]
    });
    let store = Arc::new(MockStore::with_item(DEFAULT_KEY, stored.to_string()));

    let mut journal = open(store);

    assert!(journal.take_notices().is_empty());
    assert_eq!(journal.len(), 2);
    assert_eq!(journal.reviews()[0].nickname(), "Sam");
    assert_eq!(journal.reviews()[1].nickname(), ANONYMOUS);
}

#[test]
fn corrupt_storage_is_set_aside_before_the_first_save() {
    let stored = r#"{"version":2,"reviews":[{"id":"1","name":"Keep"}]}"#;
    let store = Arc::new(MockStore::with_item(DEFAULT_KEY, stored));

    let mut journal = open(store.clone());
    journal
        .submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submit malbec");

    assert!(matches!(
        journal.take_notices().as_slice(),
        [Notice::Corrupt { .. }]
    ));
    assert_eq!(
        store.get_item("wineReviews.corrupt").expect("read backup"),
        Some(stored.to_owned())
    );

    let reopened = open(store);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.reviews()[0].name(), "Malbec");
}

#[test]
fn stored_reviews_are_saved_back_unchanged() {
    let legacy = json!({
        "id": "1714560000000",
        "name": "Rioja",
        "nickname": "Dad",
        "type": "wine",
        "rating": 4,
        "notes": "Oaky",
        "imageUrl": "data:image/jpeg;base64,/9j/",
        "date": "2024-05-01T10:40:00.000Z"
    });
    let store = Arc::new(MockStore::with_item(DEFAULT_KEY, json!([legacy]).to_string()));

    let mut journal = open(store.clone());
    journal
        .submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submit malbec");

    let saved: serde_json::Value = serde_json::from_str(
        &store
            .get_item(DEFAULT_KEY)
            .expect("read store")
            .expect("value is present"),
    )
    .expect("parse saved value");

    assert_eq!(saved["reviews"][1], legacy);

    let date = saved["reviews"][0]["date"].as_str().expect("date is a string");
    assert_eq!(date.len(), "2024-05-01T10:40:00.000Z".len());
    assert!(date.ends_with('Z'));
}

#[test]
fn failed_saves_keep_the_review_in_memory() {
    let store = Arc::new(MockStore::with_quota(64));
    let mut journal = open(store.clone());

    let review = journal
        .submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submission succeeds even if saving fails");
    assert_eq!(review.name(), "Malbec");

    assert_eq!(journal.len(), 1);
    assert!(matches!(
        journal.take_notices().as_slice(),
        [Notice::NotSaved { .. }]
    ));
    assert_eq!(store.get_item(DEFAULT_KEY).expect("read store"), None);
}

#[test]
fn independent_journals_do_not_interfere() {
    let first = Arc::new(MockStore::new());
    let second = Arc::new(MockStore::new());

    let mut a = open(first.clone());
    let b = open(second.clone());

    a.submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submit malbec");

    assert_eq!(a.len(), 1);
    assert!(b.is_empty());
    assert!(open(second).is_empty());
    assert_eq!(open(first).len(), 1);
}

#[test]
fn rapid_submissions_have_unique_ids() {
    let mut journal = open(Arc::new(MockStore::new()));

    for i in 0..50 {
        journal
            .submit(submission(&format!("Sample {}", i), DrinkType::Spirits, 2.5))
            .expect("submit review");
    }

    let ids = journal
        .reviews()
        .iter()
        .map(|r| r.id().clone())
        .collect::<HashSet<_>>();

    assert_eq!(ids.len(), 50);
}

#[test]
fn file_backed_environment_survives_restarts() {
    let dir = tempfile::tempdir().expect("create temporary directory");
    let config = Config::new(dir.path(), "reviews");
    let logger = Arc::new(log::discard_logger());

    {
        let environment =
            Environment::with_file_store(logger.clone(), config.clone()).expect("open environment");
        let mut journal = environment.open_journal();
        journal
            .submit(submission("Malbec", DrinkType::Wine, 4.5))
            .expect("submit malbec");
    }

    let environment = Environment::with_file_store(logger, config).expect("reopen environment");
    let journal = environment.open_journal();

    assert_eq!(journal.len(), 1);
    assert_eq!(journal.reviews()[0].nickname(), "Sam");
}

#[test]
fn unreadable_storage_is_reported() {
    struct BrokenStore;

    impl Store for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io {
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn remove_item(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    let mut journal = open(Arc::new(BrokenStore));

    assert!(journal.is_empty());
    assert!(matches!(
        journal.take_notices().as_slice(),
        [Notice::Unreadable { .. }]
    ));
}

#[test]
fn file_store_rejects_bad_keys_on_save() {
    let dir = tempfile::tempdir().expect("create temporary directory");
    let store = Arc::new(FileStore::new(dir.path()).expect("create store"));
    let logger = log::discard_logger();
    let mut journal = Journal::open(ReviewStorage::new(store, "../escape", &logger), &logger);

    journal
        .submit(submission("Malbec", DrinkType::Wine, 4.5))
        .expect("submit malbec");

    assert!(matches!(
        journal.take_notices().as_slice(),
        [Notice::Unreadable { .. }, Notice::NotSaved { .. }]
    ));
}
