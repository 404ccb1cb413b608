//! Integration tests for soft delete through the entity manager
//!
//! Every test runs against its own in-memory ORM with an isolated metadata
//! storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use soft_deletable::prelude::*;
use soft_deletable::SOFT_DELETABLE_FILTER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Post {
    id: u32,
    title: String,
    deleted_at: Option<DateTime<Utc>>,
}

impl store_object::Entity for Post {
    fn entity_name() -> &'static str {
        "posts"
    }

    fn decorate(metadata: &MetadataStorage) {
        SoftDeletable::with_config(SoftDeletableConfig::<Post>::new("deleted_at", Utc::now))
            .apply(metadata);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Comment {
    id: u32,
    body: String,
}

impl store_object::Entity for Comment {
    fn entity_name() -> &'static str {
        "comments"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    id: String,
    archived: bool,
}

impl store_object::Entity for Task {
    fn entity_name() -> &'static str {
        "tasks"
    }

    fn decorate(metadata: &MetadataStorage) {
        SoftDeletable::with_config(
            SoftDeletableConfig::<Task>::new("archived", || true).with_value_initial(false),
        )
        .apply(metadata);
    }
}

fn post(id: u32, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        deleted_at: None,
    }
}

fn comment(id: u32, body: &str) -> Comment {
    Comment {
        id,
        body: body.to_string(),
    }
}

fn task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        archived: false,
    }
}

/// Fresh ORM with isolated metadata, the test entities discovered and the
/// handler registered
fn setup() -> Orm {
    let orm = Orm::in_memory().with_metadata(Arc::new(MetadataStorage::new()));
    orm.discover::<Post>().discover::<Comment>().discover::<Task>();
    SoftDeletable::register(&orm).unwrap();
    orm
}

fn unfiltered() -> QueryBuilder {
    QueryBuilder::new().disable_filters()
}

#[tokio::test]
async fn test_soft_delete_keeps_row() {
    let orm = setup();
    let mut em = orm.em();

    let before = Utc::now();
    em.persist_and_flush(&post(1, "hello")).await.unwrap();
    let summary = em.remove_and_flush(&post(1, "hello")).await.unwrap();

    assert_eq!(summary.soft_deleted, vec!["1".to_string()]);
    assert!(summary.deleted.is_empty());

    // hidden from default reads
    assert!(em.find::<Post>(QueryBuilder::new()).await.unwrap().is_empty());
    assert!(em.find_by_id::<Post, _>(&1).await.unwrap().is_none());
    assert_eq!(em.count::<Post>(QueryBuilder::new()).await.unwrap(), 0);

    // still stored, with the marker set
    let stored = em
        .find_by_id_with::<Post, _>(&1, unfiltered())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "hello");
    let deleted_at = stored.deleted_at.unwrap();
    assert!(deleted_at >= before);
    assert!(deleted_at <= Utc::now());
}

#[tokio::test]
async fn test_filter_can_be_disabled_by_name() {
    let orm = setup();
    let mut em = orm.em();

    em.persist(&post(1, "kept"))
        .unwrap()
        .persist(&post(2, "removed"))
        .unwrap();
    em.flush().await.unwrap();
    em.remove_and_flush(&post(2, "removed")).await.unwrap();

    let visible = em.find::<Post>(QueryBuilder::new()).await.unwrap();
    assert_eq!(visible, vec![post(1, "kept")]);

    let all = em
        .find::<Post>(
            QueryBuilder::new()
                .filter_enabled(SOFT_DELETABLE_FILTER, false)
                .order_by("id", SortOrder::Asc),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].id, 2);
    assert!(all[1].deleted_at.is_some());

    // deleted rows only
    let trashed = em
        .find::<Post>(unfiltered().filter(QueryFilter::is_not_null("deleted_at")))
        .await
        .unwrap();
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].title, "removed");
}

#[tokio::test]
async fn test_plain_entity_is_deleted() {
    let orm = setup();
    let mut em = orm.em();

    em.persist_and_flush(&comment(1, "first")).await.unwrap();
    let summary = em.remove_and_flush(&comment(1, "first")).await.unwrap();

    assert_eq!(summary.deleted, vec!["1".to_string()]);
    assert!(summary.soft_deleted.is_empty());
    assert_eq!(em.count::<Comment>(unfiltered()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_without_registration_rows_are_deleted() {
    let orm = Orm::in_memory().with_metadata(Arc::new(MetadataStorage::new()));
    orm.discover::<Post>();
    let mut em = orm.em();

    em.persist_and_flush(&post(1, "gone")).await.unwrap();
    let summary = em.remove_and_flush(&post(1, "gone")).await.unwrap();

    assert_eq!(summary.deleted, vec!["1".to_string()]);
    assert_eq!(em.count::<Post>(unfiltered()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let orm = setup();
    assert!(!SoftDeletable::register(&orm).unwrap());
    assert_eq!(orm.event_manager().subscriber_count(), 1);

    let mut em = orm.em();
    em.persist_and_flush(&post(1, "once")).await.unwrap();
    let summary = em.remove_and_flush(&post(1, "once")).await.unwrap();
    assert_eq!(summary.soft_deleted.len(), 1);
}

#[tokio::test]
async fn test_duplicate_handlers_when_deduplication_is_off() {
    let config = AppConfig {
        orm: OrmConfig::default(),
        events: EventConfig::new(8, false),
    };
    let orm = Orm::init(config, Arc::new(MemoryBackend::new()))
        .unwrap()
        .with_metadata(Arc::new(MetadataStorage::new()));
    orm.discover::<Post>();

    assert!(SoftDeletable::register(&orm).unwrap());
    assert!(SoftDeletable::register(&orm).unwrap());
    assert_eq!(orm.event_manager().subscriber_count(), 2);

    // both handlers write the same field; the row is still updated once
    let mut em = orm.em();
    em.persist_and_flush(&post(1, "twice")).await.unwrap();
    let summary = em.remove_and_flush(&post(1, "twice")).await.unwrap();
    assert_eq!(summary.soft_deleted, vec!["1".to_string()]);
    assert_eq!(em.count::<Post>(unfiltered()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_boolean_marker_with_initial_value() {
    let orm = setup();
    let mut em = orm.em();

    em.persist(&task("a")).unwrap().persist(&task("b")).unwrap();
    em.flush().await.unwrap();
    em.remove_and_flush(&task("a")).await.unwrap();

    let visible = em.find::<Task>(QueryBuilder::new()).await.unwrap();
    assert_eq!(visible, vec![task("b")]);

    let archived = em
        .find_by_id_with::<Task, _>(&"a", unfiltered())
        .await
        .unwrap()
        .unwrap();
    assert!(archived.archived);
}

#[tokio::test]
async fn test_positional_decorator() {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        id: u32,
        state: String,
    }

    impl store_object::Entity for Note {
        fn entity_name() -> &'static str {
            "notes"
        }
    }

    let orm = setup();
    SoftDeletable::with_args::<Note, _, _>(Some("state"), Some(|| "trashed"), Some(json!("live")))
        .unwrap()
        .apply(orm.metadata());

    let mut em = orm.em();
    let note = Note {
        id: 3,
        state: "live".to_string(),
    };
    em.persist_and_flush(&note).await.unwrap();
    em.remove_and_flush(&note).await.unwrap();

    assert_eq!(em.count::<Note>(QueryBuilder::new()).await.unwrap(), 0);
    let stored = em
        .find_one::<Note>(unfiltered())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, "trashed");

    let invalid = SoftDeletable::with_args::<Note, fn() -> &'static str, &'static str>(
        Some("state"),
        None,
        None,
    );
    assert!(matches!(invalid, Err(SoftDeletableError::InvalidArguments(_))));
}

#[tokio::test]
async fn test_value_is_computed_per_removal() {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ticket {
        id: u32,
        closed_seq: Option<u32>,
    }

    impl store_object::Entity for Ticket {
        fn entity_name() -> &'static str {
            "tickets"
        }
    }

    let orm = setup();
    let counter = Arc::new(AtomicU32::new(0));
    let next = counter.clone();
    SoftDeletable::with_config(SoftDeletableConfig::<Ticket>::new("closed_seq", move || {
        next.fetch_add(1, Ordering::SeqCst) + 1
    }))
    .apply(orm.metadata());

    let mut em = orm.em();
    let first = Ticket { id: 1, closed_seq: None };
    let second = Ticket { id: 2, closed_seq: None };
    em.persist(&first).unwrap().persist(&second).unwrap();
    em.flush().await.unwrap();
    em.remove(&first).unwrap().remove(&second).unwrap();
    em.flush().await.unwrap();

    let tickets = em
        .find::<Ticket>(unfiltered().order_by("id", SortOrder::Asc))
        .await
        .unwrap();
    let seqs: Vec<_> = tickets.iter().map(|t| t.closed_seq).collect();
    assert_eq!(seqs, vec![Some(1), Some(2)]);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_create_and_remove_in_one_flush() {
    let orm = setup();
    let mut em = orm.em();

    em.persist(&post(5, "short lived"))
        .unwrap()
        .remove(&post(5, "short lived"))
        .unwrap();
    let summary = em.flush().await.unwrap();

    assert_eq!(summary.created, vec!["5".to_string()]);
    assert_eq!(summary.soft_deleted, vec!["5".to_string()]);
    assert!(em.find_by_id::<Post, _>(&5).await.unwrap().is_none());
    assert_eq!(em.count::<Post>(unfiltered()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_flush_is_atomic() {
    let orm = setup();
    let mut em = orm.em();

    // the soft delete of a never-stored post fails the whole batch
    em.persist(&comment(1, "pending"))
        .unwrap()
        .remove(&post(9, "never stored"))
        .unwrap();
    let err = em.flush().await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(em.pending(), 2);
    assert_eq!(em.count::<Comment>(unfiltered()).await.unwrap(), 0);
    assert_eq!(em.count::<Post>(unfiltered()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_flush_can_be_retried() {
    let orm = setup();
    let mut em = orm.em();

    em.persist(&comment(1, "pending"))
        .unwrap()
        .remove(&post(9, "stored later"))
        .unwrap();
    assert!(em.flush().await.is_err());

    // once the row exists the same batch goes through
    orm.em()
        .persist_and_flush(&post(9, "stored later"))
        .await
        .unwrap();
    let summary = em.flush().await.unwrap();

    assert_eq!(summary.created, vec!["1".to_string()]);
    assert_eq!(summary.soft_deleted, vec!["9".to_string()]);
    assert_eq!(em.pending(), 0);
    assert!(em.find_by_id::<Post, _>(&9).await.unwrap().is_none());
}

#[tokio::test]
async fn test_soft_delete_of_stale_copy_keeps_other_edits() {
    let orm = setup();
    let original = post(1, "v1");

    let mut first = orm.em();
    first.persist_and_flush(&original).await.unwrap();

    let mut second = orm.em();
    second
        .persist_and_flush(&post(1, "v2-edited"))
        .await
        .unwrap();

    first.remove_and_flush(&original).await.unwrap();

    let stored = first
        .find_by_id_with::<Post, _>(&1, unfiltered())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "v2-edited");
    assert!(stored.deleted_at.is_some());
}

#[tokio::test]
async fn test_persist_after_remove_keeps_entity() {
    let orm = setup();
    let mut em = orm.em();

    em.persist(&post(1, "draft"))
        .unwrap()
        .remove(&post(1, "draft"))
        .unwrap()
        .persist(&post(1, "final"))
        .unwrap();
    let summary = em.flush().await.unwrap();

    assert_eq!(summary.created, vec!["1".to_string()]);
    assert!(summary.soft_deleted.is_empty());
    let stored = em.find_by_id::<Post, _>(&1).await.unwrap().unwrap();
    assert_eq!(stored, post(1, "final"));
}

#[tokio::test]
async fn test_strict_fields_reject_unknown_marker() {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Draft {
        id: u32,
    }

    impl store_object::Entity for Draft {
        fn entity_name() -> &'static str {
            "drafts"
        }

        fn decorate(metadata: &MetadataStorage) {
            SoftDeletable::with_config(SoftDeletableConfig::<Draft>::new("deleted_at", Utc::now))
                .apply(metadata);
        }
    }

    let strict = AppConfig {
        orm: OrmConfig::new("strict".to_string(), true),
        events: EventConfig::default(),
    };
    let orm = Orm::init(strict, Arc::new(MemoryBackend::new()))
        .unwrap()
        .with_metadata(Arc::new(MetadataStorage::new()));
    orm.discover::<Draft>();
    SoftDeletable::register(&orm).unwrap();

    let mut em = orm.em();
    em.persist_and_flush(&Draft { id: 1 }).await.unwrap();
    let err = em.remove_and_flush(&Draft { id: 1 }).await.unwrap_err();
    match err {
        StoreError::ValidationError { entity, field, .. } => {
            assert_eq!(entity, "drafts");
            assert_eq!(field, "deleted_at");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(em.count::<Draft>(unfiltered()).await.unwrap(), 1);

    // lenient mode writes the field anyway, and the filter then hides the row
    let lenient = setup();
    lenient.discover::<Draft>();
    let mut em = lenient.em();
    em.persist_and_flush(&Draft { id: 1 }).await.unwrap();
    em.remove_and_flush(&Draft { id: 1 }).await.unwrap();
    assert_eq!(em.count::<Draft>(QueryBuilder::new()).await.unwrap(), 0);
    assert_eq!(em.count::<Draft>(unfiltered()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_value_serialization_failure_aborts_flush() {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Upload {
        id: u32,
    }

    impl store_object::Entity for Upload {
        fn entity_name() -> &'static str {
            "uploads"
        }
    }

    let orm = setup();
    SoftDeletable::with_config(SoftDeletableConfig::<Upload>::new("purged", || {
        HashMap::from([((0, 0), "map keys must be strings")])
    }))
    .apply(orm.metadata());

    let mut em = orm.em();
    em.persist_and_flush(&Upload { id: 1 }).await.unwrap();
    let err = em.remove_and_flush(&Upload { id: 1 }).await.unwrap_err();
    assert!(matches!(err, StoreError::Event(_)));
    assert_eq!(em.count::<Upload>(unfiltered()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_signals_report_soft_delete_as_update() {
    let orm = setup();
    let events: Arc<Mutex<Vec<(EventType, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    orm.event_manager().add_callback(move |event| {
        sink.lock()
            .unwrap()
            .push((event.event_type, event.entity_name.clone()));
    });

    let mut em = orm.em();
    em.persist(&post(1, "p")).unwrap().persist(&comment(1, "c")).unwrap();
    em.flush().await.unwrap();
    em.remove(&post(1, "p")).unwrap().remove(&comment(1, "c")).unwrap();
    em.flush().await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (EventType::Create, "posts".to_string()),
            (EventType::Create, "comments".to_string()),
            (EventType::Update, "posts".to_string()),
            (EventType::Delete, "comments".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_redecorating_does_not_duplicate_filter() {
    let orm = setup();
    orm.discover::<Post>().discover::<Post>();

    let filters = orm.metadata().filters_for::<Post>();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].name, SOFT_DELETABLE_FILTER);
    assert_eq!(filters[0].cond, QueryFilter::eq("deleted_at", serde_json::Value::Null));
    assert!(SoftDeletable::is_soft_deletable::<Post>(orm.metadata()));
    assert!(!SoftDeletable::is_soft_deletable::<Comment>(orm.metadata()));
}
