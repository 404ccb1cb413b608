//! Tests for the `Entity` derive and the `#[model]` attribute

use std::sync::Arc;

use soft_deletable::prelude::*;

fn deleted_marker() -> &'static str {
    "deleted"
}

#[model]
#[entity(name = "users")]
#[soft_deletable(field = "deleted_at", value = "chrono::Utc::now")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[model]
#[entity(primary_key = "code")]
#[soft_deletable(field = "status", value = "deleted_marker", value_initial = "\"active\"")]
pub struct Coupon {
    pub code: String,
    pub status: String,
}

#[model]
pub struct AuditLog {
    pub id: u64,
    pub line: String,
}

fn orm() -> Orm {
    let orm = Orm::in_memory().with_metadata(Arc::new(MetadataStorage::new()));
    orm.discover::<User>()
        .discover::<Coupon>()
        .discover::<AuditLog>();
    SoftDeletable::register(&orm).unwrap();
    orm
}

#[test]
fn test_entity_names_and_keys() {
    assert_eq!(User::entity_name(), "users");
    assert_eq!(User::primary_key_field(), "id");
    assert_eq!(Coupon::entity_name(), "coupon");
    assert_eq!(Coupon::primary_key_field(), "code");
    assert_eq!(AuditLog::entity_name(), "audit_log");
}

#[test]
fn test_discovery_decorates_only_annotated_types() {
    let orm = orm();
    let metadata = orm.metadata();

    let user = SoftDeletable::metadata_for::<User>(metadata).unwrap();
    assert_eq!(user.field(), "deleted_at");
    assert!(user.value().unwrap().is_string());

    let coupon = SoftDeletable::metadata_for::<Coupon>(metadata).unwrap();
    assert_eq!(coupon.value().unwrap(), json!("deleted"));
    let filters = metadata.filters_for::<Coupon>();
    assert_eq!(filters[0].cond, QueryFilter::eq("status", json!("active")));

    assert!(!SoftDeletable::is_soft_deletable::<AuditLog>(metadata));
    assert!(metadata.filters_for::<AuditLog>().is_empty());
}

#[tokio::test]
async fn test_derived_entities_round_trip_through_removal() {
    let orm = orm();
    let mut em = orm.em();

    let user = User {
        id: Uuid::new_v4(),
        name: "Ada".to_string(),
        deleted_at: None,
    };
    let coupon = Coupon {
        code: "SPRING".to_string(),
        status: "active".to_string(),
    };
    let log = AuditLog {
        id: 1,
        line: "created".to_string(),
    };

    em.persist(&user)
        .unwrap()
        .persist(&coupon)
        .unwrap()
        .persist(&log)
        .unwrap();
    em.flush().await.unwrap();

    em.remove(&user)
        .unwrap()
        .remove(&coupon)
        .unwrap()
        .remove(&log)
        .unwrap();
    let summary = em.flush().await.unwrap();
    assert_eq!(summary.soft_deleted.len(), 2);
    assert_eq!(summary.deleted, vec!["1".to_string()]);

    assert!(em.find_by_id::<User, _>(&user.id).await.unwrap().is_none());
    let stored = em
        .find_by_id_with::<User, _>(&user.id, QueryBuilder::new().disable_filters())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.deleted_at.is_some());

    let stored = em
        .find_by_id_with::<Coupon, _>(&"SPRING", QueryBuilder::new().disable_filters())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "deleted");
    assert_eq!(
        em.count::<AuditLog>(QueryBuilder::new().disable_filters())
            .await
            .unwrap(),
        0
    );
}
