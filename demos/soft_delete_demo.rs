//! # Soft Delete Demo
//!
//! Walks through the soft-delete extension:
//! - Decorating entities with `#[soft_deletable]`
//! - Registering the deletion handler
//! - Removing entities and reading them back with and without the filter
//! - Listening to the post-commit signals
//!
//! Run with `RUST_LOG=debug cargo run --example soft_delete_demo --features debug-logging`
//! to see the handler's log output.

use soft_deletable::prelude::*;
use tracing_subscriber::EnvFilter;

#[model]
#[entity(name = "articles")]
#[soft_deletable(field = "deleted_at", value = "chrono::Utc::now")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[model]
#[entity(name = "sessions")]
pub struct Session {
    pub id: u32,
    pub user: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🗑️  Soft Delete Demo");
    println!("===================");

    // 1. ORM setup; a soft_deletable.toml or SOFT_DELETABLE_CONFIG is optional here
    let config = AppConfig::load().unwrap_or_default();
    let orm = Orm::init(config, std::sync::Arc::new(MemoryBackend::new()))?;
    orm.discover::<Article>().discover::<Session>();

    let registered = SoftDeletable::register(&orm)?;
    println!("✅ Handler registered: {}", registered);
    println!(
        "✅ Registering again is a no-op: {}",
        !SoftDeletable::register(&orm)?
    );

    orm.event_manager().add_callback(|event| {
        println!(
            "   📡 {:?} {} {}",
            event.event_type,
            event.entity_name,
            event.record_id.as_deref().unwrap_or("-")
        );
    });

    // 2. Persist
    println!("\n📝 Creating records");
    let mut em = orm.em();
    let first = Article {
        id: Uuid::new_v4(),
        title: "Soft delete explained".to_string(),
        deleted_at: None,
    };
    let second = Article {
        id: Uuid::new_v4(),
        title: "Filters in practice".to_string(),
        deleted_at: None,
    };
    let session = Session {
        id: 1,
        user: "ada".to_string(),
    };
    em.persist(&first)?.persist(&second)?.persist(&session)?;
    em.flush().await?;

    // 3. Remove
    println!("\n🗑️  Removing an article and a session");
    em.remove(&first)?.remove(&session)?;
    let summary = em.flush().await?;
    println!(
        "   soft deleted: {}, deleted: {}",
        summary.soft_deleted.len(),
        summary.deleted.len()
    );

    // 4. Read back
    println!("\n🔍 Reading back");
    let visible = em.find::<Article>(QueryBuilder::new()).await?;
    println!("   visible articles: {}", visible.len());

    let all = em
        .find::<Article>(QueryBuilder::new().disable_filters())
        .await?;
    for article in &all {
        match article.deleted_at {
            Some(at) => println!("   ❌ {} (deleted at {})", article.title, at),
            None => println!("   ✅ {}", article.title),
        }
    }

    let sessions = em
        .count::<Session>(QueryBuilder::new().disable_filters())
        .await?;
    println!("   stored sessions: {}", sessions);

    println!("\n🎉 Done");
    Ok(())
}
