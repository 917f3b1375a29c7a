#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineBuilder, EngineError,
    notify::{BudgetAlert, MemoryNotifier, Notifier},
};
use migration::MigratorTrait;

pub const SECRET: &str = "integration-secret";

pub struct Harness {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub alerts: MemoryNotifier,
}

/// A notifier whose deliveries never complete.
#[derive(Debug)]
pub struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    async fn notify(&self, _alert: &BudgetAlert) -> Result<(), EngineError> {
        std::future::pending().await
    }
}

async fn builder() -> (EngineBuilder, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let builder = Engine::builder()
        .database(db.clone())
        .token_secret(SECRET)
        .alert_recipient("alerts@example.com");
    (builder, db)
}

pub async fn harness_with(alerts: MemoryNotifier) -> Harness {
    let (builder, db) = builder().await;
    let engine = builder
        .notifier(Arc::new(alerts.clone()))
        .build()
        .await
        .unwrap();
    Harness { engine, db, alerts }
}

/// An engine whose alert deliveries hang until `alert_timeout` runs out.
pub async fn stalled_harness(alert_timeout: Duration) -> (Engine, DatabaseConnection) {
    let (builder, db) = builder().await;
    let engine = builder
        .notifier(Arc::new(StalledNotifier))
        .alert_timeout(alert_timeout)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn harness() -> Harness {
    harness_with(MemoryNotifier::new()).await
}

/// Register a user and return its id.
pub async fn register(engine: &Engine, email: &str) -> String {
    engine
        .register("Alice", email, "password")
        .await
        .unwrap()
        .user
        .id
}

/// Insert a transaction row with a fixed `created_at`.
pub async fn insert_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    id: &str,
    kind: &str,
    amount_minor: i64,
    category: &str,
    created_at: &str,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO records (pk, sk, user_id, created_at, transaction_id, kind, amount_minor, category, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            format!("USER#{user_id}").into(),
            format!("#TRANSACTION#{id}").into(),
            user_id.into(),
            created_at.into(),
            id.into(),
            kind.into(),
            amount_minor.into(),
            category.into(),
            "seeded".into(),
        ],
    ))
    .await
    .unwrap();
}
