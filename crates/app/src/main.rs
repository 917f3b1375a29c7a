use std::{sync::Arc, time::Duration};

use chrono::TimeDelta;
use engine::{
    CategoryConfig, MonthBounds,
    notify::{LogNotifier, Notifier, WebhookNotifier},
};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;
    init_tracing(&settings.app);

    let db = parse_database(&settings.server.database).await?;
    let categories = load_categories(&settings.categories).await?;

    let notifier: Arc<dyn Notifier> = match &settings.alerts.webhook_url {
        Some(url) => {
            tracing::info!("Budget alerts are posted to {url}");
            let timeout = Duration::from_secs(settings.alerts.timeout_secs);
            Arc::new(WebhookNotifier::new(url.clone(), timeout)?)
        }
        None => Arc::new(LogNotifier),
    };
    let month_bounds = if settings.budget.calendar_month_bounds {
        MonthBounds::Calendar
    } else {
        MonthBounds::Fixed
    };

    let engine = engine::Engine::builder()
        .database(db)
        .categories(categories)
        .notifier(notifier)
        .token_secret(settings.auth.secret)
        .token_ttl(TimeDelta::minutes(settings.auth.token_ttl_minutes))
        .month_bounds(month_bounds)
        .alert_recipient(settings.alerts.recipient)
        .alert_timeout(Duration::from_secs(settings.alerts.timeout_secs))
        .build()
        .await?;

    let bind = settings.server.bind.as_deref().unwrap_or("127.0.0.1");
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

fn init_tracing(app: &settings::App) {
    let filter = format!(
        "pocketbook={level},server={level},engine={level}",
        level = app.level
    );
    if app.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn load_categories(config: &settings::Categories) -> Result<CategoryConfig, BoxError> {
    let categories = match (&config.path, &config.url) {
        (Some(path), _) => CategoryConfig::from_file(path)?,
        (None, Some(url)) => CategoryConfig::from_url(url).await?,
        (None, None) => CategoryConfig::default(),
    };
    tracing::info!(
        income = categories.income.len(),
        expense = categories.expense.len(),
        "Categories loaded"
    );
    Ok(categories)
}
