use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DB_URL: &str = "sqlite:./pocketbook.db?mode=rwc";
const USAGE: &str = "Usage: cargo run -p migration -- [up [N]|down [N]|fresh|status]";

/// `DATABASE_URL` wins; otherwise the sqlite file the server is configured with.
fn database_url() -> String {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return url;
    }
    match std::env::var("POCKETBOOK__SERVER__DATABASE__SQLITE") {
        Ok(path) => format!("sqlite:{path}?mode=rwc"),
        Err(_) => DEFAULT_DB_URL.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());
    let steps = match args.next() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(steps) => Some(steps),
            Err(_) => {
                eprintln!("{USAGE}");
                std::process::exit(2);
            }
        },
        None => None,
    };

    let db = Database::connect(&database_url()).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, steps).await?,
        "down" => migration::Migrator::down(&db, steps.or(Some(1))).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
