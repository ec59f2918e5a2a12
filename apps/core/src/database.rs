use crate::models::EntryRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Open (creating if needed) the SQLite database at `database_url` and apply the schema.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // Every connection to an in-memory database is a separate database
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Create the timeline table and its index if missing.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timeline_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            text TEXT NOT NULL,
            sentiment TEXT NOT NULL,
            concerns JSON NOT NULL,
            categories JSON NOT NULL,
            intensities JSON NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_timeline_entries_user
            ON timeline_entries (user_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// --- Timeline entries ---

pub async fn insert_entry(pool: &SqlitePool, record: &EntryRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO timeline_entries
            (id, user_id, text, sentiment, concerns, categories, intensities, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.text)
    .bind(&record.sentiment)
    .bind(&record.concerns)
    .bind(&record.categories)
    .bind(&record.intensities)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_entry(pool: &SqlitePool, id: &str) -> Result<EntryRecord, sqlx::Error> {
    sqlx::query_as::<_, EntryRecord>(
        r#"
        SELECT id, user_id, text, sentiment, concerns, categories, intensities, created_at
        FROM timeline_entries
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// All entries for a user, oldest first.
pub async fn get_user_entries(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<EntryRecord>, sqlx::Error> {
    sqlx::query_as::<_, EntryRecord>(
        r#"
        SELECT id, user_id, text, sentiment, concerns, categories, intensities, created_at
        FROM timeline_entries
        WHERE user_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn count_entries(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timeline_entries")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
