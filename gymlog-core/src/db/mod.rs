pub mod models;
pub mod operations;

use anyhow::Result;
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::env;
use std::time::Duration;
use tokio::sync::OnceCell;

static DB_PATH: OnceCell<String> = OnceCell::const_new();

/// The configured database path, falling back to `DATABASE_URL`.
pub async fn db_path() -> Result<&'static String> {
    DB_PATH
        .get_or_try_init(|| async {
            env::var("DATABASE_URL").map_err(|_| {
                anyhow::anyhow!("DATABASE_URL must be specified or present in the environment")
            })
        })
        .await
}

pub async fn set_db_path(path: &str) -> Result<()> {
    DB_PATH
        .set(path.to_string())
        .map_err(|e| anyhow::anyhow!(format!("Failed to set DB_PATH: {:?}", e)))
}

/// Opens (creating if needed) the sqlite file at `db_path`.
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    let path = db_path.strip_prefix("sqlite://").unwrap_or(db_path);
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);
    SqlitePool::connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))
}

/// A private in-memory database. One connection, so every query sees the
/// same data.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create in-memory DB pool: {}", e))
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_10_19_090000_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-10-19-090000-0000_setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-10-19-090000-0000_setup_tables",
    up_sql: MIGRATION_2026_10_19_090000_0000_SETUP_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Applies pending migrations. Each migration runs in its own transaction.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        let mut tx = pool.begin().await?;
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement).execute(&mut *tx).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to execute migration statement in {}: {} - Error: {}",
                    migration.name,
                    statement,
                    e
                )
            })?;
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_skip_comments_and_blank_lines() {
        let sql = "-- header\nCREATE TABLE a (id INTEGER);\n\n  \
                   -- note\nCREATE TABLE b (id INTEGER);\n";
        assert_eq!(
            parse_sql_statements(sql),
            vec!["CREATE TABLE a (id INTEGER)", "CREATE TABLE b (id INTEGER)"]
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        init_database(&pool).await.unwrap();
        init_database(&pool).await.unwrap();
        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gymlog.db");
        let pool = connect(path.to_str().unwrap()).await.unwrap();
        init_database(&pool).await.unwrap();
        assert!(path.exists());
    }
}
