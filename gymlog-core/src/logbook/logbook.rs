use crate::db;
use anyhow::Result;
use log::info;
use sqlx::{Sqlite, SqlitePool, Transaction};

pub struct Logbook {
    pub db_pool: SqlitePool,
}

impl Logbook {
    /// Opens the database at `db_path` and applies pending migrations.
    pub async fn open(db_path: &str) -> Result<Self> {
        let pool = db::connect(db_path).await?;
        db::init_database(&pool).await?;
        info!("Opened logbook at {}", db_path);
        Ok(Self { db_pool: pool })
    }

    /// Opens the database configured through `db::set_db_path` or `DATABASE_URL`.
    pub async fn open_configured() -> Result<Self> {
        let path = db::db_path().await?;
        Self::open(path).await
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = db::connect_in_memory().await?;
        db::init_database(&pool).await?;
        Ok(Self { db_pool: pool })
    }

    /// Takes the write lock at `BEGIN`, so concurrent writers wait on
    /// `busy_timeout` instead of failing with `SQLITE_BUSY` on upgrade.
    pub(crate) async fn begin_write(&self) -> sqlx::Result<Transaction<'static, Sqlite>> {
        self.db_pool.begin_with("BEGIN IMMEDIATE").await
    }
}
