#![allow(dead_code)]

use std::{path::PathBuf, str::FromStr, sync::Arc};

use axum::Router;
use consultoria::{AppState, router};
use consultoria_contact::{ContactStore, SqliteContactStore, StoredContactDocument};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

pub const RECIPIENT: &str = "leads@example.com";

pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    consultoria_db::migrate(&pool).await?;

    Ok(pool)
}

pub fn create_test_app(pool: SqlitePool) -> Router {
    create_test_app_with_store(pool.clone(), Arc::new(SqliteContactStore(pool)))
}

pub fn create_test_app_with_store(pool: SqlitePool, store: Arc<dyn ContactStore>) -> Router {
    router(AppState {
        intake: consultoria_contact::Command::new(store, RECIPIENT),
        pool,
    })
}

pub struct FailingStore;

#[async_trait::async_trait]
impl ContactStore for FailingStore {
    async fn add(&self, _document: &StoredContactDocument) -> anyhow::Result<String> {
        anyhow::bail!("disk I/O error")
    }
}
