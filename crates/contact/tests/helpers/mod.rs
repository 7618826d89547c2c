use std::{path::PathBuf, str::FromStr};

use serde_json::{Map, Value, json};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    consultoria_db::migrate(&pool).await?;

    Ok(pool)
}

#[allow(dead_code)]
pub fn juan_perez() -> Map<String, Value> {
    let Value::Object(fields) = json!({
        "nombre": "Juan Perez",
        "email": "juan@x.com",
        "telefono": "+56912345678",
        "servicio": "web",
        "comentario": "Quiero cotizar un sitio web nuevo",
    }) else {
        unreachable!()
    };

    fields
}

#[allow(dead_code)]
pub struct FailingStore;

#[async_trait::async_trait]
impl consultoria_contact::ContactStore for FailingStore {
    async fn add(
        &self,
        _document: &consultoria_contact::StoredContactDocument,
    ) -> anyhow::Result<String> {
        anyhow::bail!("collection unavailable")
    }
}
