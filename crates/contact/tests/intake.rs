use std::sync::Arc;

use consultoria_contact::{Command, SqliteContactStore};
use serde_json::{Map, json};
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_intake_stores_one_document() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = helpers::setup_test_pool(dir.child("db.sqlite3")).await?;
    let store = SqliteContactStore(pool);
    let command = Command::new(Arc::new(store.clone()), "leads@consultoria.cl");

    let id = command.intake(helpers::juan_perez()).await?;

    assert_eq!(store.count().await?, 1);
    let row = store.find(&id).await?.unwrap();
    let document = row.document.0;

    for (key, value) in helpers::juan_perez() {
        assert_eq!(document.field(&key), Some(&value), "{key}");
    }
    assert_eq!(document.to.len(), 1);
    assert_eq!(document.to[0], "leads@consultoria.cl");
    assert!(document.message.subject.contains("Juan Perez"));
    assert!(row.created_at > 0);

    Ok(())
}

#[tokio::test]
async fn test_resubmission_creates_duplicate() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = helpers::setup_test_pool(dir.child("db.sqlite3")).await?;
    let store = SqliteContactStore(pool);
    let command = Command::new(Arc::new(store.clone()), "leads@consultoria.cl");

    let first = command.intake(helpers::juan_perez()).await?;
    let second = command.intake(helpers::juan_perez()).await?;

    assert_ne!(first, second);
    let rows = store.all().await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].document.0.fields, rows[1].document.0.fields);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_intakes_are_all_kept() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = helpers::setup_test_pool(dir.child("db.sqlite3")).await?;
    let store = SqliteContactStore(pool);
    let command = Command::new(Arc::new(store.clone()), "leads@consultoria.cl");

    let fut = (0..5).map(|_| command.intake(helpers::juan_perez()));
    for result in futures::future::join_all(fut).await {
        result?;
    }

    assert_eq!(store.count().await?, 5);

    Ok(())
}

#[tokio::test]
async fn test_payload_is_not_validated() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = helpers::setup_test_pool(dir.child("db.sqlite3")).await?;
    let store = SqliteContactStore(pool);
    let command = Command::new(Arc::new(store.clone()), "leads@consultoria.cl");

    let mut fields = Map::new();
    fields.insert("email".to_owned(), json!("not-an-email"));
    let id = command.intake(fields).await?;

    let document = store.find(id).await?.unwrap().document.0;
    assert_eq!(document.field("email"), Some(&json!("not-an-email")));
    assert!(document.field("nombre").is_none());
    assert_eq!(document.message.subject, "Nuevo prospecto: undefined");

    Ok(())
}

#[tokio::test]
async fn test_failed_write_surfaces_error() {
    let command = Command::new(Arc::new(helpers::FailingStore), "leads@consultoria.cl");

    let err = command.intake(helpers::juan_perez()).await.unwrap_err();

    assert!(matches!(err, consultoria_shared::Error::Unknown(_)));
    assert!(err.to_string().contains("collection unavailable"));
}
