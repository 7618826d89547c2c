use std::{
    path::PathBuf,
    str::FromStr,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use consultoria_contact::{NotificationMessage, SqliteContactStore, StoredContactDocument};
use consultoria_notification::Mailer;
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    consultoria_db::migrate(&pool).await?;

    Ok(pool)
}

pub fn lead(nombre: &str) -> StoredContactDocument {
    let Value::Object(fields) = json!({
        "nombre": nombre,
        "email": "juan@x.com",
        "telefono": "+56912345678",
        "servicio": "web",
        "comentario": "Quiero cotizar un sitio web nuevo",
    }) else {
        unreachable!()
    };

    StoredContactDocument::build(fields, "leads@example.com").unwrap()
}

pub async fn store_lead(pool: &SqlitePool, nombre: &str) -> anyhow::Result<String> {
    use consultoria_contact::ContactStore;

    SqliteContactStore(pool.clone()).add(&lead(nombre)).await
}

/// Records every message instead of sending it. Fails the first
/// `failures` calls.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, NotificationMessage)>>,
    failures: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Default::default()
        }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.subject.to_owned())
            .collect()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, message: &NotificationMessage) -> anyhow::Result<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            anyhow::bail!("smtp connection refused");
        }

        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), message.clone()));

        Ok(())
    }
}
