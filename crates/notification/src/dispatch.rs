use std::{sync::Arc, time::Duration};

use consultoria_contact::StoredContactDocument;
use consultoria_db::table::{Contactos, ContactosDelivery};
use sea_query::{Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow, types::Json};
use time::OffsetDateTime;
use tokio::{sync::watch, task::JoinHandle};

use crate::Mailer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryState {
    Sending,
    Success,
    Error,
}

/// A stored lead whose notification has not been delivered yet.
#[derive(Debug, FromRow)]
pub struct PendingDelivery {
    pub id: String,
    pub document: Json<StoredContactDocument>,
    pub attempts: Option<i64>,
}

#[derive(Debug, FromRow)]
pub struct DeliveryRow {
    pub document_id: String,
    pub state: String,
    pub attempts: i64,
    pub error: Option<String>,
    pub updated_at: i64,
}

impl DeliveryRow {
    pub fn state(&self) -> Option<DeliveryState> {
        self.state.parse().ok()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends the notification email of every stored lead and tracks the outcome
/// in `contactos_delivery`. Documents in `contactos` are only read.
#[derive(Clone)]
pub struct Dispatcher {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    max_attempts: u32,
    batch_size: u64,
    interval: Duration,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            mailer,
            max_attempts: 5,
            batch_size: 50,
            interval: Duration::from_secs(10),
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Leads with no delivery record, or whose last delivery failed and
    /// still have attempts left. Oldest first.
    pub async fn pending(&self) -> anyhow::Result<Vec<PendingDelivery>> {
        let statement = Query::select()
            .column((Contactos::Table, Contactos::Id))
            .column((Contactos::Table, Contactos::Document))
            .column((ContactosDelivery::Table, ContactosDelivery::Attempts))
            .from(Contactos::Table)
            .left_join(
                ContactosDelivery::Table,
                Expr::col((ContactosDelivery::Table, ContactosDelivery::DocumentId))
                    .equals((Contactos::Table, Contactos::Id)),
            )
            .and_where(
                Expr::col((ContactosDelivery::Table, ContactosDelivery::DocumentId))
                    .is_null()
                    .or(Expr::col((ContactosDelivery::Table, ContactosDelivery::State))
                        .eq(DeliveryState::Error.to_string())
                        .and(
                            Expr::col((ContactosDelivery::Table, ContactosDelivery::Attempts))
                                .lt(self.max_attempts),
                        )),
            )
            .order_by((Contactos::Table, Contactos::CreatedAt), Order::Asc)
            .order_by((Contactos::Table, Contactos::Id), Order::Asc)
            .limit(self.batch_size)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, PendingDelivery, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?)
    }

    /// One polling pass over the pending leads.
    ///
    /// Each lead is claimed as `SENDING` before its email goes out. A lead
    /// that cannot be claimed is skipped, and one whose outcome cannot be
    /// written stays `SENDING`, so a bookkeeping failure never sends twice.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> anyhow::Result<DispatchReport> {
        let mut report = DispatchReport::default();

        for pending in self.pending().await? {
            if let Err(err) = self.claim(&pending.id).await {
                tracing::error!(id = %pending.id, error = %err, "failed to claim lead");
                report.failed += 1;
                continue;
            }

            let (state, error) = match self.deliver(&pending.document).await {
                Ok(()) => {
                    report.sent += 1;
                    (DeliveryState::Success, None)
                }
                Err(err) => {
                    tracing::warn!(
                        id = %pending.id,
                        attempts = pending.attempts.unwrap_or_default() + 1,
                        error = %err,
                        "lead notification failed"
                    );
                    report.failed += 1;
                    (DeliveryState::Error, Some(err.to_string()))
                }
            };

            if let Err(err) = self.finish(&pending.id, state, error).await {
                tracing::error!(
                    id = %pending.id,
                    state = %state,
                    error = %err,
                    "failed to record delivery outcome"
                );
            }
        }

        if report.sent > 0 || report.failed > 0 {
            tracing::info!(sent = report.sent, failed = report.failed, "dispatch pass done");
        }

        Ok(report)
    }

    async fn deliver(&self, document: &StoredContactDocument) -> anyhow::Result<()> {
        if document.to.is_empty() {
            anyhow::bail!("document has no recipient");
        }

        for to in &document.to {
            self.mailer.send(to, &document.message).await?;
        }

        Ok(())
    }

    /// Count one more attempt and mark the lead `SENDING`.
    async fn claim(&self, id: &str) -> anyhow::Result<()> {
        let updated_at = OffsetDateTime::now_utc().unix_timestamp();
        let statement = Query::insert()
            .into_table(ContactosDelivery::Table)
            .columns([
                ContactosDelivery::DocumentId,
                ContactosDelivery::State,
                ContactosDelivery::Attempts,
                ContactosDelivery::UpdatedAt,
            ])
            .values_panic([
                id.into(),
                DeliveryState::Sending.to_string().into(),
                1.into(),
                updated_at.into(),
            ])
            .on_conflict(
                OnConflict::column(ContactosDelivery::DocumentId)
                    .update_columns([ContactosDelivery::State, ContactosDelivery::UpdatedAt])
                    .value(
                        ContactosDelivery::Attempts,
                        Expr::col((ContactosDelivery::Table, ContactosDelivery::Attempts)).add(1),
                    )
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(())
    }

    async fn finish(
        &self,
        id: &str,
        state: DeliveryState,
        error: Option<String>,
    ) -> anyhow::Result<()> {
        let updated_at = OffsetDateTime::now_utc().unix_timestamp();
        let statement = Query::update()
            .table(ContactosDelivery::Table)
            .values([
                (ContactosDelivery::State, state.to_string().into()),
                (ContactosDelivery::Error, error.into()),
                (ContactosDelivery::UpdatedAt, updated_at.into()),
            ])
            .and_where(Expr::col(ContactosDelivery::DocumentId).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(())
    }

    pub async fn delivery(&self, id: impl Into<String>) -> anyhow::Result<Option<DeliveryRow>> {
        let id: String = id.into();
        let statement = Query::select()
            .columns([
                ContactosDelivery::DocumentId,
                ContactosDelivery::State,
                ContactosDelivery::Attempts,
                ContactosDelivery::Error,
                ContactosDelivery::UpdatedAt,
            ])
            .from(ContactosDelivery::Table)
            .and_where(Expr::col(ContactosDelivery::DocumentId).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, DeliveryRow, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Poll in the background until [`DispatcherHandle::shutdown_and_wait`].
    pub fn run(self) -> DispatcherHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = stop.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = self.run_once().await {
                            tracing::error!(error = %err, "dispatch pass failed");
                        }
                    }
                }
            }

            tracing::info!("notification dispatcher stopped");
        });

        DispatcherHandle { shutdown, task }
    }
}

pub struct DispatcherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Stop polling and wait for an in-flight pass to finish.
    pub async fn shutdown_and_wait(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await?;

        Ok(())
    }
}
