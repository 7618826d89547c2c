use consultoria_db::table::Contactos;
use sea_query::{Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow, types::Json};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::StoredContactDocument;

/// Append-only sink for accepted submissions.
#[async_trait::async_trait]
pub trait ContactStore: Send + Sync {
    /// Write one new document and return its id. No deduplication.
    async fn add(&self, document: &StoredContactDocument) -> anyhow::Result<String>;
}

#[derive(Debug, FromRow)]
pub struct ContactRow {
    pub id: String,
    pub document: Json<StoredContactDocument>,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct SqliteContactStore(pub SqlitePool);

#[async_trait::async_trait]
impl ContactStore for SqliteContactStore {
    async fn add(&self, document: &StoredContactDocument) -> anyhow::Result<String> {
        let id = Ulid::new().to_string();
        let created_at = OffsetDateTime::now_utc().unix_timestamp();

        let statement = Query::insert()
            .into_table(Contactos::Table)
            .columns([Contactos::Id, Contactos::Document, Contactos::CreatedAt])
            .values_panic([
                id.to_owned().into(),
                serde_json::to_string(document)?.into(),
                created_at.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.0).await?;

        Ok(id)
    }
}

impl SqliteContactStore {
    pub async fn find(&self, id: impl Into<String>) -> anyhow::Result<Option<ContactRow>> {
        let id: String = id.into();
        let statement = Query::select()
            .columns([Contactos::Id, Contactos::Document, Contactos::CreatedAt])
            .from(Contactos::Table)
            .and_where(Expr::col(Contactos::Id).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, ContactRow, _>(&sql, values)
            .fetch_optional(&self.0)
            .await?)
    }

    /// All documents, oldest first.
    pub async fn all(&self) -> anyhow::Result<Vec<ContactRow>> {
        let statement = Query::select()
            .columns([Contactos::Id, Contactos::Document, Contactos::CreatedAt])
            .from(Contactos::Table)
            .order_by(Contactos::CreatedAt, Order::Asc)
            .order_by(Contactos::Id, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, ContactRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?)
    }

    pub async fn count(&self) -> anyhow::Result<i64> {
        let statement = Query::select()
            .expr(Func::count(Expr::col(Contactos::Id)))
            .from(Contactos::Table)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (total,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(&self.0).await?;

        Ok(total)
    }
}
