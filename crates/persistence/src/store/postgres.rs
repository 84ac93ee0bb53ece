//! PostgreSQL document store: one `documents` table with a JSONB body.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{generate_id, CollectionPath, Direction, Document, DocumentQuery, DocumentStore};
use crate::error::{classify_backend_message, StoreError};
use crate::metrics::StoreTimer;

const BACKEND: &str = "postgres";

// SQLSTATE insufficient_privilege
const INSUFFICIENT_PRIVILEGE: &str = "42501";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            data: row.data.0,
        }
    }
}

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_sqlx(path: &CollectionPath, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) {
            return StoreError::PermissionDenied {
                path: path.to_string(),
                message: db.message().to_string(),
            };
        }
    }
    classify_backend_message(path.as_str(), &e.to_string())
}

/// Builds the list query. Field names are bound as parameters; only the
/// sort direction is spliced into the SQL text.
fn build_list_query<'a>(
    collection: &'a CollectionPath,
    query: &'a DocumentQuery,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
    builder.push_bind(collection.as_str());

    for filter in &query.filters {
        let mut probe = Map::new();
        probe.insert(filter.field.clone(), filter.value.clone());
        builder.push(" AND data @> ");
        builder.push_bind(Json(Value::Object(probe)));
        builder.push("::jsonb");
    }

    builder.push(" ORDER BY ");
    if let Some(order) = &query.order_by {
        let (dir, nulls) = match order.direction {
            Direction::Ascending => (" ASC", " NULLS FIRST, "),
            Direction::Descending => (" DESC", " NULLS LAST, "),
        };
        // Numbers sort numerically; everything else by its text form.
        builder.push("CASE WHEN jsonb_typeof(data -> ");
        builder.push_bind(order.field.as_str());
        builder.push(") = 'number' THEN (data ->> ");
        builder.push_bind(order.field.as_str());
        builder.push(")::numeric END");
        builder.push(dir);
        builder.push(nulls);
        builder.push("(data ->> ");
        builder.push_bind(order.field.as_str());
        builder.push(") COLLATE \"C\"");
        builder.push(dir);
        builder.push(nulls);
    }
    builder.push("seq ASC");

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    builder
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let timer = StoreTimer::new(BACKEND, "list");
        let result = build_list_query(collection, query)
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(Document::from).collect())
            .map_err(|e| map_sqlx(collection, e));
        timer.finish(result)
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let timer = StoreTimer::new(BACKEND, "get");
        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Document::from))
        .map_err(|e| map_sqlx(collection, e));
        timer.finish(result)
    }

    async fn insert(
        &self,
        collection: &CollectionPath,
        id: Option<&str>,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "insert");
        let id = id.map(str::to_string).unwrap_or_else(generate_id);
        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Json(&data))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx(collection, e))
        .and_then(|row| {
            row.map(Document::from).ok_or_else(|| {
                StoreError::Backend(format!(
                    "Document already exists: {}",
                    collection.document(&id)
                ))
            })
        });
        timer.finish(result)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "set");
        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&data))
        .fetch_one(&self.pool)
        .await
        .map(Document::from)
        .map_err(|e| map_sqlx(collection, e));
        timer.finish(result)
    }

    async fn patch(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "patch");
        let result = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, data
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&fields))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx(collection, e))
        .and_then(|row| {
            row.map(Document::from)
                .ok_or_else(|| StoreError::not_found(collection.as_str(), id))
        });
        timer.finish(result)
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, StoreError> {
        let timer = StoreTimer::new(BACKEND, "delete");
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected() > 0)
            .map_err(|e| map_sqlx(collection, e));
        timer.finish(result)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn test_list_sql_without_ordering() {
        let collection = CollectionPath::root("campaigns");
        let query = DocumentQuery::new().where_eq("status", "active");
        let mut builder = build_list_query(&collection, &query);
        let sql = builder.build().sql().to_string();

        assert_eq!(
            sql,
            "SELECT id, data FROM documents WHERE collection = $1 AND data @> $2::jsonb ORDER BY seq ASC"
        );
    }

    #[test]
    fn test_list_sql_with_ordering_and_limit() {
        let collection = CollectionPath::root("notices");
        let query = DocumentQuery::new()
            .where_eq("active", true)
            .order_by("updated_at", Direction::Descending)
            .limit(1);
        let mut builder = build_list_query(&collection, &query);
        let sql = builder.build().sql().to_string();

        assert!(sql.contains("jsonb_typeof(data -> $3) = 'number'"));
        assert!(sql.contains("(data ->> $5) COLLATE \"C\" DESC NULLS LAST, seq ASC"));
        assert!(sql.ends_with("LIMIT $6"));
    }
}
