use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::{bind_param, build_query};
use crate::database::store::{DocumentStore, GroupSummary, JsonDocument};
use crate::filter::filter::validate_identifier;
use crate::filter::{Filter, FilterData};

/// [`DocumentStore`] backed by one Postgres table per collection.
///
/// Documents are mapped onto columns with `jsonb_populate_record` on the way
/// in and `to_jsonb` on the way out, so the JSON field names must match the
/// column names created by [`crate::database::schema`].
pub struct PgDocumentStore {
    db: DatabaseManager,
}

impl PgDocumentStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, document: JsonDocument) -> Result<(), DatabaseError> {
        validate_identifier(collection)?;
        let query = format!(
            "INSERT INTO \"{t}\" SELECT * FROM jsonb_populate_record(NULL::\"{t}\", $1)",
            t = collection
        );
        sqlx::query(&query)
            .bind(Value::Object(document))
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn find(&self, collection: &str, query: FilterData) -> Result<Vec<JsonDocument>, DatabaseError> {
        let filter = Filter::from_data(collection, query)?;
        let sql = filter.to_sql()?;

        let rows = build_query(&sql).fetch_all(self.db.pool()).await?;
        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            match row.try_get::<Value, _>("doc")? {
                Value::Object(doc) => documents.push(doc),
                other => {
                    return Err(DatabaseError::QueryError(format!("expected a document row, got {}", other)));
                }
            }
        }
        Ok(documents)
    }

    async fn count(&self, collection: &str, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        let filter = Filter::from_data(
            collection,
            FilterData { where_clause, ..FilterData::default() },
        )?;
        let sql = filter.to_count_sql()?;
        let row = build_query(&sql).fetch_one(self.db.pool()).await?;
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn update(&self, collection: &str, id: &str, patch: JsonDocument) -> Result<u64, DatabaseError> {
        validate_identifier(collection)?;
        if patch.is_empty() {
            return Err(DatabaseError::QueryError("empty update".to_string()));
        }

        let mut assignments = Vec::with_capacity(patch.len());
        for column in patch.keys() {
            validate_identifier(column)?;
            assignments.push(format!("\"{c}\" = p.\"{c}\"", c = column));
        }
        let query = format!(
            "UPDATE \"{t}\" SET {sets} FROM jsonb_populate_record(NULL::\"{t}\", $1) AS p WHERE \"{t}\".\"id\" = $2",
            t = collection,
            sets = assignments.join(", "),
        );

        let q = sqlx::query(&query).bind(Value::Object(patch));
        let result = bind_param(q, &Value::String(id.to_string()))
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn group_summary(
        &self,
        collection: &str,
        where_clause: Option<Value>,
        group_by: &str,
        average_of: &str,
    ) -> Result<Vec<GroupSummary>, DatabaseError> {
        let filter = Filter::from_data(
            collection,
            FilterData { where_clause, ..FilterData::default() },
        )?;
        let sql = filter.to_group_sql(group_by, average_of)?;
        let rows = build_query(&sql).fetch_all(self.db.pool()).await?;

        rows.iter()
            .map(|row| -> Result<GroupSummary, DatabaseError> {
                Ok(GroupSummary {
                    key: row.try_get("key")?,
                    count: row.try_get("count")?,
                    average: row.try_get("average")?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}
