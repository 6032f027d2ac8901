use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::FilterData;

/// A flat JSON document as it travels between repositories and the store.
pub type JsonDocument = Map<String, Value>;

/// One row of a grouped aggregate: number of documents in the group and the
/// mean of the averaged column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: i64,
    pub average: Option<f64>,
}

/// Collection-oriented persistence used by every repository.
///
/// Every document carries a string `id`. Unique keys declared by the
/// collection are enforced by the store; a rejected write surfaces as
/// [`DatabaseError::Conflict`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, document: JsonDocument) -> Result<(), DatabaseError>;

    /// Documents matching `query.where_clause`, honouring order/limit/offset.
    async fn find(&self, collection: &str, query: FilterData) -> Result<Vec<JsonDocument>, DatabaseError>;

    async fn count(&self, collection: &str, where_clause: Option<Value>) -> Result<i64, DatabaseError>;

    /// Overwrite the given fields of the document with `id`. Returns the
    /// number of documents matched (0 or 1).
    async fn update(&self, collection: &str, id: &str, patch: JsonDocument) -> Result<u64, DatabaseError>;

    async fn group_summary(
        &self,
        collection: &str,
        where_clause: Option<Value>,
        group_by: &str,
        average_of: &str,
    ) -> Result<Vec<GroupSummary>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
