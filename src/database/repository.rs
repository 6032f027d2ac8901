use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::database::models::Document;
use crate::database::store::{DocumentStore, GroupSummary, JsonDocument};
use crate::filter::{FilterData, Page, PageRequest};

/// Typed access to one collection of the shared document store.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn create(&self, record: &T) -> Result<(), DatabaseError> {
        match serde_json::to_value(record)? {
            Value::Object(document) => self.store.insert(T::COLLECTION, document).await,
            _ => Err(DatabaseError::QueryError(format!("{} record is not an object", T::COLLECTION))),
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find(T::COLLECTION, filter_data)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(Value::Object(doc)).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn find_one(&self, where_clause: Value) -> Result<Option<T>, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(where_clause),
            limit: Some(1),
            ..FilterData::default()
        };
        Ok(self.select_any(filter).await?.into_iter().next())
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.find_one(json!({ "id": id })).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<T, DatabaseError> {
        self.get(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(T::NOT_FOUND.to_string()))
    }

    pub async fn count(&self, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        self.store.count(T::COLLECTION, where_clause).await
    }

    /// One page of matching records plus the total match count, fetched
    /// concurrently.
    pub async fn list(
        &self,
        where_clause: Value,
        order: &str,
        page: PageRequest,
    ) -> Result<Page<T>, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(where_clause.clone()),
            order: Some(Value::String(order.to_string())),
            limit: Some(page.limit as i64),
            offset: Some(page.skip()),
        };

        let (items, total) = futures::try_join!(self.select_any(filter), self.count(Some(where_clause)))?;
        Ok(Page { items, total, request: page })
    }

    /// Overwrite only the supplied fields. `updated_at` is always refreshed.
    pub async fn update_partial(&self, id: &str, mut patch: JsonDocument) -> Result<(), DatabaseError> {
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        let matched = self.store.update(T::COLLECTION, id, patch).await?;
        if matched == 0 {
            return Err(DatabaseError::NotFound(T::NOT_FOUND.to_string()));
        }
        Ok(())
    }

    pub async fn group_summary(
        &self,
        where_clause: Value,
        group_by: &str,
        average_of: &str,
    ) -> Result<Vec<GroupSummary>, DatabaseError> {
        self.store
            .group_summary(T::COLLECTION, Some(where_clause), group_by, average_of)
            .await
    }
}
