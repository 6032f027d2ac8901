//! In-process test support: an in-memory [`DocumentStore`] and helpers for
//! driving the router with `tower::ServiceExt::oneshot`.

mod api;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::DateTime;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::app::{router, AppState};
use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::schema::unique_keys;
use crate::database::{DatabaseError, DocumentStore, GroupSummary, JsonDocument};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::{FilterData, FilterError, FilterOp, SortDirection};

/// Document store kept in process memory. Honours the same filter documents
/// and unique keys as the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<JsonDocument>>>,
    offline: AtomicBool,
    broken: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` fail, as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Make every query fail with a raw query error.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, AtomicOrdering::SeqCst);
    }

    pub fn documents(&self, collection: &str) -> Vec<JsonDocument> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<JsonDocument>>> {
        match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_broken(&self) -> Result<(), DatabaseError> {
        if self.broken.load(AtomicOrdering::SeqCst) {
            return Err(DatabaseError::QueryError("relation does not exist".to_string()));
        }
        Ok(())
    }

    fn matching(&self, collection: &str, where_clause: &Option<Value>) -> Result<Vec<JsonDocument>, DatabaseError> {
        self.check_broken()?;
        let docs = self.documents(collection);
        let mut out = Vec::new();
        for doc in docs {
            if matches_where(&doc, where_clause.as_ref().unwrap_or(&NULL))? {
                out.push(doc);
            }
        }
        Ok(out)
    }
}

static NULL: Value = Value::Null;

fn unique_violation(collection: &str, docs: &[JsonDocument], candidate: &JsonDocument) -> Option<String> {
    for columns in unique_keys(collection) {
        let key: Vec<&Value> = columns.iter().map(|c| candidate.get(*c).unwrap_or(&NULL)).collect();
        if key.iter().any(|v| v.is_null()) {
            continue;
        }
        let clash = docs.iter().any(|doc| {
            doc.get("id") != candidate.get("id")
                && columns
                    .iter()
                    .zip(&key)
                    .all(|(c, v)| doc.get(*c).map(|d| values_equal(d, v)).unwrap_or(false))
        });
        if clash {
            return Some(format!("{}_{}_key", collection, columns.join("_")));
        }
    }
    None
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: JsonDocument) -> Result<(), DatabaseError> {
        self.check_broken()?;
        let mut collections = self.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        if let Some(index) = unique_violation(collection, docs, &document) {
            return Err(DatabaseError::Conflict(index));
        }
        docs.push(document);
        Ok(())
    }

    async fn find(&self, collection: &str, query: FilterData) -> Result<Vec<JsonDocument>, DatabaseError> {
        let mut docs = self.matching(collection, &query.where_clause)?;

        if let Some(order) = &query.order {
            let infos = FilterOrder::validate_and_parse(order)?;
            docs.sort_by(|a, b| {
                for info in &infos {
                    let ord = compare_for_sort(a.get(&info.column), b.get(&info.column));
                    let ord = match info.sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let limit = query.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(docs.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, collection: &str, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        Ok(self.matching(collection, &where_clause)?.len() as i64)
    }

    async fn update(&self, collection: &str, id: &str, patch: JsonDocument) -> Result<u64, DatabaseError> {
        self.check_broken()?;
        if patch.is_empty() {
            return Err(DatabaseError::QueryError("empty update".to_string()));
        }

        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(position) = docs.iter().position(|d| d.get("id") == Some(&json!(id))) else {
            return Ok(0);
        };

        let mut updated = docs[position].clone();
        for (key, value) in patch {
            updated.insert(key, value);
        }
        if let Some(index) = unique_violation(collection, docs, &updated) {
            return Err(DatabaseError::Conflict(index));
        }
        docs[position] = updated;
        Ok(1)
    }

    async fn group_summary(
        &self,
        collection: &str,
        where_clause: Option<Value>,
        group_by: &str,
        average_of: &str,
    ) -> Result<Vec<GroupSummary>, DatabaseError> {
        let docs = self.matching(collection, &where_clause)?;

        let mut groups: HashMap<String, (i64, Vec<f64>)> = HashMap::new();
        for doc in &docs {
            let key = match doc.get(group_by) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => other.to_string(),
            };
            let entry = groups.entry(key).or_default();
            entry.0 += 1;
            if let Some(n) = doc.get(average_of).and_then(Value::as_f64) {
                entry.1.push(n);
            }
        }

        let mut out: Vec<GroupSummary> = groups
            .into_iter()
            .map(|(key, (count, values))| GroupSummary {
                key,
                count,
                average: if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                },
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(DatabaseError::ConnectionError("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Evaluate a where document against one document.
pub fn matches_where(doc: &JsonDocument, where_data: &Value) -> Result<bool, FilterError> {
    let obj = match where_data {
        Value::Null => return Ok(true),
        Value::Object(obj) => obj,
        _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
    };

    for (key, value) in obj {
        let matched = if key.starts_with('$') {
            matches_logical(doc, key, value)?
        } else {
            let mut all = true;
            for info in FilterWhere::parse_field_condition(key, value)? {
                if !matches_condition(doc.get(&info.column).unwrap_or(&NULL), info.operator, &info.data)? {
                    all = false;
                    break;
                }
            }
            all
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_logical(doc: &JsonDocument, op: &str, value: &Value) -> Result<bool, FilterError> {
    match FilterOp::parse(op) {
        Some(FilterOp::And) | Some(FilterOp::Or) => {
            let clauses = value
                .as_array()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| FilterError::operator_data(op, "requires a non-empty array"))?;
            let mut results = Vec::with_capacity(clauses.len());
            for clause in clauses {
                results.push(matches_where(doc, clause)?);
            }
            Ok(if op == "$and" {
                results.iter().all(|r| *r)
            } else {
                results.iter().any(|r| *r)
            })
        }
        Some(FilterOp::Not) => Ok(!matches_where(doc, value)?),
        _ => Err(FilterError::UnsupportedOperator(op.to_string())),
    }
}

fn matches_condition(field: &Value, op: FilterOp, data: &Value) -> Result<bool, FilterError> {
    let result = match op {
        FilterOp::Eq if data.is_null() => field.is_null(),
        FilterOp::Ne if data.is_null() => !field.is_null(),
        FilterOp::Eq => !field.is_null() && values_equal(field, data),
        FilterOp::Ne => !values_equal(field, data),
        FilterOp::Gt => compare(field, data) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(compare(field, data), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => compare(field, data) == Some(Ordering::Less),
        FilterOp::Lte => matches!(compare(field, data), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Like | FilterOp::ILike => {
            let pattern = data
                .as_str()
                .ok_or_else(|| FilterError::operator_data("$like", "requires a string pattern"))?;
            match field.as_str() {
                Some(text) => like_match(pattern, text, op == FilterOp::ILike),
                None => false,
            }
        }
        FilterOp::In => {
            let values = data
                .as_array()
                .ok_or_else(|| FilterError::operator_data("$in", "requires an array"))?;
            !field.is_null() && values.iter().any(|v| values_equal(field, v))
        }
        FilterOp::And | FilterOp::Or | FilterOp::Not => {
            return Err(FilterError::UnsupportedOperator(format!("{:?} on a field", op)));
        }
    };
    Ok(result)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Ascending order with nulls last.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
    }
}

enum LikeToken {
    Any,
    One,
    Literal(char),
}

/// SQL LIKE semantics with `\` as the escape character.
fn like_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let fold = |s: &str| if case_insensitive { s.to_lowercase() } else { s.to_string() };
    let pattern = fold(pattern);
    let text: Vec<char> = fold(text).chars().collect();

    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            '%' => LikeToken::Any,
            '_' => LikeToken::One,
            other => LikeToken::Literal(other),
        });
    }

    // matched[j]: the tokens consumed so far match text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;
    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        for j in 0..=text.len() {
            match token {
                LikeToken::Any => next[j] = matched[j] || (j > 0 && next[j - 1]),
                LikeToken::One => next[j] = j > 0 && matched[j - 1],
                LikeToken::Literal(c) => next[j] = j > 0 && matched[j - 1] && text[j - 1] == *c,
            }
        }
        matched = next;
    }
    matched[text.len()]
}

/// Router wired to a fresh [`MemoryStore`].
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_tests())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = match TokenService::new(&config.security.jwt_secret) {
            Ok(tokens) => tokens,
            Err(e) => panic!("test token service: {}", e),
        };
        let state = AppState::new(config, tokens, store.clone());
        Self {
            store,
            router: router(state),
        }
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    /// Register a fresh teacher account and return its token.
    pub async fn token(&self) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "username": "bu_sari",
                    "email": "sari@smkn4jkt.sch.id",
                    "password": "rahasia123",
                    "role": "guru"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Create a student and return its id.
    pub async fn create_siswa(&self, token: &str, nis: &str, kelas: &str) -> String {
        let (status, body) = self
            .post(
                "/siswa",
                token,
                json!({
                    "nis": nis,
                    "nama_lengkap": format!("Siswa {}", nis),
                    "kelas": kelas,
                    "jurusan": "RPL"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create siswa failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> JsonDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_like_matching() {
        assert!(like_match("%ani%", "Ani Lestari", true));
        assert!(!like_match("%ani%", "Ani Lestari", false));
        assert!(like_match("1234____", "12345678", false));
        assert!(like_match("%50\\%%", "diskon 50% hari ini", false));
        assert!(!like_match("%50\\%%", "diskon 500 hari ini", false));
    }

    #[test]
    fn test_where_evaluation() {
        let d = doc(json!({ "kelas": "X-1", "tanggal": "2024-07-15", "nilai_karakter": 4, "email": null }));
        assert!(matches_where(&d, &json!({ "kelas": "X-1" })).unwrap());
        assert!(matches_where(&d, &json!({ "tanggal": { "$gte": "2024-07-01", "$lte": "2024-07-31" } })).unwrap());
        assert!(!matches_where(&d, &json!({ "tanggal": { "$gt": "2024-07-15" } })).unwrap());
        assert!(matches_where(&d, &json!({ "$or": [{ "kelas": "X-2" }, { "nilai_karakter": { "$in": [3, 4] } }] })).unwrap());
        assert!(matches_where(&d, &json!({ "email": null })).unwrap());
        assert!(matches_where(&d, &json!({ "$not": { "kelas": "X-2" } })).unwrap());
        assert!(matches_where(&d, &json!({ "kelas": { "$regex": "X" } })).is_err());
    }

    #[tokio::test]
    async fn test_unique_keys_enforced() {
        let store = MemoryStore::new();
        store.insert("siswa", doc(json!({ "id": "a", "nis": "12345678" }))).await.unwrap();
        let err = store.insert("siswa", doc(json!({ "id": "b", "nis": "12345678" }))).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(ref name) if name == "siswa_nis_key"));
    }

    #[tokio::test]
    async fn test_find_orders_and_pages() {
        let store = MemoryStore::new();
        for (id, tanggal) in [("a", "2024-07-02"), ("b", "2024-07-03"), ("c", "2024-07-01")] {
            store.insert("jurnal_harian", doc(json!({ "id": id, "tanggal": tanggal }))).await.unwrap();
        }
        let found = store
            .find(
                "jurnal_harian",
                FilterData {
                    order: Some(json!("tanggal desc")),
                    limit: Some(2),
                    offset: Some(1),
                    ..FilterData::default()
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
