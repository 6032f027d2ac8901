use serde_json::Value;
use sqlx::{postgres::PgArguments, query::Query, Postgres};

use crate::filter::SqlResult;

/// Build a `sqlx` query from compiled SQL, binding every JSON parameter
/// with the closest native Postgres type.
pub fn build_query(sql: &SqlResult) -> Query<'_, Postgres, PgArguments> {
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param(q, p);
    }
    q
}

pub fn bind_param<'q>(
    q: Query<'q, Postgres, PgArguments>,
    v: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        // Documents and arrays travel as JSONB
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
