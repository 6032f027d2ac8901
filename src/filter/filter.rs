use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlResult};

/// SQL identifiers must look like `[A-Za-z_][A-Za-z0-9_]*`; they are quoted
/// into the statement verbatim.
pub fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

pub struct Filter {
    table_name: String,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name)?;
        Ok(Self {
            table_name,
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn from_data(table_name: impl Into<String>, data: FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new(table_name)?;
        filter.assign(data)?;
        Ok(filter)
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if data.limit.is_some() || data.offset.is_some() { self.limit(data.limit, data.offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<i64>, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit.map_or(false, |l| l < 0) || offset.map_or(false, |o| o < 0) {
            return Err(FilterError::InvalidRange { limit, offset });
        }
        self.limit = limit;
        self.offset = offset;
        Ok(self)
    }

    /// Whole rows as one `jsonb` document each, in the column `doc`.
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT to_jsonb(t) AS doc".to_string(),
            format!("FROM \"{}\" t", self.table_name),
            format!("WHERE {}", where_result.query),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = match self.where_data {
            Some(ref where_data) => FilterWhere::generate(where_data, 0)?,
            None => ("1=1".to_string(), vec![]),
        };
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = format!(
            "SELECT COUNT(*) AS count FROM \"{}\" WHERE {}",
            self.table_name, where_result.query
        );
        Ok(SqlResult { query, params: where_result.params })
    }

    /// Per-group row count and mean of a numeric column, ordered by group key.
    pub fn to_group_sql(&self, group_by: &str, average_of: &str) -> Result<SqlResult, FilterError> {
        validate_identifier(group_by)?;
        validate_identifier(average_of)?;
        let where_result = self.to_where_sql()?;
        let query = format!(
            "SELECT \"{g}\"::text AS key, COUNT(*) AS count, AVG(\"{a}\")::float8 AS average \
             FROM \"{t}\" WHERE {w} GROUP BY \"{g}\" ORDER BY \"{g}\"",
            g = group_by,
            a = average_of,
            t = self.table_name,
            w = where_result.query,
        );
        Ok(SqlResult { query, params: where_result.params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
