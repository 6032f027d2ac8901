use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOp, FilterWhereInfo};

/// Compiles a Mongo-style where document into a parameterized SQL predicate.
///
/// Placeholders are numbered from `starting_param_index + 1` and keep
/// counting through nested `$and` / `$or` / `$not` groups, so the returned
/// parameter list always lines up with the `$n` markers in the SQL.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let conditions = filter_where.compile(where_data)?;
        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        Ok((where_clause, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    /// Flatten a where document into a list of conditions to be AND-ed.
    fn compile(&mut self, where_data: &Value) -> Result<Vec<String>, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(vec![]),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut conditions = Vec::new();
        for (key, value) in obj {
            if key.starts_with('$') {
                conditions.push(self.compile_logical(key, value)?);
            } else {
                for info in Self::parse_field_condition(key, value)? {
                    conditions.push(self.build_sql_condition(&info)?);
                }
            }
        }
        Ok(conditions)
    }

    fn compile_logical(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match FilterOp::parse(op) {
            Some(FilterOp::And) | Some(FilterOp::Or) => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::operator_data(op, "requires an array"))?;
                if arr.is_empty() {
                    return Err(FilterError::operator_data(op, "requires at least one clause"));
                }
                let mut parts = Vec::with_capacity(arr.len());
                for clause in arr {
                    let inner = self.compile(clause)?;
                    parts.push(Self::group(inner));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", parts.join(joiner)))
            }
            Some(FilterOp::Not) => {
                let inner = self.compile(value)?;
                Ok(format!("NOT {}", Self::group(inner)))
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn group(conditions: Vec<String>) -> String {
        if conditions.is_empty() {
            "(1=1)".to_string()
        } else {
            format!("({})", conditions.join(" AND "))
        }
    }

    pub(crate) fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        validate_identifier(field)?;

        let is_operator_object = matches!(value, Value::Object(obj)
            if !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')));

        if !is_operator_object {
            // Implicit equality: { field: value }
            return Ok(vec![FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            }]);
        }

        let mut out = Vec::new();
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = FilterOp::parse(op_key)
                    .filter(|op| !op.is_logical())
                    .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                out.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator,
                    data: op_val.clone(),
                });
            }
        }
        Ok(out)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        let data = &condition.data;

        let sql = match condition.operator {
            FilterOp::Eq if data.is_null() => format!("{} IS NULL", quoted_column),
            FilterOp::Ne if data.is_null() => format!("{} IS NOT NULL", quoted_column),
            FilterOp::Eq => format!("{} = {}", quoted_column, self.param(data.clone())),
            FilterOp::Ne => format!("{} IS DISTINCT FROM {}", quoted_column, self.param(data.clone())),
            FilterOp::Gt => format!("{} > {}", quoted_column, self.scalar_param("$gt", data)?),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.scalar_param("$gte", data)?),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.scalar_param("$lt", data)?),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.scalar_param("$lte", data)?),
            FilterOp::Like => format!("{} LIKE {}", quoted_column, self.string_param("$like", data)?),
            FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.string_param("$ilike", data)?),
            FilterOp::In => {
                let values = data
                    .as_array()
                    .ok_or_else(|| FilterError::operator_data("$in", "requires an array"))?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", quoted_column, params.join(", "))
            }
            FilterOp::And | FilterOp::Or | FilterOp::Not => {
                return Err(FilterError::UnsupportedOperator(format!("{:?} on a field", condition.operator)));
            }
        };
        Ok(sql)
    }

    fn scalar_param(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(self.param(value.clone())),
            _ => Err(FilterError::operator_data(op, "requires a scalar value")),
        }
    }

    fn string_param(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match value {
            Value::String(_) => Ok(self.param(value.clone())),
            _ => Err(FilterError::operator_data(op, "requires a string pattern")),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
