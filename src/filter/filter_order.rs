use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Accepts `"tanggal desc, created_at desc"`, an array of such strings,
    /// or `{ "tanggal": "desc" }`.
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                let mut out = Vec::new();
                for v in arr {
                    let s = v
                        .as_str()
                        .ok_or_else(|| FilterError::InvalidOrder(format!("expected string, got {}", v)))?;
                    out.extend(Self::parse_order_string(s)?);
                }
                Ok(out)
            }
            Value::Object(obj) => {
                let mut out = Vec::new();
                for (column, dir) in obj {
                    validate_identifier(column)?;
                    let sort = Self::parse_direction(dir.as_str().unwrap_or("asc"))?;
                    out.push(FilterOrderInfo { column: column.clone(), sort });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOrder(other.to_string())),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            let Some(column) = it.next() else { continue };
            validate_identifier(column)?;
            let sort = Self::parse_direction(it.next().unwrap_or("asc"))?;
            if it.next().is_some() {
                return Err(FilterError::InvalidOrder(part.trim().to_string()));
            }
            out.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        if dir.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if dir.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidOrder(format!("unknown direction '{}'", dir)))
        }
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
