#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,

    Like,
    ILike,

    In,

    And,
    Or,
    Not,
}

impl FilterOp {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$and" => FilterOp::And,
            "$or" => FilterOp::Or,
            "$not" => FilterOp::Not,
            _ => return None,
        })
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, FilterOp::And | FilterOp::Or | FilterOp::Not)
    }
}

/// Query description shared by the SQL compiler and the in-memory test store.
#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub where_clause: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterData {
    pub fn with_where(where_clause: serde_json::Value) -> Self {
        Self {
            where_clause: Some(where_clause),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
