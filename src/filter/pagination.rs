use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;

/// Resolved 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Parse raw query values. Non-numeric input falls back to the defaults,
    /// `page` is at least 1 and `limit` is clamped to `[1, max_limit]`.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE as i64)
            .max(1)
            .min(u32::MAX as i64) as u32;
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(default_limit as i64)
            .clamp(1, max_limit as i64) as u32;
        Self { page, limit }
    }

    pub fn skip(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit as i64 - 1) / self.limit as i64
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: 10 }
    }
}

/// One page of results plus the count of everything that matched.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        self.request.total_pages(self.total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Pagination block for list responses; `total_key` names the total
    /// (`total_entries`, `total_students`, `total_teachers`).
    pub fn pagination_json(&self, total_key: &str) -> serde_json::Value {
        let mut block = serde_json::Map::new();
        block.insert("current_page".into(), self.request.page.into());
        block.insert("total_pages".into(), self.total_pages().into());
        block.insert(total_key.into(), self.total.into());
        block.insert("per_page".into(), self.request.limit.into());
        serde_json::Value::Object(block)
    }
}

impl<T: Serialize> Page<T> {
    pub fn to_json(&self, items_key: &str, total_key: &str) -> Result<serde_json::Value, serde_json::Error> {
        let mut body = serde_json::Map::new();
        body.insert(items_key.into(), serde_json::to_value(&self.items)?);
        body.insert("pagination".into(), self.pagination_json(total_key));
        Ok(serde_json::Value::Object(body))
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%text%` with metacharacters escaped.
pub fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text))
}
