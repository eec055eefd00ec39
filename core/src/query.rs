//! Query-string construction for listing and history endpoints.

use std::collections::BTreeMap;

/// Ordered key/value pairs appended to a GET request URL.
///
/// Empty values are never stored, so an empty `Query` produces no `?` at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value`, skipping empty values.
    pub fn push(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `k=v&k=v` form of the pairs.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Paging and filtering conditions for listing endpoints.
    ///
    /// Emits `offset`, `limit`, `filter` and `order_by` in that order. The
    /// filter is rendered as a compact JSON object and only when non-empty.
    pub fn conditions(options: &ListOptions) -> Self {
        let mut query = Self::new();
        query.push("offset", &options.offset);
        query.push("limit", &options.limit);
        if !options.filter.is_empty() {
            query.push("filter", &render_filter(&options.filter));
        }
        query.push("order_by", &options.order_by);
        query
    }

    /// Filters for the account activity log.
    pub fn history(history: &HistoryQuery) -> Self {
        let mut query = Self::new();
        query.push("action", &history.action);
        query.push("date", &history.date);
        query.push("sortBy", &history.sort_by);
        query.push("startDate", &history.start_date);
        query.push("endDate", &history.end_date);
        query
    }
}

fn render_filter(filter: &BTreeMap<String, String>) -> String {
    // A map of strings always serializes.
    serde_json::to_string(filter).unwrap_or_else(|_| "{}".to_string())
}

/// Paging options shared by the form and submission listings.
///
/// Empty strings mean "let the server decide".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub offset: String,
    pub limit: String,
    pub filter: BTreeMap<String, String>,
    pub order_by: String,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: impl ToString) -> Self {
        self.offset = offset.to_string();
        self
    }

    pub fn limit(mut self, limit: impl ToString) -> Self {
        self.limit = limit.to_string();
        self
    }

    pub fn filter(mut self, key: &str, value: &str) -> Self {
        self.filter.insert(key.to_string(), value.to_string());
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = field.to_string();
        self
    }
}

/// Filters for `user/history`. Dates use the `MM/DD/YYYY` format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub action: String,
    pub date: String,
    pub sort_by: String,
    pub start_date: String,
    pub end_date: String,
}
