//! Generic list-query helper: free-text search, equality filters, sort,
//! page/limit pagination and field projection over one table.
//!
//! Every list endpoint (doctors, patients, blood requests) feeds its raw
//! query-string map through this module. Column access is whitelisted per
//! collection, so caller input never reaches SQL as an identifier.

use std::collections::HashMap;

use serde::Serialize;

/// Keys consumed by the helper itself; everything else in the query string is
/// treated as an equality filter.
pub const RESERVED_KEYS: &[&str] = &["searchTerm", "sort", "page", "limit", "fields"];

const DEFAULT_SORT: &str = "-created_at";

/// Per-collection whitelists and defaults.
pub struct CollectionSpec {
    /// Columns matched by the case-insensitive substring search.
    pub searchable: &'static [&'static str],
    /// Columns accepted as equality filters.
    pub filterable: &'static [&'static str],
    /// Columns accepted in the sort specifier.
    pub sortable: &'static [&'static str],
    pub default_limit: u32,
}

/// Raw query-string map as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    params: HashMap<String, String>,
}

impl ListQuery {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Resolve the raw map against a collection's whitelists.
    pub fn plan(&self, spec: &CollectionSpec) -> QueryPlan {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(term) = self.params.get("searchTerm").filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            let ors: Vec<String> = spec
                .searchable
                .iter()
                .map(|col| {
                    binds.push(pattern.clone());
                    format!("LOWER({col}) LIKE ?")
                })
                .collect();
            if !ors.is_empty() {
                clauses.push(format!("({})", ors.join(" OR ")));
            }
        }

        for (key, value) in &self.params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let column = to_snake_case(key);
            // Unknown filter keys are ignored, matching the permissive
            // behavior of the original query layer.
            if spec.filterable.contains(&column.as_str()) {
                clauses.push(format!("{column} = ?"));
                binds.push(value.clone());
            }
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sort = self
            .params
            .get("sort")
            .map(String::as_str)
            .unwrap_or(DEFAULT_SORT);
        let (sort_column, descending) = match sort.strip_prefix('-') {
            Some(col) => (to_snake_case(col), true),
            None => (to_snake_case(sort), false),
        };
        let order_sql = if spec.sortable.contains(&sort_column.as_str()) {
            format!("ORDER BY {sort_column} {}", if descending { "DESC" } else { "ASC" })
        } else {
            "ORDER BY created_at DESC".to_string()
        };

        let page = self
            .params
            .get("page")
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = self
            .params
            .get("limit")
            .and_then(|l| l.parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(spec.default_limit);

        let fields = self.params.get("fields").map(|f| {
            f.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        QueryPlan { where_sql, binds, order_sql, page, limit, fields }
    }
}

/// A resolved query: SQL suffix + binds, pagination numbers, projection.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    where_sql: String,
    binds: Vec<String>,
    order_sql: String,
    page: u32,
    limit: u32,
    fields: Option<Vec<String>>,
}

impl QueryPlan {
    /// `WHERE … ORDER BY … LIMIT … OFFSET …` to append to a SELECT.
    /// Limit/offset are validated integers and inlined; only filter and
    /// search values are bound.
    pub fn suffix(&self) -> String {
        let offset = (self.page - 1) * self.limit;
        let mut parts = Vec::new();
        if !self.where_sql.is_empty() {
            parts.push(self.where_sql.clone());
        }
        parts.push(self.order_sql.clone());
        parts.push(format!("LIMIT {} OFFSET {}", self.limit, offset));
        parts.join(" ")
    }

    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// Pagination meta from an independent total-row count.
    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_page: total.div_ceil(self.limit as u64),
        }
    }

    /// Apply the comma-separated field projection to one serialized row.
    /// The id field always survives projection.
    pub fn project(&self, row: serde_json::Value) -> serde_json::Value {
        let Some(fields) = &self.fields else {
            return row;
        };
        let serde_json::Value::Object(map) = row else {
            return row;
        };
        let projected: serde_json::Map<String, serde_json::Value> = map
            .into_iter()
            .filter(|(key, _)| key == "id" || fields.iter().any(|f| f == key))
            .collect();
        serde_json::Value::Object(projected)
    }
}

/// `{page, limit, total, totalPage}` attached to list envelopes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_page: u64,
}

fn to_snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for ch in input.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
