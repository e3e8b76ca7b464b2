//! Pagination and sort helpers shared by list endpoints.

use serde::Deserialize;

/// Default page size for paginated lists.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Upper bound on any requested page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sortable product columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    CreatedAt,
}

impl ProductSort {
    /// Column the sort maps to. Only these fixed strings reach SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price_cents",
            Self::CreatedAt => "created_at",
        }
    }

    /// Full `ORDER BY` body, with `id` as a stable tiebreaker.
    pub fn order_clause(&self, order: SortOrder) -> String {
        format!("{} {}, id {}", self.column(), order.as_sql(), order.as_sql())
    }
}
