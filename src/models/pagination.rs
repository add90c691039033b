use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Pagination parameters for list queries.
/// When neither page nor limit is given the whole list is returned.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: Option<i64>,
    /// Number of items per page.
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// SQL OFFSET based on the effective (capped) limit.
    pub fn offset(&self) -> Option<i64> {
        let effective_limit = self.effective_limit()?;
        let page = self.page.unwrap_or(1).max(1);
        Some((page - 1) * effective_limit)
    }

    pub fn effective_limit(&self) -> Option<i64> {
        match self.limit {
            Some(limit) => Some(limit.clamp(1, Self::MAX_LIMIT)),
            None if self.page.is_some() => Some(Self::DEFAULT_LIMIT),
            None => None,
        }
    }

    /// `LIMIT .. OFFSET ..` suffix, empty when unpaginated. Values are integers so this is injection-safe.
    pub fn sql_suffix(&self) -> String {
        match (self.effective_limit(), self.offset()) {
            (Some(limit), Some(offset)) => format!(" LIMIT {} OFFSET {}", limit, offset),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total_items: i64) -> Self {
        let total_pages = if limit > 0 { (total_items + limit - 1) / limit } else { 1 };

        Self {
            data,
            page,
            limit,
            total_items,
            total_pages,
        }
    }

    pub fn from_params(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        match params.effective_limit() {
            Some(limit) => Self::new(data, params.page.unwrap_or(1).max(1), limit, total_items),
            None => Self::new(data, 1, total_items.max(1), total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_params_means_no_pagination() {
        let params = PaginationParams::default();
        assert_eq!(params.effective_limit(), None);
        assert_eq!(params.offset(), None);
        assert_eq!(params.sql_suffix(), "");
    }

    #[test]
    fn page_without_limit_uses_default() {
        let params = PaginationParams::new(Some(3), None);
        assert_eq!(params.effective_limit(), Some(PaginationParams::DEFAULT_LIMIT));
        assert_eq!(params.offset(), Some(100));
    }

    #[test]
    fn limit_is_capped() {
        let params = PaginationParams::new(Some(2), Some(1_000));
        assert_eq!(params.effective_limit(), Some(PaginationParams::MAX_LIMIT));
        assert_eq!(params.sql_suffix(), " LIMIT 200 OFFSET 200");
    }

    #[test]
    fn total_pages_rounds_up() {
        let response = PaginatedResponse::new(vec![1, 2], 1, 2, 5);
        assert_eq!(response.total_pages, 3);

        let unpaginated = PaginatedResponse::from_params(vec![1, 2, 3], &PaginationParams::default(), 3);
        assert_eq!(unpaginated.total_pages, 1);
        assert_eq!(unpaginated.limit, 3);
    }
}
