pub mod payroll;
pub mod time_entries;
pub mod users;

use serde::Deserialize;

/// Offset pagination shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }

    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamping() {
        let q = PageQuery::default();
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            skip: Some(-5),
            limit: Some(10_000),
        };
        assert_eq!(q.limit(), 500);
        assert_eq!(q.offset(), 0);
    }
}
