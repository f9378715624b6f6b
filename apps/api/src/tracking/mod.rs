//! Tracking: persistence of user actions: saved remedies, search history,
//! symptom journal and the dashboard that summarizes them.
//!
//! Tables are owned by the hosted database; this service only reads and
//! writes rows. Every query is scoped to the caller's `user_id`.

pub mod dashboard;
pub mod handlers;
pub mod saved;
pub mod searches;
pub mod symptoms;

/// Page size used when a list endpoint is called without `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolves an optional `limit` to `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 20);
        assert_eq!(clamp_limit(Some(0), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 1);
        assert_eq!(clamp_limit(Some(-5), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 1);
        assert_eq!(clamp_limit(Some(500), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 100);
        assert_eq!(clamp_limit(Some(7), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 7);
    }
}
