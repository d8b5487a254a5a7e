pub mod assistant;
pub mod calendar;
pub mod config;
pub mod error;
pub mod focus;
pub mod model;
pub mod planner;
pub mod repository;
pub mod review;
pub mod storage;

#[cfg(test)]
mod tests {
    use crate::error::AppError;

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("task is required");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "task is required");
        assert_eq!(err.to_string(), "invalid_input - task is required");
    }

    #[test]
    fn assistant_errors_have_their_own_code() {
        let err = AppError::assistant("HTTP 500");
        assert_eq!(err.code(), "assistant_error");
    }
}
