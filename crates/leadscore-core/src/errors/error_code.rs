//! LeadScoreErrorCode trait for structured error codes at outer surfaces.

/// Every error enum implements this to expose a stable code string
/// that callers outside the crate can match on.
pub trait LeadScoreErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted surface string: `[ERROR_CODE] message`.
    fn surface_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
