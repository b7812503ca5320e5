//! Classification helpers for raw `sqlx` errors.

/// Name of the unique index guarding short codes.
pub const SHORT_CODE_UNIQUE_CONSTRAINT: &str = "url_mappings_short_code_unique";

/// Returns true when `e` is a uniqueness violation on the short code index.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(SHORT_CODE_UNIQUE_CONSTRAINT))
}
