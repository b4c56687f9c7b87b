//! Translation of SQLx failures into store errors.

use o2s_core::domain::entities::token::TokenKind;
use o2s_core::errors::StoreError;

/// Map a SQLx failure to a storage error, with `context` naming the operation.
///
/// A closed pool maps to the closed-store error.
pub fn storage_error(context: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed => StoreError::closed(),
        other => StoreError::storage(format!("{}: {}", context, other)),
    }
}

/// Whether `err` is a duplicate-key violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || db_err.message().starts_with("Duplicate entry")
        }
        _ => false,
    }
}

/// Token key whose unique index a duplicate-key message names.
///
/// MySQL reports the index as `'uk_access'` or, from 8.0 on, as
/// `'table.uk_access'`.
pub fn conflicting_kind(message: &str) -> Option<TokenKind> {
    TokenKind::ALL
        .into_iter()
        .find(|kind| message.contains(&format!("uk_{}'", kind.column())))
}

/// Map a failed insert into a token table, turning duplicate keys into
/// conflicts on the offending column
pub fn token_insert_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        let field = match &err {
            sqlx::Error::Database(db_err) => conflicting_kind(db_err.message())
                .map(|kind| kind.column().to_string())
                .unwrap_or_else(|| "key".to_string()),
            _ => "key".to_string(),
        };
        return StoreError::conflict(field);
    }
    storage_error("Failed to insert token record", err)
}
