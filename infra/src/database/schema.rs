//! Table layouts for the MySQL engines.
//!
//! Token keys are nullable with plain unique indexes. MySQL lets any number
//! of rows hold NULL under a unique index, so an empty key is stored as NULL
//! and only non-empty keys take part in uniqueness. Key columns are
//! `VARBINARY`, which compares bytes with no case folding and no trailing-space
//! padding.

use crate::InfrastructureError;

/// Longest table name MySQL accepts
const MAX_IDENTIFIER_LEN: usize = 64;

/// Check that `name` is safe to splice into SQL as a table name.
///
/// Only ASCII letters, digits and underscores are accepted, and the name may
/// not start with a digit.
pub fn validate_table_name(name: &str) -> Result<(), InfrastructureError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(InfrastructureError::Config(format!(
            "invalid table name: {:?}",
            name
        )))
    }
}

/// `CREATE TABLE` statement for a token table
pub fn token_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS `{table}` (
            `id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
            `created_at` DATETIME(6) NOT NULL,
            `expires_at` DATETIME(6) NOT NULL,
            `code` VARBINARY(255) NULL DEFAULT NULL,
            `access` VARBINARY(255) NULL DEFAULT NULL,
            `refresh` VARBINARY(255) NULL DEFAULT NULL,
            `payload` TEXT NOT NULL,
            PRIMARY KEY (`id`),
            UNIQUE KEY `uk_code` (`code`),
            UNIQUE KEY `uk_access` (`access`),
            UNIQUE KEY `uk_refresh` (`refresh`),
            KEY `idx_expires_at` (`expires_at`)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#
    )
}

/// `CREATE TABLE` statement for a client table
pub fn client_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS `{table}` (
            `id` VARBINARY(255) NOT NULL,
            `secret` VARCHAR(255) NOT NULL,
            `domain` VARCHAR(255) NOT NULL,
            `payload` TEXT NOT NULL,
            `created_at` DATETIME(6) NOT NULL,
            PRIMARY KEY (`id`),
            KEY `idx_domain` (`domain`)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#
    )
}
