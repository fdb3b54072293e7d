//! Database bootstrap: table creation and sample rows.

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// DDL for the `products` table; safe to run repeatedly.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
/// Sample catalog inserted into an empty table.
pub const SEED_SQL: &str = include_str!("../sql/seed.sql");

pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    info!("products table ready");
    Ok(())
}

/// 表为空时插入示例数据，返回插入的行数。
pub async fn seed_if_empty(pool: &PgPool) -> Result<u64> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "products table not empty, skipping seed");
        return Ok(0);
    }
    let inserted = sqlx::query(SEED_SQL).execute(pool).await?.rows_affected();
    info!(inserted, "seeded products table");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent_ddl() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS products"));
        assert!(SCHEMA_SQL.contains("CREATE INDEX IF NOT EXISTS"));
    }

    #[test]
    fn seed_is_a_single_statement() {
        assert_eq!(SEED_SQL.trim_end().matches(';').count(), 0);
        assert!(SEED_SQL.starts_with("INSERT INTO products"));
    }
}
