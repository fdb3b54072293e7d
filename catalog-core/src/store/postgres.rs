use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::instrument;

use super::ProductStore;
use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Page, Product, ProductChanges};

/// PostgreSQL implementation of [`ProductStore`]. All queries are parameterized.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建立连接池；不会重试，连接失败直接返回错误。
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self))]
    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, stock, category, created_at
            FROM products
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn create(&self, product: NewProduct) -> Result<Product> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, stock, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, stock, category, created_at
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, stock, category, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                price = COALESCE($2, price),
                stock = COALESCE($3, stock),
                category = COALESCE($4, category)
            WHERE id = $5
            RETURNING id, name, price, stock, category, created_at
            "#,
        )
        .bind(&changes.name)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(&changes.category)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, price, stock, category, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::NotFound(id))
    }

    async fn ping(&self) -> Result<i32> {
        let ok: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(ok)
    }
}
