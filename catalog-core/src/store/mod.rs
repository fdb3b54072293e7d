//! Storage port for products and its adapters.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewProduct, Page, Product, ProductChanges};

pub use memory::MemoryProductStore;
pub use postgres::PgProductStore;

/// Row store behind the HTTP handlers.
///
/// `get`, `update` and `delete` report a missing row as
/// [`CatalogError::NotFound`](crate::CatalogError::NotFound).
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self, page: Page) -> Result<Vec<Product>>;
    async fn create(&self, product: NewProduct) -> Result<Product>;
    async fn get(&self, id: i64) -> Result<Product>;
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Product>;
    /// Returns the removed row.
    async fn delete(&self, id: i64) -> Result<Product>;
    /// Round-trip to the backend (`SELECT 1`).
    async fn ping(&self) -> Result<i32>;
}
