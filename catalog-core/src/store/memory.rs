use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::ProductStore;
use crate::error::{CatalogError, Result};
use crate::models::{NewProduct, Page, Product, ProductChanges};

/// In-memory [`ProductStore`] for tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Product>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟数据库不可用：之后的每次调用都返回连接池超时错误。
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        self.ensure_available()?;
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        self.ensure_available()?;
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let row = Product {
            id: inner.next_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            category: product.category,
            created_at: Utc::now(),
        };
        inner.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<Product> {
        self.ensure_available()?;
        let inner = self.inner.lock().await;
        inner.rows.get(&id).cloned().ok_or(CatalogError::NotFound(id))
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Product> {
        self.ensure_available()?;
        let mut inner = self.inner.lock().await;
        let row = inner.rows.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(price) = changes.price {
            row.price = price;
        }
        if let Some(stock) = changes.stock {
            row.stock = stock;
        }
        if let Some(category) = changes.category {
            row.category = Some(category);
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<Product> {
        self.ensure_available()?;
        let mut inner = self.inner.lock().await;
        inner.rows.remove(&id).ok_or(CatalogError::NotFound(id))
    }

    async fn ping(&self) -> Result<i32> {
        self.ensure_available()?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: 1_000,
            stock: 3,
            category: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryProductStore::new();
        let a = store.create(new_product("a")).await.unwrap();
        let b = store.create(new_product("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.get(2).await.unwrap().name, "b");
    }

    #[tokio::test]
    async fn list_respects_page() {
        let store = MemoryProductStore::new();
        for name in ["a", "b", "c", "d"] {
            store.create(new_product(name)).await.unwrap();
        }
        let page = store.list(Page { limit: 2, offset: 1 }).await.unwrap();
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[tokio::test]
    async fn update_keeps_absent_fields() {
        let store = MemoryProductStore::new();
        let created = store.create(new_product("a")).await.unwrap();
        let updated = store
            .update(
                created.id,
                ProductChanges {
                    price: Some(2_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 2_500);
        assert_eq!(updated.name, "a");
        assert_eq!(updated.stock, 3);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryProductStore::new();
        assert!(matches!(store.get(9).await, Err(CatalogError::NotFound(9))));
        assert!(matches!(
            store.update(9, ProductChanges::default()).await,
            Err(CatalogError::NotFound(9))
        ));
        assert!(matches!(store.delete(9).await, Err(CatalogError::NotFound(9))));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryProductStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list(Page::default()).await,
            Err(CatalogError::Database(_))
        ));
        assert!(store.ping().await.is_err());
    }
}
